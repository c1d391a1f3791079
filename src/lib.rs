//! The library code for the `skald` static site generator. A build is a
//! single pass:
//!
//! 1. Loading layouts ([`crate::layout`]) and parsing posts from source files
//!    on disk ([`crate::post`]), rendering `chat` blocks along the way
//!    ([`crate::chat`])
//! 2. Running extensions against the build's [`crate::site::Site`]. The
//!    series extension ([`crate::series`]) writes `_data/series.yml` and adds
//!    an index page per series.
//! 3. Rendering all posts and generated pages to disk ([`crate::write`])
//!
//! The series extension only runs when the site has a `serie_posts` layout.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod chat;
pub mod config;
pub mod layout;
pub mod markdown;
pub mod page;
pub mod post;
pub mod series;
pub mod site;
pub mod value;
pub mod write;
