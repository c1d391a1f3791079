//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading layouts, parsing the
//! posts ([`crate::post`]), generating series pages ([`crate::series`]), and
//! rendering everything to disk ([`crate::write`]).

use crate::chat::ChatRenderer;
use crate::config::Config;
use crate::layout::{Error as LayoutError, Layouts};
use crate::post::{Error as ParseError, Parser as PostParser};
use crate::series::{self, Error as SeriesError};
use crate::site::{self, Error as DataError, Site};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object and returns the [`Site`] that was
/// rendered.
pub fn build_site(config: &Config) -> Result<Site> {
    let layouts = Layouts::load(&config.layouts_directory)?;

    // collect all posts
    let chat_renderer = ChatRenderer::new(&config.includes_directory);
    let post_parser = PostParser::new(&config.posts_url, &chat_renderer);
    let posts = post_parser.parse_posts(&config.posts_source_directory)?;
    tracing::info!(count = posts.len(), "parsed posts");

    let mut site = Site {
        root_url: config.site_root.clone(),
        data_directory: config.data_directory.clone(),
        posts,
        layouts,
        data: site::load_data(&config.data_directory)?,
        pages: Vec::new(),
    };

    series::generate(&mut site)?;

    // Blow away the old output directory so we don't have any stale pages.
    rmdir(&config.output_directory)?;
    let written = Writer {
        output_directory: &config.output_directory,
    }
    .write_site(&site)?;
    tracing::info!(
        written,
        output = %config.output_directory.display(),
        "built site"
    );

    Ok(site)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during layout loading,
/// parsing, series generation, writing, and cleaning the output directory.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading layouts.
    Layout(LayoutError),

    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors loading site data.
    Data(DataError),

    /// Returned for errors generating series data.
    Series(SeriesError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Layout(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Data(err) => err.fmt(f),
            Error::Series(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Layout(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Data(err) => Some(err),
            Error::Series(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    /// Converts [`LayoutError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LayoutError) -> Error {
        Error::Layout(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<DataError> for Error {
    /// Converts [`DataError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: DataError) -> Error {
        Error::Data(err)
    }
}

impl From<SeriesError> for Error {
    /// Converts [`SeriesError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SeriesError) -> Error {
        Error::Series(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
