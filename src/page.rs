use std::collections::BTreeMap;
use std::path::PathBuf;

/// A page synthesized during the build (e.g., a series index). It isn't
/// backed by a source file; the writer renders it through `layout` with
/// `context` as the page's fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// The output path, relative to the output directory.
    pub path: PathBuf,

    /// The name of the layout to render the page with.
    pub layout: String,

    /// Named values made available to the layout as `.page.{name}`.
    pub context: BTreeMap<String, String>,
}
