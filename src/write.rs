use crate::layout::{self, Layouts};
use crate::site::Site;
use crate::value::from_yaml;
use gtmpl::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for templating the site's posts and generated pages and
/// writing them to disk.
pub struct Writer<'a> {
    /// The directory in which all output files are written. Posts land in
    /// `{output_directory}/posts/{id}.html`; generated pages at their own
    /// relative paths (e.g., `{output_directory}/series/{url}/index.html`).
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders every post and generated page of `site` and writes the results
    /// under the output directory. Returns the number of files written.
    pub fn write_site(&self, site: &Site) -> Result<usize> {
        let site_value = site_to_value(site);
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written = 0;

        let posts = site
            .posts
            .iter()
            .map(|post| (post.output_path(), post.layout.as_str(), fields(Value::from(post))));

        let pages = site.pages.iter().map(|page| {
            let mut m = fields(Value::from(page));
            m.insert("url".to_owned(), Value::String(page_url(site, &page.path)));
            (page.path.clone(), page.layout.as_str(), m)
        });

        for (relative_path, layout, page) in posts.chain(pages) {
            let file_path = self.output_directory.join(&relative_path);
            // there should always be a dir since the path is under the output
            // directory
            if let Some(dir) = file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(&site.layouts, layout, page, &site_value, &file_path)?;
            written += 1;
        }
        Ok(written)
    }

    /// Templates a single page and writes it to `file_path`.
    fn write_page(
        &self,
        layouts: &Layouts,
        layout: &str,
        page: HashMap<String, Value>,
        site: &Value,
        file_path: &Path,
    ) -> Result<()> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("page".to_owned(), Value::Object(page));
        m.insert("site".to_owned(), site.clone());

        let html = layouts.render(layout, Value::Object(m)).map_err(|err| {
            Error::Render {
                path: file_path.to_owned(),
                err,
            }
        })?;
        std::fs::write(file_path, html)?;
        tracing::debug!(path = %file_path.display(), layout, "wrote page");
        Ok(())
    }
}

fn fields(value: Value) -> HashMap<String, Value> {
    match value {
        Value::Object(m) => m,
        _ => HashMap::new(),
    }
}

// The URL of a generated page. Index pages are addressed by their directory.
fn page_url(site: &Site, path: &Path) -> String {
    let relative = path.to_string_lossy().replace('\\', "/");
    let relative = relative.trim_end_matches("index.html");
    match site.root_url.join(relative) {
        Ok(url) => url.to_string(),
        Err(_) => relative.to_owned(),
    }
}

/// Converts the site-wide values into a [`Value::Object`] with the fields
/// `root`, `posts`, and `data`.
fn site_to_value(site: &Site) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("root".to_owned(), Value::String(site.root_url.to_string()));
    m.insert(
        "posts".to_owned(),
        Value::Array(site.posts.iter().map(Value::from).collect()),
    );
    m.insert(
        "data".to_owned(),
        Value::Object(
            site.data
                .iter()
                .map(|(k, v)| (k.clone(), from_yaml(v)))
                .collect(),
        ),
    );
    Value::Object(m)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Render { path: PathBuf, err: layout::Error },

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render { path, err } => {
                write!(f, "Rendering '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
