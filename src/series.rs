//! Series support. Posts may name the series they belong to in their
//! frontmatter:
//!
//! ```yaml
//! serie:
//!   url: go
//!   name: Go Series
//! ```
//!
//! When the site has a `serie_posts` layout, [`generate`] collects the
//! distinct series into `_data/series.yml` and adds one index page per series
//! at `series/{url}/index.html`. Without that layout the whole step is a
//! no-op.

use crate::page::Page;
use crate::post::Post;
use crate::site::Site;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The layout series pages are rendered with. Its presence in the layout
/// registry also enables series generation.
pub const SERIES_LAYOUT: &str = "serie_posts";

/// The name of the data file (and site data key) holding the series list.
pub const SERIES_DATA: &str = "series";

const SERIES_DIRECTORY: &str = "series";

/// A distinct series. Two records with the same `url` are the same series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesRecord {
    /// The series identifier, used as a URL path segment.
    pub url: String,

    /// The series display name.
    pub name: String,
}

/// Collects the distinct series referenced by `posts`, in the order in which
/// they are first referenced. Posts without a complete `serie` are skipped.
/// When several posts reference the same series `url`, the first post's
/// `name` is kept and later names are ignored.
pub fn index_series<'a, I>(posts: I) -> Vec<SeriesRecord>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    for record in posts.into_iter().filter_map(Post::series_record) {
        if seen.insert(record.url.clone()) {
            records.push(record);
        }
    }
    records
}

/// Writes `records` to `{data_directory}/series.yml` as a YAML sequence of
/// `{url, name}` mappings, replacing any previous contents. Returns the path
/// of the written file.
pub fn write_series_data(data_directory: &Path, records: &[SeriesRecord]) -> Result<PathBuf> {
    let path = data_directory.join(format!("{}.yml", SERIES_DATA));
    std::fs::create_dir_all(data_directory).map_err(|err| Error::WriteData {
        path: path.clone(),
        err,
    })?;
    let file = File::create(&path).map_err(|err| Error::WriteData {
        path: path.clone(),
        err,
    })?;
    serde_yaml::to_writer(file, records)?;
    Ok(path)
}

/// Creates one index [`Page`] per series, in the same order as `records`.
pub fn series_pages(records: &[SeriesRecord]) -> Vec<Page> {
    records
        .iter()
        .map(|record| {
            let mut context = BTreeMap::new();
            context.insert("serie_url".to_owned(), record.url.clone());
            context.insert("serie_name".to_owned(), record.name.clone());
            Page {
                path: PathBuf::from(format!("{}/{}/index.html", SERIES_DIRECTORY, record.url)),
                layout: SERIES_LAYOUT.to_owned(),
                context,
            }
        })
        .collect()
}

/// Returns true if the site can render series pages.
pub fn enabled(site: &Site) -> bool {
    site.layouts.contains(SERIES_LAYOUT)
}

/// Indexes the site's series, writes the series data file, makes the series
/// list available to templates as `site.data.series`, and appends the series
/// index pages to the site's pages. Does nothing if the site has no
/// `serie_posts` layout.
pub fn generate(site: &mut Site) -> Result<()> {
    if !enabled(site) {
        tracing::debug!(
            layout = SERIES_LAYOUT,
            "layout not found; skipping series generation"
        );
        return Ok(());
    }

    let records = index_series(&site.posts);
    let path = write_series_data(&site.data_directory, &records)?;
    tracing::info!(count = records.len(), path = %path.display(), "wrote series data");

    for record in &records {
        tracing::debug!(url = %record.url, name = %record.name, "generating series page");
    }
    site.data
        .insert(SERIES_DATA.to_owned(), serde_yaml::to_value(&records)?);
    site.pages.extend(series_pages(&records));
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem generating series data.
#[derive(Debug)]
pub enum Error {
    /// Returned when the series data file can't be written.
    WriteData { path: PathBuf, err: std::io::Error },

    /// Returned when the series list can't be serialized.
    Serialize(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::WriteData { path, err } => {
                write!(f, "Writing series data '{}': {}", path.display(), err)
            }
            Error::Serialize(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WriteData { path: _, err } => Some(err),
            Error::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts [`serde_yaml::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator when serializing.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Serialize(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::Layouts;
    use crate::post::SerieMeta;
    use url::Url;

    fn post(id: &str, serie: Option<(Option<&str>, Option<&str>)>) -> Post {
        Post {
            id: id.to_owned(),
            title: id.to_owned(),
            date: "2021-01-01".to_owned(),
            layout: "post".to_owned(),
            serie: serie.map(|(url, name)| SerieMeta {
                url: url.map(str::to_owned),
                name: name.map(str::to_owned),
            }),
            url: Url::parse("https://example.com/posts/")
                .unwrap()
                .join(&format!("{}.html", id))
                .unwrap(),
            body: String::new(),
        }
    }

    fn record(url: &str, name: &str) -> SeriesRecord {
        SeriesRecord {
            url: url.to_owned(),
            name: name.to_owned(),
        }
    }

    fn scenario() -> Vec<Post> {
        vec![
            post("a", Some((Some("go"), Some("Go Series")))),
            post("b", Some((Some("go"), Some("Golang")))),
            post("c", Some((Some("rust"), Some("Rust Series")))),
            post("d", None),
        ]
    }

    fn site_with_layouts(root: &Path, layouts: &[&str]) -> Site {
        let mut registry = Layouts::default();
        for name in layouts {
            registry.insert(name, "{{ .page.serie_name }}").unwrap();
        }
        Site {
            root_url: Url::parse("https://example.com/").unwrap(),
            data_directory: root.join("_data"),
            posts: scenario(),
            layouts: registry,
            data: BTreeMap::new(),
            pages: Vec::new(),
        }
    }

    #[test]
    fn test_index_series_first_name_wins() {
        assert_eq!(
            vec![record("go", "Go Series"), record("rust", "Rust Series")],
            index_series(&scenario()),
        );
    }

    #[test]
    fn test_index_series_skips_incomplete_series() {
        let posts = vec![
            post("a", None),
            post("b", Some((None, Some("Nameless")))),
            post("c", Some((Some("orphan"), None))),
            post("d", Some((None, None))),
        ];
        assert!(index_series(&posts).is_empty());
    }

    #[test]
    fn test_index_series_many_duplicates() {
        let posts: Vec<Post> = (0..10)
            .map(|i| {
                let name = format!("Go #{}", i);
                post(&format!("p{}", i), Some((Some("go"), Some(name.as_str()))))
            })
            .collect();
        assert_eq!(vec![record("go", "Go #0")], index_series(&posts));
    }

    #[test]
    fn test_index_series_pages_stay_under_series_directory() {
        let posts = vec![
            post("a", Some((Some("/tmp/escaped"), Some("Escaped")))),
            post("b", Some((Some("go/"), Some("Trailing Slash")))),
            post("c", Some((Some("./go"), Some("Dotted")))),
            post("d", Some((Some("../go"), Some("Parent")))),
            post("e", Some((Some("go#intro"), Some("Fragment")))),
            post("f", Some((Some("go?page=2"), Some("Query")))),
            post("g", Some((Some("go"), Some("Go Series")))),
        ];
        let records = index_series(&posts);
        assert_eq!(vec![record("go", "Go Series")], records);

        let pages = series_pages(&records);
        assert_eq!(1, pages.len());
        assert!(pages[0].path.is_relative());
        assert_eq!(Path::new("series/go/index.html"), pages[0].path.as_path());
    }

    #[test]
    fn test_series_pages() {
        let records = vec![record("go", "Go Series"), record("rust", "Rust Series")];
        let pages = series_pages(&records);

        let paths: Vec<PathBuf> = pages.iter().map(|p| p.path.clone()).collect();
        assert_eq!(
            vec![
                PathBuf::from("series/go/index.html"),
                PathBuf::from("series/rust/index.html"),
            ],
            paths,
        );
        assert!(pages.iter().all(|p| p.layout == SERIES_LAYOUT));
        assert_eq!("go", pages[0].context["serie_url"]);
        assert_eq!("Go Series", pages[0].context["serie_name"]);

        let distinct: HashSet<&PathBuf> = paths.iter().collect();
        assert_eq!(records.len(), distinct.len());
    }

    #[test]
    fn test_write_series_data_overwrites() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("_data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("series.yml"), "- url: stale\n  name: Stale\n").unwrap();

        let path = write_series_data(&data_dir, &[record("go", "Go Series")])?;
        let written: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap())?;
        let wanted: serde_yaml::Value = serde_yaml::from_str("- url: go\n  name: Go Series\n")?;
        assert_eq!(wanted, written);
        Ok(())
    }

    #[test]
    fn test_write_series_data_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be.
        let blocker = dir.path().join("_data");
        std::fs::write(&blocker, "").unwrap();
        assert!(matches!(
            write_series_data(&blocker, &[]),
            Err(Error::WriteData { .. })
        ));
    }

    #[test]
    fn test_generate() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut site = site_with_layouts(dir.path(), &["post", SERIES_LAYOUT]);
        generate(&mut site)?;

        let paths: Vec<&Path> = site.pages.iter().map(|p| p.path.as_path()).collect();
        assert_eq!(
            vec![
                Path::new("series/go/index.html"),
                Path::new("series/rust/index.html"),
            ],
            paths,
        );
        assert!(dir.path().join("_data/series.yml").is_file());
        assert_eq!(
            serde_yaml::to_value(vec![
                record("go", "Go Series"),
                record("rust", "Rust Series")
            ])?,
            site.data[SERIES_DATA],
        );
        Ok(())
    }

    #[test]
    fn test_generate_without_layout_is_noop() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut site = site_with_layouts(dir.path(), &["post"]);
        generate(&mut site)?;

        assert!(site.pages.is_empty());
        assert!(site.data.is_empty());
        assert!(!dir.path().join("_data").exists());
        Ok(())
    }
}
