//! Defines [`Site`], the state of a single build which extensions like
//! [`crate::series::generate`] read from and add to.

use crate::layout::Layouts;
use crate::page::Page;
use crate::post::Post;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

const DATA_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Everything known about the site during a build.
pub struct Site {
    /// The site's root URL.
    pub root_url: Url,

    /// The directory holding the site's data files (`_data`).
    pub data_directory: PathBuf,

    /// All posts, in collection order (oldest first).
    pub posts: Vec<Post>,

    /// The layout registry.
    pub layouts: Layouts,

    /// Data made available to templates as `.site.data`, keyed by data file
    /// name less its extension.
    pub data: BTreeMap<String, serde_yaml::Value>,

    /// Pages generated during the build, in addition to the posts.
    pub pages: Vec<Page>,
}

/// Loads every `*.yml`/`*.yaml` file in `dir` keyed by file stem. A missing
/// directory yields no data.
pub fn load_data(dir: &Path) -> Result<BTreeMap<String, serde_yaml::Value>> {
    let mut data = BTreeMap::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(data),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let path = entry?.path();
        let is_data = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| DATA_EXTENSIONS.contains(&ext));
        if !path.is_file() || !is_data {
            continue;
        }
        if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
            let contents = std::fs::read_to_string(&path)?;
            let value = serde_yaml::from_str(&contents).map_err(|err| Error::Parse {
                path: path.clone(),
                err,
            })?;
            data.insert(name.to_owned(), value);
        }
    }
    Ok(data)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading site data.
#[derive(Debug)]
pub enum Error {
    /// Returned when a data file isn't valid YAML.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse { path, err } => {
                write!(f, "Parsing data file '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_data() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("authors.yml"), "- alice\n- bob\n")?;
        std::fs::write(dir.path().join("links.yaml"), "home: /\n")?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let data = load_data(dir.path())?;
        assert_eq!(vec!["authors", "links"], data.keys().collect::<Vec<_>>());
        assert_eq!(
            serde_yaml::Value::Sequence(vec!["alice".into(), "bob".into()]),
            data["authors"],
        );
        Ok(())
    }

    #[test]
    fn test_load_data_missing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(load_data(&dir.path().join("_data"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_data_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.yml"), "key: [unclosed\n").unwrap();
        assert!(matches!(load_data(dir.path()), Err(Error::Parse { .. })));
    }
}
