//! The layout registry: named gtmpl templates loaded from the `_layouts`
//! directory. A layout's name is its file name less the `.html` extension.

use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

const LAYOUT_EXTENSION: &str = "html";

/// Maps layout names to parsed templates.
#[derive(Default)]
pub struct Layouts {
    templates: HashMap<String, Template>,
}

impl Layouts {
    /// Loads and parses every `*.html` file in `dir`. A missing directory
    /// yields an empty registry.
    pub fn load(dir: &Path) -> Result<Layouts> {
        let mut layouts = Layouts::default();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(layouts),
            Err(e) => return Err(Error::Read { path: dir.to_owned(), err: e }),
        };

        for entry in entries {
            let path = entry
                .map_err(|e| Error::Read { path: dir.to_owned(), err: e })?
                .path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != LAYOUT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                let source = std::fs::read_to_string(&path).map_err(|e| Error::Read {
                    path: path.clone(),
                    err: e,
                })?;
                layouts.insert(name, &source)?;
            }
        }

        tracing::debug!(count = layouts.templates.len(), dir = %dir.display(), "loaded layouts");
        Ok(layouts)
    }

    /// Parses `source` and registers (or replaces) it as the layout `name`.
    pub fn insert(&mut self, name: &str, source: &str) -> Result<()> {
        let mut template = Template::default();
        template.parse(source).map_err(|e| Error::Parse {
            layout: name.to_owned(),
            message: e.to_string(),
        })?;
        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Renders the named layout against `value`.
    pub fn render(&self, name: &str, value: Value) -> Result<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::UnknownLayout(name.to_owned()))?;
        let execute_error = |message: String| Error::Template {
            layout: name.to_owned(),
            message,
        };
        let context = Context::from(value).map_err(|e| execute_error(e.to_string()))?;
        let mut output: Vec<u8> = Vec::new();
        template
            .execute(&mut output, &context)
            .map_err(|e| execute_error(e.to_string()))?;
        String::from_utf8(output).map_err(|e| execute_error(e.to_string()))
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or rendering a layout.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems reading the layouts directory.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when a page names a layout that isn't registered.
    UnknownLayout(String),

    /// Returned when a layout's source fails to parse.
    Parse { layout: String, message: String },

    /// Returned when a layout fails to execute.
    Template { layout: String, message: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading layout '{}': {}", path.display(), err)
            }
            Error::UnknownLayout(name) => write!(f, "unknown layout `{}`", name),
            Error::Parse { layout, message } => {
                write!(f, "Parsing layout `{}`: {}", layout, message)
            }
            Error::Template { layout, message } => {
                write!(f, "Rendering layout `{}`: {}", layout, message)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::UnknownLayout(_) => None,
            Error::Parse { .. } => None,
            Error::Template { .. } => None,
        }
    }
}
