//! Defines the [`Post`], [`Parser`], and [`Error`] types. Also defines the
//! logic for parsing posts from the file system into memory.

use std::{
    fmt,
    fs::read_dir,
    path::{Component, Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

use crate::chat::{self, ChatRenderer};
use crate::markdown;
use crate::series::SeriesRecord;

/// The layout used for posts which don't name one in their frontmatter.
pub const DEFAULT_LAYOUT: &str = "post";

const MARKDOWN_EXTENSION: &str = "md";

/// Represents a blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's identifier, the source file name less its extension.
    pub id: String,

    /// The title of the post.
    pub title: String,

    /// The date of the post, formatted as `YYYY-MM-DD`.
    pub date: String,

    /// The name of the layout the post is rendered with.
    pub layout: String,

    /// The series the post belongs to, if any.
    pub serie: Option<SerieMeta>,

    /// The absolute URL of the rendered post.
    pub url: Url,

    /// The rendered HTML body.
    pub body: String,
}

impl Post {
    /// The output path of the post, relative to the output directory.
    pub fn output_path(&self) -> PathBuf {
        Path::new("posts").join(format!("{}.html", self.id))
    }

    /// Returns the post's series as a [`SeriesRecord`] if both its `url` and
    /// `name` are present.
    pub fn series_record(&self) -> Option<SeriesRecord> {
        self.serie.as_ref().and_then(SerieMeta::to_record)
    }
}

/// The `serie` frontmatter field. Either subfield may be absent, in which
/// case the post doesn't belong to a series.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SerieMeta {
    /// The series identifier. Used as a URL path segment.
    #[serde(default)]
    pub url: Option<String>,

    /// The series display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl SerieMeta {
    /// Returns the series as a [`SeriesRecord`]. Metadata missing a field, or
    /// whose `url` isn't a single path segment, is treated as incomplete.
    pub fn to_record(&self) -> Option<SeriesRecord> {
        match (&self.url, &self.name) {
            (Some(url), Some(name)) if is_path_segment(url) => Some(SeriesRecord {
                url: url.clone(),
                name: name.clone(),
            }),
            (Some(url), Some(_)) => {
                tracing::warn!(
                    url = %url,
                    "ignoring series identifier which isn't a single path segment"
                );
                None
            }
            _ => None,
        }
    }
}

// `url` lands in both an output path and a page URL, so separators and URL
// delimiters are rejected along with `.` and `..`.
fn is_path_segment(url: &str) -> bool {
    if url.contains(&['/', '\\', '#', '?'][..]) {
        return false;
    }
    let mut components = Path::new(url).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[derive(Deserialize)]
struct Frontmatter {
    title: String,
    date: String,

    #[serde(default)]
    layout: Option<String>,

    #[serde(default)]
    serie: Option<SerieMeta>,
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{post_id}.html`).
    posts_url: &'a Url,

    /// Renders the chat blocks found in post bodies.
    chat_renderer: &'a ChatRenderer,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(posts_url: &'a Url, chat_renderer: &'a ChatRenderer) -> Parser<'a> {
        Parser {
            posts_url,
            chat_renderer,
        }
    }

    /// Parses a single [`Post`] from an `id` and the source file contents.
    pub fn parse_post(&self, id: &str, input: &str) -> Result<Post> {
        match self._parse_post(id, input) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", id),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, id: &str, input: &str) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let mut post = Post {
            id: id.to_owned(),
            title: frontmatter.title,
            date: frontmatter.date,
            layout: frontmatter
                .layout
                .unwrap_or_else(|| DEFAULT_LAYOUT.to_owned()),
            serie: frontmatter.serie,
            url: self.posts_url.join(&format!("{}.html", id))?,
            body: String::default(),
        };

        markdown::to_html(&mut post.body, &input[body_start..], self.chat_renderer)?;
        Ok(post)
    }

    /// Searches a provided `source_directory` for post files (extension =
    /// `.md`) and returns a list of [`Post`] objects sorted by date (oldest
    /// first, ties broken by id). This is the order in which series are
    /// discovered. Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally
    ///    `layout` and `serie`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// serie:
    ///   url: greetings
    ///   name: Greetings
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in read_dir(source_directory)? {
            let path = result?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION) {
                continue;
            }

            let id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| Error::InvalidFileName(path.clone()))?;
            let contents = std::fs::read_to_string(&path)?;
            posts.push(self.parse_post(id, &contents)?);
        }

        posts.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned when a chat block in the post body can't be rendered.
    Chat(chat::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Chat(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Chat(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::InvalidFileName(_) => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<chat::Error> for Error {
    /// Converts a [`chat::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator when rendering post bodies.
    fn from(err: chat::Error) -> Error {
        Error::Chat(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
