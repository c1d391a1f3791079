//! Renders `chat` blocks into dialog bubbles. A chat block is a fenced block
//! whose info string names the speaking character, e.g.:
//!
//! ````md
//! ```chat alice
//! Hello
//! world
//! ```
//! ````
//!
//! The character's icon is read from `{includes_directory}/{character}.svg`
//! and inlined into the output, and the block's lines are joined into a
//! single paragraph. The result is raw HTML which is spliced into the post
//! body as-is.

use std::fmt;
use std::path::{Path, PathBuf};

/// The first word of a fenced block's info string that marks it as a chat
/// block.
pub const CHAT_BLOCK: &str = "chat";

/// The attributes of a chat block, validated when the block is parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatAttributes {
    /// The name of the speaking character. Names the icon file and is used
    /// as the CSS class and the bubble title.
    pub character: String,
}

impl ChatAttributes {
    /// Parses the attributes from a fenced block's info string. The first
    /// word is the block name (`chat`); the character may be given either
    /// positionally (`chat alice`) or by name (`chat character=alice`). The
    /// named form wins if both are present.
    pub fn from_info(info: &str) -> Result<ChatAttributes> {
        let mut positional = None;
        let mut named = None;
        for word in info.split_whitespace().skip(1) {
            match word.split_once('=') {
                Some(("character", value)) => named = Some(value),
                Some(_) => {}
                None => {
                    if positional.is_none() {
                        positional = Some(word)
                    }
                }
            }
        }

        match named.or(positional) {
            Some(character) if !character.is_empty() => Ok(ChatAttributes {
                character: character.to_owned(),
            }),
            _ => Err(Error::MissingCharacter(info.to_owned())),
        }
    }
}

/// Returns true if `info` (a fenced block's info string) opens a chat block.
pub fn is_chat_block(info: &str) -> bool {
    info.split_whitespace().next() == Some(CHAT_BLOCK)
}

/// Renders chat blocks, loading character icons from an includes directory.
pub struct ChatRenderer {
    includes_directory: PathBuf,
}

impl ChatRenderer {
    pub fn new(includes_directory: &Path) -> ChatRenderer {
        ChatRenderer {
            includes_directory: includes_directory.to_owned(),
        }
    }

    /// Renders a chat block from its attributes and raw lines.
    pub fn render<S: AsRef<str>>(
        &self,
        attributes: &ChatAttributes,
        lines: &[S],
    ) -> Result<String> {
        let character = &attributes.character;
        let svg_path = self.includes_directory.join(format!("{}.svg", character));
        let svg = std::fs::read_to_string(&svg_path).map_err(|err| {
            Error::ResourceNotFound {
                path: svg_path.clone(),
                err,
            }
        })?;

        let content = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");

        Ok(format!(
            r#"<div class="dialog {class}" title="{title}">
  <div class="dialog-head">
  {svg}
  </div>
  <div class="dialog-text">
  <p>{content}</p>
  </div>
</div>
"#,
            class = character.to_lowercase(),
            title = capitalize(character),
            svg = svg.trim_end(),
            content = content,
        ))
    }
}

// Uppercases the first character and lowercases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem rendering a chat block.
#[derive(Debug)]
pub enum Error {
    /// Returned when the block's info string doesn't name a character.
    MissingCharacter(String),

    /// Returned when the character's icon can't be read.
    ResourceNotFound { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingCharacter(info) => {
                write!(f, "chat block `{}` doesn't name a character", info)
            }
            Error::ResourceNotFound { path, err } => {
                write!(f, "Reading chat icon '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingCharacter(_) => None,
            Error::ResourceNotFound { path: _, err } => Some(err),
        }
    }
}
