use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file which marks a project's root directory.
pub const PROJECT_FILE: &str = "skald.yaml";

fn default_output_directory() -> PathBuf {
    PathBuf::from("_site")
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,
}

/// The resolved build configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The site's root URL; must end with a trailing slash so paths can be
    /// joined onto it.
    pub site_root: Url,

    /// The base URL for post pages, `{site_root}/posts/`.
    pub posts_url: Url,

    /// Post source files (`_posts`).
    pub posts_source_directory: PathBuf,

    /// Layout templates (`_layouts`).
    pub layouts_directory: PathBuf,

    /// Chat icons and other includes (`_includes`).
    pub includes_directory: PathBuf,

    /// Site data files (`_data`).
    pub data_directory: PathBuf,

    /// Where the rendered site is written.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and its ancestors for a `skald.yaml` and loads it. If
    /// `output_directory` is given it overrides the project's.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        // A root without a trailing slash would make `join` replace its last
        // path segment.
        let mut site_root = project.site_root;
        if !site_root.path().ends_with('/') {
            let with_slash = format!("{}/", site_root.path());
            site_root.set_path(&with_slash);
        }

        Ok(Config {
            posts_url: site_root.join("posts/")?,
            site_root,
            posts_source_directory: project_root.join("_posts"),
            layouts_directory: project_root.join("_layouts"),
            includes_directory: project_root.join("_includes"),
            data_directory: project_root.join("_data"),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join(project.output_directory),
            },
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::write(
            root.path().join(PROJECT_FILE),
            "site_root: https://example.com/blog\n",
        )?;
        let nested = root.path().join("_posts/drafts");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested, None)?;
        assert_eq!("https://example.com/blog/", config.site_root.as_str());
        assert_eq!("https://example.com/blog/posts/", config.posts_url.as_str());
        assert_eq!(root.path().join("_posts"), config.posts_source_directory);
        assert_eq!(root.path().join("_data"), config.data_directory);
        assert_eq!(root.path().join("_site"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_output_directory_override() -> Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::write(
            root.path().join(PROJECT_FILE),
            "site_root: https://example.com/\noutput_directory: public\n",
        )?;

        let config = Config::from_directory(root.path(), None)?;
        assert_eq!(root.path().join("public"), config.output_directory);

        let config = Config::from_directory(root.path(), Some(Path::new("/tmp/out")))?;
        assert_eq!(PathBuf::from("/tmp/out"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_unreadable_project_file() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(PROJECT_FILE);
        let err = Config::from_project_file(&path, None).unwrap_err();
        assert!(
            err.to_string().starts_with("Opening project file"),
            "{}",
            err
        );
    }

    #[test]
    fn test_missing_site_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(PROJECT_FILE), "output_directory: public\n").unwrap();
        assert!(Config::from_directory(root.path(), None).is_err());
    }
}
