//! Loads a [`Config`] from a project directory. A project looks like:
//!
//! ```text
//! pagefold.yaml        # site title/url plus optional overrides
//! content/             # pages, see `crate::loader`
//! static/              # copied verbatim into `{output}/static`
//! theme/
//! ├── theme.yaml       # `templates: [layout.html]`
//! └── layout.html
//! ```

use crate::heading::HeadingConfig;
use crate::projector::ProjectionConfig;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "pagefold.yaml";

/// Site-wide identity used by the layout and the feed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Site {
    pub title: String,

    /// The site's root URL. It should end in a trailing slash so routes can
    /// be joined onto it.
    pub url: Url,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// The Twitter handle (e.g. `@someone`) for card metadata.
    #[serde(default)]
    pub twitter: Option<String>,

    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

fn default_locale() -> String {
    String::from("en_US")
}

#[derive(Deserialize)]
struct Project {
    #[serde(flatten)]
    site: Site,

    #[serde(default = "default_content_directory")]
    content_directory: PathBuf,

    #[serde(default = "default_static_directory")]
    static_directory: PathBuf,

    #[serde(default)]
    projection: ProjectionConfig,

    #[serde(default)]
    heading: HeadingConfig,
}

fn default_content_directory() -> PathBuf {
    PathBuf::from("content")
}

fn default_static_directory() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Deserialize)]
struct Theme {
    templates: Vec<PathBuf>,
}

/// Everything a site build needs, with paths resolved against the project
/// root and the output directory.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: Site,
    pub content_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub templates: Vec<PathBuf>,
    pub output_directory: PathBuf,
    pub static_output_directory: PathBuf,
    pub projection: ProjectionConfig,
    pub heading: HeadingConfig,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a
    /// [`PROJECT_FILE`] and loads the first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::ProjectFileNotFound(dir.to_owned()))
    }

    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = parse(path, "project")?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        let theme_dir = project_root.join("theme");
        let theme: Theme = parse(&theme_dir.join("theme.yaml"), "theme")?;

        tracing::debug!(project = %path.display(), "loaded configuration");
        Ok(Config {
            site: project.site,
            content_directory: project_root.join(project.content_directory),
            static_source_directory: project_root.join(project.static_directory),
            templates: theme
                .templates
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            output_directory: output_directory.to_owned(),
            static_output_directory: output_directory.join("static"),
            projection: project.projection,
            heading: project.heading,
        })
    }
}

fn open(path: &Path, kind: &'static str) -> Result<File> {
    File::open(path).map_err(|err| Error::Open {
        kind,
        path: path.to_owned(),
        err,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T> {
    serde_yaml::from_reader(open(path, kind)?).map_err(|err| Error::Parse {
        kind,
        path: path.to_owned(),
        err,
    })
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no project file exists in the directory or any parent.
    #[error("could not find `{}` in `{}` or any parent directory", PROJECT_FILE, .0.display())]
    ProjectFileNotFound(PathBuf),

    /// Returned when a project or theme file can't be opened.
    #[error("opening {} file `{}`: {}", .kind, .path.display(), .err)]
    Open {
        kind: &'static str,
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a project or theme file isn't valid.
    #[error("parsing {} file `{}`: {}", .kind, .path.display(), .err)]
    Parse {
        kind: &'static str,
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },
}
