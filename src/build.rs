//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the content tree
//! ([`crate::loader`]), projecting it into sidebar data
//! ([`crate::projector`]), rendering every page ([`crate::layout`]), copying
//! the static source directory into the static output directory, and
//! writing the Atom feed and the state-map data.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::layout::{Error as LayoutError, Layout};
use crate::loader::{self, Error as LoadError};
use crate::node::{self, MdxPage};
use crate::projector::Projector;
use crate::statemap;
use gtmpl::Template;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marks an output directory as created by `pagefold`, making it safe to
/// delete on the next build.
const WATERMARK: &str = ".pagefold";

/// Builds the site from a [`Config`] object.
pub fn build_site(config: &Config) -> Result<()> {
    let nodes = loader::load(&config.content_directory)?;

    // The sidebar is the same on every page, so project once.
    let projector = Projector::new(&config.projection);
    let projection = projector.project(&nodes);
    let projects = projector.projects(&nodes);

    let template = parse_template(config.templates.iter())?;

    clean(&config.output_directory)?;
    std::fs::create_dir_all(&config.output_directory)?;
    File::create(config.output_directory.join(WATERMARK))?;

    let layout = Layout {
        template: &template,
        site: &config.site,
        projection: &projection,
        projects: &projects,
        heading: &config.heading,
        sidebar_label_length: config.projection.sidebar_label_length,
    };
    let pages = node::pages(&nodes);
    for page in &pages {
        write_page(&layout, &config.output_directory, page)?;
    }

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    let posts: Vec<&MdxPage> = projector.post_pages(&nodes).collect();
    write_feed(
        FeedConfig {
            title: config.site.title.clone(),
            id: config.site.url.to_string(),
            author: config.site.author.clone(),
            home_page: config.site.url.clone(),
        },
        &posts,
        File::create(config.output_directory.join("feed.xml"))?,
    )?;

    serde_json::to_writer_pretty(
        File::create(config.output_directory.join("state-map.json"))?,
        &statemap::data(),
    )?;

    tracing::info!(
        pages = pages.len(),
        headers = projection.headers.len(),
        recent_posts = projection.posts.len(),
        projects = projects.len(),
        feed_posts = posts.len(),
        output = %config.output_directory.display(),
        "built site"
    );
    Ok(())
}

/// Maps a route to its output file: `/` becomes `index.html`, `/posts/a`
/// becomes `posts/a/index.html`.
pub fn output_path(output_directory: &Path, route: &str) -> PathBuf {
    let route = route.trim_matches('/');
    if route.is_empty() {
        output_directory.join("index.html")
    } else {
        output_directory.join(route).join("index.html")
    }
}

fn write_page(layout: &Layout, output_directory: &Path, page: &MdxPage) -> Result<()> {
    let path = output_path(output_directory, &page.route);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut w = BufWriter::new(File::create(&path)?);
    layout.render(&mut w, page).map_err(|err| Error::Render {
        route: page.route.clone(),
        err,
    })?;
    w.flush()?;
    tracing::debug!(route = %page.route, path = %path.display(), "wrote page");
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix() can't fail; every entry is under `src`.
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// Loads the template file contents, concatenates them, and parses the
// result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|err| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

// Deletes the output directory from a previous build. We don't want to
// naively delete whatever directory the user passed in, so we only delete
// directories that are empty or carry the watermark left by a previous
// build.
fn clean(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let empty = std::fs::read_dir(dir)?.next().is_none();
    if !empty && !dir.join(WATERMARK).is_file() {
        return Err(Error::ForeignOutputDirectory(dir.to_owned()));
    }
    std::fs::remove_dir_all(dir).map_err(|err| Error::Clean {
        path: dir.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// rendering, cleaning output directories, parsing template files, and
/// other I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors loading the content tree.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Returned for errors rendering a page.
    #[error("rendering `{route}`: {err}")]
    Render {
        route: String,
        #[source]
        err: LayoutError,
    },

    /// Returned when the output directory exists, isn't empty, and wasn't
    /// created by a previous build.
    #[error(
        "refusing to overwrite `{}`: it is not empty and has no `{}` marker",
        .0.display(),
        WATERMARK
    )]
    ForeignOutputDirectory(PathBuf),

    /// Returned for I/O problems while cleaning output directories.
    #[error("cleaning directory `{}`: {}", .path.display(), .err)]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {}", .path.display(), .err)]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("{0}")]
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned for errors writing the state-map data.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Returned for walking the static directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_output_path() {
        let out = Path::new("/out");
        assert_eq!(output_path(out, "/"), Path::new("/out/index.html"));
        assert_eq!(
            output_path(out, "/about"),
            Path::new("/out/about/index.html")
        );
        assert_eq!(
            output_path(out, "/posts/first-post"),
            Path::new("/out/posts/first-post/index.html")
        );
    }

    #[test]
    fn test_clean_refuses_foreign_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("precious.txt"), "keep me").unwrap();

        match clean(dir.path()) {
            Err(Error::ForeignOutputDirectory(path)) => assert_eq!(path, dir.path()),
            other => panic!("expected refusal, got {:?}", other),
        }
        assert!(dir.path().join("precious.txt").exists());
    }

    #[test]
    fn test_clean_removes_watermarked_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join(WATERMARK), "").unwrap();
        fs::write(out.join("stale.html"), "").unwrap();

        clean(&out).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_copy_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        fs::create_dir_all(src.join("fonts")).unwrap();
        fs::write(src.join("main.css"), "body {}").unwrap();
        fs::write(src.join("fonts/inter.woff2"), "font").unwrap();

        let dst = dir.path().join("out/static");
        copy_dir(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("main.css")).unwrap(), "body {}");
        assert_eq!(
            fs::read_to_string(dst.join("fonts/inter.woff2")).unwrap(),
            "font"
        );
    }
}
