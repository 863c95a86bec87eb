//! Builds a [`PageNode`] tree from a content directory. The layout mirrors
//! the site's URL structure:
//!
//! ```text
//! content/
//! ├── _meta.json          # Meta node: {"index": "Home", "posts": "Posts"}
//! ├── index.md            # route `/`
//! ├── about.md            # route `/about`
//! └── posts/              # Folder node, route `/posts`
//!     ├── index.md        # route `/posts`
//!     └── first-post.md   # route `/posts/first-post`
//! ```
//!
//! A directory holds at most one `_meta` file. When several exist, the first
//! by file name (`_meta.json`, then `_meta.yaml`, then `_meta.yml`) is used
//! and the rest are ignored with a warning.
//!
//! Within a directory the `_meta` node comes first, followed by pages and
//! folders ordered newest first by their front-matter `date` (undated ones
//! last, ties broken by name). That ordering is what lets
//! [`crate::projector`] treat traversal order as recency order.

use crate::node::{Folder, FrontMatter, MdxPage, Meta, PageNode};
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;
use std::path::Path;
use walkdir::WalkDir;

const META_FILES: [&str; 3] = ["_meta.json", "_meta.yaml", "_meta.yml"];
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "mdx"];
const FENCE: &str = "---";

/// Loads the tree rooted at `content_directory`. The returned nodes are the
/// top-level entries of the site.
pub fn load(content_directory: &Path) -> Result<Vec<PageNode>> {
    let nodes = load_directory(content_directory, Path::new(""))?;
    tracing::debug!(
        directory = %content_directory.display(),
        nodes = nodes.len(),
        "loaded content tree"
    );
    Ok(nodes)
}

fn load_directory(root: &Path, relative_dir: &Path) -> Result<Vec<PageNode>> {
    let mut meta = None;
    let mut nodes = Vec::new();

    let walker = WalkDir::new(root.join(relative_dir))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for result in walker {
        let entry = result?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let relative_path = relative_dir.join(&file_name);

        if entry.file_type().is_dir() {
            if file_name.starts_with('.') || file_name.starts_with('_') {
                continue;
            }
            nodes.push(PageNode::Folder(Folder {
                route: route(&relative_path),
                children: load_directory(root, &relative_path)?,
                name: file_name,
            }));
        } else if META_FILES.contains(&file_name.as_str()) {
            if meta.is_some() {
                tracing::warn!(path = %relative_path.display(), "ignoring duplicate `_meta` file");
                continue;
            }
            meta = Some(annotate(load_meta(entry.path()), &relative_path)?);
        } else if is_markdown(entry.path()) {
            nodes.push(annotate(
                load_page(entry.path(), &relative_path),
                &relative_path,
            )?);
        }
    }

    nodes.sort_by(newest_first);
    if let Some(meta) = meta {
        nodes.insert(0, meta);
    }
    Ok(nodes)
}

fn annotate<T>(result: Result<T>, relative_path: &Path) -> Result<T> {
    result.map_err(|err| {
        Error::Annotated(
            format!("loading `{}`", relative_path.display()),
            Box::new(err),
        )
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn load_meta(path: &Path) -> Result<PageNode> {
    let data: Mapping = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
    Ok(PageNode::Meta(Meta { data }))
}

fn load_page(path: &Path, relative_path: &Path) -> Result<PageNode> {
    let contents = std::fs::read_to_string(path)?;
    let (front_matter, body) = parse_front_matter(&contents)?;
    let name = relative_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::debug!(path = %relative_path.display(), "loaded page");
    Ok(PageNode::MdxPage(MdxPage {
        name,
        route: route(&relative_path.with_extension("")),
        front_matter,
        body: body.to_owned(),
    }))
}

/// Splits a page source into its front matter and body. Front matter is
/// the YAML between a first line that is exactly `---` and the next line
/// that is exactly `---`. Any other source has no front matter and the
/// whole input is the body. A fenced block that isn't a YAML mapping also
/// yields `None`.
pub fn parse_front_matter(input: &str) -> Result<(Option<FrontMatter>, &str)> {
    let yaml_start = match input.split_inclusive('\n').next() {
        Some(line) if line.ends_with('\n') && is_fence(line) => line.len(),
        _ => return Ok((None, input)),
    };

    let mut yaml_stop = yaml_start;
    let mut body_start = None;
    for line in input[yaml_start..].split_inclusive('\n') {
        if is_fence(line) {
            body_start = Some(yaml_stop + line.len());
            break;
        }
        yaml_stop += line.len();
    }
    let body_start = body_start.ok_or(Error::FrontmatterMissingEndFence)?;

    let yaml = &input[yaml_start..yaml_stop];
    let front_matter = if yaml.trim().is_empty() {
        None
    } else {
        FrontMatter::from_value(serde_yaml::from_str::<Value>(yaml)?)
    };
    let body = input[body_start..].trim_start_matches(&['\r', '\n'][..]);
    Ok((front_matter, body))
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(&['\r', '\n'][..]) == FENCE
}

/// Derives a route from a path relative to the content root. An `index`
/// segment at the end maps to its directory's route.
fn route(relative_path: &Path) -> String {
    let mut segments: Vec<String> = relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }
    format!("/{}", segments.join("/"))
}

fn newest_first(a: &PageNode, b: &PageNode) -> Ordering {
    fn key(node: &PageNode) -> (Option<&str>, &str) {
        match node {
            PageNode::Meta(_) => (None, ""),
            PageNode::Folder(folder) => (None, &folder.name),
            PageNode::MdxPage(page) => (
                page.front_matter.as_ref().and_then(|fm| fm.date.as_deref()),
                &page.name,
            ),
        }
    }

    let (a_date, a_name) = key(a);
    let (b_date, b_name) = key(b);
    let by_date = match (a_date, b_date) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a_name.cmp(b_name))
}

/// Represents the result of a content-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the content tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a page's front matter has an opening fence (`---`) but
    /// no closing one.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when front matter or a `_meta` file isn't valid YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned for I/O errors reading source files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for [`walkdir`] errors while listing directories.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation, usually the offending file.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}
