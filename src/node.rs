//! Defines the [`PageNode`] tree, the in-memory form of a site's content. A
//! tree is either produced by [`crate::loader`] from a content directory or
//! decoded from a page-map snapshot (JSON or YAML) such as:
//!
//! ```json
//! [
//!   { "kind": "Meta", "data": { "index": "Home", "posts": "Posts" } },
//!   {
//!     "kind": "Folder",
//!     "name": "posts",
//!     "route": "/posts",
//!     "children": [
//!       {
//!         "kind": "MdxPage",
//!         "name": "first-post",
//!         "route": "/posts/first-post",
//!         "frontMatter": { "title": "First" }
//!       }
//!     ]
//!   }
//! ]
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// One node in the content tree. The projection logic matches on this
/// exhaustively, so there are no "is this field present" checks downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PageNode {
    /// Navigation metadata for the directory the node appears in.
    Meta(Meta),

    /// A directory of further nodes.
    Folder(Folder),

    /// A content page.
    MdxPage(MdxPage),
}

/// An ordered mapping of navigation key to label. Keys are usually route
/// segments (`posts`, `about`) and values their display labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub data: Mapping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,

    #[serde(default)]
    pub route: String,

    #[serde(default)]
    pub children: Vec<PageNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MdxPage {
    /// The file stem of the page's source (e.g., `first-post` for
    /// `posts/first-post.md`).
    pub name: String,

    /// The site-relative route the page is served at (e.g.,
    /// `/posts/first-post`).
    pub route: String,

    /// The page's front matter. Anything other than a mapping decodes to
    /// `None`.
    #[serde(
        default,
        rename = "frontMatter",
        deserialize_with = "front_matter_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub front_matter: Option<FrontMatter>,

    /// The markdown source below the front matter. Never part of a snapshot.
    #[serde(skip)]
    pub body: String,
}

/// Per-page metadata authored above the page body. Scalar fields accept any
/// YAML scalar (`title: 2023` reads as `"2023"`); a field holding a list or
/// mapping is dropped on its own without discarding its siblings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    /// Publication date in `YYYY-MM-DD` form.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    /// Layout selector. `posts` renders the page as a post listing and
    /// `projects` as a grid of project cards.
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_type: Option<String>,

    /// Labels shown on a project card. A single scalar counts as one tag.
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Converts a decoded YAML value into [`FrontMatter`]. Returns `None`
    /// for anything that isn't a mapping.
    pub fn from_value(value: Value) -> Option<FrontMatter> {
        match value {
            Value::Mapping(_) => match serde_yaml::from_value(value) {
                Ok(front_matter) => Some(front_matter),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring malformed front matter");
                    None
                }
            },
            _ => None,
        }
    }

    /// Returns the title if it is present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

/// Renders a YAML scalar as text: strings as-is, numbers and booleans in
/// their display form. Null, sequences and mappings have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = scalar_text(&value);
    if text.is_none() && !value.is_null() {
        tracing::warn!(value = ?value, "ignoring non-scalar front-matter field");
    }
    Ok(text)
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        value => scalar_text(&value).into_iter().collect(),
    })
}

fn front_matter_object<'de, D>(deserializer: D) -> Result<Option<FrontMatter>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(FrontMatter::from_value(Value::deserialize(deserializer)?))
}

impl PageNode {
    /// Builds a [`PageNode::Meta`] from key/label pairs, preserving order.
    pub fn meta<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PageNode
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut data = Mapping::new();
        for (key, value) in pairs {
            data.insert(key.into(), value.into());
        }
        PageNode::Meta(Meta { data })
    }

    pub fn folder(name: &str, route: &str, children: Vec<PageNode>) -> PageNode {
        PageNode::Folder(Folder {
            name: name.to_owned(),
            route: route.to_owned(),
            children,
        })
    }

    pub fn page(name: &str, route: &str, front_matter: Option<FrontMatter>) -> PageNode {
        PageNode::MdxPage(MdxPage {
            name: name.to_owned(),
            route: route.to_owned(),
            front_matter,
            body: String::new(),
        })
    }
}

/// Collects every [`MdxPage`] in the tree, depth first, in traversal order.
pub fn pages(nodes: &[PageNode]) -> Vec<&MdxPage> {
    fn walk<'a>(nodes: &'a [PageNode], out: &mut Vec<&'a MdxPage>) {
        for node in nodes {
            match node {
                PageNode::Meta(_) => {}
                PageNode::Folder(folder) => walk(&folder.children, out),
                PageNode::MdxPage(page) => out.push(page),
            }
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

/// Decodes a page-map snapshot. JSON is accepted since it is a subset of
/// YAML.
pub fn from_snapshot(input: &str) -> Result<Vec<PageNode>, serde_yaml::Error> {
    serde_yaml::from_str(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titled(title: &str) -> Option<FrontMatter> {
        Some(FrontMatter {
            title: Some(title.to_owned()),
            ..FrontMatter::default()
        })
    }

    #[test]
    fn test_decode_snapshot() {
        let nodes = from_snapshot(
            r#"[
                {"kind": "Meta", "data": {"index": "Home", "posts": "Posts", "about": "About"}},
                {"kind": "Folder", "name": "posts", "route": "/posts", "children": [
                    {"kind": "MdxPage", "name": "first-post", "route": "/posts/first-post",
                     "frontMatter": {"title": "First", "date": "2023-01-02"}}
                ]}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            nodes,
            vec![
                PageNode::meta(vec![
                    ("index", "Home"),
                    ("posts", "Posts"),
                    ("about", "About"),
                ]),
                PageNode::folder(
                    "posts",
                    "/posts",
                    vec![PageNode::page(
                        "first-post",
                        "/posts/first-post",
                        Some(FrontMatter {
                            title: Some("First".to_owned()),
                            date: Some("2023-01-02".to_owned()),
                            ..FrontMatter::default()
                        }),
                    )]
                ),
            ]
        );
    }

    #[test]
    fn test_scalar_fields_are_lenient() {
        let nodes = from_snapshot(
            r#"[{"kind": "MdxPage", "name": "a", "route": "/posts/a",
                 "frontMatter": {"title": 2023, "description": true, "image": ["x"],
                                 "date": "2023-01-02", "tags": ["rust", 7]}}]"#,
        )
        .unwrap();

        assert_eq!(
            nodes,
            vec![PageNode::page(
                "a",
                "/posts/a",
                Some(FrontMatter {
                    title: Some("2023".to_owned()),
                    description: Some("true".to_owned()),
                    date: Some("2023-01-02".to_owned()),
                    tags: vec!["rust".to_owned(), "7".to_owned()],
                    ..FrontMatter::default()
                }),
            )]
        );
    }

    #[test]
    fn test_single_tag() {
        let front_matter =
            FrontMatter::from_value(serde_yaml::from_str("tags: maps").unwrap()).unwrap();
        assert_eq!(front_matter.tags, vec!["maps".to_owned()]);
    }

    #[test]
    fn test_meta_order_preserved() {
        let nodes =
            from_snapshot(r#"[{"kind": "Meta", "data": {"z": "Z", "a": "A", "m": "M"}}]"#).unwrap();
        match &nodes[0] {
            PageNode::Meta(meta) => {
                let keys: Vec<&str> = meta.data.iter().filter_map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["z", "a", "m"]);
            }
            other => panic!("expected meta, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_front_matter_is_none() {
        for front_matter in &[r#""just a string""#, "42", "[1, 2]", "null"] {
            let input = format!(
                r#"[{{"kind": "MdxPage", "name": "a", "route": "/a", "frontMatter": {}}}]"#,
                front_matter
            );
            let nodes = from_snapshot(&input).unwrap();
            assert_eq!(nodes, vec![PageNode::page("a", "/a", None)]);
        }
    }

    #[test]
    fn test_missing_front_matter_is_none() {
        let nodes =
            from_snapshot(r#"[{"kind": "MdxPage", "name": "a", "route": "/a"}]"#).unwrap();
        assert_eq!(nodes, vec![PageNode::page("a", "/a", None)]);
    }

    #[test]
    fn test_empty_title_is_absent() {
        let front_matter = FrontMatter {
            title: Some(String::new()),
            ..FrontMatter::default()
        };
        assert_eq!(front_matter.title(), None);
        assert_eq!(titled("Hi").unwrap().title(), Some("Hi"));
    }

    #[test]
    fn test_pages_depth_first() {
        let nodes = vec![
            PageNode::page("index", "/", None),
            PageNode::meta(vec![("posts", "Posts")]),
            PageNode::folder(
                "posts",
                "/posts",
                vec![
                    PageNode::page("b", "/posts/b", titled("B")),
                    PageNode::folder(
                        "deep",
                        "/posts/deep",
                        vec![PageNode::page("c", "/posts/deep/c", None)],
                    ),
                ],
            ),
            PageNode::page("about", "/about", None),
        ];
        let routes: Vec<&str> = pages(&nodes).iter().map(|p| p.route.as_str()).collect();
        assert_eq!(routes, vec!["/", "/posts/b", "/posts/deep/c", "/about"]);
    }
}
