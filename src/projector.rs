//! Projects a [`PageNode`] tree into the two flat lists the layout consumes:
//! sidebar navigation [`Header`]s and the most recent [`Post`]s. See
//! [`Projector::project`] for the rules. [`Projector::projects`] collects the
//! cards of the projects grid the same way.

use crate::node::{self, MdxPage, PageNode};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// The navigation key that never becomes a sidebar entry.
const INDEX: &str = "index";

/// Page names inside the posts folder that aren't posts.
const EXCLUDED_POST_NAMES: [&str; 2] = ["index", "about"];

/// Knobs for [`Projector`]. Every field has a default so callers can
/// override just one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// The name of the top-level folder holding posts.
    pub posts_folder: String,

    /// The maximum number of posts in a [`Projection`].
    pub max_posts: usize,

    /// The number of characters after which a post title is truncated in
    /// the sidebar.
    pub sidebar_label_length: usize,

    /// The name of the top-level folder holding project pages.
    pub projects_folder: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            posts_folder: String::from("posts"),
            max_posts: 10,
            sidebar_label_length: 40,
            projects_folder: String::from("projects"),
        }
    }
}

/// A single sidebar entry: a navigation key (used as the link target) and
/// its display label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub label: String,
}

/// A recent-post summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub route: String,
}

/// A card in the projects grid, built from a project page's front matter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCard {
    pub title: String,
    pub route: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// The result of [`Projector::project`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub headers: Vec<Header>,
    pub posts: Vec<Post>,
}

pub struct Projector<'a> {
    config: &'a ProjectionConfig,
}

impl<'a> Projector<'a> {
    pub fn new(config: &'a ProjectionConfig) -> Projector<'a> {
        Projector { config }
    }

    /// Projects the top-level `nodes` of a content tree.
    ///
    /// 1. Every top-level [`PageNode::Meta`] contributes one [`Header`] per
    ///    key, in declaration order, except the `index` key.
    /// 2. Every top-level [`PageNode::Folder`] named
    ///    [`ProjectionConfig::posts_folder`] contributes its direct
    ///    [`PageNode::MdxPage`] children that have a non-empty title and
    ///    aren't named `index` or `about`.
    /// 3. Posts are capped at [`ProjectionConfig::max_posts`]. The tree
    ///    order is taken as recency order; nothing is sorted here.
    pub fn project(&self, nodes: &[PageNode]) -> Projection {
        Projection {
            headers: nodes.iter().flat_map(headers).collect(),
            posts: self
                .post_pages(nodes)
                .take(self.config.max_posts)
                .filter_map(|page| {
                    Some(Post {
                        title: page.front_matter.as_ref()?.title()?.to_owned(),
                        route: page.route.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Iterates every page that qualifies as a post, uncapped, in traversal
    /// order. Each yielded page is guaranteed to have a non-empty title.
    pub fn post_pages<'n>(
        &self,
        nodes: &'n [PageNode],
    ) -> impl Iterator<Item = &'n MdxPage> + 'n {
        let posts_folder = self.config.posts_folder.clone();
        nodes
            .iter()
            .filter_map(move |node| match node {
                PageNode::Folder(folder) if folder.name == posts_folder => Some(&folder.children),
                PageNode::Meta(_) | PageNode::Folder(_) | PageNode::MdxPage(_) => None,
            })
            .flatten()
            .filter_map(|child| match child {
                PageNode::MdxPage(page) if is_post(page) => Some(page),
                PageNode::Meta(_) | PageNode::Folder(_) | PageNode::MdxPage(_) => None,
            })
    }

    /// Collects a card for every titled page directly inside a top-level
    /// [`ProjectionConfig::projects_folder`], except the folder's `index`
    /// page. Tree order is kept and nothing is capped.
    pub fn projects(&self, nodes: &[PageNode]) -> Vec<ProjectCard> {
        nodes
            .iter()
            .filter_map(|node| match node {
                PageNode::Folder(folder) if folder.name == self.config.projects_folder => {
                    Some(&folder.children)
                }
                PageNode::Meta(_) | PageNode::Folder(_) | PageNode::MdxPage(_) => None,
            })
            .flatten()
            .filter_map(|child| match child {
                PageNode::MdxPage(page) if page.name != INDEX => project_card(page),
                PageNode::Meta(_) | PageNode::Folder(_) | PageNode::MdxPage(_) => None,
            })
            .collect()
    }
}

fn project_card(page: &MdxPage) -> Option<ProjectCard> {
    let front_matter = page.front_matter.as_ref()?;
    Some(ProjectCard {
        title: front_matter.title()?.to_owned(),
        route: page.route.clone(),
        description: front_matter.description.clone(),
        image: front_matter.image.clone(),
        tags: front_matter.tags.clone(),
    })
}

fn is_post(page: &MdxPage) -> bool {
    match &page.front_matter {
        Some(front_matter) => {
            front_matter.title().is_some() && !EXCLUDED_POST_NAMES.contains(&page.name.as_str())
        }
        None => false,
    }
}

fn headers(node: &PageNode) -> Vec<Header> {
    match node {
        PageNode::Meta(meta) => meta
            .data
            .iter()
            .map(|(key, value)| (stringify(key), value))
            .filter(|(key, _)| key != INDEX)
            .map(|(key, value)| Header {
                key,
                label: stringify(value),
            })
            .collect(),
        PageNode::Folder(_) | PageNode::MdxPage(_) => Vec::new(),
    }
}

/// Converts a navigation value to its display form. A mapping with a string
/// `title` is the object form of a navigation entry and yields that title.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            node::scalar_text(value).unwrap_or_default()
        }
        Value::Null => String::new(),
        Value::Mapping(mapping) => match mapping.get(&Value::from("title")) {
            Some(Value::String(title)) => title.clone(),
            _ => compact_yaml(value),
        },
        Value::Sequence(_) => compact_yaml(value),
    }
}

fn compact_yaml(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_start_matches("---").trim().to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::FrontMatter;
    use pretty_assertions::assert_eq;

    fn titled(title: &str) -> Option<FrontMatter> {
        Some(FrontMatter {
            title: Some(title.to_owned()),
            ..FrontMatter::default()
        })
    }

    fn header(key: &str, label: &str) -> Header {
        Header {
            key: key.to_owned(),
            label: label.to_owned(),
        }
    }

    fn post(title: &str, route: &str) -> Post {
        Post {
            title: title.to_owned(),
            route: route.to_owned(),
        }
    }

    fn numbered_post(i: usize) -> PageNode {
        let name = format!("p{}", i);
        PageNode::page(&name, &format!("/posts/{}", name), titled("T"))
    }

    fn project(nodes: &[PageNode]) -> Projection {
        Projector::new(&ProjectionConfig::default()).project(nodes)
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(project(&[]), Projection::default());
    }

    #[test]
    fn test_reference_tree() {
        let nodes = vec![
            PageNode::meta(vec![("a", "A")]),
            PageNode::folder(
                "posts",
                "/posts",
                vec![
                    PageNode::page("index", "/posts", titled("All posts")),
                    PageNode::page("first-post", "/posts/first-post", titled("First")),
                    PageNode::page("about", "/posts/about", titled("About")),
                ],
            ),
        ];

        assert_eq!(
            project(&nodes),
            Projection {
                headers: vec![header("a", "A")],
                posts: vec![post("First", "/posts/first-post")],
            }
        );
    }

    #[test]
    fn test_no_meta_means_no_headers() {
        let nodes = vec![
            PageNode::page("index", "/", titled("Home")),
            PageNode::folder(
                "posts",
                "/posts",
                vec![PageNode::page("x", "/posts/x", titled("X"))],
            ),
        ];
        assert!(project(&nodes).headers.is_empty());
    }

    #[test]
    fn test_index_key_excluded_anywhere() {
        let nodes = vec![
            PageNode::meta(vec![("index", "Home"), ("posts", "Posts")]),
            PageNode::meta(vec![("about", "About"), ("index", "Home again")]),
        ];
        assert_eq!(
            project(&nodes).headers,
            vec![header("posts", "Posts"), header("about", "About")]
        );
    }

    #[test]
    fn test_header_order_across_meta_nodes() {
        let nodes = vec![
            PageNode::meta(vec![("z", "Z"), ("b", "B")]),
            PageNode::page("index", "/", None),
            PageNode::meta(vec![("y", "Y"), ("a", "A")]),
        ];
        let first = project(&nodes);
        assert_eq!(
            first.headers,
            vec![header("z", "Z"), header("b", "B"), header("y", "Y"), header("a", "A")]
        );
        assert_eq!(first, project(&nodes));
    }

    #[test]
    fn test_non_string_labels() {
        let mut entry = serde_yaml::Mapping::new();
        entry.insert(Value::from("title"), Value::from("Projects"));
        entry.insert(Value::from("type"), Value::from("page"));
        let nodes = vec![PageNode::meta(vec![
            (Value::from("count"), Value::Number(42i64.into())),
            (Value::from("flag"), Value::Bool(true)),
            (Value::from("empty"), Value::Null),
            (Value::from("projects"), Value::Mapping(entry)),
        ])];

        assert_eq!(
            project(&nodes).headers,
            vec![
                header("count", "42"),
                header("flag", "true"),
                header("empty", ""),
                header("projects", "Projects"),
            ]
        );
    }

    #[test]
    fn test_post_filtering() {
        let nodes = vec![PageNode::folder(
            "posts",
            "/posts",
            vec![
                PageNode::page("no-front-matter", "/posts/no-front-matter", None),
                PageNode::page("untitled", "/posts/untitled", Some(FrontMatter::default())),
                PageNode::page("blank", "/posts/blank", titled("")),
                PageNode::folder(
                    "nested",
                    "/posts/nested",
                    vec![PageNode::page("n", "/posts/nested/n", titled("N"))],
                ),
                PageNode::meta(vec![("kept", "Kept")]),
                PageNode::page("about", "/posts/about", titled("About")),
                PageNode::page("kept", "/posts/kept", titled("Kept")),
            ],
        )];

        let projection = project(&nodes);
        assert_eq!(projection.posts, vec![post("Kept", "/posts/kept")]);
        // Only top-level meta nodes produce headers.
        assert!(projection.headers.is_empty());
    }

    #[test]
    fn test_other_folders_ignored() {
        let nodes = vec![
            PageNode::folder(
                "post",
                "/post",
                vec![PageNode::page("a", "/post/a", titled("A"))],
            ),
            PageNode::folder(
                "projects",
                "/projects",
                vec![PageNode::page("b", "/projects/b", titled("B"))],
            ),
        ];
        assert!(project(&nodes).posts.is_empty());

        let config = ProjectionConfig {
            posts_folder: String::from("post"),
            ..ProjectionConfig::default()
        };
        assert_eq!(
            Projector::new(&config).project(&nodes).posts,
            vec![post("A", "/post/a")]
        );
    }

    #[test]
    fn test_truncates_without_reordering() {
        let children: Vec<PageNode> = (0..15)
            .map(|i| {
                let name = format!("post-{:02}", 14 - i);
                PageNode::page(&name, &format!("/posts/{}", name), titled(&name))
            })
            .collect();
        let nodes = vec![PageNode::folder("posts", "/posts", children)];

        let posts = project(&nodes).posts;
        assert_eq!(posts.len(), 10);
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "post-14", "post-13", "post-12", "post-11", "post-10", "post-09", "post-08",
                "post-07", "post-06", "post-05"
            ]
        );
    }

    #[test]
    fn test_cap_applies_across_folders() {
        let folder = |n: usize| {
            PageNode::folder("posts", "/posts", (0..n).map(numbered_post).collect())
        };
        let nodes = vec![folder(6), folder(6)];
        assert_eq!(project(&nodes).posts.len(), 10);

        let config = ProjectionConfig {
            max_posts: 3,
            ..ProjectionConfig::default()
        };
        assert_eq!(Projector::new(&config).project(&nodes).posts.len(), 3);
    }

    #[test]
    fn test_post_pages_uncapped() {
        let children: Vec<PageNode> = (0..12).map(numbered_post).collect();
        let nodes = vec![PageNode::folder("posts", "/posts", children)];
        let config = ProjectionConfig::default();
        assert_eq!(Projector::new(&config).post_pages(&nodes).count(), 12);
    }

    #[test]
    fn test_projects() {
        let state_map = FrontMatter {
            title: Some(String::from("State Map")),
            description: Some(String::from("Interactive map")),
            tags: vec![String::from("D3.js"), String::from("GeoJSON")],
            ..FrontMatter::default()
        };
        let nodes = vec![
            PageNode::folder(
                "posts",
                "/posts",
                vec![PageNode::page("a", "/posts/a", titled("A"))],
            ),
            PageNode::folder(
                "projects",
                "/projects",
                vec![
                    PageNode::page("index", "/projects", titled("Projects")),
                    PageNode::page("state-map", "/projects/state-map", Some(state_map)),
                    PageNode::page("draft", "/projects/draft", None),
                ],
            ),
        ];

        let config = ProjectionConfig::default();
        assert_eq!(
            Projector::new(&config).projects(&nodes),
            vec![ProjectCard {
                title: String::from("State Map"),
                route: String::from("/projects/state-map"),
                description: Some(String::from("Interactive map")),
                image: None,
                tags: vec![String::from("D3.js"), String::from("GeoJSON")],
            }]
        );
        // Projects never leak into the sidebar's recent posts.
        assert_eq!(project(&nodes).posts, vec![post("A", "/posts/a")]);
    }
}
