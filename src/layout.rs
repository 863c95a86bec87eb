//! Renders a single page through the site's layout template. The layout
//! wraps each page with the sidebar (navigation [`Header`]s and recent
//! [`crate::projector::Post`]s), a title heading on post-detail pages, and
//! Open Graph / Twitter card metadata.
//!
//! The template receives a [`Value::Object`] with these fields (every text
//! value is already HTML-escaped):
//!
//! * `site`: `{title, url, locale, twitter}`
//! * `title`, `description`, `image`, `route`, `url`
//! * `body`: the page's rendered HTML
//! * `listing`: true when the page's front matter has `type: posts`
//! * `show_heading`, `heading_style`: see [`crate::heading`]
//! * `headers`: `[{href, label}]`
//! * `posts`: `[{title, route}]`, titles truncated for the sidebar
//! * `meta`: `[{name, content}]` social metadata tags
//! * `project_grid`: true when the page's front matter has `type: projects`
//! * `projects`: `[{title, route, description, image, tags}]`, see
//!   [`crate::projector::Projector::projects`]. `description` and `image`
//!   are nil when absent.

use crate::config::Site;
use crate::heading::{self, HeadingConfig};
use crate::markdown;
use crate::node::MdxPage;
use crate::projector::{Header, ProjectCard, Projection};
use gtmpl::{Context, Template, Value};
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::io::Write;
use url::Url;

/// The front-matter `type` that switches a page into post-listing mode.
const LISTING_TYPE: &str = "posts";

/// The front-matter `type` that renders the projects grid.
const PROJECTS_TYPE: &str = "projects";

/// Renders [`MdxPage`]s with the layout template. The projection is computed
/// once per build and shared by every page.
pub struct Layout<'a> {
    pub template: &'a Template,
    pub site: &'a Site,
    pub projection: &'a Projection,
    pub projects: &'a [ProjectCard],
    pub heading: &'a HeadingConfig,

    /// The number of characters after which sidebar post titles are
    /// truncated.
    pub sidebar_label_length: usize,
}

impl Layout<'_> {
    /// Renders `page` and writes the result to `w`.
    pub fn render<W: Write>(&self, w: &mut W, page: &MdxPage) -> Result<()> {
        let source_route = if page.name == "index" {
            format!("{}/index", page.route.trim_end_matches('/'))
        } else {
            page.route.clone()
        };
        let mut body = String::new();
        markdown::to_html(&mut body, &source_route, &page.body);
        let context = Context::from(self.to_value(page, body)?).map_err(Error::Template)?;
        self.template.execute(w, &context).map_err(Error::Template)
    }

    /// Builds the template value for `page`. `body` is the page's HTML.
    pub fn to_value(&self, page: &MdxPage, body: String) -> Result<Value> {
        let front_matter = page.front_matter.clone().unwrap_or_default();
        let title = front_matter.title().unwrap_or(&page.name);
        let image = self.heading.image_or_default(front_matter.image.as_deref());
        let description = self
            .heading
            .description_or_default(front_matter.description.as_deref());
        let url = page_url(&self.site.url, &page.route)?;
        let show_heading =
            !title.is_empty() && page.route.contains(&self.heading.post_route_marker);
        let page_type = front_matter.page_type.as_deref();
        let heading_style = heading::resolve(self.heading, &page.route, Some(image)).to_css();

        let social = SocialMeta {
            site: self.site,
            title,
            description,
            image,
            url: url.as_str(),
        };

        Ok(object(vec![
            ("site", self.site_value()),
            ("title", text(title)),
            ("description", text(description)),
            ("image", text(image)),
            ("route", text(&page.route)),
            ("url", text(url.as_str())),
            ("body", Value::String(body)),
            ("listing", Value::Bool(page_type == Some(LISTING_TYPE))),
            ("show_heading", Value::Bool(show_heading)),
            ("heading_style", text(&heading_style)),
            (
                "headers",
                Value::Array(self.projection.headers.iter().map(header_value).collect()),
            ),
            (
                "posts",
                Value::Array(
                    self.projection
                        .posts
                        .iter()
                        .map(|post| {
                            let label = truncate_label(&post.title, self.sidebar_label_length);
                            object(vec![("title", text(&label)), ("route", text(&post.route))])
                        })
                        .collect(),
                ),
            ),
            (
                "meta",
                Value::Array(
                    social
                        .tags()
                        .into_iter()
                        .map(|(name, content)| {
                            object(vec![("name", text(name)), ("content", text(&content))])
                        })
                        .collect(),
                ),
            ),
            ("project_grid", Value::Bool(page_type == Some(PROJECTS_TYPE))),
            (
                "projects",
                Value::Array(self.projects.iter().map(project_value).collect()),
            ),
        ]))
    }

    fn site_value(&self) -> Value {
        object(vec![
            ("title", text(&self.site.title)),
            ("url", text(self.site.url.as_str())),
            ("locale", text(&self.site.locale)),
            ("twitter", optional_text(self.site.twitter.as_deref())),
        ])
    }
}

/// Shortens `label` to at most `max` characters, replacing the tail with
/// `...` when it doesn't fit.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let mut truncated: String = label.chars().take(max.saturating_sub(3)).collect();
        truncated.push_str("...");
        truncated
    } else {
        label.to_owned()
    }
}

/// Resolves the absolute URL of the page at `route`.
pub fn page_url(site_url: &Url, route: &str) -> std::result::Result<Url, url::ParseError> {
    site_url.join(route.trim_start_matches('/'))
}

/// The inputs to a page's social metadata tags.
pub struct SocialMeta<'a> {
    pub site: &'a Site,
    pub title: &'a str,
    pub description: &'a str,
    pub image: &'a str,
    pub url: &'a str,
}

impl SocialMeta<'_> {
    /// Returns `(name, content)` pairs for the Open Graph and Twitter card
    /// tags. The Twitter `site`/`creator` tags are only emitted when the site
    /// has a Twitter handle.
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("og:image", self.image.to_owned()),
            ("og:title", self.title.to_owned()),
            ("og:description", self.description.to_owned()),
            ("og:url", self.url.to_owned()),
            ("og:site_name", self.site.title.clone()),
            ("og:type", String::from("website")),
            ("og:locale", self.site.locale.clone()),
            ("twitter:card", String::from("summary_large_image")),
        ];
        if let Some(handle) = &self.site.twitter {
            tags.push(("twitter:site", handle.clone()));
            tags.push(("twitter:creator", handle.clone()));
        }
        tags.push(("twitter:title", self.title.to_owned()));
        tags.push(("twitter:description", self.description.to_owned()));
        tags.push(("twitter:image", self.image.to_owned()));
        tags
    }
}

fn header_value(header: &Header) -> Value {
    let href = if header.key.contains("://") {
        header.key.clone()
    } else {
        format!("/{}", header.key)
    };
    object(vec![("href", text(&href)), ("label", text(&header.label))])
}

fn project_value(card: &ProjectCard) -> Value {
    object(vec![
        ("title", text(&card.title)),
        ("route", text(&card.route)),
        ("description", optional_text(card.description.as_deref())),
        ("image", optional_text(card.image.as_deref())),
        (
            "tags",
            Value::Array(card.tags.iter().map(|tag| text(tag)).collect()),
        ),
    ])
}

fn object(fields: Vec<(&str, Value)>) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    for (key, value) in fields {
        m.insert(key.to_owned(), value);
    }
    Value::Object(m)
}

/// Converts text into an HTML-escaped [`Value::String`].
fn text(s: &str) -> Value {
    let mut escaped = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut escaped, s);
    Value::String(escaped)
}

fn optional_text(s: Option<&str>) -> Value {
    s.map(text).unwrap_or(Value::Nil)
}

/// The result of a fallible page-rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error("{0}")]
    Template(String),

    /// Returned when a page URL can't be built from the site URL and route.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
