//! Converts page bodies from markdown to HTML.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};
use url::Url;

const MARKDOWN_EXTENSIONS: [&str; 2] = [".mdx", ".md"];

/// A throwaway origin for resolving relative routes; only the path of the
/// joined URL is kept.
const ORIGIN: &str = "http://pagefold.invalid/";

/// Converts `markdown` to HTML, appending the result to `w`.
///
/// `source_route` is the route of the source file itself, i.e. the page's
/// route with `/index` appended for index pages. Relative links to other
/// pages (`first-post.md`, `../about.mdx#me`) are resolved against it and
/// rewritten to the route the linked page is served at.
pub fn to_html(w: &mut String, source_route: &str, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let base = Url::parse(ORIGIN)
        .and_then(|origin| origin.join(source_route.trim_start_matches('/')));
    match base {
        Ok(base) => {
            let converter = LinkConverter { base: &base };
            let events = Parser::new_ext(markdown, options).map(|ev| converter.convert(ev));
            html::push_html(w, events);
        }
        Err(err) => {
            tracing::warn!(route = source_route, error = %err, "leaving links unconverted");
            html::push_html(w, Parser::new_ext(markdown, options));
        }
    }
}

struct LinkConverter<'a> {
    base: &'a Url,
}

impl LinkConverter<'_> {
    fn convert<'b>(&self, ev: Event<'b>) -> Event<'b> {
        match ev {
            Event::Start(tag) => Event::Start(self.convert_tag(tag)),
            Event::End(tag) => Event::End(self.convert_tag(tag)),
            _ => ev,
        }
    }

    fn convert_tag<'b>(&self, tag: Tag<'b>) -> Tag<'b> {
        match tag {
            Tag::Link(
                link @ (LinkType::Inline
                | LinkType::Reference
                | LinkType::ReferenceUnknown
                | LinkType::Shortcut
                | LinkType::ShortcutUnknown
                | LinkType::Collapsed
                | LinkType::CollapsedUnknown),
                url,
                title,
            ) => match self.convert_link(&url) {
                Some(route) => Tag::Link(link, CowStr::Boxed(route.into_boxed_str()), title),
                None => Tag::Link(link, url, title),
            },
            _ => tag,
        }
    }

    /// Rewrites a relative link to a markdown source into the linked page's
    /// route, keeping any fragment. Returns `None` when the link should be
    /// left alone.
    fn convert_link(&self, url: &str) -> Option<String> {
        if url.contains("://") || url.starts_with('#') || url.starts_with("mailto:") {
            return None;
        }

        let (path, fragment) = match url.find('#') {
            Some(i) => (&url[..i], &url[i..]),
            None => (url, ""),
        };
        let stem = MARKDOWN_EXTENSIONS
            .iter()
            .find_map(|ext| path.strip_suffix(ext))?;
        let resolved = self.base.join(stem).ok()?;

        let route = match resolved.path().strip_suffix("/index") {
            Some("") => "/",
            Some(parent) => parent,
            None => resolved.path(),
        };
        Some(format!("{}{}", route, fragment))
    }
}
