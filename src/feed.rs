//! Support for creating Atom feeds from a list of posts.

use crate::config::Author;
use crate::layout::page_url;
use crate::node::MdxPage;
use atom_syndication::{Entry, Error as AtomError, Feed, FixedDateTime, Link, Person};
use chrono::{NaiveDate, TimeZone, Utc};
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// post pages and writes the result to a [`std::io::Write`]. Pages without a
/// parseable `date` are left out of the feed.
pub fn write_feed<W: Write>(config: FeedConfig, posts: &[&MdxPage], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[&MdxPage]) -> Result<Feed> {
    let entries = feed_entries(&config, posts)?;
    let updated = entries
        .iter()
        .map(|entry| entry.updated)
        .max()
        .unwrap_or_else(|| Utc::now().into());

    Ok(Feed {
        title: config.title.into(),
        id: config.id,
        updated,
        authors: author_to_people(config.author),
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_owned(),
            ..Default::default()
        }],
        entries,
        ..Default::default()
    })
}

fn feed_entries(config: &FeedConfig, posts: &[&MdxPage]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        let front_matter = match &post.front_matter {
            Some(front_matter) => front_matter,
            None => continue,
        };
        let date = match front_matter.date.as_deref().and_then(parse_date) {
            Some(date) => date,
            None => {
                tracing::warn!(
                    route = %post.route,
                    "leaving post without a valid date out of the feed"
                );
                continue;
            }
        };
        let url = page_url(&config.home_page, &post.route)?.to_string();

        entries.push(Entry {
            id: url.clone(),
            title: front_matter.title().unwrap_or(&post.name).to_owned().into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: url,
                rel: "alternate".to_owned(),
                ..Default::default()
            }],
            summary: front_matter.description.clone().map(Into::into),
            published: Some(date),
            ..Default::default()
        })
    }
    Ok(entries)
}

/// Parses a `YYYY-MM-DD` date as midnight UTC.
fn parse_date(date: &str) -> Option<FixedDateTime> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive).into())
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            ..Default::default()
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] AtomError),

    /// Returned when a post URL can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
