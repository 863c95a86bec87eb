//! The library code for the `pagefold` static site generator. A build is a
//! single pass:
//!
//! 1. Loading the content directory into a [`node::PageNode`] tree
//!    ([`crate::loader`])
//! 2. Projecting the tree into sidebar navigation headers and the most
//!    recent posts ([`crate::projector`])
//! 3. Rendering every page through the layout template ([`crate::layout`]),
//!    which also decides each post heading's background
//!    ([`crate::heading`])
//! 4. Writing the Atom feed ([`crate::feed`]) and the visited-states map
//!    data ([`crate::statemap`])
//!
//! The projection is the interesting part. It is a pure function of the
//! tree: top-level `Meta` nodes become navigation headers (minus `index`),
//! and titled pages directly inside the `posts` folder become the recent
//! posts list, capped at ten and kept in tree order.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod heading;
pub mod layout;
pub mod loader;
pub mod markdown;
pub mod node;
pub mod projector;
pub mod statemap;
