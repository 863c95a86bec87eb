//! Resolves the decorative background of a post's heading block.

use serde::{Deserialize, Serialize};

/// Settings for [`resolve`] and for the caller-side fallbacks applied before
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// A route containing this substring is a post-detail page.
    pub post_route_marker: String,

    /// Substituted when a page has no `image` in its front matter.
    pub default_image: String,

    /// Substituted when a page has no `description` in its front matter.
    pub default_description: String,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        HeadingConfig {
            post_route_marker: String::from("/posts/"),
            default_image: String::from(
                "https://www.wilsonpeakproperties.com/custimages/Big_Sky_Resort_Winter.jpeg",
            ),
            default_description: String::from("Software. Be happy"),
        }
    }
}

impl HeadingConfig {
    pub fn image_or_default<'a>(&'a self, image: Option<&'a str>) -> &'a str {
        image.unwrap_or(&self.default_image)
    }

    pub fn description_or_default<'a>(&'a self, description: Option<&'a str>) -> &'a str {
        description.unwrap_or(&self.default_description)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingStyle {
    /// `url(<image>)` on post-detail routes, empty elsewhere.
    pub background_image: String,
    pub background_position: &'static str,
    pub background_size: &'static str,
    pub background_repeat: &'static str,
}

impl HeadingStyle {
    /// Renders the style as the value of an HTML `style` attribute. An empty
    /// background image is left out rather than rendered as an empty
    /// declaration.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if !self.background_image.is_empty() {
            css.push_str(&format!("background-image: {}; ", self.background_image));
        }
        css.push_str(&format!(
            "background-position: {}; background-size: {}; background-repeat: {};",
            self.background_position, self.background_size, self.background_repeat
        ));
        css
    }
}

/// Decides the heading style for a page at `route` whose (already
/// defaulted) image is `image`.
pub fn resolve(config: &HeadingConfig, route: &str, image: Option<&str>) -> HeadingStyle {
    let background_image = match image {
        Some(image) if route.contains(&config.post_route_marker) => format!("url({})", image),
        _ => String::new(),
    };
    HeadingStyle {
        background_image,
        background_position: "center",
        background_size: "cover",
        background_repeat: "no-repeat",
    }
}
