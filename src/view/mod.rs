use std::borrow::Cow;

use serde::Deserialize;

pub mod form_renderer;
pub mod list_renderer;
pub mod page_renderer;
pub mod post_renderer;
pub mod templates;

/// How user supplied text reaches the markup.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Escaped,
    /// Text is written as-is, markup included. Only for pages that relied on it.
    LegacyRaw,
}

impl RenderMode {
    pub fn text<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        match self {
            RenderMode::Escaped => quick_xml::escape::escape(raw),
            RenderMode::LegacyRaw => Cow::Borrowed(raw),
        }
    }
}
