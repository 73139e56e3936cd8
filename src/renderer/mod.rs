//! Page access used by the extractors.
//!
//! Components only talk to a [`PageRenderer`]; whether pages come from the
//! network ([`HttpRenderer`]) or from saved HTML ([`StaticRenderer`]) is up to
//! the caller.

mod fixture;
mod http;

use std::time::Duration;

use ::scraper::{ElementRef, Html, Selector};

use crate::error::Result;

pub use fixture::StaticRenderer;
pub use http::{HttpLauncher, HttpRenderer};

/// A page session: one loaded document at a time.
#[allow(async_fn_in_trait)]
pub trait PageRenderer {
    /// Navigate to `url`. Errors abort only the caller's current page.
    async fn load(&mut self, url: &str) -> Result<()>;

    /// Wait at most `timeout` for an element matching `selector`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// All elements matching `selector` on the current page, in document order.
    async fn find_all(&mut self, selector: &str) -> Result<Vec<Element>>;

    /// Run a script against the current page.
    async fn execute_script(&mut self, script: &str) -> Result<()>;

    /// Release the session. Called exactly once, on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// Opens a fresh renderer session for each sync cycle.
#[allow(async_fn_in_trait)]
pub trait RendererFactory {
    type Renderer: PageRenderer;

    async fn open(&self) -> Result<Self::Renderer>;
}

/// Snapshot of an element taken from the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    text: String,
    attrs: Vec<(String, String)>,
    html: String,
}

impl Element {
    pub(crate) fn from_ref(element: &ElementRef) -> Self {
        let text = element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");
        let attrs = element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            text,
            attrs,
            html: element.html(),
        }
    }

    /// Visible text with whitespace runs collapsed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether any class token contains `fragment`.
    pub fn has_class_containing(&self, fragment: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|token| token.contains(fragment)))
    }

    /// Elements matching `selector` below this one.
    pub fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        let fragment = Html::parse_fragment(&self.html);
        select_all(&fragment, selector)
    }
}

pub(crate) fn select_all(document: &Html, selector: &str) -> Result<Vec<Element>> {
    let selector = Selector::parse(selector)?;
    Ok(document
        .select(&selector)
        .map(|e| Element::from_ref(&e))
        .collect())
}
