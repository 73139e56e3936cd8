use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use ::scraper::Html;
use tracing::debug;

use super::{select_all, Element, PageRenderer, RendererFactory};
use crate::error::{Result, SyncError};

/// Serves pages from memory, for offline replay of saved pages and for tests.
///
/// Scripts are recorded; a script containing a registered trigger swaps the
/// current page for the expanded markup, standing in for "load more" clicks.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    pages: HashMap<String, String>,
    expansions: HashMap<String, Vec<(String, String)>>,
    current: Option<(String, String)>,
    scripts: Vec<String>,
    closed: bool,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_owned(), html.to_owned());
        self
    }

    /// When a script containing `trigger` runs on `url`, show `html` instead.
    pub fn with_expansion(mut self, url: &str, trigger: &str, html: &str) -> Self {
        self.expansions
            .entry(url.to_owned())
            .or_default()
            .push((trigger.to_owned(), html.to_owned()));
        self
    }

    /// Load every `*.html` file in `dir`; the URL of each page is `<base><file stem>`.
    pub fn from_dir(dir: &Path, base: &str) -> Result<Self> {
        let io_err = |source| SyncError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut renderer = Self::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let html = std::fs::read_to_string(&path).map_err(|source| SyncError::Io {
                path: path.clone(),
                source,
            })?;
            renderer.pages.insert(format!("{base}{stem}"), html);
        }
        debug!(pages = renderer.pages.len(), "loaded saved pages");
        Ok(renderer)
    }

    /// Scripts executed so far, oldest first.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn document(&self) -> Result<Html> {
        let (_, html) = self.current.as_ref().ok_or(SyncError::ElementNotFound {
            context: "loaded page",
        })?;
        Ok(Html::parse_document(html))
    }
}

impl PageRenderer for StaticRenderer {
    async fn load(&mut self, url: &str) -> Result<()> {
        if self.closed {
            return Err(SyncError::Session("renderer already closed".into()));
        }
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| SyncError::UnexpectedStatus {
                url: url.to_owned(),
                status: reqwest::StatusCode::NOT_FOUND,
            })?;
        self.current = Some((url.to_owned(), html.clone()));
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if self.find_all(selector).await?.is_empty() {
            return Err(SyncError::Timeout {
                selector: selector.to_owned(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Element>> {
        select_all(&self.document()?, selector)
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        self.scripts.push(script.to_owned());
        let Some((url, _)) = &self.current else {
            return Ok(());
        };
        let expanded = self.expansions.get(url).and_then(|triggers| {
            triggers
                .iter()
                .find(|(trigger, _)| script.contains(trigger.as_str()))
                .map(|(_, html)| html.clone())
        });
        if let Some(html) = expanded {
            let url = url.clone();
            self.current = Some((url, html));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}

impl RendererFactory for StaticRenderer {
    type Renderer = StaticRenderer;

    async fn open(&self) -> Result<StaticRenderer> {
        let mut session = self.clone();
        session.closed = false;
        session.current = None;
        session.scripts.clear();
        Ok(session)
    }
}
