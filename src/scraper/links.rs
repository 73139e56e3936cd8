use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::config::{Selectors, CONSENT_WAIT, LOAD_MORE_WAIT, SETTLE_DELAY};
use crate::error::Result;
use crate::renderer::PageRenderer;
use crate::scraper::click_script;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Collects match detail links from a tournament results page.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    pub selectors: Selectors,
    /// Bound on waiting for the first result row.
    pub row_wait: Duration,
    /// Pause after scrolling or expanding the list.
    pub settle_delay: Duration,
}

impl LinkDiscoverer {
    pub fn new(selectors: Selectors, row_wait: Duration) -> Self {
        Self {
            selectors,
            row_wait,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Every row link on the results page, in page order.
    ///
    /// A page that cannot be loaded or shows no rows yields an empty list.
    /// Only a lost renderer session is returned as an error.
    #[instrument(skip(self, renderer))]
    pub async fn discover<R: PageRenderer>(
        &self,
        renderer: &mut R,
        source_url: &str,
    ) -> Result<Vec<String>> {
        if let Err(e) = renderer.load(source_url).await {
            if e.is_session_fatal() {
                return Err(e);
            }
            warn!(error = %e, "results page failed to load");
            return Ok(Vec::new());
        }

        self.dismiss_consent(renderer).await;

        if let Err(e) = renderer
            .wait_for_selector(&self.selectors.row_link, self.row_wait)
            .await
        {
            if e.is_session_fatal() {
                return Err(e);
            }
            warn!(error = %e, "no result rows on page");
            return Ok(Vec::new());
        }

        self.expand(renderer).await;

        let rows = match renderer.find_all(&self.selectors.row_link).await {
            Ok(rows) => rows,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "failed to read result rows");
                return Ok(Vec::new());
            }
        };
        let base = reqwest::Url::parse(source_url).ok();
        let links: Vec<String> = rows
            .iter()
            .filter_map(|row| row.attribute("href"))
            .filter(|href| !href.trim().is_empty())
            .map(|href| absolute_url(base.as_ref(), href.trim()))
            .collect();

        info!(count = links.len(), "discovered match links");
        Ok(links)
    }

    async fn dismiss_consent<R: PageRenderer>(&self, renderer: &mut R) {
        let selector = &self.selectors.consent_button;
        if renderer.wait_for_selector(selector, CONSENT_WAIT).await.is_err() {
            return;
        }
        if let Err(e) = renderer.execute_script(&click_script(selector)).await {
            debug!(error = %e, "could not dismiss consent overlay");
        }
    }

    /// Scroll and press "load more" once; failure leaves the visible rows as they are.
    async fn expand<R: PageRenderer>(&self, renderer: &mut R) {
        match renderer.execute_script(SCROLL_TO_BOTTOM).await {
            Ok(()) => tokio::time::sleep(self.settle_delay).await,
            Err(e) => debug!(error = %e, "scroll not available"),
        }

        let selector = &self.selectors.load_more;
        if let Err(e) = renderer.wait_for_selector(selector, LOAD_MORE_WAIT).await {
            debug!(error = %e, "no load-more control");
            return;
        }
        match renderer.execute_script(&click_script(selector)).await {
            Ok(()) => {
                debug!("expanded result list");
                tokio::time::sleep(self.settle_delay).await;
            }
            Err(e) => debug!(error = %e, "load-more click failed, using visible rows"),
        }
    }
}

fn absolute_url(base: Option<&reqwest::Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}
