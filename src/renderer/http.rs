use std::time::Duration;

use ::scraper::{Html, Selector};
use tracing::{debug, instrument};

use super::{select_all, Element, PageRenderer, RendererFactory};
use crate::error::{Result, SyncError};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Renderer over plain HTTP: pages are fetched once and queried as static HTML.
pub struct HttpRenderer {
    http: reqwest::Client,
    page: Option<(String, String)>,
}

impl HttpRenderer {
    /// Create a renderer using the provided [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: client,
            page: None,
        }
    }

    fn document(&self) -> Result<Html> {
        let (_, body) = self.page.as_ref().ok_or(SyncError::ElementNotFound {
            context: "loaded page",
        })?;
        Ok(Html::parse_document(body))
    }
}

/// Fetch a URL and return the response body.
async fn get_document(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(url, "fetching page");

    let response = client.get(url).send().await.map_err(|e| SyncError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| SyncError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

impl PageRenderer for HttpRenderer {
    #[instrument(skip(self))]
    async fn load(&mut self, url: &str) -> Result<()> {
        self.page = None;
        let body = get_document(&self.http, url).await?;
        self.page = Some((url.to_owned(), body));
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        // A fetched document never changes, so there is nothing to wait for.
        let parsed = Selector::parse(selector)?;
        if self.document()?.select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(SyncError::Timeout {
                selector: selector.to_owned(),
                waited_ms: 0,
            })
        }
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Element>> {
        select_all(&self.document()?, selector)
    }

    async fn execute_script(&mut self, _script: &str) -> Result<()> {
        Err(SyncError::Unsupported("script execution"))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some((url, _)) = self.page.take() {
            debug!(url, "closing http session");
        }
        Ok(())
    }
}

/// Builds an [`HttpRenderer`] with a bounded request timeout per cycle.
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    pub request_timeout: Duration,
}

impl RendererFactory for HttpLauncher {
    type Renderer = HttpRenderer;

    async fn open(&self) -> Result<HttpRenderer> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| SyncError::Session(e.to_string()))?;
        Ok(HttpRenderer::with_client(client))
    }
}
