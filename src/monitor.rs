use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::config::SourceMap;
use crate::error::Result;
use crate::renderer::{PageRenderer, RendererFactory};
use crate::sync::{CycleReport, SyncEngine};

/// Drives sync cycles for one year, one renderer session per cycle.
pub struct Monitor<F> {
    factory: F,
    engine: SyncEngine,
    year: i32,
    source_url: String,
}

impl<F: RendererFactory> Monitor<F> {
    /// Fails with `UnknownYear` when `sources` has no URL for `year`.
    pub fn new(factory: F, engine: SyncEngine, sources: &SourceMap, year: i32) -> Result<Self> {
        let source_url = sources.url(year)?.to_owned();
        Ok(Self {
            factory,
            engine,
            year,
            source_url,
        })
    }

    /// One cycle. The session is closed whether or not the cycle succeeds.
    #[instrument(skip(self), fields(year = self.year))]
    pub async fn run_once(&self) -> Result<CycleReport> {
        info!(url = %self.source_url, "checking for new matches");
        let mut renderer = self.factory.open().await?;
        let result = self
            .engine
            .run_cycle(&mut renderer, self.year, &self.source_url)
            .await;
        if let Err(e) = renderer.close().await {
            warn!(error = %e, "failed to close renderer session");
        }
        result
    }

    /// Repeats [`Monitor::run_once`] every `interval` until the process ends.
    pub async fn run_loop(&self, interval: Duration) {
        info!(year = self.year, interval_secs = interval.as_secs(), "starting monitor loop");
        loop {
            if let Err(e) = self.run_once().await {
                error!(error = %e, "sync cycle failed");
            }
            info!(secs = interval.as_secs(), "sleeping");
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selectors;
    use crate::renderer::StaticRenderer;
    use crate::scraper::{ExtractOptions, LinkDiscoverer, RecordExtractor};
    use crate::store::JsonStore;
    use crate::sync::SyncMode;
    use crate::SyncError;

    const RESULTS: &str = "https://example.com/results/2026/";

    fn engine(dir: &std::path::Path) -> SyncEngine {
        let mut discoverer = LinkDiscoverer::new(Selectors::default(), Duration::ZERO);
        discoverer.settle_delay = Duration::ZERO;
        SyncEngine {
            store: JsonStore::new(dir),
            discoverer,
            extractor: RecordExtractor::new(ExtractOptions::default()),
            tournament_label: "PDC".into(),
            mode: SyncMode::Incremental,
            limit: None,
        }
    }

    fn site() -> StaticRenderer {
        StaticRenderer::new()
            .with_page(RESULTS, r#"<a class="eventRowLink" href="/m/1/">1</a>"#)
            .with_page(
                "https://example.com/m/1/",
                r#"<div class="participant__participantNameWrapper">Stephen Bunting</div>
                   <div class="participant__participantNameWrapper">Josh Rock</div>
                   <div class="oddsRow"><a title="TippmixPro"></a>
                     <button class="oddsCell">2,20</button><button class="oddsCell wcl-win">1,65</button></div>"#,
            )
    }

    fn sources() -> SourceMap {
        SourceMap::from_pairs([(2026, RESULTS.to_string())])
    }

    #[test]
    fn unknown_year_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Monitor::new(site(), engine(dir.path()), &sources(), 2019)
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::UnknownYear { year: 2019, .. }));
    }

    #[tokio::test]
    async fn run_once_syncs_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = Monitor::new(site(), engine(dir.path()), &sources(), 2026).unwrap();

        let report = monitor.run_once().await.unwrap();
        assert!(report.succeeded());
        assert_eq!(report.appended, 1);

        let dataset = JsonStore::new(dir.path()).load(2026).unwrap().unwrap();
        let record = &dataset.matches[0];
        assert_eq!(record.favorite.name, "Josh Rock");
        assert!(record.favorite.won);
        assert_eq!(record.underdog.odds, Some(2.2));
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_running_across_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = Monitor::new(site(), engine(dir.path()), &sources(), 2026).unwrap();

        let outcome =
            tokio::time::timeout(Duration::from_secs(25), monitor.run_loop(Duration::from_secs(10)))
                .await;
        assert!(outcome.is_err(), "loop should only end when cancelled");

        let dataset = JsonStore::new(dir.path()).load(2026).unwrap().unwrap();
        assert_eq!(dataset.matches.len(), 1);
    }
}
