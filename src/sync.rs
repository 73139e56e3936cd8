use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::model::TournamentDataset;
use crate::renderer::PageRenderer;
use crate::scraper::{Extraction, LinkDiscoverer, RecordExtractor};
use crate::store::JsonStore;

/// Whether a cycle builds on the stored dataset or starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SyncMode {
    /// Only identifiers missing from the store are extracted and appended.
    #[default]
    Incremental,
    /// Every discovered identifier is extracted and the stored dataset replaced.
    Full,
}

/// Counters for one discover → diff → extract → save pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub year: i32,
    pub discovered: usize,
    pub new: usize,
    pub appended: usize,
    pub skipped: usize,
    pub failed: usize,
    pub saved: bool,
}

impl CycleReport {
    /// The source listed at least one match.
    pub fn succeeded(&self) -> bool {
        self.discovered > 0
    }
}

pub struct SyncEngine {
    pub store: JsonStore,
    pub discoverer: LinkDiscoverer,
    pub extractor: RecordExtractor,
    pub tournament_label: String,
    pub mode: SyncMode,
    /// Cap on identifiers extracted per cycle.
    pub limit: Option<usize>,
}

impl SyncEngine {
    /// Runs one cycle for `year` against `source_url` using `renderer`.
    ///
    /// Per-record failures are counted and skipped. A lost renderer session
    /// ends the cycle after saving the records appended so far.
    #[instrument(skip(self, renderer), fields(mode = %self.mode))]
    pub async fn run_cycle<R: PageRenderer>(
        &self,
        renderer: &mut R,
        year: i32,
        source_url: &str,
    ) -> Result<CycleReport> {
        let mut dataset = match self.mode {
            SyncMode::Incremental => self.store.load(year)?,
            SyncMode::Full => None,
        }
        .unwrap_or_else(|| {
            info!("starting a fresh dataset");
            TournamentDataset::new(year, &self.tournament_label)
        });
        let mut seen = dataset.seen_ids();

        let discovered = self.discoverer.discover(renderer, source_url).await?;
        let mut fresh = seen.unseen(&discovered);
        if let Some(limit) = self.limit {
            fresh.truncate(limit);
        }

        let mut report = CycleReport {
            year,
            discovered: discovered.len(),
            new: fresh.len(),
            ..CycleReport::default()
        };
        if fresh.is_empty() {
            info!(discovered = report.discovered, "no new matches");
            return Ok(report);
        }
        info!(new = report.new, known = seen.len(), "found new matches");

        let total = fresh.len();
        for (i, id) in fresh.iter().enumerate() {
            match self.extractor.extract(renderer, id).await {
                Ok(Extraction::Record(record)) => {
                    info!(
                        "[{}/{total}] {} ({}) vs {} ({}) - {}",
                        i + 1,
                        record.player_a,
                        display_odds(record.odds_a),
                        record.player_b,
                        display_odds(record.odds_b),
                        record.round,
                    );
                    if dataset.append(&mut seen, record) {
                        report.appended += 1;
                    }
                }
                Ok(Extraction::Skipped(reason)) => {
                    info!(%reason, id = %id, "[{}/{total}] skipped", i + 1);
                    report.skipped += 1;
                }
                Err(e) if e.is_session_fatal() => {
                    warn!(error = %e, "renderer session lost, ending cycle");
                    self.save(&dataset, &mut report)?;
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, id = %id, "[{}/{total}] extraction failed", i + 1);
                    report.failed += 1;
                }
            }
        }

        self.save(&dataset, &mut report)?;
        info!(
            appended = report.appended,
            skipped = report.skipped,
            failed = report.failed,
            saved = report.saved,
            "cycle complete"
        );
        Ok(report)
    }

    fn save(&self, dataset: &TournamentDataset, report: &mut CycleReport) -> Result<()> {
        if report.appended == 0 {
            return Ok(());
        }
        self.store.save(dataset)?;
        report.saved = true;
        Ok(())
    }
}

fn display_odds(odds: Option<f64>) -> String {
    odds.map(|o| format!("{o:.2}")).unwrap_or_else(|| "-".into())
}
