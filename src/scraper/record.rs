use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::classify::{classify, outcome_kind, walkover_flags};
use crate::config::{self, Selectors, ODDS_WAIT};
use crate::error::Result;
use crate::model::{Contender, MatchRecord, Side};
use crate::renderer::{Element, PageRenderer};
use crate::scraper::{parse_odds, round_from_breadcrumb, strip_marker, UNKNOWN_ROUND};

/// Why a match page produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than two participant names on the page.
    MissingParticipants,
    /// Neither side has a market price.
    NoOdds,
    /// A price is at or below the configured minimum.
    OddsBelowThreshold,
}

/// Result of extracting one match page. Hard failures are `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(MatchRecord),
    Skipped(SkipReason),
}

/// Knobs for turning a match page into a record.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub selectors: Selectors,
    /// Title of the bookmaker link whose odds row is read.
    pub bookmaker: String,
    /// Text appended to the name of a participant advancing by walkover.
    pub walkover_marker: String,
    pub min_odds: Option<f64>,
    /// Bound on waiting for the participant names.
    pub wait_timeout: Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            bookmaker: config::DEFAULT_BOOKMAKER.into(),
            walkover_marker: config::DEFAULT_WALKOVER_MARKER.into(),
            min_odds: None,
            wait_timeout: Duration::from_secs(10),
        }
    }
}

/// Odds and win markers read from the bookmaker row.
#[derive(Debug, Default)]
struct Market {
    odds_a: Option<f64>,
    odds_b: Option<f64>,
    a_won: bool,
    b_won: bool,
}

pub struct RecordExtractor {
    options: ExtractOptions,
}

impl RecordExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Loads the match page at `id` and normalizes it.
    #[instrument(skip(self, renderer))]
    pub async fn extract<R: PageRenderer>(&self, renderer: &mut R, id: &str) -> Result<Extraction> {
        let sel = &self.options.selectors;
        renderer.load(id).await?;

        if let Err(e) = renderer
            .wait_for_selector(&sel.participant, self.options.wait_timeout)
            .await
        {
            if e.is_session_fatal() {
                return Err(e);
            }
            warn!(error = %e, "participants did not appear");
            return Ok(Extraction::Skipped(SkipReason::MissingParticipants));
        }
        let names = renderer.find_all(&sel.participant).await?;
        let [raw_a, raw_b, ..] = names.as_slice() else {
            warn!(found = names.len(), "fewer than two participants");
            return Ok(Extraction::Skipped(SkipReason::MissingParticipants));
        };

        let marker = &self.options.walkover_marker;
        let (player_a, player_b, walkover) = match (
            strip_marker(raw_a.text(), marker),
            strip_marker(raw_b.text(), marker),
        ) {
            (Some(a), b) => (a, b.unwrap_or_else(|| raw_b.text().to_string()), Some(Side::A)),
            (None, Some(b)) => (raw_a.text().to_string(), b, Some(Side::B)),
            (None, None) => (raw_a.text().to_string(), raw_b.text().to_string(), None),
        };

        let round = self.round(renderer).await?;

        let market = match walkover {
            Some(winner) => {
                debug!(%winner, "walkover");
                let (a_won, b_won) = walkover_flags(winner);
                Market {
                    a_won,
                    b_won,
                    ..Market::default()
                }
            }
            None => {
                let market = self.market(renderer).await?;
                if market.odds_a.is_none() && market.odds_b.is_none() {
                    return Ok(Extraction::Skipped(SkipReason::NoOdds));
                }
                if let Some(min) = self.options.min_odds {
                    let low = [market.odds_a, market.odds_b]
                        .into_iter()
                        .flatten()
                        .any(|odds| odds <= min);
                    if low {
                        return Ok(Extraction::Skipped(SkipReason::OddsBelowThreshold));
                    }
                }
                market
            }
        };

        let outcome = outcome_kind(walkover.is_some(), market.a_won, market.b_won);
        let classified = classify(
            Contender {
                name: player_a.clone(),
                odds: market.odds_a,
                won: market.a_won,
            },
            Contender {
                name: player_b.clone(),
                odds: market.odds_b,
                won: market.b_won,
            },
        );

        Ok(Extraction::Record(MatchRecord {
            id: id.to_string(),
            player_a,
            player_b,
            odds_a: market.odds_a,
            odds_b: market.odds_b,
            favorite: classified.favorite,
            underdog: classified.underdog,
            round,
            outcome,
        }))
    }

    async fn round<R: PageRenderer>(&self, renderer: &mut R) -> Result<String> {
        let crumbs = match renderer.find_all(&self.options.selectors.breadcrumb).await {
            Ok(crumbs) => crumbs,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                debug!(error = %e, "breadcrumb unreadable");
                Vec::new()
            }
        };
        Ok(crumbs
            .last()
            .and_then(|c| round_from_breadcrumb(c.text()))
            .unwrap_or_else(|| UNKNOWN_ROUND.to_string()))
    }

    async fn market<R: PageRenderer>(&self, renderer: &mut R) -> Result<Market> {
        let sel = &self.options.selectors;
        match renderer.wait_for_selector(&sel.prematch, ODDS_WAIT).await {
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => debug!(error = %e, "no prematch odds section"),
            Ok(()) => {}
        }

        let rows = match renderer.find_all(&sel.odds_row).await {
            Ok(rows) => rows,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                debug!(error = %e, "odds rows unreadable");
                return Ok(Market::default());
            }
        };
        let Some(cells) = self.bookmaker_cells(&rows) else {
            debug!(bookmaker = %self.options.bookmaker, "bookmaker odds not listed");
            return Ok(Market::default());
        };

        let read = |cell: &Element| {
            let odds = parse_odds(cell.text());
            if odds.is_none() {
                debug!(text = cell.text(), "no usable odds in cell");
            }
            (odds, cell.has_class_containing(&sel.won_class))
        };
        let (odds_a, a_won) = read(&cells[0]);
        let (odds_b, b_won) = read(&cells[1]);
        Ok(Market {
            odds_a,
            odds_b,
            a_won,
            b_won,
        })
    }

    /// Odds cells of the innermost row carrying the bookmaker link.
    fn bookmaker_cells(&self, rows: &[Element]) -> Option<Vec<Element>> {
        let link = format!(r#"a[title="{}"]"#, self.options.bookmaker);
        // Rows arrive in document order, so an enclosing row precedes the rows it contains.
        rows.iter().rev().find_map(|row| {
            let has_link = row.find_all(&link).is_ok_and(|links| !links.is_empty());
            if !has_link {
                return None;
            }
            let cells = row.find_all(&self.options.selectors.odds_cell).ok()?;
            (cells.len() >= 2).then_some(cells)
        })
    }
}
