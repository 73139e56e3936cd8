use serde::{Deserialize, Serialize};

/// Odds value written for a side without a market price.
///
/// Only the on-disk format knows about it; in memory absent odds are `None`.
pub const SENTINEL_ODDS: f64 = 1.0;

/// One of the two participants as listed on the match page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Side {
    A,
    B,
}

/// How the result of a match was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutcomeKind {
    /// Played match with exactly one winner.
    Decided,
    /// One side advanced without play; there is no market price.
    Walkover,
    /// No winner could be read from the page.
    Unresolved,
}

/// A participant seen through the favorite/underdog lens.
#[derive(Debug, Clone, PartialEq)]
pub struct Contender {
    pub name: String,
    pub odds: Option<f64>,
    pub won: bool,
}

impl Contender {
    /// Odds as used for ordering and payouts, absent odds counting as the sentinel.
    pub fn price(&self) -> f64 {
        self.odds.unwrap_or(SENTINEL_ODDS)
    }
}

/// A normalized, immutable match result keyed by the detail page URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredMatch", into = "StoredMatch")]
pub struct MatchRecord {
    pub id: String,
    pub player_a: String,
    pub player_b: String,
    pub odds_a: Option<f64>,
    pub odds_b: Option<f64>,
    pub favorite: Contender,
    pub underdog: Contender,
    pub round: String,
    pub outcome: OutcomeKind,
}

impl MatchRecord {
    pub fn is_walkover(&self) -> bool {
        self.outcome == OutcomeKind::Walkover
    }

    /// The side that won, if the record knows one.
    pub fn winner(&self) -> Option<&Contender> {
        match (self.favorite.won, self.underdog.won) {
            (true, false) => Some(&self.favorite),
            (false, true) => Some(&self.underdog),
            _ => None,
        }
    }
}

/// Exact shape of a match inside the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMatch {
    player_a: String,
    player_b: String,
    odds_a: f64,
    odds_b: f64,
    underdog: String,
    underdog_odds: f64,
    underdog_won: bool,
    favorite: String,
    favorite_odds: f64,
    favorite_won: bool,
    round: String,
    // Older archives predate ids.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
}

fn from_stored(odds: f64) -> Option<f64> {
    // Exact comparison: the sentinel is written verbatim, never computed.
    (odds != SENTINEL_ODDS).then_some(odds)
}

impl From<StoredMatch> for MatchRecord {
    fn from(m: StoredMatch) -> Self {
        let odds_a = from_stored(m.odds_a);
        let odds_b = from_stored(m.odds_b);
        let one_winner = m.favorite_won != m.underdog_won;
        let outcome = match (odds_a, odds_b, one_winner) {
            (None, None, true) => OutcomeKind::Walkover,
            (_, _, true) => OutcomeKind::Decided,
            _ => OutcomeKind::Unresolved,
        };
        MatchRecord {
            id: m.id,
            player_a: m.player_a,
            player_b: m.player_b,
            odds_a,
            odds_b,
            favorite: Contender {
                name: m.favorite,
                odds: from_stored(m.favorite_odds),
                won: m.favorite_won,
            },
            underdog: Contender {
                name: m.underdog,
                odds: from_stored(m.underdog_odds),
                won: m.underdog_won,
            },
            round: m.round,
            outcome,
        }
    }
}

impl From<MatchRecord> for StoredMatch {
    fn from(m: MatchRecord) -> Self {
        StoredMatch {
            player_a: m.player_a,
            player_b: m.player_b,
            odds_a: m.odds_a.unwrap_or(SENTINEL_ODDS),
            odds_b: m.odds_b.unwrap_or(SENTINEL_ODDS),
            underdog_odds: m.underdog.price(),
            underdog: m.underdog.name,
            underdog_won: m.underdog.won,
            favorite_odds: m.favorite.price(),
            favorite: m.favorite.name,
            favorite_won: m.favorite.won,
            round: m.round,
            id: m.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALKOVER_JSON: &str = r#"{
  "playerA": "Luke Littler",
  "playerB": "Ryan Meikle",
  "oddsA": 1.0,
  "oddsB": 1.0,
  "underdog": "Luke Littler",
  "underdogOdds": 1.0,
  "underdogWon": true,
  "favorite": "Ryan Meikle",
  "favoriteOdds": 1.0,
  "favoriteWon": false,
  "round": "1/16 döntő",
  "id": "https://example.com/match/abc"
}"#;

    #[test]
    fn sentinel_odds_load_as_walkover() {
        let record: MatchRecord = serde_json::from_str(WALKOVER_JSON).unwrap();
        assert_eq!(record.outcome, OutcomeKind::Walkover);
        assert_eq!(record.odds_a, None);
        assert_eq!(record.odds_b, None);
        assert_eq!(record.winner().map(|c| c.name.as_str()), Some("Luke Littler"));
    }

    #[test]
    fn stored_shape_round_trips_verbatim() {
        let record: MatchRecord = serde_json::from_str(WALKOVER_JSON).unwrap();
        let written = serde_json::to_string_pretty(&record).unwrap();
        assert_eq!(written, WALKOVER_JSON);
    }

    #[test]
    fn record_without_id_loads_and_writes_back_without_one() {
        let json = WALKOVER_JSON.replace(",\n  \"id\": \"https://example.com/match/abc\"", "");
        assert!(!json.contains("\"id\""));
        let record: MatchRecord = serde_json::from_str(&json).unwrap();
        assert!(record.id.is_empty());
        assert_eq!(serde_json::to_string_pretty(&record).unwrap(), json);
    }

    #[test]
    fn missing_winner_loads_as_unresolved() {
        let json = WALKOVER_JSON
            .replace("\"oddsA\": 1.0", "\"oddsA\": 2.5")
            .replace("\"underdogWon\": true", "\"underdogWon\": false");
        let record: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.outcome, OutcomeKind::Unresolved);
        assert_eq!(record.odds_a, Some(2.5));
        assert!(record.winner().is_none());
    }
}
