//! Flat-stake betting summaries over an archived tournament.

use itertools::Itertools;
use serde::Serialize;

use crate::model::{MatchRecord, TournamentDataset, SENTINEL_ODDS};

/// Outcome of backing the same side of every match with a fixed stake.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StrategyStats {
    pub wins: usize,
    pub losses: usize,
    /// Percentage of matches won.
    pub win_rate: f64,
    pub total_profit: f64,
    /// Profit as a percentage of the total staked.
    pub roi: f64,
}

/// The highest-priced underdog that won.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upset {
    pub underdog: String,
    pub favorite: String,
    pub odds: f64,
    pub round: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub tournament: String,
    pub matches: usize,
    pub stake: f64,
    pub underdog: StrategyStats,
    pub favorite: StrategyStats,
    pub biggest_upset: Option<Upset>,
}

/// Summarizes both strategies over the matches whose round is in `rounds`
/// (all matches when `rounds` is empty).
pub fn summarize(dataset: &TournamentDataset, stake: f64, rounds: &[String]) -> Summary {
    let matches = dataset
        .matches
        .iter()
        .filter(|m| rounds.is_empty() || rounds.contains(&m.round))
        .collect_vec();

    let underdog = strategy(&matches, stake, |m| (m.underdog.price(), m.underdog.won));
    // The favorite bet pays the shorter of the two listed prices and wins whenever the underdog does not.
    let favorite = strategy(&matches, stake, |m| {
        let a = m.odds_a.unwrap_or(SENTINEL_ODDS);
        let b = m.odds_b.unwrap_or(SENTINEL_ODDS);
        (a.min(b), !m.underdog.won)
    });

    let biggest_upset = matches
        .iter()
        .filter(|m| m.underdog.won)
        .max_by(|x, y| x.underdog.price().total_cmp(&y.underdog.price()))
        .map(|m| Upset {
            underdog: m.underdog.name.clone(),
            favorite: m.favorite.name.clone(),
            odds: m.underdog.price(),
            round: m.round.clone(),
        });

    Summary {
        tournament: dataset.tournament.clone(),
        matches: matches.len(),
        stake,
        underdog,
        favorite,
        biggest_upset,
    }
}

fn strategy(
    matches: &[&MatchRecord],
    stake: f64,
    bet: impl Fn(&MatchRecord) -> (f64, bool),
) -> StrategyStats {
    let mut stats = StrategyStats::default();
    for &m in matches {
        let (odds, won) = bet(m);
        if won {
            stats.wins += 1;
            stats.total_profit += odds * stake - stake;
        } else {
            stats.losses += 1;
            stats.total_profit -= stake;
        }
    }
    let staked = stake * matches.len() as f64;
    if staked > 0.0 {
        stats.roi = stats.total_profit / staked * 100.0;
    }
    if !matches.is_empty() {
        stats.win_rate = stats.wins as f64 / matches.len() as f64 * 100.0;
    }
    stats
}

/// Distinct round labels in the order they first appear.
pub fn rounds(dataset: &TournamentDataset) -> Vec<String> {
    dataset
        .matches
        .iter()
        .map(|m| m.round.clone())
        .unique()
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contender, OutcomeKind};

    fn decided(id: &str, fav: f64, dog: f64, dog_won: bool, round: &str) -> MatchRecord {
        MatchRecord {
            id: id.into(),
            player_a: format!("fav-{id}"),
            player_b: format!("dog-{id}"),
            odds_a: Some(fav),
            odds_b: Some(dog),
            favorite: Contender {
                name: format!("fav-{id}"),
                odds: Some(fav),
                won: !dog_won,
            },
            underdog: Contender {
                name: format!("dog-{id}"),
                odds: Some(dog),
                won: dog_won,
            },
            round: round.into(),
            outcome: OutcomeKind::Decided,
        }
    }

    fn dataset() -> TournamentDataset {
        let mut d = TournamentDataset::new(2026, "PDC");
        d.matches = vec![
            decided("1", 1.5, 3.0, false, "1. kör"),
            decided("2", 1.2, 5.0, true, "1. kör"),
            decided("3", 1.8, 2.0, true, "Döntő"),
        ];
        d
    }

    #[test]
    fn underdog_and_favorite_strategies() {
        let s = summarize(&dataset(), 100.0, &[]);
        assert_eq!(s.matches, 3);

        assert_eq!(s.underdog.wins, 2);
        assert_eq!(s.underdog.losses, 1);
        // -100 + 400 + 100
        assert!((s.underdog.total_profit - 400.0).abs() < 1e-9);
        assert!((s.underdog.roi - 400.0 / 3.0).abs() < 1e-9);

        assert_eq!(s.favorite.wins, 1);
        // +50 - 100 - 100
        assert!((s.favorite.total_profit + 150.0).abs() < 1e-9);

        let upset = s.biggest_upset.unwrap();
        assert_eq!(upset.underdog, "dog-2");
        assert_eq!(upset.odds, 5.0);
    }

    #[test]
    fn round_filter_and_empty_selection() {
        let s = summarize(&dataset(), 10.0, &["Döntő".to_string()]);
        assert_eq!(s.matches, 1);
        assert_eq!(s.underdog.win_rate, 100.0);

        let s = summarize(&dataset(), 10.0, &["Elődöntő".to_string()]);
        assert_eq!(s.matches, 0);
        assert_eq!(s.underdog.roi, 0.0);
        assert!(s.biggest_upset.is_none());
    }

    #[test]
    fn rounds_in_first_seen_order() {
        assert_eq!(rounds(&dataset()), vec!["1. kör", "Döntő"]);
    }
}
