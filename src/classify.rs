//! Favorite/underdog assignment. Pure functions, no I/O.

use crate::model::{Contender, OutcomeKind, Side};

/// Favorite and underdog of one match.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub favorite: Contender,
    pub underdog: Contender,
    /// Which listed side ended up as favorite.
    pub favorite_side: Side,
}

/// Orders two participants by price.
///
/// The higher price is the underdog. On equal prices (absent odds count as the
/// sentinel, so two walkover sides compare equal) side A is the underdog and B
/// the favorite, which keeps re-extraction of the same page stable.
pub fn classify(a: Contender, b: Contender) -> Classification {
    if b.price() > a.price() {
        Classification {
            favorite: a,
            underdog: b,
            favorite_side: Side::A,
        }
    } else {
        Classification {
            favorite: b,
            underdog: a,
            favorite_side: Side::B,
        }
    }
}

/// Derives the outcome kind from the walkover flag and both win markers.
pub fn outcome_kind(walkover: bool, a_won: bool, b_won: bool) -> OutcomeKind {
    match (walkover, a_won != b_won) {
        (true, _) => OutcomeKind::Walkover,
        (false, true) => OutcomeKind::Decided,
        (false, false) => OutcomeKind::Unresolved,
    }
}

/// Win markers for a walkover advanced by `winner`.
pub fn walkover_flags(winner: Side) -> (bool, bool) {
    (winner == Side::A, winner == Side::B)
}
