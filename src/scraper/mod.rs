pub(crate) mod links;
pub(crate) mod record;

pub use links::LinkDiscoverer;
pub use record::{ExtractOptions, Extraction, RecordExtractor, SkipReason};

use crate::config::parse_decimal;
use crate::model::SENTINEL_ODDS;

/// Round label used when the page does not name one.
pub const UNKNOWN_ROUND: &str = "Unknown";

/// Removes `marker` from a participant name, along with the punctuation around it.
///
/// Returns `None` when the name does not carry the marker.
pub(crate) fn strip_marker(raw: &str, marker: &str) -> Option<String> {
    if marker.is_empty() || !raw.contains(marker) {
        return None;
    }
    let name = raw
        .replace(marker, "")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '(' | ')'))
        .to_string();
    Some(name)
}

/// A bookmaker price from an odds cell.
///
/// Anything that is not a real price above evens, including the `1.00` the
/// archive uses for "no price", reads as absent.
pub(crate) fn parse_odds(raw: &str) -> Option<f64> {
    parse_decimal(raw).filter(|odds| *odds > SENTINEL_ODDS)
}

/// Round from a breadcrumb such as `"World Championship - 1/8 döntő"`.
pub(crate) fn round_from_breadcrumb(text: &str) -> Option<String> {
    let (_, round) = text.trim().rsplit_once(" - ")?;
    let round = round.trim();
    (!round.is_empty()).then(|| round.to_string())
}

/// JavaScript clicking the first element matching `selector`.
pub(crate) fn click_script(selector: &str) -> String {
    // serde_json quotes and escapes the selector as a JS string literal.
    let quoted = serde_json::Value::from(selector).to_string();
    format!("const el = document.querySelector({quoted}); if (el) {{ el.scrollIntoView(true); el.click(); }}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_and_punctuation_are_stripped() {
        assert_eq!(
            strip_marker("Ryan Meikle (Továbbjutó)", "Továbbjutó").as_deref(),
            Some("Ryan Meikle")
        );
        assert_eq!(
            strip_marker("Továbbjutó - Gerwyn Price", "Továbbjutó").as_deref(),
            Some("Gerwyn Price")
        );
        assert_eq!(strip_marker("Gerwyn Price", "Továbbjutó"), None);
        assert_eq!(strip_marker("Gerwyn Price", ""), None);
    }

    #[test]
    fn odds_must_be_a_real_price() {
        assert_eq!(parse_odds("2,40"), Some(2.4));
        assert_eq!(parse_odds("1.01"), Some(1.01));
        assert_eq!(parse_odds("1,00"), None);
        assert_eq!(parse_odds("0,50"), None);
        assert_eq!(parse_odds("NaN"), None);
        assert_eq!(parse_odds("inf"), None);
        assert_eq!(parse_odds("-"), None);
    }

    #[test]
    fn round_is_last_breadcrumb_segment() {
        assert_eq!(
            round_from_breadcrumb(" PDC-dartsvilágbajnokság - 1/8 döntő ").as_deref(),
            Some("1/8 döntő")
        );
        assert_eq!(
            round_from_breadcrumb("Darts - World - Final").as_deref(),
            Some("Final")
        );
        assert_eq!(round_from_breadcrumb("Darts"), None);
        assert_eq!(round_from_breadcrumb("Darts - "), None);
    }

    #[test]
    fn click_script_escapes_selector() {
        let script = click_script(r#"div[class*="oddsRow"]"#);
        assert!(script.contains(r#"querySelector("div[class*=\"oddsRow\"]")"#));
    }
}
