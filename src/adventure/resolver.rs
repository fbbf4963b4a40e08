//! Free-text object resolution.
//!
//! Player phrases are matched against content ids, not display names:
//! - the phrase is lower-cased and runs of whitespace become `_`
//! - a candidate matches when its lower-cased id contains the phrase
//! - the first match in enumeration order wins
//!
//! This is intentionally permissive ("schluessel" finds `alter_schluessel`);
//! authors control ties through list order.

/// Normalise a player phrase for id matching.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Check if a normalised phrase matches a candidate id.
pub fn id_matches(normalized: &str, candidate: &str) -> bool {
    !normalized.is_empty() && candidate.to_lowercase().contains(normalized)
}

/// First candidate id matching `phrase`. An empty phrase matches nothing.
pub fn resolve<'a, I, S>(phrase: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let normalized = normalize_phrase(phrase);
    candidates
        .into_iter()
        .map(|candidate| candidate.as_ref())
        .find(|candidate| id_matches(&normalized, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("Alter  Schluessel"), "alter_schluessel");
        assert_eq!(normalize_phrase("  lampe "), "lampe");
        assert_eq!(normalize_phrase(""), "");
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        assert!(id_matches("schluessel", "Alter_Schluessel"));
        assert!(id_matches("alter_schl", "alter_schluessel"));
        assert!(!id_matches("alter schluessel", "alter_schluessel"));
        assert!(!id_matches("", "lampe"));
    }

    #[test]
    fn first_match_in_list_order_wins() {
        let ids = vec!["rote_karte".to_string(), "karte".to_string()];
        assert_eq!(resolve("karte", &ids), Some("rote_karte"));
        assert_eq!(resolve("rote karte", &ids), Some("rote_karte"));
        assert_eq!(resolve("blaue karte", &ids), None);
    }

    #[test]
    fn empty_phrase_matches_nothing() {
        let ids = ["lampe"];
        assert_eq!(resolve("   ", ids.iter().copied()), None);
    }
}
