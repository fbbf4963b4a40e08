//! Free-text input parser.
//!
//! Turns a raw player line into an [`ActionDescriptor`]. The vocabulary is
//! German with English fallbacks. Parsing never fails: an unrecognised verb is
//! returned as [`Verb::Other`] so the dispatcher can report it.

use std::fmt;

/// Canonical verbs understood by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Go,
    Take,
    Inspect,
    Look,
    Use,
    Open,
    Close,
    Push,
    Pull,
    Attack,
    Combine,
    Inventory,
    Help,
    /// Unrecognised first token, kept for diagnostics.
    Other(String),
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Go => "go",
            Verb::Take => "take",
            Verb::Inspect => "inspect",
            Verb::Look => "look",
            Verb::Use => "use",
            Verb::Open => "open",
            Verb::Close => "close",
            Verb::Push => "push",
            Verb::Pull => "pull",
            Verb::Attack => "attack",
            Verb::Combine => "combine",
            Verb::Inventory => "inventory",
            Verb::Help => "help",
            Verb::Other(raw) => raw,
        };
        f.write_str(name)
    }
}

/// The four compass directions used by authored exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Nord,
    Sued,
    Ost,
    West,
}

impl Direction {
    /// Exit key as it appears in room documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Nord => "nord",
            Direction::Sued => "sued",
            Direction::Ost => "ost",
            Direction::West => "west",
        }
    }

    /// Resolve a single token (`n`, `nord`, ...) to a direction.
    pub fn from_alias(token: &str) -> Option<Self> {
        match token {
            "n" | "nord" => Some(Direction::Nord),
            "s" | "sued" => Some(Direction::Sued),
            "o" | "ost" => Some(Direction::Ost),
            "w" | "west" => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub verb: Verb,
    pub object: Option<String>,
    pub target: Option<String>,
    pub direction: Option<Direction>,
    pub raw: String,
}

/// Canonical verb → surface forms. Scanned in order; the first hit wins.
const VERB_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "go",
        &[
            "geh", "gehe", "gehe nach", "gehe zu", "go", "lauf", "laufe", "reise", "n", "s", "o",
            "w", "nord", "sued", "ost", "west",
        ],
    ),
    ("take", &["nimm", "nehmen", "hole", "grab", "pick"]),
    (
        "inspect",
        &[
            "untersuche",
            "untersuchen",
            "inspect",
            "schau",
            "schau an",
            "ansehen",
            "look",
        ],
    ),
    ("look", &["umschauen", "umsehen"]),
    ("use", &["benutze", "nutze", "verwende", "use"]),
    ("open", &["öffne", "oeffne", "open"]),
    ("close", &["schließe", "schliesse", "close"]),
    ("push", &["drücke", "druecke", "schiebe", "push"]),
    ("pull", &["ziehe", "pull"]),
    (
        "attack",
        &["angriff", "angreifen", "attack", "schlag", "kämpfe", "kaempfe"],
    ),
    ("combine", &["kombiniere", "combine"]),
    (
        "inventory",
        &["inventar", "tasche", "beutel", "i", "inv", "rucksack"],
    ),
    ("help", &["hilfe", "help"]),
];

/// Words separating the two halves of a combine command.
const COMBINE_CONNECTIVES: &[&str] = &["mit", "with"];

fn canonical_verb(name: &str) -> Verb {
    match name {
        "go" => Verb::Go,
        "take" => Verb::Take,
        "inspect" => Verb::Inspect,
        "look" => Verb::Look,
        "use" => Verb::Use,
        "open" => Verb::Open,
        "close" => Verb::Close,
        "push" => Verb::Push,
        "pull" => Verb::Pull,
        "attack" => Verb::Attack,
        "combine" => Verb::Combine,
        "inventory" => Verb::Inventory,
        "help" => Verb::Help,
        other => Verb::Other(other.to_string()),
    }
}

/// Leading-token match against the synonym table.
fn normalize_verb(input: &str) -> Option<Verb> {
    VERB_SYNONYMS.iter().find_map(|(verb, forms)| {
        forms
            .iter()
            .any(|form| {
                input == *form
                    || input
                        .strip_prefix(form)
                        .is_some_and(|rest| rest.starts_with(' '))
            })
            .then(|| canonical_verb(verb))
    })
}

/// Split `X mit Y` into its two phrases. `X` is the shortest prefix that is
/// followed by a connective and a non-empty remainder.
fn split_combine(tokens: &[&str]) -> Option<(String, String)> {
    (1..tokens.len().saturating_sub(1))
        .find(|&i| COMBINE_CONNECTIVES.contains(&tokens[i]))
        .map(|i| (tokens[..i].join(" "), tokens[i + 1..].join(" ")))
}

fn non_empty(phrase: String) -> Option<String> {
    if phrase.is_empty() {
        None
    } else {
        Some(phrase)
    }
}

/// Parse user input into a normalised action descriptor.
pub fn parse(text: &str) -> ActionDescriptor {
    let raw = text.to_string();
    let lower = text.trim().to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    if tokens.len() == 1 {
        if let Some(direction) = Direction::from_alias(tokens[0]) {
            return ActionDescriptor {
                verb: Verb::Go,
                object: None,
                target: None,
                direction: Some(direction),
                raw,
            };
        }
    }

    let verb = normalize_verb(&lower)
        .unwrap_or_else(|| Verb::Other(tokens.first().copied().unwrap_or_default().to_string()));
    let rest = tokens.get(1..).unwrap_or_default();

    let mut object = None;
    let mut target = None;
    let mut direction = None;

    match verb {
        Verb::Combine => match split_combine(rest) {
            Some((source, other)) => {
                object = Some(source);
                target = Some(other);
            }
            None => object = non_empty(rest.join(" ")),
        },
        Verb::Go => {
            direction = tokens.iter().find_map(|token| Direction::from_alias(token));
            if direction.is_none() {
                object = rest.first().map(|token| token.to_string());
            }
        }
        _ => object = non_empty(rest.join(" ")),
    }

    ActionDescriptor {
        verb,
        object,
        target,
        direction,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_direction_tokens_short_circuit_to_go() {
        for (input, expected) in [
            ("n", Direction::Nord),
            ("s", Direction::Sued),
            ("o", Direction::Ost),
            ("w", Direction::West),
            ("nord", Direction::Nord),
            ("SUED", Direction::Sued),
            ("  ost ", Direction::Ost),
            ("west", Direction::West),
        ] {
            let action = parse(input);
            assert_eq!(action.verb, Verb::Go, "input {:?}", input);
            assert_eq!(action.direction, Some(expected), "input {:?}", input);
            assert_eq!(action.object, None);
        }
    }

    #[test]
    fn combine_splits_object_and_target() {
        let action = parse("kombiniere schluessel mit tor");
        assert_eq!(action.verb, Verb::Combine);
        assert_eq!(action.object.as_deref(), Some("schluessel"));
        assert_eq!(action.target.as_deref(), Some("tor"));

        let action = parse("combine old key with rusty gate");
        assert_eq!(action.object.as_deref(), Some("old key"));
        assert_eq!(action.target.as_deref(), Some("rusty gate"));
    }

    #[test]
    fn combine_without_connective_is_a_single_phrase() {
        let action = parse("kombiniere schluessel tor");
        assert_eq!(action.object.as_deref(), Some("schluessel tor"));
        assert_eq!(action.target, None);
    }

    #[test]
    fn go_finds_direction_anywhere() {
        let action = parse("gehe nach nord");
        assert_eq!(action.verb, Verb::Go);
        assert_eq!(action.direction, Some(Direction::Nord));

        let action = parse("geh hoch");
        assert_eq!(action.direction, None);
        assert_eq!(action.object.as_deref(), Some("hoch"));
    }

    #[test]
    fn verbs_take_remainder_as_object() {
        let action = parse("Nimm alte Lampe");
        assert_eq!(action.verb, Verb::Take);
        assert_eq!(action.object.as_deref(), Some("alte lampe"));
        assert_eq!(action.raw, "Nimm alte Lampe");

        let action = parse("untersuche");
        assert_eq!(action.verb, Verb::Inspect);
        assert_eq!(action.object, None);
    }

    #[test]
    fn prefix_must_be_followed_by_space() {
        // "inventar" must not be read as "i" + "nventar"
        assert_eq!(parse("inventar").verb, Verb::Inventory);
        // "nimmermehr" is not "nimm"
        assert_eq!(
            parse("nimmermehr").verb,
            Verb::Other("nimmermehr".to_string())
        );
    }

    #[test]
    fn unknown_verbs_fall_back_to_first_token() {
        let action = parse("tanze wild");
        assert_eq!(action.verb, Verb::Other("tanze".to_string()));
        assert_eq!(action.object.as_deref(), Some("wild"));
    }

    #[test]
    fn empty_input_does_not_panic() {
        let action = parse("   ");
        assert_eq!(action.verb, Verb::Other(String::new()));
        assert_eq!(action.object, None);
    }
}
