//! Free-form text to [`Operation`].
//!
//! Input is whatever the speech-to-text collaborator heard, so the parser is
//! lenient about phrasing and strict about meaning:
//!
//! 1. **Normalize**: lowercase, trim, collapse whitespace, strip punctuation
//!    from word edges (`"  Rotate   LEFT!"` → `"rotate left"`,
//!    `"Blur, please."` → `"blur please"`).
//! 2. **Numeric commands**: `<verb> [by] <number> [unit]`, e.g.
//!    `"brightness by 50"`, `"contrast 150"`, `"darken by 20"`,
//!    `"hue by minus 30 degrees"`. The verb is matched against adjustments
//!    only. The canonical name takes the number as the parameter itself
//!    (`"contrast 150"` is a 150% gain); any other phrasing takes it as an
//!    offset from the neutral value (`"more contrast by 20"` is 120%,
//!    `"less contrast by 20"` is 80%). Out-of-range numbers are clamped.
//!    `"brightness by"` with nothing usable after `by` is
//!    [`ParseFailure::MissingParameter`].
//! 3. **Everything else**: tolerant catalog lookup
//!    ([`catalog::phrases::lookup_with`]). A bare adjustment word
//!    (`"saturation"`) applies the catalog's default step.
//! 4. **Ties**: among the best-ranked candidates, the one sharing the most
//!    words with the input wins; an exact tie is [`ParseFailure::Ambiguous`].
//!
//! Parsing is pure: same text and same policy, same answer.

use crate::catalog::phrases::{Candidate, MatchPolicy, entry, lookup_with};
use crate::catalog::{Family, Operation, OperationKind};
use thiserror::Error;
use tracing::debug;

/// Why a piece of text did not become an operation. Always recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseFailure {
    #[error("command not understood: \"{input}\"")]
    Unrecognized { input: String },
    #[error("\"{input}\" could mean {}", join_kinds(.candidates))]
    Ambiguous {
        input: String,
        candidates: Vec<OperationKind>,
    },
    #[error("{kind} needs a number, e.g. \"{kind} by 20\"")]
    MissingParameter { kind: OperationKind },
}

impl ParseFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ParseFailure::Unrecognized { .. } => "unrecognized",
            ParseFailure::Ambiguous { .. } => "ambiguous",
            ParseFailure::MissingParameter { .. } => "missing_parameter",
        }
    }
}

fn join_kinds(kinds: &[OperationKind]) -> String {
    let names: Vec<String> = kinds.iter().map(|k| format!("\"{k}\"")).collect();
    names.join(" or ")
}

/// Characters stripped from either edge of a word.
const PUNCTUATION: &[char] = &[',', '!', '?', ';', ':', '"', '\'', '(', ')'];

/// Unit words that may follow a number.
const UNITS: &[&str] = &["percent", "percentage", "degree", "degrees"];

/// Normalize raw text for matching.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .map(strip_word_punctuation)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"blur,"` → `"blur"`, `"20."` → `"20"`. A leading `.` stays so `".5"`
/// remains a number.
fn strip_word_punctuation(word: &str) -> &str {
    word.trim_start_matches(PUNCTUATION)
        .trim_end_matches(|c: char| c == '.' || PUNCTUATION.contains(&c))
}

/// Text-to-operation parser configured with a [`MatchPolicy`].
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    policy: MatchPolicy,
}

impl CommandParser {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn parse(&self, text: &str) -> Result<Operation, ParseFailure> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(ParseFailure::Unrecognized {
                input: text.trim().to_string(),
            });
        }

        let tokens: Vec<&str> = normalized.split(' ').collect();

        if let Some(op) = self.parse_numeric(&normalized, &tokens)? {
            debug!(input = %normalized, operation = %op, "parsed numeric command");
            return Ok(op);
        }

        let candidates = lookup_with(&normalized, &self.policy);
        let chosen = choose(&normalized, &candidates)?;
        let op = match chosen.kind.family() {
            Family::Adjustment => default_adjustment(chosen),
            _ => chosen.kind.with_default_params(),
        };
        debug!(
            input = %normalized,
            operation = %op,
            phrase = chosen.phrase,
            specificity = ?chosen.specificity,
            "parsed command"
        );
        Ok(op)
    }

    /// `Ok(None)` means "not a numeric command, try the general path".
    fn parse_numeric(
        &self,
        normalized: &str,
        tokens: &[&str],
    ) -> Result<Option<Operation>, ParseFailure> {
        let tokens = strip_unit(tokens);
        if let Some((value, verb_tokens)) = split_trailing_number(tokens) {
            let verb = strip_trailing_by(verb_tokens).join(" ");
            if verb.is_empty() {
                return Ok(None);
            }
            return Ok(self
                .adjustment_for(&verb)?
                .and_then(|c| numeric_adjustment(c, value)));
        }

        // "<verb> by" or "<verb> by <words>": the shape of a numeric command
        // with no number in it.
        if let Some(by) = tokens.iter().rposition(|t| *t == "by") {
            let verb = tokens[..by].join(" ");
            if !verb.is_empty() {
                if let Some(c) = self.adjustment_for(&verb)? {
                    debug!(input = %normalized, kind = %c.kind, "numeric command without a number");
                    return Err(ParseFailure::MissingParameter { kind: c.kind });
                }
            }
        }

        Ok(None)
    }

    /// Best adjustment candidate for a verb phrase, if any adjustment matches.
    fn adjustment_for(&self, verb: &str) -> Result<Option<Candidate>, ParseFailure> {
        let candidates: Vec<Candidate> = lookup_with(verb, &self.policy)
            .into_iter()
            .filter(|c| c.kind.family() == Family::Adjustment)
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }
        choose(verb, &candidates).map(Some)
    }
}

/// Parse with the default policy.
pub fn parse(text: &str) -> Result<Operation, ParseFailure> {
    CommandParser::default().parse(text)
}

/// Pick one candidate from a best-first list, or explain why not.
fn choose(input: &str, candidates: &[Candidate]) -> Result<Candidate, ParseFailure> {
    let Some(first) = candidates.first() else {
        return Err(ParseFailure::Unrecognized {
            input: input.to_string(),
        });
    };

    let top_overlap = candidates
        .iter()
        .filter(|c| c.specificity == first.specificity)
        .map(|c| c.overlap)
        .max()
        .unwrap_or(first.overlap);
    let tied: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.specificity == first.specificity && c.overlap == top_overlap)
        .collect();

    match tied.as_slice() {
        [only] => Ok(**only),
        _ => Err(ParseFailure::Ambiguous {
            input: input.to_string(),
            candidates: tied.iter().map(|c| c.kind).collect(),
        }),
    }
}

/// Adjustment spoken without a number: the catalog default step, mirrored
/// around the identity for inverting synonyms ("darken", "desaturate").
fn default_adjustment(candidate: Candidate) -> Operation {
    let op = candidate.kind.with_default_params();
    match (candidate.inverted, op.parameter()) {
        (true, Some(step)) => candidate
            .kind
            .with_value(2.0 * identity_of(candidate.kind) - step)
            .unwrap_or(op),
        _ => op,
    }
}

/// Adjustment with an explicit number. The canonical name sets the parameter
/// directly; a synonym moves it away from the identity, downward for
/// inverting synonyms: "more color by 30" is saturation 130, "desaturate by
/// 30" is saturation 70, "darken by 30" is brightness -30.
fn numeric_adjustment(candidate: Candidate, value: f32) -> Option<Operation> {
    let identity = identity_of(candidate.kind);
    let value = if candidate.inverted {
        identity - value
    } else if candidate.phrase == entry(candidate.kind).canonical {
        value
    } else {
        identity + value
    };
    candidate.kind.with_value(value)
}

fn identity_of(kind: OperationKind) -> f32 {
    use crate::catalog::params::{Brightness, Contrast, Hue, Saturation};
    match kind {
        OperationKind::Brightness => Brightness::IDENTITY,
        OperationKind::Contrast => Contrast::IDENTITY,
        OperationKind::Saturation => Saturation::IDENTITY,
        OperationKind::Hue => Hue::IDENTITY,
        _ => 0.0,
    }
}

/// Split `[.., "by", "minus", "20"]` into `(-20.0, [..])`.
fn split_trailing_number<'a>(tokens: &'a [&'a str]) -> Option<(f32, &'a [&'a str])> {
    let (last, rest) = tokens.split_last()?;
    let value = parse_number(last)?;
    match rest.split_last() {
        Some((&"minus" | &"negative", rest)) => Some((-value, rest)),
        Some((&"plus" | &"positive", rest)) => Some((value, rest)),
        _ => Some((value, rest)),
    }
}

/// Drop a trailing unit word: `[.., "50", "percent"]` → `[.., "50"]`.
fn strip_unit<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    match tokens {
        [rest @ .., "per", "cent"] => rest,
        [rest @ .., last] if UNITS.contains(last) => rest,
        _ => tokens,
    }
}

fn strip_trailing_by<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    match tokens.split_last() {
        Some((&"by", rest)) => rest,
        _ => tokens,
    }
}

/// Signed integer or decimal, optionally followed by `%`.
fn parse_number(token: &str) -> Option<f32> {
    let token = token.strip_suffix('%').unwrap_or(token);
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Brightness, Contrast, Hue, Saturation};

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Rotate   LEFT!  "), "rotate left");
        assert_eq!(normalize("Blur."), "blur");
        assert_eq!(normalize("undo?!"), "undo");
        assert_eq!(normalize("\tzoom\nin "), "zoom in");
    }

    #[test]
    fn normalize_keeps_number_signs() {
        assert_eq!(normalize("Brightness by -20."), "brightness by -20");
        assert_eq!(normalize("hue by .5"), "hue by .5");
    }

    #[test]
    fn normalize_strips_punctuation_inside_utterance() {
        assert_eq!(normalize("Blur, please."), "blur please");
        assert_eq!(normalize("okay, sepia!"), "okay sepia");
        assert_eq!(normalize("\"invert\" , now"), "invert now");
    }

    #[test]
    fn commas_do_not_hide_commands() {
        assert_eq!(parse("blur, please").unwrap(), Operation::Blur);
        assert_eq!(parse("okay, sepia").unwrap(), Operation::Sepia);
        assert_eq!(
            parse("brightness, by 40.").unwrap(),
            Operation::Brightness(Brightness::new(40.0))
        );
    }

    #[test]
    fn spoken_units_after_the_number() {
        assert_eq!(
            parse("brightness by 50 percent").unwrap(),
            Operation::Brightness(Brightness::new(50.0))
        );
        assert_eq!(
            parse("contrast by 150 per cent").unwrap(),
            Operation::Contrast(Contrast::new(150.0))
        );
        assert_eq!(
            parse("hue by minus 30 degrees").unwrap(),
            Operation::Hue(Hue::new(-30.0))
        );
        assert_eq!(
            parse("brightness by percent").unwrap_err().kind(),
            "missing_parameter"
        );
    }

    #[test]
    fn near_miss_words_are_not_commands() {
        assert_eq!(parse("edit").unwrap_err().kind(), "unrecognized");
        assert_eq!(parse("blue").unwrap_err().kind(), "unrecognized");
    }

    #[test]
    fn parses_every_canonical_phrase() {
        for &kind in OperationKind::all() {
            let op = parse(kind.name()).unwrap();
            assert_eq!(op.kind(), kind, "canonical phrase {:?}", kind.name());
        }
    }

    #[test]
    fn brightness_by_number() {
        assert_eq!(
            parse("brightness by 50").unwrap(),
            Operation::Brightness(Brightness::new(50.0))
        );
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(
            parse("brightness by 999").unwrap(),
            Operation::Brightness(Brightness::new(100.0))
        );
        assert_eq!(
            parse("hue by -500").unwrap(),
            Operation::Hue(Hue::new(-180.0))
        );
    }

    #[test]
    fn typo_in_verb_still_parses() {
        assert_eq!(
            parse("brihgtness by 50").unwrap(),
            Operation::Brightness(Brightness::new(50.0))
        );
    }

    #[test]
    fn by_is_optional() {
        assert_eq!(
            parse("contrast 150").unwrap(),
            Operation::Contrast(Contrast::new(150.0))
        );
    }

    #[test]
    fn decimal_and_percent_numbers() {
        assert_eq!(
            parse("saturation by 12.5%").unwrap(),
            Operation::Saturation(Saturation::new(12.5))
        );
    }

    #[test]
    fn spoken_minus_negates() {
        assert_eq!(
            parse("hue by minus 30").unwrap(),
            Operation::Hue(Hue::new(-30.0))
        );
    }

    #[test]
    fn inverted_synonym_with_number() {
        assert_eq!(
            parse("darken by 30").unwrap(),
            Operation::Brightness(Brightness::new(-30.0))
        );
        assert_eq!(
            parse("desaturate by 30").unwrap(),
            Operation::Saturation(Saturation::new(70.0))
        );
    }

    #[test]
    fn directional_synonyms_move_away_from_identity() {
        assert_eq!(
            parse("increase contrast by 20").unwrap(),
            Operation::Contrast(Contrast::new(120.0))
        );
        assert_eq!(
            parse("reduce contrast by 20").unwrap(),
            Operation::Contrast(Contrast::new(80.0))
        );
        assert_eq!(
            parse("more color by 30").unwrap(),
            Operation::Saturation(Saturation::new(130.0))
        );
        assert_eq!(
            parse("less color by 30").unwrap(),
            Operation::Saturation(Saturation::new(70.0))
        );
        assert_eq!(
            parse("brighten by 20").unwrap(),
            Operation::Brightness(Brightness::new(20.0))
        );
    }

    #[test]
    fn increase_is_stronger_than_reduce() {
        for (up, down) in [
            ("more contrast by 40", "less contrast by 40"),
            ("saturate by 25", "desaturate by 25"),
            ("lighten by 10", "darken by 10"),
        ] {
            let up = parse(up).unwrap().parameter().unwrap();
            let down = parse(down).unwrap().parameter().unwrap();
            assert!(up > down, "{up} should exceed {down}");
        }
    }

    #[test]
    fn canonical_name_takes_the_number_as_is() {
        assert_eq!(
            parse("contrast by 20").unwrap(),
            Operation::Contrast(Contrast::new(20.0))
        );
        assert_eq!(
            parse("saturation 30").unwrap(),
            Operation::Saturation(Saturation::new(30.0))
        );
    }

    #[test]
    fn bare_adjustment_uses_default_step() {
        assert_eq!(
            parse("saturation").unwrap(),
            Operation::Saturation(Saturation::new(150.0))
        );
        assert_eq!(
            parse("brighten").unwrap(),
            Operation::Brightness(Brightness::new(25.0))
        );
    }

    #[test]
    fn bare_inverted_adjustment_mirrors_default() {
        assert_eq!(
            parse("darken").unwrap(),
            Operation::Brightness(Brightness::new(-25.0))
        );
        assert_eq!(
            parse("desaturate").unwrap(),
            Operation::Saturation(Saturation::new(50.0))
        );
    }

    #[test]
    fn by_without_number_is_missing_parameter() {
        assert_eq!(
            parse("brightness by").unwrap_err(),
            ParseFailure::MissingParameter {
                kind: OperationKind::Brightness
            }
        );
        assert_eq!(
            parse("contrast by a lot").unwrap_err(),
            ParseFailure::MissingParameter {
                kind: OperationKind::Contrast
            }
        );
    }

    #[test]
    fn number_after_non_adjustment_falls_back() {
        assert_eq!(parse("rotate left 90").unwrap(), Operation::RotateLeft);
    }

    #[test]
    fn unrecognized_text() {
        let err = parse("purple elephant").unwrap_err();
        assert_eq!(err.kind(), "unrecognized");
        assert!(matches!(err, ParseFailure::Unrecognized { input } if input == "purple elephant"));
    }

    #[test]
    fn empty_text_is_unrecognized() {
        assert_eq!(parse("   ").unwrap_err().kind(), "unrecognized");
        assert_eq!(parse("?!").unwrap_err().kind(), "unrecognized");
    }

    #[test]
    fn bare_number_is_unrecognized() {
        assert_eq!(parse("50").unwrap_err().kind(), "unrecognized");
    }

    #[test]
    fn two_commands_in_one_utterance_are_ambiguous() {
        let err = parse("undo the blur").unwrap_err();
        match err {
            ParseFailure::Ambiguous { candidates, .. } => {
                assert!(candidates.contains(&OperationKind::Undo));
                assert!(candidates.contains(&OperationKind::Blur));
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn longest_overlap_breaks_ties() {
        assert_eq!(
            parse("please reset the zoom").unwrap(),
            Operation::ResetZoom
        );
        assert_eq!(parse("could you rotate it right").unwrap(), Operation::RotateRight);
    }

    #[test]
    fn synonyms_and_noise() {
        assert_eq!(parse("Grey scale.").unwrap(), Operation::Grayscale);
        assert_eq!(parse("upside down").unwrap(), Operation::FlipVertical);
        assert_eq!(parse("fliphorizontal").unwrap(), Operation::FlipHorizontal);
        assert_eq!(parse("quit").unwrap(), Operation::Exit);
    }

    #[test]
    fn stricter_policy_rejects_typos() {
        let parser = CommandParser::new(MatchPolicy {
            min_confidence: 1.0,
            max_edit_distance: 0,
        });
        assert!(parser.parse("sepai").is_err());
        assert_eq!(parser.parse("sepia").unwrap(), Operation::Sepia);
    }

    #[test]
    fn parse_number_rejects_junk() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("+7%"), Some(7.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("1e9"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn failure_messages_are_readable() {
        let err = parse("brightness by").unwrap_err();
        assert_eq!(
            err.to_string(),
            "brightness needs a number, e.g. \"brightness by 20\""
        );
    }
}
