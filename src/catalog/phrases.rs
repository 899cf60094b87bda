//! Phrase table and tolerant lookup.
//!
//! The table is static: one [`CatalogEntry`] per [`OperationKind`], holding the
//! canonical phrase, its synonyms, and synonyms that invert an adjustment
//! ("darken" is brightness pointed the other way).
//!
//! ## Matching
//!
//! [`lookup`] compares a normalized phrase against every entry and returns one
//! [`Candidate`] per kind that matched at all, best first. Three tiers, in
//! order of specificity:
//!
//! 1. **Exact**: the phrase equals the canonical form or a synonym.
//! 2. **Fuzzy**: whitespace-stripped phrase and entry are within a bounded
//!    edit distance (optimal string alignment, so a swapped pair of letters
//!    costs one edit). Absorbs typos and missing word boundaries:
//!    `"brihgtness"`, `"rotateleft"`.
//! 3. **Tokens**: every significant word of the entry appears in the phrase.
//!    Absorbs filler: `"please rotate the image left"`.
//!
//! Within a tier, candidates are ordered by how many of their words appear in
//! the phrase. Deciding what to do with ties is the parser's job.

use super::OperationKind;
use std::cmp::Reverse;

/// One row of the phrase table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub kind: OperationKind,
    pub canonical: &'static str,
    pub synonyms: &'static [&'static str],
    /// Synonyms that run an adjustment in the opposite direction.
    pub inverted: &'static [&'static str],
    /// One-line help text.
    pub summary: &'static str,
}

impl CatalogEntry {
    /// Canonical phrase followed by synonyms, each tagged with whether it inverts.
    fn phrases(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        std::iter::once((self.canonical, false))
            .chain(self.synonyms.iter().map(|s| (*s, false)))
            .chain(self.inverted.iter().map(|s| (*s, true)))
    }
}

/// How closely a phrase matched an entry. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    Exact,
    Fuzzy { distance: usize },
    Tokens,
}

/// A kind the phrase could mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub kind: OperationKind,
    /// The table phrase that produced this match.
    pub phrase: &'static str,
    pub specificity: Specificity,
    /// Significant words of `phrase` that also appear in the input.
    pub overlap: usize,
    /// Matched through an inverting synonym.
    pub inverted: bool,
}

impl Candidate {
    fn rank(&self) -> (Specificity, Reverse<usize>) {
        (self.specificity, Reverse(self.overlap))
    }
}

/// Thresholds for the fuzzy tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// `1 - distance / longer_len` must be strictly above this for a fuzzy
    /// match to count.
    pub min_confidence: f32,
    /// Hard cap on edit distance regardless of length.
    pub max_edit_distance: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
            max_edit_distance: 3,
        }
    }
}

/// Words that carry no command meaning.
const FILLER: &[&str] = &[
    "a", "an", "the", "image", "picture", "photo", "please", "apply", "it", "this", "that", "to",
    "make", "add", "some", "now", "filter", "effect", "can", "you", "me", "my", "and", "of", "on",
    "would", "could", "just",
];

const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        kind: OperationKind::Grayscale,
        canonical: "grayscale",
        synonyms: &["greyscale", "gray scale", "grey scale", "black and white", "monochrome"],
        inverted: &[],
        summary: "convert to shades of gray",
    },
    CatalogEntry {
        kind: OperationKind::Blur,
        canonical: "blur",
        synonyms: &["blurry", "gaussian blur", "soften", "smooth"],
        inverted: &[],
        summary: "gaussian blur",
    },
    CatalogEntry {
        kind: OperationKind::Sharpen,
        canonical: "sharpen",
        synonyms: &["sharper", "sharpen image"],
        inverted: &[],
        summary: "enhance fine detail",
    },
    CatalogEntry {
        kind: OperationKind::EdgeDetection,
        canonical: "edge detection",
        synonyms: &["edge", "edges", "detect edges", "find edges", "outline"],
        inverted: &[],
        summary: "keep only the edges",
    },
    CatalogEntry {
        kind: OperationKind::Sepia,
        canonical: "sepia",
        synonyms: &["sepia tone", "vintage", "old photo"],
        inverted: &[],
        summary: "warm brown vintage tone",
    },
    CatalogEntry {
        kind: OperationKind::Invert,
        canonical: "invert",
        synonyms: &["invert colors", "invert colours", "negative", "inverse"],
        inverted: &[],
        summary: "photographic negative",
    },
    CatalogEntry {
        kind: OperationKind::HistogramEqualization,
        canonical: "histogram equalization",
        synonyms: &["histogram", "histogram equalisation", "equalize", "equalise"],
        inverted: &[],
        summary: "spread out the tonal range",
    },
    CatalogEntry {
        kind: OperationKind::AdaptiveThreshold,
        canonical: "adaptive threshold",
        synonyms: &["adaptive", "adaptive thresholding", "threshold", "binarize"],
        inverted: &[],
        summary: "black and white by local threshold",
    },
    CatalogEntry {
        kind: OperationKind::Brightness,
        canonical: "brightness",
        synonyms: &["brighten", "brighter", "lighten", "lighter"],
        inverted: &["darken", "darker", "dim"],
        summary: "offset brightness (-100 to 100)",
    },
    CatalogEntry {
        kind: OperationKind::Contrast,
        canonical: "contrast",
        synonyms: &["more contrast", "increase contrast"],
        inverted: &["less contrast", "reduce contrast", "decrease contrast"],
        summary: "contrast gain in percent (0 to 200)",
    },
    CatalogEntry {
        kind: OperationKind::Saturation,
        canonical: "saturation",
        synonyms: &["saturate", "more color", "more colour"],
        inverted: &["desaturate", "less color", "less colour"],
        summary: "saturation gain in percent (0 to 200)",
    },
    CatalogEntry {
        kind: OperationKind::Hue,
        canonical: "hue",
        synonyms: &["hue shift", "shift hue", "color shift", "colour shift"],
        inverted: &[],
        summary: "rotate hue in degrees (-180 to 180)",
    },
    CatalogEntry {
        kind: OperationKind::RotateLeft,
        canonical: "rotate left",
        synonyms: &["rotate counterclockwise", "rotate anticlockwise", "turn left"],
        inverted: &[],
        summary: "rotate 90 degrees counterclockwise",
    },
    CatalogEntry {
        kind: OperationKind::RotateRight,
        canonical: "rotate right",
        synonyms: &["rotate", "rotate clockwise", "turn right"],
        inverted: &[],
        summary: "rotate 90 degrees clockwise",
    },
    CatalogEntry {
        kind: OperationKind::FlipHorizontal,
        canonical: "flip horizontal",
        synonyms: &["flip horizontally", "flip", "mirror"],
        inverted: &[],
        summary: "mirror left to right",
    },
    CatalogEntry {
        kind: OperationKind::FlipVertical,
        canonical: "flip vertical",
        synonyms: &["flip vertically", "upside down", "flip upside down"],
        inverted: &[],
        summary: "mirror top to bottom",
    },
    CatalogEntry {
        kind: OperationKind::ZoomIn,
        canonical: "zoom in",
        synonyms: &["zoom", "enlarge", "magnify", "bigger"],
        inverted: &[],
        summary: "zoom in one step",
    },
    CatalogEntry {
        kind: OperationKind::ZoomOut,
        canonical: "zoom out",
        synonyms: &["smaller", "shrink"],
        inverted: &[],
        summary: "zoom out one step",
    },
    CatalogEntry {
        kind: OperationKind::ResetZoom,
        canonical: "reset zoom",
        synonyms: &["zoom reset", "actual size", "original size", "hundred percent"],
        inverted: &[],
        summary: "back to 100%",
    },
    CatalogEntry {
        kind: OperationKind::Fit,
        canonical: "fit",
        synonyms: &["fit to window", "fit to screen", "zoom to fit"],
        inverted: &[],
        summary: "fit the image in the window",
    },
    CatalogEntry {
        kind: OperationKind::Undo,
        canonical: "undo",
        synonyms: &["undo that", "undo last", "go back"],
        inverted: &[],
        summary: "step back one edit",
    },
    CatalogEntry {
        kind: OperationKind::Redo,
        canonical: "redo",
        synonyms: &["redo that", "do again", "go forward"],
        inverted: &[],
        summary: "step forward one edit",
    },
    CatalogEntry {
        kind: OperationKind::Reset,
        canonical: "reset",
        synonyms: &["reset image", "start over", "restore original", "original image"],
        inverted: &[],
        summary: "discard all edits (cannot be undone)",
    },
    CatalogEntry {
        kind: OperationKind::Help,
        canonical: "help",
        synonyms: &["show help", "what can i say", "commands", "show commands"],
        inverted: &[],
        summary: "list the commands",
    },
    CatalogEntry {
        kind: OperationKind::Exit,
        canonical: "exit",
        synonyms: &["quit", "close", "close app", "goodbye"],
        inverted: &[],
        summary: "end the session",
    },
];

/// Every row of the table, in catalog order.
pub fn entries() -> &'static [CatalogEntry] {
    ENTRIES
}

/// The row for `kind`.
pub fn entry(kind: OperationKind) -> &'static CatalogEntry {
    // ENTRIES is written in `OperationKind` declaration order.
    &ENTRIES[kind as usize]
}

/// Look up a normalized phrase with the default [`MatchPolicy`].
pub fn lookup(phrase: &str) -> Vec<Candidate> {
    lookup_with(phrase, &MatchPolicy::default())
}

/// Look up a normalized phrase. Returns at most one candidate per kind,
/// sorted best first; empty when nothing clears the policy's thresholds.
pub fn lookup_with(phrase: &str, policy: &MatchPolicy) -> Vec<Candidate> {
    let input_tokens = significant_tokens(phrase);
    let input_compact = compact(phrase);

    let mut best: Vec<Candidate> = Vec::new();
    for entry in ENTRIES {
        let mut winner: Option<Candidate> = None;
        for (text, inverted) in entry.phrases() {
            let Some(specificity) = match_phrase(phrase, &input_compact, &input_tokens, text, policy)
            else {
                continue;
            };
            let candidate = Candidate {
                kind: entry.kind,
                phrase: text,
                specificity,
                overlap: token_overlap(&input_tokens, &significant_tokens(text), policy),
                inverted,
            };
            if winner.is_none_or(|w| candidate.rank() < w.rank()) {
                winner = Some(candidate);
            }
        }
        best.extend(winner);
    }

    best.sort_by_key(Candidate::rank);
    best
}

fn match_phrase(
    input: &str,
    input_compact: &str,
    input_tokens: &[&str],
    text: &'static str,
    policy: &MatchPolicy,
) -> Option<Specificity> {
    if input == text {
        return Some(Specificity::Exact);
    }

    let text_compact = compact(text);
    let longer = input_compact.chars().count().max(text_compact.chars().count());
    if longer > 0 {
        let allowed = max_fuzzy_distance(longer, policy);
        if let Some(distance) = bounded_edit_distance(input_compact, &text_compact, allowed) {
            return Some(Specificity::Fuzzy { distance });
        }
    }

    let text_tokens = significant_tokens(text);
    if !text_tokens.is_empty()
        && text_tokens
            .iter()
            .all(|t| input_tokens.iter().any(|i| tokens_match(i, t, policy)))
    {
        return Some(Specificity::Tokens);
    }

    None
}

/// Largest distance whose confidence `1 - distance / longer` stays strictly
/// above `min_confidence`, capped by `max_edit_distance`. A confidence equal
/// to the threshold does not count: "edit" is one edit from "exit" (0.75),
/// and that is not close enough.
fn max_fuzzy_distance(longer: usize, policy: &MatchPolicy) -> usize {
    let slack = (1.0 - policy.min_confidence) * longer as f32;
    (slack.ceil().max(0.0) as usize)
        .saturating_sub(1)
        .min(policy.max_edit_distance)
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn significant_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|t| !FILLER.contains(t))
        .collect()
}

/// Word equality, with one typo tolerated on words of five letters or more
/// unless the policy allows no edits at all.
fn tokens_match(input: &str, expected: &str, policy: &MatchPolicy) -> bool {
    if input == expected {
        return true;
    }
    let tolerance = policy.max_edit_distance.min(1);
    tolerance > 0
        && expected.chars().count() >= 5
        && bounded_edit_distance(input, expected, tolerance).is_some()
}

fn token_overlap(input_tokens: &[&str], phrase_tokens: &[&str], policy: &MatchPolicy) -> usize {
    phrase_tokens
        .iter()
        .filter(|t| input_tokens.iter().any(|i| tokens_match(i, t, policy)))
        .count()
}

/// Optimal-string-alignment distance between `a` and `b`, or `None` once it
/// is certain to exceed `bound`.
///
/// Insertions, deletions, substitutions and adjacent transpositions each
/// cost one. The row minimum is checked after every row so hopeless pairs
/// stop early.
pub fn bounded_edit_distance(a: &str, b: &str, bound: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > bound {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= bound).then_some(d);
    }

    let width = b.len() + 1;
    let mut prev_prev = vec![0usize; width];
    let mut prev: Vec<usize> = (0..width).collect();
    let mut row = vec![0usize; width];

    for i in 1..=a.len() {
        row[0] = i;
        let mut row_min = row[0];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(prev_prev[j - 2] + 1);
            }
            row[j] = d;
            row_min = row_min.min(d);
        }
        if row_min > bound {
            return None;
        }
        std::mem::swap(&mut prev_prev, &mut prev);
        std::mem::swap(&mut prev, &mut row);
    }

    let d = prev[b.len()];
    (d <= bound).then_some(d)
}
