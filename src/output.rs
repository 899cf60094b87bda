//! User-facing text for every command surface.
//!
//! # Output Format
//!
//! ## Feedback
//!
//! One short line per handled command, phrased to be read aloud:
//!
//! ```text
//! Grayscale applied
//! Brightness +50
//! Rotated left
//! Zoom 125%
//! Undo applied
//! ```
//!
//! ## History
//!
//! ```text
//! History (3 of 50)
//!     000 original
//!     001 blur
//!   > 002 brightness 25
//!     003 rotate left
//! ```
//!
//! The `>` marks the entry on display. Entries below it are the redo tail.
//!
//! ## Help
//!
//! Commands grouped by family, each with its synonyms and a summary.
//!
//! # Architecture
//!
//! Each surface has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::catalog::{Family, Operation, OperationKind, phrases};
use crate::history::History;
use crate::session::SessionError;
use crate::view::Zoom;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a 0-based history position as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Confirmation line for a handled command.
///
/// `zoom` is the zoom state after the command; view commands report the new
/// level when it is given.
pub fn feedback(op: &Operation, zoom: Option<&Zoom>) -> String {
    match op {
        Operation::Brightness(p) => format!("Brightness {:+}", p.value()),
        Operation::Contrast(p) => format!("Contrast {}%", p.value()),
        Operation::Saturation(p) => format!("Saturation {}%", p.value()),
        Operation::Hue(p) => format!("Hue {:+}", p.value()),
        Operation::RotateLeft => "Rotated left".to_string(),
        Operation::RotateRight => "Rotated right".to_string(),
        Operation::FlipHorizontal => "Flipped horizontally".to_string(),
        Operation::FlipVertical => "Flipped vertically".to_string(),
        Operation::ZoomIn | Operation::ZoomOut | Operation::ResetZoom | Operation::Fit => {
            match zoom {
                Some(z) => format!("Zoom {}%", z.percent()),
                None => capitalize(op.kind().name()),
            }
        }
        Operation::Undo => "Undo applied".to_string(),
        Operation::Redo => "Redo applied".to_string(),
        Operation::Reset => "Image reset".to_string(),
        Operation::Help => "Showing help".to_string(),
        Operation::Exit => "Goodbye".to_string(),
        filter => format!("{} applied", capitalize(filter.kind().name())),
    }
}

// ============================================================================
// Failures
// ============================================================================

/// Render a session failure for the user.
///
/// Parse failures read as "not understood" with the reason; a missing image
/// gets a prompt to load one rather than a generic error.
pub fn format_failure(err: &SessionError) -> String {
    match err {
        SessionError::Parse(failure) => format!("Command not recognized: {failure}"),
        SessionError::NoImageLoaded => "No image loaded. Load an image first.".to_string(),
        SessionError::Pipeline(failure) => capitalize(&failure.to_string()),
        SessionError::Codec(err) => format!("Error: {err}"),
    }
}

// ============================================================================
// History
// ============================================================================

/// List the original and every retained entry, marking the cursor.
pub fn format_history(history: &History) -> Vec<String> {
    let mut lines = vec![format!(
        "History ({} of {})",
        history.len(),
        history.capacity()
    )];
    let marker = |pos: usize| if pos == history.cursor() { "  > " } else { "    " };

    lines.push(format!("{}{} original", marker(0), format_index(0)));
    for (i, entry) in history.entries().enumerate() {
        let pos = i + 1;
        lines.push(format!(
            "{}{} {}",
            marker(pos),
            format_index(pos),
            entry.operation
        ));
    }
    if history.evicted() > 0 {
        lines.push(format!(
            "{}({} older edits dropped)",
            indent(1),
            history.evicted()
        ));
    }
    lines
}

// ============================================================================
// Help
// ============================================================================

fn family_heading(family: Family) -> &'static str {
    match family {
        Family::Filter => "Filters",
        Family::Adjustment => "Adjustments",
        Family::Transform => "Transforms",
        Family::View => "Navigation",
        Family::Control => "History & app",
    }
}

/// How a user says a command, e.g. `brightness by <n>` for adjustments.
fn usage(kind: OperationKind) -> String {
    match kind.family() {
        Family::Adjustment => format!("{} by <n>", kind.name()),
        _ => kind.name().to_string(),
    }
}

/// Command reference grouped by family.
pub fn help_text() -> String {
    let families = [
        Family::Filter,
        Family::Adjustment,
        Family::Transform,
        Family::View,
        Family::Control,
    ];
    let mut lines = Vec::new();
    for family in families {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(family_heading(family).to_string());
        for entry in phrases::entries().iter().filter(|e| e.kind.family() == family) {
            lines.push(format!(
                "{}{:<26}{}",
                indent(1),
                usage(entry.kind),
                entry.summary
            ));
            if !entry.synonyms.is_empty() {
                lines.push(format!(
                    "{}also: {}",
                    indent(2),
                    entry.synonyms.join(", ")
                ));
            }
        }
    }
    lines.join("\n")
}

// ============================================================================
// Parse
// ============================================================================

/// Describe a parsed operation.
///
/// ```text
/// brightness 50
///     Family: adjustment
///     Changes image: yes
/// ```
pub fn format_operation(op: &Operation) -> Vec<String> {
    let family = match op.family() {
        Family::Filter => "filter",
        Family::Adjustment => "adjustment",
        Family::Transform => "transform",
        Family::View => "view",
        Family::Control => "control",
    };
    vec![
        op.to_string(),
        format!("{}Family: {}", indent(1), family),
        format!(
            "{}Changes image: {}",
            indent(1),
            if op.is_mutating() { "yes" } else { "no" }
        ),
    ]
}

// ============================================================================
// Print wrappers
// ============================================================================

pub fn print_history(history: &History) {
    for line in format_history(history) {
        println!("{}", line);
    }
}

pub fn print_help() {
    println!("{}", help_text());
}

pub fn print_operation(op: &Operation) {
    for line in format_operation(op) {
        println!("{}", line);
    }
}
