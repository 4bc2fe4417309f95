//! Ariadne-based rendering of [`TypeError`] into a terminal-printable
//! report.
//!
//! [`TypeError`] itself stays a driver-agnostic wire format (see its own
//! doc comment); this module is the one place that turns it into text,
//! the way a driver or language server would otherwise have to.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::{TypeError, TypeErrorKind};

fn error_code(kind: TypeErrorKind) -> &'static str {
    match kind {
        TypeErrorKind::OccursCheck => "E0001",
        TypeErrorKind::Mismatch => "E0002",
        TypeErrorKind::AmbiguousType => "E0003",
        TypeErrorKind::NonExhaustiveMatch => "E0004",
        TypeErrorKind::UnboundIdentifier => "E0005",
        TypeErrorKind::ArityMismatch => "E0006",
        TypeErrorKind::NotInstantiable => "E0007",
    }
}

/// Renders `error` against `source`, colorless so the output is stable
/// across terminals and snapshot tests. `_filename` is accepted for a
/// driver's error banner but ariadne's single-source `Report` doesn't
/// need it as a cache key.
pub fn render_diagnostic(error: &TypeError, source: &str, _filename: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();
    let start = (error.location.start as usize).min(source_len);
    let end = (error.location.end as usize).min(source_len).max(start);
    let range = if start == end { start..end.saturating_add(1).min(source_len).max(start) } else { start..end };

    let mut builder = Report::build(ReportKind::Error, range.clone())
        .with_code(error_code(error.kind))
        .with_message(&error.primary_message)
        .with_config(config)
        .with_label(Label::new(range).with_message(&error.primary_message).with_color(Color::Red));

    for secondary in &error.secondary_messages {
        builder = builder.with_note(secondary);
    }
    if let Some(suggestion) = &error.suggestion {
        builder = builder.with_help(suggestion);
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(Source::from(source), &mut buf)
        .expect("rendering a diagnostic to an in-memory buffer never fails");
    String::from_utf8(buf).expect("ariadne output is always valid UTF-8")
}
