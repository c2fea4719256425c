//! Error types for loading and running scene files

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::LayoutError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scene file: {message}")]
    Toml { message: String, span: Option<Span> },

    #[error("invalid expression: {message}")]
    Expression {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("unknown view '{name}'")]
    UnknownView {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    #[error("unknown anchor '{name}'")]
    UnknownAnchor {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    #[error("{error}")]
    InvalidAnchor { span: Span, error: LayoutError },

    #[error("invalid fix: {reason}")]
    InvalidFix { span: Span, reason: String },

    #[error("expression reads both '{first}' and '{second}'")]
    MixedReferences {
        span: Span,
        first: String,
        second: String,
    },

    #[error("duplicate view '{name}'")]
    DuplicateView { name: String, span: Span },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl SceneError {
    pub fn span(&self) -> Option<Span> {
        match self {
            SceneError::Toml { span, .. } => span.clone(),
            SceneError::Expression { span, .. }
            | SceneError::UnknownView { span, .. }
            | SceneError::UnknownAnchor { span, .. }
            | SceneError::InvalidAnchor { span, .. }
            | SceneError::InvalidFix { span, .. }
            | SceneError::MixedReferences { span, .. }
            | SceneError::DuplicateView { span, .. } => Some(span.clone()),
            SceneError::Io { .. } | SceneError::Layout(_) => None,
        }
    }

    fn label(&self) -> String {
        match self {
            SceneError::Expression {
                message, expected, ..
            } => {
                if expected.is_empty() {
                    message.clone()
                } else {
                    format!("{}\nExpected: {}", message, expected.join(", "))
                }
            }
            SceneError::UnknownView { .. } => {
                "no view with this name is declared before here".into()
            }
            SceneError::UnknownAnchor { .. } => "not an anchor name".into(),
            SceneError::MixedReferences { .. } => {
                "an expression may only read one view's geometry".into()
            }
            other => other.to_string(),
        }
    }

    fn help(&self) -> Option<String> {
        let suggestions = match self {
            SceneError::UnknownView { suggestions, .. }
            | SceneError::UnknownAnchor { suggestions, .. } => suggestions,
            _ => return None,
        };
        match suggestions.as_slice() {
            [] => None,
            [one] => Some(format!("did you mean '{}'?", one)),
            many => Some(format!("did you mean one of: {}?", many.join(", "))),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}\n", self);
        };

        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(self.label())
                    .with_color(Color::Red),
            );
        if let Some(help) = self.help() {
            report = report.with_help(help);
        }

        let mut buf = Vec::new();
        match report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
        {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}\n", self),
        }
    }
}
