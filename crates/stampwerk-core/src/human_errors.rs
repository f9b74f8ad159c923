// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity decides whether the editor shows a passing note, a warning next to
// the document, or replaces the whole operation with an error screen.

use crate::error::StampwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing was lost; the action simply did not happen.
    Notice,
    /// The session continues, but the user should look at what happened.
    Warning,
    /// The whole operation (upload, export) failed.
    Fatal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: impl Into<String>, suggestion: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity,
        }
    }
}

/// Convert a `StampwerkError` into a `HumanError`.
pub fn humanize_error(err: &StampwerkError) -> HumanError {
    match err {
        // -- Upload --
        StampwerkError::UnsupportedMediaType(mime) => HumanError::new(
            "This type of file can't be stamped.",
            format!("Upload a PDF or an image (PNG, JPEG) instead. (File type: {mime})"),
            Severity::Fatal,
        ),

        StampwerkError::RasterizationFailure { page, .. } => HumanError::new(
            match page {
                Some(index) => format!("Page {} of this document couldn't be read.", index + 1),
                None => "This document couldn't be read.".into(),
            },
            "The file may be damaged. Try opening it on a computer first, or export it again as a PDF.",
            Severity::Fatal,
        ),

        StampwerkError::RendererUnavailable(_) => HumanError::new(
            "PDF pages can't be rendered on this system.",
            "Install the PDFium library, or stamp an image instead.",
            Severity::Fatal,
        ),

        StampwerkError::PdfError(_) => HumanError::new(
            "There's a problem with this PDF file.",
            "The file may be damaged or password-protected. Try a different copy of the file.",
            Severity::Fatal,
        ),

        StampwerkError::ImageError(_) => HumanError::new(
            "There's a problem with this image.",
            "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.",
            Severity::Fatal,
        ),

        // -- Interaction --
        StampwerkError::PointerResolutionFailure => HumanError::new(
            "That spot isn't on a page.",
            "Click inside one of the pages to place the stamp.",
            Severity::Notice,
        ),

        StampwerkError::UnknownStampReference(_) => HumanError::new(
            "That stamp no longer exists.",
            "It may already have been deleted. Nothing was changed.",
            Severity::Warning,
        ),

        StampwerkError::DuplicateStamp(_) => HumanError::new(
            "That stamp is already on the document.",
            "Nothing was changed.",
            Severity::Warning,
        ),

        StampwerkError::PlacementPending => HumanError::new(
            "A stamp is still waiting for verification.",
            "Finish or cancel the verification before choosing another stamp.",
            Severity::Notice,
        ),

        StampwerkError::AuthorizationDenied => HumanError::new(
            "You're not allowed to place stamps on this document.",
            "Ask the document owner to give your account stamping rights.",
            Severity::Warning,
        ),

        StampwerkError::AuthorizationCancelled => HumanError::new(
            "The stamp wasn't placed.",
            "Verification was cancelled. Choose the stamp again to retry.",
            Severity::Notice,
        ),

        // -- Compositing --
        StampwerkError::CompositingFailure { page, .. } => HumanError::new(
            match page {
                Some(index) => format!("Page {} couldn't be prepared for download.", index + 1),
                None => "The stamped document couldn't be prepared for download.".into(),
            },
            "Your stamps are still in place. Try downloading again.",
            Severity::Fatal,
        ),

        StampwerkError::Font(_) => HumanError::new(
            "The stamp lettering font couldn't be loaded.",
            "Check the font setting points to a TrueType or OpenType file.",
            Severity::Fatal,
        ),

        StampwerkError::InvalidColor(value) => HumanError::new(
            "That color isn't recognised.",
            format!("Colors are written like #FF5733. (Got: {value})"),
            Severity::Warning,
        ),

        // -- Configuration / persistence --
        StampwerkError::Config(detail) => HumanError::new(
            "The settings file has a problem.",
            format!("Fix the setting or delete the file to use the defaults. ({detail})"),
            Severity::Fatal,
        ),

        StampwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "It may have been moved or deleted. Try choosing the file again.",
                Severity::Fatal,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "The app doesn't have permission to use that file.",
                "Check the file permissions, or copy the file to a different location first.",
                Severity::Fatal,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, your storage may be full.",
                Severity::Fatal,
            ),
        },

        StampwerkError::Serialization(_) => HumanError::new(
            "A data file couldn't be understood.",
            "Check the file is valid JSON. If this keeps happening, please report it.",
            Severity::Fatal,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StampId;

    #[test]
    fn unsupported_upload_is_fatal() {
        let human = humanize_error(&StampwerkError::UnsupportedMediaType("text/plain".into()));
        assert_eq!(human.severity, Severity::Fatal);
        assert!(human.suggestion.contains("text/plain"));
    }

    #[test]
    fn stale_stamp_is_a_warning() {
        let human = humanize_error(&StampwerkError::UnknownStampReference(StampId::new()));
        assert_eq!(human.severity, Severity::Warning);
    }

    #[test]
    fn cancelled_placement_is_a_notice() {
        let human = humanize_error(&StampwerkError::AuthorizationCancelled);
        assert_eq!(human.severity, Severity::Notice);
    }

    #[test]
    fn missing_renderer_is_not_blamed_on_the_file() {
        let human = humanize_error(&StampwerkError::RendererUnavailable("no library".into()));
        assert_eq!(human.severity, Severity::Fatal);
        assert!(human.message.contains("PDF"));
        assert!(!human.suggestion.contains("damaged"));
    }

    #[test]
    fn page_numbers_are_one_based() {
        let human = humanize_error(&StampwerkError::RasterizationFailure {
            page: Some(2),
            reason: "bad stream".into(),
        });
        assert!(human.message.contains("Page 3"));
    }

    #[test]
    fn recoverable_errors_are_never_fatal() {
        let soft = [
            StampwerkError::PointerResolutionFailure,
            StampwerkError::UnknownStampReference(StampId::new()),
            StampwerkError::DuplicateStamp(StampId::new()),
            StampwerkError::PlacementPending,
            StampwerkError::AuthorizationDenied,
            StampwerkError::AuthorizationCancelled,
        ];
        for err in &soft {
            assert!(err.is_recoverable());
            assert_ne!(humanize_error(err).severity, Severity::Fatal, "{err}");
        }
    }
}
