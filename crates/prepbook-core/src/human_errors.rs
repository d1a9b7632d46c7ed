// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people preparing worksheets.
//
// Every technical error is mapped to a plain sentence with a clear suggestion.
// Severity decides whether the user can fix the problem themselves.

use crate::error::PrepbookError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (pick another file, close the file in Word).
    ActionRequired,
    /// The input cannot be processed as it is.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown first).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `PrepbookError` into a `HumanError`.
pub fn humanize_error(err: &PrepbookError) -> HumanError {
    match err {
        PrepbookError::Docx(detail) => HumanError {
            message: "The file could not be opened as a Word document.".into(),
            suggestion: format!("Save it again as .docx from Word and retry. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PrepbookError::Xml(detail) => HumanError {
            message: "The document contents are damaged.".into(),
            suggestion: format!("Open and re-save the document in Word, then retry. ({detail})"),
            severity: Severity::Permanent,
        },

        PrepbookError::Equation(detail) => HumanError {
            message: "An equation in the document could not be read.".into(),
            suggestion: format!("Retype the equation with Word's equation editor. ({detail})"),
            severity: Severity::Permanent,
        },

        PrepbookError::PdfError(detail) => HumanError {
            message: "The PDF could not be processed.".into(),
            suggestion: format!("Check that the file is a valid, unencrypted PDF. ({detail})"),
            severity: Severity::Permanent,
        },

        PrepbookError::ImageError(detail) => HumanError {
            message: "A picture inside the PDF could not be converted.".into(),
            suggestion: format!("The page may use an unusual image format. ({detail})"),
            severity: Severity::Permanent,
        },

        PrepbookError::NoRecords(kind) => HumanError {
            message: format!("No {kind} questions were found."),
            suggestion: "Check that questions follow the expected numbering, e.g. `প্রশ্ন ১.` for CQ or `১.` with options `ক.`–`ঘ.` for MCQ.".into(),
            severity: Severity::ActionRequired,
        },

        PrepbookError::Export(detail) => HumanError {
            message: "The export files could not be written.".into(),
            suggestion: format!("Close the files if they are open in Excel and retry. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PrepbookError::Config(detail) => HumanError {
            message: "The settings file has a problem.".into(),
            suggestion: format!("Fix or delete the configuration file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PrepbookError::Io(io_err) => humanize_io_error(io_err),

        PrepbookError::Serialization(detail) => HumanError {
            message: "Some data could not be read or written.".into(),
            suggestion: format!("Check the JSON file for typos. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_io_error(err: &std::io::Error) -> HumanError {
    match err.kind() {
        std::io::ErrorKind::NotFound => HumanError {
            message: "The file could not be found.".into(),
            suggestion: "Check the file name and folder, then try again.".into(),
            severity: Severity::ActionRequired,
        },
        std::io::ErrorKind::PermissionDenied => HumanError {
            message: "Permission denied.".into(),
            suggestion: "Close the file if it is open in another program, or choose another folder.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "Could not read or write a file.".into(),
            suggestion: format!("Check that the disk is not full. ({err})"),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_action_required() {
        let err = PrepbookError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("could not be found"));
    }

    #[test]
    fn damaged_xml_is_permanent() {
        let human = humanize_error(&PrepbookError::Xml("unexpected end".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("unexpected end"));
    }

    #[test]
    fn no_records_names_the_sheet_kind() {
        let human = humanize_error(&PrepbookError::NoRecords("CQ".into()));
        assert!(human.message.contains("CQ"));
    }

    #[test]
    fn display_has_message_then_suggestion() {
        let human = humanize_error(&PrepbookError::Config("bad".into()));
        let text = human.to_string();
        assert!(text.starts_with("The settings file has a problem."));
        assert!(text.ends_with("(bad)"));
    }
}
