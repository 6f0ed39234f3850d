// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every conversion attempt ends in one summary the user can act on: the
// technical error is mapped to plain English with a suggestion, and dropped
// images are listed by name.

use crate::error::{BildwerkError, ItemFailure};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something about the request itself must change (settings, file choice).
    ActionRequired,
    /// Cannot be fixed by retrying — unreadable file, unsupported format.
    Permanent,
    /// Likely to succeed on another attempt (out of memory, disk full).
    Transient,
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

/// Convert a `BildwerkError` into a `HumanError`.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    match err {
        // -- Intake --
        BildwerkError::Decode(detail) => HumanError {
            message: "This picture could not be read.".into(),
            suggestion: format!(
                "The file may be damaged or only partly downloaded. Try exporting it again. ({detail})"
            ),
            severity: Severity::Permanent,
        },

        BildwerkError::UnsupportedFormat(detail) => {
            if detail.to_ascii_lowercase().contains("hei") {
                HumanError {
                    message: "iPhone HEIC photos aren't supported yet.".into(),
                    suggestion: "Export the photo as JPEG (or set the camera to \"Most Compatible\"), then add it again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "This type of picture isn't supported.".into(),
                    suggestion: format!("Use a JPEG, PNG, WebP, GIF, BMP or TIFF file instead. (File type: {detail})"),
                    severity: Severity::Permanent,
                }
            }
        }

        BildwerkError::DegenerateImage { width, height } => HumanError {
            message: "This picture is empty.".into(),
            suggestion: format!("The image reports a size of {width}x{height} pixels. Pick another file."),
            severity: Severity::Permanent,
        },

        // -- Configuration --
        BildwerkError::InvalidConfig(detail) => HumanError {
            message: "The page settings don't leave room for the picture.".into(),
            suggestion: format!("Use a smaller margin or a bigger page. ({detail})"),
            severity: Severity::ActionRequired,
        },

        // -- Assembly --
        BildwerkError::Sink(detail) | BildwerkError::Pdf(detail) => HumanError {
            message: "The PDF could not be created.".into(),
            suggestion: format!(
                "Nothing was saved. Try again with fewer or smaller pictures. ({detail})"
            ),
            severity: Severity::Transient,
        },

        // -- Storage --
        BildwerkError::Io(io_err) => HumanError {
            message: "The file could not be read or saved.".into(),
            suggestion: format!("Check that the folder exists and there is free space. ({io_err})"),
            severity: Severity::Transient,
        },

        BildwerkError::Serialization(detail) => HumanError {
            message: "The settings file is not valid.".into(),
            suggestion: format!("Fix or delete the settings file. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

/// One line per dropped image, in input order, or `None` when nothing was dropped.
pub fn describe_omissions(omitted: &[ItemFailure]) -> Option<String> {
    if omitted.is_empty() {
        return None;
    }

    let mut sorted: Vec<&ItemFailure> = omitted.iter().collect();
    sorted.sort_by_key(|item| item.source_order);

    let noun = if sorted.len() == 1 { "picture was" } else { "pictures were" };
    let mut text = format!("{} {noun} left out:", sorted.len());
    for item in sorted {
        text.push_str("\n  ");
        text.push_str(&item.to_string());
    }
    Some(text)
}
