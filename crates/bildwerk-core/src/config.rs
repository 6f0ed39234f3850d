// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::LayoutMode;

/// Settings for one image-to-document conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Page layout policy.
    pub layout: LayoutMode,
    /// Title written into the document metadata.
    pub title: Option<String>,
    /// File name used when the document is saved.
    pub output_name: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::OriginalFit,
            title: None,
            output_name: "converted-document.pdf".into(),
        }
    }
}

impl ConversionConfig {
    pub fn with_layout(layout: LayoutMode) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Check the settings before any page is planned.
    pub fn validate(&self) -> Result<()> {
        match &self.layout {
            LayoutMode::OriginalFit => Ok(()),
            LayoutMode::FixedPage(page) => page.validate(),
        }
    }

    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }
}
