// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line flags folded over the (optional) JSON settings file.

use std::path::PathBuf;

use bildwerk_core::config::ConversionConfig;
use bildwerk_core::error::Result;
use bildwerk_core::types::{FixedPageConfig, LayoutMode, PaperSize};
use clap::{Args, ValueEnum};
use tracing::warn;

/// Layout mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One page per image at the image's own size.
    Original,
    /// Fixed paper size, image scaled into the margins and centred.
    Fixed,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Images to convert, in page order.
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Where to write the PDF (defaults to the configured output name).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page layout.
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Named paper size for fixed pages (a4, a5, letter, legal).
    #[arg(long, value_parser = parse_paper)]
    pub paper: Option<PaperSize>,

    /// Fixed page width in millimetres.
    #[arg(long)]
    pub page_width: Option<f64>,

    /// Fixed page height in millimetres.
    #[arg(long)]
    pub page_height: Option<f64>,

    /// Margin on every side of a fixed page, in millimetres.
    #[arg(long)]
    pub margin: Option<f64>,

    /// Document title.
    #[arg(long)]
    pub title: Option<String>,

    /// JSON settings file.
    #[arg(long, env = "BILDWERK_CONFIG")]
    pub config: Option<PathBuf>,
}

fn parse_paper(name: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_name(name).ok_or_else(|| format!("unknown paper size '{name}'"))
}

impl ConvertArgs {
    fn touches_fixed_page(&self) -> bool {
        self.paper.is_some()
            || self.page_width.is_some()
            || self.page_height.is_some()
            || self.margin.is_some()
    }

    /// Settings file (or defaults) overridden by flags, then validated.
    pub fn resolve(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::load(path)?,
            None => ConversionConfig::default(),
        };

        let fixed = match (self.mode, config.layout) {
            (Some(ModeArg::Original), _) => None,
            (Some(ModeArg::Fixed), LayoutMode::FixedPage(page)) => Some(page),
            (Some(ModeArg::Fixed), LayoutMode::OriginalFit) => Some(FixedPageConfig::default()),
            (None, LayoutMode::FixedPage(page)) => Some(page),
            // Page flags alone imply a fixed page.
            (None, LayoutMode::OriginalFit) if self.touches_fixed_page() => {
                Some(FixedPageConfig::default())
            }
            (None, LayoutMode::OriginalFit) => None,
        };

        config.layout = match fixed {
            Some(mut page) => {
                if let Some(paper) = self.paper {
                    let (width, height) = paper.dimensions_mm();
                    page.page_width = width;
                    page.page_height = height;
                }
                if let Some(width) = self.page_width {
                    page.page_width = width;
                }
                if let Some(height) = self.page_height {
                    page.page_height = height;
                }
                if let Some(margin) = self.margin {
                    page.margin = margin;
                }
                LayoutMode::FixedPage(page)
            }
            None => {
                if self.touches_fixed_page() {
                    warn!("page size and margin flags are ignored in original mode");
                }
                LayoutMode::OriginalFit
            }
        };

        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Output path: the flag, or the configured file name.
    pub fn output_path(&self, config: &ConversionConfig) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output_name))
    }
}
