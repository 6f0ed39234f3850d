// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: image descriptors, layout modes and page geometry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BildwerkError, Result};

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Reference pixel density used when a page is measured in pixels.
const PIXELS_PER_INCH: f64 = 96.0;

/// Unique identifier for an accepted input image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decodable raster image together with its intrinsic pixel size.
///
/// Immutable once built. The content buffer is reference counted so the
/// planner, the assembler and the session can share it without copying.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    id: ImageId,
    pixel_width: u32,
    pixel_height: u32,
    content: Arc<[u8]>,
    source_order: usize,
    media_type: String,
    name: Option<String>,
}

impl ImageDescriptor {
    /// Build a descriptor, rejecting images with a zero dimension.
    pub fn new(
        id: ImageId,
        pixel_width: u32,
        pixel_height: u32,
        content: impl Into<Arc<[u8]>>,
        source_order: usize,
        media_type: impl Into<String>,
    ) -> Result<Self> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(BildwerkError::DegenerateImage {
                width: pixel_width,
                height: pixel_height,
            });
        }
        Ok(Self {
            id,
            pixel_width,
            pixel_height,
            content: content.into(),
            source_order,
            media_type: media_type.into(),
            name: None,
        })
    }

    /// Attach the display name of the input (usually its file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Same image under a different id.
    pub fn with_id(&self, id: ImageId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Display name of the input, or the id when none was given.
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// Encoded image bytes exactly as received.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn source_order(&self) -> usize {
        self.source_order
    }

    /// MIME type of the encoded content (e.g. `image/jpeg`).
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.pixel_width) / f64::from(self.pixel_height)
    }

    /// Same image at a different position in the sequence.
    pub fn with_source_order(&self, source_order: usize) -> Self {
        Self {
            source_order,
            ..self.clone()
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Unit in which a [`PageGeometry`] is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// CSS reference pixels (96 per inch).
    Pixel,
    Millimetre,
}

impl Unit {
    /// Convert a length in this unit to millimetres.
    pub fn to_mm(&self, value: f64) -> f64 {
        match self {
            Self::Pixel => value * MM_PER_INCH / PIXELS_PER_INCH,
            Self::Millimetre => value,
        }
    }
}

/// Standard paper sizes usable as fixed pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Look up a named size (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }
}

/// Fixed physical page used by [`LayoutMode::FixedPage`], in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedPageConfig {
    pub page_width: f64,
    pub page_height: f64,
    /// Blank border kept on every side of the page.
    pub margin: f64,
}

impl Default for FixedPageConfig {
    fn default() -> Self {
        Self::for_paper(PaperSize::A4, 10.0)
    }
}

impl FixedPageConfig {
    pub fn for_paper(paper: PaperSize, margin: f64) -> Self {
        let (page_width, page_height) = paper.dimensions_mm();
        Self {
            page_width,
            page_height,
            margin,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    /// Reject sizes that leave no content rectangle.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("page width", self.page_width),
            ("page height", self.page_height),
            ("margin", self.margin),
        ];
        for (name, value) in values {
            if !value.is_finite() || value <= 0.0 {
                return Err(BildwerkError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.margin * 2.0 >= self.page_width || self.margin * 2.0 >= self.page_height {
            return Err(BildwerkError::InvalidConfig(format!(
                "margin {} leaves no room on a {}x{} mm page",
                self.margin, self.page_width, self.page_height
            )));
        }
        Ok(())
    }
}

/// Page layout policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    /// One page per image at the image's own pixel size.
    #[default]
    OriginalFit,
    /// Portrait page of a fixed size, image scaled into the margins and centred.
    FixedPage(FixedPageConfig),
}

/// Computed placement of one image on its page.
///
/// Offsets are measured from the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub unit: Unit,
    pub page_width: f64,
    pub page_height: f64,
    pub orientation: Orientation,
    pub placed_width: f64,
    pub placed_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl PageGeometry {
    /// Whether the placed image is non-empty and lies inside the page
    /// (touching the edge is fine).
    pub fn fits_page(&self) -> bool {
        self.placed_width > 0.0
            && self.placed_height > 0.0
            && self.offset_x >= 0.0
            && self.offset_y >= 0.0
            && self.offset_x + self.placed_width <= self.page_width
            && self.offset_y + self.placed_height <= self.page_height
    }

    /// Page size converted to millimetres.
    pub fn page_size_mm(&self) -> (f64, f64) {
        (
            self.unit.to_mm(self.page_width),
            self.unit.to_mm(self.page_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_rejects_zero_dimensions() {
        let err = ImageDescriptor::new(ImageId::new(), 0, 10, vec![1u8], 0, "image/png");
        assert!(matches!(
            err,
            Err(BildwerkError::DegenerateImage {
                width: 0,
                height: 10
            })
        ));
        assert!(ImageDescriptor::new(ImageId::new(), 10, 0, vec![1u8], 0, "image/png").is_err());
    }

    #[test]
    fn descriptor_keeps_content_untouched() {
        let bytes = vec![9u8, 8, 7];
        let desc =
            ImageDescriptor::new(ImageId::new(), 4, 2, bytes.clone(), 3, "image/jpeg").unwrap();
        assert_eq!(desc.content(), bytes.as_slice());
        assert_eq!(desc.source_order(), 3);
        assert_eq!(desc.media_type(), "image/jpeg");
        assert!((desc.aspect_ratio() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn descriptor_name_falls_back_to_id() {
        let desc = ImageDescriptor::new(ImageId::new(), 4, 2, vec![0u8], 0, "image/png").unwrap();
        assert_eq!(desc.name(), desc.id().to_string());
        assert_eq!(desc.with_name("beach.jpg").name(), "beach.jpg");
    }

    #[test]
    fn default_fixed_page_is_a4_with_ten_mm_margin() {
        let cfg = FixedPageConfig::default();
        assert_eq!(cfg.page_width, 210.0);
        assert_eq!(cfg.page_height, 297.0);
        assert_eq!(cfg.content_width(), 190.0);
        assert_eq!(cfg.content_height(), 277.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn margin_swallowing_page_is_rejected() {
        let cfg = FixedPageConfig {
            page_width: 100.0,
            page_height: 300.0,
            margin: 50.0,
        };
        assert!(matches!(cfg.validate(), Err(BildwerkError::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        for cfg in [
            FixedPageConfig {
                page_width: 0.0,
                ..Default::default()
            },
            FixedPageConfig {
                margin: -1.0,
                ..Default::default()
            },
            FixedPageConfig {
                page_height: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(cfg.validate().is_err(), "{cfg:?} should be invalid");
        }
    }

    #[test]
    fn pixels_convert_at_96_dpi() {
        assert!((Unit::Pixel.to_mm(96.0) - 25.4).abs() < 1e-9);
        assert_eq!(Unit::Millimetre.to_mm(12.5), 12.5);
    }

    #[test]
    fn geometry_containment_allows_touching_edges() {
        let geom = PageGeometry {
            unit: Unit::Millimetre,
            page_width: 210.0,
            page_height: 297.0,
            orientation: Orientation::Portrait,
            placed_width: 190.0,
            placed_height: 277.0,
            offset_x: 10.0,
            offset_y: 10.0,
        };
        assert!(geom.fits_page());
        let overflow = PageGeometry {
            offset_x: 21.0,
            ..geom
        };
        assert!(!overflow.fits_page());
        let inverted = PageGeometry {
            placed_width: -10.0,
            ..geom
        };
        assert!(!inverted.fits_page());
    }

    #[test]
    fn layout_mode_json_shape() {
        let json = serde_json::to_string(&LayoutMode::OriginalFit).unwrap();
        assert_eq!(json, r#"{"mode":"original_fit"}"#);

        let mode: LayoutMode =
            serde_json::from_str(r#"{"mode":"fixed_page","margin":5.0}"#).unwrap();
        assert_eq!(
            mode,
            LayoutMode::FixedPage(FixedPageConfig {
                page_width: 210.0,
                page_height: 297.0,
                margin: 5.0,
            })
        );
    }

    #[test]
    fn paper_names_are_case_insensitive() {
        assert_eq!(PaperSize::from_name("A4"), Some(PaperSize::A4));
        assert_eq!(PaperSize::from_name("letter"), Some(PaperSize::Letter));
        assert_eq!(PaperSize::from_name("b5"), None);
    }
}
