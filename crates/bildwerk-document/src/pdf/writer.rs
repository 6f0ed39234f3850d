// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — the document sink used for real conversions, built on
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The sink therefore keeps the page under construction
// open until the next `add_page` (or `finish`) closes it.

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::PageGeometry;
use image::ImageFormat;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::assemble::{DocumentSink, SinkFactory};

/// Images are registered at 72 DPI so one pixel is one point before scaling.
const IMAGE_DPI: f32 = 72.0;

/// Opens printpdf-backed sinks.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl SinkFactory for PdfWriter {
    type Sink = PdfSink;

    #[instrument(skip_all, fields(unit = ?first_page.unit))]
    fn open(&self, first_page: &PageGeometry) -> Result<PdfSink> {
        let title = self.title.as_deref().unwrap_or("Bildwerk Document");
        info!(title, "Creating PDF");

        Ok(PdfSink {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            current: Some(OpenPage::new(first_page)),
        })
    }
}

/// Page being filled: its geometry and the drawing operations collected so far.
struct OpenPage {
    geometry: PageGeometry,
    ops: Vec<Op>,
}

impl OpenPage {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            geometry: *geometry,
            ops: Vec::new(),
        }
    }

    fn close(self) -> PdfPage {
        let (width_mm, height_mm) = self.geometry.page_size_mm();
        PdfPage::new(Mm(width_mm as f32), Mm(height_mm as f32), self.ops)
    }
}

/// A PDF under construction.
pub struct PdfSink {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    current: Option<OpenPage>,
}

impl DocumentSink for PdfSink {
    fn add_page(&mut self, geometry: &PageGeometry) -> Result<()> {
        if let Some(page) = self.current.take() {
            self.pages.push(page.close());
        }
        self.current = Some(OpenPage::new(geometry));
        Ok(())
    }

    #[instrument(skip(self, content), fields(bytes_len = content.len()))]
    fn place_image(
        &mut self,
        geometry: &PageGeometry,
        content: &[u8],
        media_type: &str,
    ) -> Result<()> {
        let page = self
            .current
            .as_mut()
            .ok_or_else(|| BildwerkError::Sink("no open page to place the image on".into()))?;

        let decoded = match ImageFormat::from_mime_type(media_type) {
            Some(format) => image::load_from_memory_with_format(content, format),
            None => image::load_from_memory(content),
        }
        .map_err(|err| BildwerkError::Sink(format!("failed to decode image for PDF: {err}")))?;

        let img_width = decoded.width();
        let img_height = decoded.height();

        // Convert to RGB8 for printpdf.
        let raw = RawImage {
            pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
            width: img_width as usize,
            height: img_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.doc.add_image(&raw);

        let unit = geometry.unit;
        let placed_w_pt = Mm(unit.to_mm(geometry.placed_width) as f32).into_pt().0;
        let placed_h_pt = Mm(unit.to_mm(geometry.placed_height) as f32).into_pt().0;
        let offset_x_pt = Mm(unit.to_mm(geometry.offset_x) as f32).into_pt().0;
        let offset_y_pt = Mm(unit.to_mm(geometry.offset_y) as f32).into_pt().0;
        let page_h_pt = Mm(unit.to_mm(geometry.page_height) as f32).into_pt().0;

        // PDF space grows upwards from the bottom-left corner.
        let bottom_pt = page_h_pt - offset_y_pt - placed_h_pt;

        let scale_x = placed_w_pt / img_width as f32;
        let scale_y = placed_h_pt / img_height as f32;

        page.ops.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(offset_x_pt)),
                translate_y: Some(Pt(bottom_pt)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        });

        debug!(placed_w_pt, placed_h_pt, scale_x, scale_y, "Image placed on page");
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        if let Some(page) = self.current.take() {
            self.pages.push(page.close());
        }
        let page_count = self.pages.len();
        self.doc.with_pages(self.pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = self.doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(pages = page_count, warnings = warnings.len(), "PDF serialised");
        Ok(output)
    }
}
