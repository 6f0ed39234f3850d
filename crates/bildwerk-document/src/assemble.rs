// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — feeds planned pages, one at a time and in input order,
// into a document sink.
//
// The sink is created lazily from the first page's geometry because most
// encoders fix the initial page size at construction. Every later page is
// appended with its own size. A sink failure aborts the whole document:
// the half-built sink is dropped and nothing is handed to the caller.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::types::{ImageDescriptor, ImageId, PageGeometry};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

/// Creates a document sink once the first page is known.
pub trait SinkFactory {
    type Sink: DocumentSink;

    /// Start a new document whose first page has `first_page`'s size.
    fn open(&self, first_page: &PageGeometry) -> Result<Self::Sink>;
}

/// Append-only page encoder.
pub trait DocumentSink: Sized {
    /// Start a new page sized and oriented per `geometry`.
    fn add_page(&mut self, geometry: &PageGeometry) -> Result<()>;

    /// Draw `content` on the current page at the placement rectangle of `geometry`.
    fn place_image(
        &mut self,
        geometry: &PageGeometry,
        content: &[u8],
        media_type: &str,
    ) -> Result<()>;

    /// Serialise the finished document.
    fn finish(self) -> Result<Vec<u8>>;
}

/// Observable lifecycle of an assembler.
///
/// The sealed state has no variant here: `finish` consumes the assembler and
/// the sealed result is the returned [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// No page yet; no sink exists.
    Empty,
    /// At least one page appended.
    Open,
    /// A sink failure ended the assembly. No further pages are accepted.
    Aborted,
}

/// One page of an assembled document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub image_id: ImageId,
    pub source_order: usize,
    pub geometry: PageGeometry,
}

/// A finished, read-only document ready for export.
#[derive(Debug, Clone)]
pub struct Document {
    pages: Vec<Page>,
    bytes: Vec<u8>,
}

impl Document {
    /// Pages in output order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Encoded document.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lowercase hex SHA-256 of the encoded document.
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    /// Write the encoded document to `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        info!(
            pages = self.pages.len(),
            bytes = self.bytes.len(),
            "Wrote document to {}",
            path.as_ref().display()
        );
        Ok(())
    }
}

enum Stage<S> {
    Empty,
    Open { sink: S, pages: Vec<Page> },
    Aborted(String),
}

/// Sequential state machine: `Empty → Open`, sealed into a [`Document`] by
/// [`DocumentAssembler::finish`].
pub struct DocumentAssembler<F: SinkFactory> {
    factory: F,
    stage: Stage<F::Sink>,
}

impl<F: SinkFactory> DocumentAssembler<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            stage: Stage::Empty,
        }
    }

    pub fn state(&self) -> AssemblyState {
        match self.stage {
            Stage::Empty => AssemblyState::Empty,
            Stage::Open { .. } => AssemblyState::Open,
            Stage::Aborted(_) => AssemblyState::Aborted,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        match &self.stage {
            Stage::Open { pages, .. } => pages.len(),
            _ => 0,
        }
    }

    /// Append one page holding `descriptor`, placed per `geometry`.
    ///
    /// Pages must arrive in strictly increasing `source_order`. Any error
    /// aborts the assembly for good.
    #[instrument(skip_all, fields(image = %descriptor.id(), order = descriptor.source_order()))]
    pub fn push(&mut self, descriptor: &ImageDescriptor, geometry: PageGeometry) -> Result<()> {
        let result = self.append(descriptor, geometry);
        if let Err(err) = &result {
            if !matches!(self.stage, Stage::Aborted(_)) {
                warn!(error = %err, "Assembly aborted");
                self.stage = Stage::Aborted(err.to_string());
            }
        }
        result
    }

    fn append(&mut self, descriptor: &ImageDescriptor, geometry: PageGeometry) -> Result<()> {
        if let Stage::Aborted(reason) = &self.stage {
            return Err(BildwerkError::Sink(format!(
                "assembly already aborted: {reason}"
            )));
        }
        if !geometry.fits_page() {
            return Err(BildwerkError::Sink(format!(
                "image placement {geometry:?} falls outside its page"
            )));
        }

        let page = Page {
            image_id: descriptor.id(),
            source_order: descriptor.source_order(),
            geometry,
        };

        if matches!(self.stage, Stage::Empty) {
            let mut sink = self.factory.open(&geometry)?;
            sink.place_image(&geometry, descriptor.content(), descriptor.media_type())?;
            debug!("First page opened the document");
            self.stage = Stage::Open {
                sink,
                pages: vec![page],
            };
            return Ok(());
        }

        if let Stage::Open { sink, pages } = &mut self.stage {
            let last = pages.last().map(|p| p.source_order).unwrap_or_default();
            if page.source_order <= last {
                return Err(BildwerkError::Sink(format!(
                    "page for input #{} arrived after input #{last}",
                    page.source_order
                )));
            }
            sink.add_page(&geometry)?;
            sink.place_image(&geometry, descriptor.content(), descriptor.media_type())?;
            pages.push(page);
            debug!(pages = pages.len(), "Page appended");
        }
        Ok(())
    }

    /// Seal the document.
    ///
    /// Returns `Ok(None)` when no page was ever pushed: there is nothing to export.
    #[instrument(skip_all)]
    pub fn finish(self) -> Result<Option<Document>> {
        match self.stage {
            Stage::Empty => {
                info!("No pages to assemble");
                Ok(None)
            }
            Stage::Aborted(reason) => Err(BildwerkError::Sink(format!(
                "assembly aborted: {reason}"
            ))),
            Stage::Open { sink, pages } => {
                let bytes = sink.finish()?;
                info!(pages = pages.len(), bytes = bytes.len(), "Document sealed");
                Ok(Some(Document { pages, bytes }))
            }
        }
    }
}

/// Assemble an ordered run of planned pages into one document.
pub fn assemble<'a, F: SinkFactory>(
    factory: F,
    pages: impl IntoIterator<Item = (&'a ImageDescriptor, PageGeometry)>,
) -> Result<Option<Document>> {
    let mut assembler = DocumentAssembler::new(factory);
    for (descriptor, geometry) in pages {
        assembler.push(descriptor, geometry)?;
    }
    assembler.finish()
}
