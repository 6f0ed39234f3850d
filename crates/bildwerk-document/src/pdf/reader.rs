// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect finished documents (page count, page sizes) using the
// `lopdf` crate.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Read-only view of an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            BildwerkError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            BildwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Width and height of every page in millimetres, in page order.
    pub fn page_sizes_mm(&self) -> Result<Vec<(f64, f64)>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| {
                let rect = self.media_box(page_id).ok_or_else(|| {
                    BildwerkError::Pdf(format!("page {number} has no usable MediaBox"))
                })?;
                let width = (rect[2] - rect[0]).abs() / PT_PER_MM;
                let height = (rect[3] - rect[1]).abs() / PT_PER_MM;
                Ok((width, height))
            })
            .collect()
    }

    /// MediaBox of a page, following /Parent for inherited boxes.
    fn media_box(&self, page_id: ObjectId) -> Option<[f64; 4]> {
        let mut dict: &Dictionary = self.document.get_dictionary(page_id).ok()?;
        loop {
            if let Ok(object) = dict.get(b"MediaBox") {
                return self.rectangle(object);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.document.get_dictionary(parent).ok()?;
        }
    }

    fn rectangle(&self, object: &Object) -> Option<[f64; 4]> {
        let object = match object {
            Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let values: Vec<f64> = object
            .as_array()
            .ok()?
            .iter()
            .filter_map(number)
            .collect();
        values.try_into().ok()
    }
}

pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
