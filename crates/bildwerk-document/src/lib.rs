// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image-to-PDF conversion for Bildwerk.
//
// Provides image intake (sniffing, decoding, measuring), the page layout
// planner, the sequential document assembler with its sink seam, the
// printpdf-backed PDF sink, a PDF inspector, and the concurrent conversion
// pipeline with its pending-image session.

pub mod assemble;
pub mod intake;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod session;

// Re-export the primary items so callers can use `bildwerk_document::PdfWriter` etc.
pub use assemble::{
    AssemblyState, Document, DocumentAssembler, DocumentSink, Page, SinkFactory, assemble,
};
pub use intake::{IntakeInput, probe};
pub use layout::{plan, plan_all};
pub use pdf::reader::PdfReader;
pub use pdf::writer::{PdfSink, PdfWriter};
pub use pipeline::{ConversionOutcome, convert, convert_descriptors, convert_to_pdf, probe_all};
pub use session::PendingImages;
