// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the printpdf-backed document sink and an lopdf-backed inspector.

pub mod reader;
pub mod writer;

pub use reader::PdfReader;
pub use writer::{PdfSink, PdfWriter};
