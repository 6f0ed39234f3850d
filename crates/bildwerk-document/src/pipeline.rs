// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline — intake, layout and assembly for one request.
//
// Decoding is fanned out across tokio's blocking pool, one task per input,
// and joined back in input order. Planning and assembly only start once every
// decode has been joined, so dropping the future before then has no side
// effects: finished decodes are simply discarded.

use bildwerk_core::config::ConversionConfig;
use bildwerk_core::error::{BildwerkError, ItemFailure, Result};
use bildwerk_core::types::ImageDescriptor;
use tracing::{info, instrument, warn};

use crate::assemble::{Document, DocumentAssembler, SinkFactory};
use crate::intake::{IntakeInput, probe};
use crate::layout::plan;
use crate::pdf::PdfWriter;

/// Result of a conversion that did not fail as a whole.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// A document was produced. `omitted` lists inputs that were dropped.
    Exported {
        document: Document,
        omitted: Vec<ItemFailure>,
    },
    /// No input survived (or none was given); there is nothing to save.
    NothingToExport { omitted: Vec<ItemFailure> },
}

impl ConversionOutcome {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Exported { document, .. } => Some(document),
            Self::NothingToExport { .. } => None,
        }
    }

    /// Inputs dropped from the conversion, in input order.
    pub fn omitted(&self) -> &[ItemFailure] {
        match self {
            Self::Exported { omitted, .. } | Self::NothingToExport { omitted } => omitted,
        }
    }
}

/// Decode every input concurrently; results come back in input order.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub async fn probe_all(
    inputs: Vec<IntakeInput>,
) -> Vec<std::result::Result<ImageDescriptor, ItemFailure>> {
    let tasks: Vec<_> = inputs
        .into_iter()
        .enumerate()
        .map(|(order, input)| {
            let id = input.id();
            let name = input.name().to_owned();
            let handle = tokio::task::spawn_blocking(move || probe(&input, order));
            (order, id, name, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (order, id, name, handle) in tasks {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                let err = BildwerkError::Decode(format!("decoder task failed: {join_err}"));
                Err(ItemFailure::new(id, name, order, &err))
            }
        };
        results.push(result);
    }
    results
}

/// Convert `inputs` into one document using `factory` as the sink.
#[instrument(skip_all, fields(inputs = inputs.len(), layout = ?config.layout))]
pub async fn convert<F: SinkFactory>(
    inputs: Vec<IntakeInput>,
    config: &ConversionConfig,
    factory: F,
) -> Result<ConversionOutcome> {
    config.validate()?;

    let mut accepted = Vec::with_capacity(inputs.len());
    let mut omitted = Vec::new();
    for result in probe_all(inputs).await {
        match result {
            Ok(descriptor) => accepted.push(descriptor),
            Err(failure) => omitted.push(failure),
        }
    }

    let mut outcome = convert_descriptors(&accepted, config, factory)?;
    match &mut outcome {
        ConversionOutcome::Exported { omitted: dropped, .. }
        | ConversionOutcome::NothingToExport { omitted: dropped } => {
            omitted.append(dropped);
            omitted.sort_by_key(|failure| failure.source_order);
            *dropped = omitted;
        }
    }
    Ok(outcome)
}

/// Convert `inputs` to PDF with the title from `config`.
pub async fn convert_to_pdf(
    inputs: Vec<IntakeInput>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome> {
    convert(inputs, config, pdf_writer(config)).await
}

/// printpdf sink configured from `config`.
pub fn pdf_writer(config: &ConversionConfig) -> PdfWriter {
    match &config.title {
        Some(title) => PdfWriter::new().with_title(title.clone()),
        None => PdfWriter::new(),
    }
}

/// Plan and assemble already-decoded images, in the order given.
///
/// A descriptor whose planned placement does not fit its page is dropped and
/// reported rather than aborting the document.
#[instrument(skip_all, fields(images = descriptors.len()))]
pub fn convert_descriptors<F: SinkFactory>(
    descriptors: &[ImageDescriptor],
    config: &ConversionConfig,
    factory: F,
) -> Result<ConversionOutcome> {
    config.validate()?;

    let mut omitted = Vec::new();
    let mut assembler = DocumentAssembler::new(factory);
    for descriptor in descriptors {
        let geometry = plan(descriptor, &config.layout);
        if !geometry.fits_page() {
            warn!(image = %descriptor.id(), ?geometry, "Planned placement does not fit; dropping");
            omitted.push(misplaced(descriptor));
            continue;
        }
        assembler.push(descriptor, geometry)?;
    }

    let outcome = match assembler.finish()? {
        Some(document) => {
            info!(
                pages = document.page_count(),
                omitted = omitted.len(),
                "Conversion complete"
            );
            ConversionOutcome::Exported { document, omitted }
        }
        None => {
            info!(omitted = omitted.len(), "Nothing to export");
            ConversionOutcome::NothingToExport { omitted }
        }
    };
    Ok(outcome)
}

/// Per-item failure for an image whose planned placement is unusable.
fn misplaced(descriptor: &ImageDescriptor) -> ItemFailure {
    let err = BildwerkError::DegenerateImage {
        width: descriptor.pixel_width(),
        height: descriptor.pixel_height(),
    };
    ItemFailure::new(
        descriptor.id(),
        descriptor.name(),
        descriptor.source_order(),
        &err,
    )
}
