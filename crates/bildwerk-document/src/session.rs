// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending-image session — the images a user has picked but not yet converted.

use std::collections::HashMap;

use bildwerk_core::config::ConversionConfig;
use bildwerk_core::error::{ItemFailure, Result};
use bildwerk_core::types::{ImageDescriptor, ImageId};
use tracing::{debug, info};

use crate::assemble::SinkFactory;
use crate::intake::{IntakeInput, probe};
use crate::pipeline::{ConversionOutcome, convert_descriptors, probe_all};

/// Owns decoded images between selection and conversion.
///
/// Images keep the order in which they were added; removing one closes the
/// gap. Taking the images for a conversion empties the session so no decoded
/// buffer outlives the request.
#[derive(Debug, Default)]
pub struct PendingImages {
    order: Vec<ImageId>,
    images: HashMap<ImageId, ImageDescriptor>,
}

impl PendingImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.images.contains_key(&id)
    }

    /// Decode and add one image at the end of the sequence.
    pub fn add(&mut self, input: &IntakeInput) -> std::result::Result<ImageId, ItemFailure> {
        let descriptor = probe(input, self.len())?;
        Ok(self.insert(descriptor))
    }

    /// Decode several images concurrently and append the ones that succeed,
    /// in input order. Failures are returned; they never block the others.
    pub async fn add_all(&mut self, inputs: Vec<IntakeInput>) -> Vec<ItemFailure> {
        let base = self.len();
        let mut failures = Vec::new();
        for result in probe_all(inputs).await {
            match result {
                Ok(descriptor) => {
                    self.insert(descriptor);
                }
                Err(mut failure) => {
                    failure.source_order += base;
                    failures.push(failure);
                }
            }
        }
        info!(pending = self.len(), rejected = failures.len(), "Images added");
        failures
    }

    /// Append `descriptor`. Adding the same input twice yields two pages, so a
    /// repeated id is replaced by a fresh one.
    fn insert(&mut self, descriptor: ImageDescriptor) -> ImageId {
        let descriptor = if self.images.contains_key(&descriptor.id()) {
            descriptor.with_id(ImageId::new())
        } else {
            descriptor
        };
        let id = descriptor.id();
        self.images.insert(id, descriptor);
        self.order.push(id);
        id
    }

    /// Drop one image from the pending set.
    pub fn remove(&mut self, id: ImageId) -> Option<ImageDescriptor> {
        let removed = self.images.remove(&id)?;
        self.order.retain(|pending| *pending != id);
        debug!(image = %id, pending = self.len(), "Image removed");
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.images.clear();
        debug!("Pending images cleared");
    }

    /// Pending images in order, numbered from zero without gaps.
    pub fn descriptors(&self) -> Vec<ImageDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.images.get(id))
            .enumerate()
            .map(|(order, descriptor)| descriptor.with_source_order(order))
            .collect()
    }

    /// Move every pending image out of the session, numbered from zero.
    pub fn take_all(&mut self) -> Vec<ImageDescriptor> {
        let descriptors = self.descriptors();
        self.clear();
        descriptors
    }

    /// Convert everything pending and empty the session.
    pub fn convert<F: SinkFactory>(
        &mut self,
        config: &ConversionConfig,
        factory: F,
    ) -> Result<ConversionOutcome> {
        config.validate()?;
        let descriptors = self.take_all();
        convert_descriptors(&descriptors, config, factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    use crate::assemble::tests::RecordingFactory;
    use crate::intake::tests::encoded;

    fn png(name: &str, width: u32) -> IntakeInput {
        IntakeInput::new(name, encoded(width, 8, ImageFormat::Png))
    }

    #[test]
    fn add_remove_keeps_order_dense() {
        let mut session = PendingImages::new();
        let a = session.add(&png("a.png", 10)).unwrap();
        let b = session.add(&png("b.png", 20)).unwrap();
        let c = session.add(&png("c.png", 30)).unwrap();
        assert_eq!(session.len(), 3);

        let removed = session.remove(b).unwrap();
        assert_eq!(removed.pixel_width(), 20);
        assert!(!session.contains(b));
        assert!(session.remove(b).is_none());

        let descriptors = session.descriptors();
        let ids: Vec<ImageId> = descriptors.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![a, c]);
        let orders: Vec<usize> = descriptors.iter().map(|d| d.source_order()).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn same_input_added_twice_gets_two_entries() {
        let mut session = PendingImages::new();
        let input = png("a.png", 10);
        let first = session.add(&input).unwrap();
        let second = session.add(&input.clone()).unwrap();

        assert_ne!(first, second);
        assert_eq!(session.len(), 2);

        session.remove(first).unwrap();
        assert_eq!(session.len(), 1);
        assert!(session.contains(second));
    }

    #[test]
    fn rejected_input_is_not_added() {
        let mut session = PendingImages::new();
        let failure = session
            .add(&IntakeInput::new("x.jpg", b"nope".to_vec()))
            .unwrap_err();
        assert_eq!(failure.name, "x.jpg");
        assert!(session.is_empty());
    }

    #[test]
    fn convert_drains_session() {
        let mut session = PendingImages::new();
        session.add(&png("a.png", 10)).unwrap();
        session.add(&png("b.png", 12)).unwrap();

        let outcome = session
            .convert(&ConversionConfig::default(), RecordingFactory::default())
            .unwrap();
        assert_eq!(outcome.document().unwrap().page_count(), 2);
        assert!(session.is_empty());
    }

    #[test]
    fn cleared_session_has_nothing_to_export() {
        let mut session = PendingImages::new();
        session.add(&png("a.png", 10)).unwrap();
        session.clear();

        let outcome = session
            .convert(&ConversionConfig::default(), RecordingFactory::default())
            .unwrap();
        assert!(matches!(outcome, ConversionOutcome::NothingToExport { .. }));
    }

    #[tokio::test]
    async fn add_all_reports_failures_with_session_positions() {
        let mut session = PendingImages::new();
        session.add(&png("first.png", 10)).unwrap();

        let failures = session
            .add_all(vec![
                png("second.png", 10),
                IntakeInput::new("third.png", b"junk".to_vec()),
                png("fourth.png", 10),
            ])
            .await;

        assert_eq!(session.len(), 3);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "third.png");
        assert_eq!(failures[0].source_order, 2);
    }
}
