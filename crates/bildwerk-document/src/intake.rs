// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image intake — turns user-supplied files into image descriptors.
//
// Each input is sniffed, fully decoded once to prove it is usable, and
// measured. Anything that fails becomes an `ItemFailure` for that input only.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, ItemFailure, Result};
use bildwerk_core::types::{ImageDescriptor, ImageId};
use image::{ImageFormat, ImageReader};
use tracing::{debug, instrument, warn};

/// One file handed to the converter, before it has been decoded.
#[derive(Debug, Clone)]
pub struct IntakeInput {
    id: ImageId,
    name: String,
    bytes: Arc<[u8]>,
}

impl IntakeInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: ImageId::new(),
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an input from the filesystem, named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn fail(&self, source_order: usize, err: &BildwerkError) -> ItemFailure {
        ItemFailure::new(self.id, self.name.clone(), source_order, err)
    }
}

/// Decode `input` and describe it, or report why it was rejected.
#[instrument(skip(input), fields(name = %input.name, bytes_len = input.bytes.len()))]
pub fn probe(
    input: &IntakeInput,
    source_order: usize,
) -> std::result::Result<ImageDescriptor, ItemFailure> {
    match measure(input) {
        Ok((width, height, media_type)) => {
            debug!(width, height, media_type, "Image accepted");
            ImageDescriptor::new(
                input.id,
                width,
                height,
                Arc::clone(&input.bytes),
                source_order,
                media_type,
            )
            .map(|descriptor| descriptor.with_name(input.name.clone()))
            .map_err(|err| input.fail(source_order, &err))
        }
        Err(err) => {
            warn!(error = %err, "Image rejected");
            Err(input.fail(source_order, &err))
        }
    }
}

/// Decoded pixel size and MIME type of the input.
fn measure(input: &IntakeInput) -> Result<(u32, u32, &'static str)> {
    if input.bytes.is_empty() {
        return Err(BildwerkError::Decode("file is empty".into()));
    }
    if is_heif(&input.bytes) || has_extension(&input.name, &["heic", "heif"]) {
        return Err(BildwerkError::UnsupportedFormat("image/heic".into()));
    }

    let mut reader = ImageReader::new(Cursor::new(&input.bytes[..]))
        .with_guessed_format()
        .map_err(|err| BildwerkError::Decode(err.to_string()))?;

    if reader.format().is_none() {
        if let Some(format) = extension_of(&input.name).and_then(ImageFormat::from_extension) {
            reader.set_format(format);
        }
    }
    let format = reader.format().ok_or_else(|| {
        BildwerkError::UnsupportedFormat(format!("unrecognised content in {}", input.name))
    })?;

    let decoded = reader
        .decode()
        .map_err(|err| BildwerkError::Decode(err.to_string()))?;

    Ok((decoded.width(), decoded.height(), format.to_mime_type()))
}

/// ISO-BMFF brands used by HEIC/HEIF stills.
fn is_heif(bytes: &[u8]) -> bool {
    const BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"hevc", b"heim", b"mif1", b"msf1"];
    bytes.len() >= 12
        && &bytes[4..8] == b"ftyp"
        && BRANDS.iter().any(|brand| &bytes[8..12] == *brand)
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|ext| ext.to_str())
}

fn has_extension(name: &str, wanted: &[&str]) -> bool {
    extension_of(name).is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    /// Encode a solid-colour test image.
    pub(crate) fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_is_measured() {
        let input = IntakeInput::new("a.png", encoded(40, 30, ImageFormat::Png));
        let desc = probe(&input, 2).unwrap();
        assert_eq!(desc.pixel_width(), 40);
        assert_eq!(desc.pixel_height(), 30);
        assert_eq!(desc.media_type(), "image/png");
        assert_eq!(desc.source_order(), 2);
        assert_eq!(desc.id(), input.id());
        assert_eq!(desc.content(), input.bytes());
        assert_eq!(desc.name(), "a.png");
    }

    #[test]
    fn jpeg_is_measured() {
        let input = IntakeInput::new("photo", encoded(16, 48, ImageFormat::Jpeg));
        let desc = probe(&input, 0).unwrap();
        assert_eq!((desc.pixel_width(), desc.pixel_height()), (16, 48));
        assert_eq!(desc.media_type(), "image/jpeg");
    }

    #[test]
    fn garbage_is_a_per_item_failure() {
        let input = IntakeInput::new("notes.txt", b"definitely not an image".to_vec());
        let failure = probe(&input, 5).unwrap_err();
        assert_eq!(failure.id, input.id());
        assert_eq!(failure.name, "notes.txt");
        assert_eq!(failure.source_order, 5);
    }

    #[test]
    fn truncated_png_fails_decode() {
        let mut bytes = encoded(64, 64, ImageFormat::Png);
        bytes.truncate(bytes.len() / 2);
        let failure = probe(&IntakeInput::new("cut.png", bytes), 0).unwrap_err();
        assert!(failure.reason.contains("decoded"), "{}", failure.reason);
    }

    #[test]
    fn heic_is_rejected_by_magic() {
        let mut bytes = vec![0, 0, 0, 24];
        bytes.extend_from_slice(b"ftypheic");
        bytes.extend_from_slice(&[0; 16]);
        let failure = probe(&IntakeInput::new("IMG_0001", bytes), 0).unwrap_err();
        assert!(failure.reason.contains("unsupported"), "{}", failure.reason);
    }

    #[test]
    fn heic_is_rejected_by_extension() {
        let failure = probe(&IntakeInput::new("IMG_0002.HEIC", vec![1, 2, 3]), 0).unwrap_err();
        assert!(failure.reason.contains("image/heic"));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(probe(&IntakeInput::new("empty.png", Vec::new()), 0).is_err());
    }

    #[test]
    fn from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, encoded(3, 3, ImageFormat::Png)).unwrap();

        let input = IntakeInput::from_path(&path).unwrap();
        assert_eq!(input.name(), "scan.png");
        assert!(probe(&input, 0).is_ok());
    }
}
