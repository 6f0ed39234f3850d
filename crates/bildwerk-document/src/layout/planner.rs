// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout planner — decides page size, orientation and image placement
// for one image. Pure: no I/O, no shared state, safe to call from any thread.

use bildwerk_core::types::{
    FixedPageConfig, ImageDescriptor, LayoutMode, Orientation, PageGeometry, Unit,
};

/// Compute the geometry of the page that will hold `descriptor`.
///
/// Descriptors always have non-zero dimensions, so this cannot fail.
/// `FixedPage` settings must have passed [`FixedPageConfig::validate`]
/// (callers go through `ConversionConfig::validate`); an unvalidated
/// degenerate page yields a geometry that fails `PageGeometry::fits_page`.
pub fn plan(descriptor: &ImageDescriptor, mode: &LayoutMode) -> PageGeometry {
    match mode {
        LayoutMode::OriginalFit => plan_original(descriptor),
        LayoutMode::FixedPage(page) => plan_fixed(descriptor, page),
    }
}

/// Plan every descriptor in order.
pub fn plan_all<'a>(
    descriptors: impl IntoIterator<Item = &'a ImageDescriptor>,
    mode: &LayoutMode,
) -> Vec<PageGeometry> {
    descriptors.into_iter().map(|d| plan(d, mode)).collect()
}

fn plan_original(descriptor: &ImageDescriptor) -> PageGeometry {
    let width = f64::from(descriptor.pixel_width());
    let height = f64::from(descriptor.pixel_height());

    // Square images stay portrait.
    let orientation = if descriptor.pixel_width() > descriptor.pixel_height() {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };

    PageGeometry {
        unit: Unit::Pixel,
        page_width: width,
        page_height: height,
        orientation,
        placed_width: width,
        placed_height: height,
        offset_x: 0.0,
        offset_y: 0.0,
    }
}

fn plan_fixed(descriptor: &ImageDescriptor, page: &FixedPageConfig) -> PageGeometry {
    let content_width = page.content_width();
    let content_height = page.content_height();
    let image_ratio = descriptor.aspect_ratio();
    let content_ratio = content_width / content_height;

    let (placed_width, placed_height) = if image_ratio > content_ratio {
        // Relatively wider than the content box: width binds.
        (content_width, content_width / image_ratio)
    } else {
        (content_height * image_ratio, content_height)
    };

    PageGeometry {
        unit: Unit::Millimetre,
        page_width: page.page_width,
        page_height: page.page_height,
        orientation: Orientation::Portrait,
        placed_width,
        placed_height,
        offset_x: (page.page_width - placed_width) / 2.0,
        offset_y: (page.page_height - placed_height) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::types::ImageId;

    const EPS: f64 = 1e-9;

    fn image(width: u32, height: u32) -> ImageDescriptor {
        ImageDescriptor::new(ImageId::new(), width, height, vec![0u8], 0, "image/png").unwrap()
    }

    fn a4() -> LayoutMode {
        LayoutMode::FixedPage(FixedPageConfig::default())
    }

    #[test]
    fn original_fit_matches_pixels() {
        for (w, h) in [(4000, 3000), (3000, 4000), (1, 1), (1, 9999), (640, 480)] {
            let geom = plan(&image(w, h), &LayoutMode::OriginalFit);
            assert_eq!(geom.unit, Unit::Pixel);
            assert_eq!(geom.page_width, f64::from(w));
            assert_eq!(geom.page_height, f64::from(h));
            assert_eq!(geom.placed_width, f64::from(w));
            assert_eq!(geom.placed_height, f64::from(h));
            assert_eq!(geom.offset_x, 0.0);
            assert_eq!(geom.offset_y, 0.0);
            let expected = if w > h {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            };
            assert_eq!(geom.orientation, expected, "{w}x{h}");
        }
    }

    #[test]
    fn square_original_is_portrait() {
        let geom = plan(&image(500, 500), &LayoutMode::OriginalFit);
        assert_eq!(geom.orientation, Orientation::Portrait);
    }

    #[test]
    fn wide_photo_on_a4_is_width_bound() {
        let geom = plan(&image(4000, 3000), &a4());
        assert_eq!(geom.unit, Unit::Millimetre);
        assert_eq!(geom.orientation, Orientation::Portrait);
        assert_eq!(geom.placed_width, 190.0);
        assert!((geom.placed_height - 142.5).abs() < EPS);
        assert!((geom.offset_x - 10.0).abs() < EPS);
        assert!((geom.offset_y - 77.25).abs() < EPS);
    }

    #[test]
    fn tall_image_on_a4_is_height_bound() {
        let geom = plan(&image(1000, 3000), &a4());
        assert_eq!(geom.placed_height, 277.0);
        assert!(geom.placed_width < 190.0);
        assert!((geom.placed_width - 277.0 / 3.0).abs() < EPS);
        assert!((geom.offset_y - 10.0).abs() < EPS);
    }

    #[test]
    fn fixed_page_binds_exactly_one_side() {
        let sizes = [
            (4000, 3000),
            (3000, 4000),
            (1, 1),
            (10000, 1),
            (1, 10000),
            (1080, 1920),
            (2480, 3508),
            (333, 777),
        ];
        for (w, h) in sizes {
            let geom = plan(&image(w, h), &a4());
            assert!(geom.placed_width <= 190.0 + EPS, "{w}x{h}");
            assert!(geom.placed_height <= 277.0 + EPS, "{w}x{h}");

            let width_bound = geom.placed_width == 190.0;
            let height_bound = geom.placed_height == 277.0;
            assert!(width_bound ^ height_bound, "{w}x{h}: {geom:?}");
            if width_bound {
                assert!(geom.placed_height < 277.0);
            } else {
                assert!(geom.placed_width < 190.0);
            }

            assert!((geom.offset_x - (210.0 - geom.placed_width) / 2.0).abs() < EPS);
            assert!((geom.offset_y - (297.0 - geom.placed_height) / 2.0).abs() < EPS);
            assert!(geom.offset_x >= 0.0 && geom.offset_y >= 0.0);
            assert!(geom.fits_page(), "{w}x{h}: {geom:?}");
        }
    }

    #[test]
    fn matching_ratio_fills_content_box() {
        // 190:277 exactly.
        let geom = plan(&image(190, 277), &a4());
        assert!((geom.placed_width - 190.0).abs() < EPS);
        assert!((geom.placed_height - 277.0).abs() < EPS);
        assert!((geom.offset_x - 10.0).abs() < EPS);
        assert!((geom.offset_y - 10.0).abs() < EPS);
    }

    #[test]
    fn custom_page_and_margin() {
        let mode = LayoutMode::FixedPage(FixedPageConfig {
            page_width: 100.0,
            page_height: 100.0,
            margin: 5.0,
        });
        let geom = plan(&image(200, 100), &mode);
        assert_eq!(geom.page_width, 100.0);
        assert_eq!(geom.placed_width, 90.0);
        assert!((geom.placed_height - 45.0).abs() < EPS);
        assert!((geom.offset_y - 27.5).abs() < EPS);
    }

    #[test]
    fn degenerate_page_does_not_panic() {
        let mode = LayoutMode::FixedPage(FixedPageConfig {
            page_width: 20.0,
            page_height: 20.0,
            margin: 15.0,
        });
        let geom = plan(&image(4, 3), &mode);
        assert!(!geom.fits_page(), "{geom:?}");
    }

    #[test]
    fn planning_is_bit_identical() {
        let desc = image(4032, 3024);
        for mode in [LayoutMode::OriginalFit, a4()] {
            let a = plan(&desc, &mode);
            let b = plan(&desc, &mode);
            for (x, y) in [
                (a.page_width, b.page_width),
                (a.page_height, b.page_height),
                (a.placed_width, b.placed_width),
                (a.placed_height, b.placed_height),
                (a.offset_x, b.offset_x),
                (a.offset_y, b.offset_y),
            ] {
                assert_eq!(x.to_bits(), y.to_bits());
            }
            assert_eq!(a, b);
        }
    }

    #[test]
    fn plan_all_keeps_order() {
        let images = [image(10, 20), image(30, 10), image(5, 5)];
        let geoms = plan_all(&images, &LayoutMode::OriginalFit);
        let widths: Vec<f64> = geoms.iter().map(|g| g.page_width).collect();
        assert_eq!(widths, vec![10.0, 30.0, 5.0]);
    }
}
