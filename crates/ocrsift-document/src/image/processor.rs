// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — resize, crop, blur, contrast/sharpness/brightness
// adjustment. Operates on in-memory images using the `image` and `imageproc`
// crates.

use image::{DynamicImage, ImageBuffer, Rgba};
use imageproc::filter::gaussian_blur_f32;
use ocrsift_core::error::SiftError;
use tracing::{debug, info, instrument};

/// 3x3 smoothing kernel used as the "blurred" reference for sharpening.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let prepared = ImageProcessor::open("page.png")?
///     .fit_width(2500)
///     .adjust_contrast(1.2)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, SiftError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            SiftError::Image(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = img.width(),
            height = img.height(),
            "Image loaded"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Geometry -------------------------------------------------------------

    /// Downscale to `max_width` if the image is wider, preserving aspect ratio.
    /// Uses Lanczos3 filtering. Narrower images are returned unchanged.
    #[instrument(skip(self), fields(max_width))]
    pub fn fit_width(self, max_width: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width <= max_width || max_width == 0 {
            return self;
        }
        let new_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
        debug!(from_w = width, from_h = height, max_width, new_height, "Downscaling image");
        let resized = self.image.resize_exact(
            max_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        );
        Self { image: resized }
    }

    /// Upscale to `target_height` if the image is shorter, preserving aspect
    /// ratio. Taller images are returned unchanged.
    #[instrument(skip(self), fields(target_height))]
    pub fn fit_min_height(self, target_height: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if height >= target_height || height == 0 {
            return self;
        }
        let new_width = ((width as u64 * target_height as u64) / height as u64).max(1) as u32;
        debug!(from_w = width, from_h = height, new_width, target_height, "Upscaling image");
        let resized = self.image.resize_exact(
            new_width,
            target_height,
            image::imageops::FilterType::Lanczos3,
        );
        Self { image: resized }
    }

    /// Crop a rectangular region from the image.
    ///
    /// `x` and `y` are the top-left corner; `width` and `height` define the
    /// size of the crop rectangle. Values are clamped to image bounds. Unlike
    /// the other operations this borrows `self`, so one page can be cut into
    /// several strips.
    #[instrument(skip(self), fields(x, y, width, height))]
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = width.min(img_w - safe_x);
        let safe_h = height.min(img_h - safe_y);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping image");

        let cropped = self.image.crop_imm(safe_x, safe_y, safe_w, safe_h);
        Self { image: cropped }
    }

    // -- Tone -----------------------------------------------------------------

    /// Gaussian blur on the luma channel. Produces a grayscale image.
    #[instrument(skip(self), fields(sigma))]
    pub fn denoise(self, sigma: f32) -> Self {
        let gray = self.image.to_luma8();
        Self {
            image: DynamicImage::ImageLuma8(gaussian_blur_f32(&gray, sigma)),
        }
    }

    /// Scale every colour channel by `factor`. Values > 1.0 brighten; 1.0 is a
    /// no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn scale_brightness(self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        let rgba = self.image.to_rgba8();
        let brightened = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| -> u8 { (channel as f32 * factor).clamp(0.0, 255.0) as u8 };
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });
        Self {
            image: DynamicImage::ImageRgba8(brightened),
        }
    }

    /// Adjust contrast by a factor around the mean luminance. Values > 1.0
    /// increase contrast; values < 1.0 decrease it. A value of 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        let pivot = mean_luma(&self.image);
        let rgba = self.image.to_rgba8();

        let contrasted = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| -> u8 {
                let val = factor * (channel as f32 - pivot) + pivot;
                val.clamp(0.0, 255.0) as u8
            };
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(contrasted),
        }
    }

    /// Adjust sharpness by blending with a 3x3-smoothed copy. Values > 1.0
    /// sharpen; 1.0 is a no-op; 0.0 yields the smoothed image.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_sharpness(self, factor: f32) -> Self {
        if (factor - 1.0).abs() < f32::EPSILON {
            return self;
        }
        let rgba = self.image.to_rgba8();
        let smooth = image::imageops::filter3x3(&rgba, &SMOOTH_KERNEL);

        let (width, height) = rgba.dimensions();
        let sharpened = ImageBuffer::from_fn(width, height, |x, y| {
            let original = *rgba.get_pixel(x, y);
            // border pixels have no full 3x3 neighbourhood
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                return original;
            }
            let Rgba([r, g, b, a]) = original;
            let Rgba([sr, sg, sb, _]) = *smooth.get_pixel(x, y);
            let blend = |orig: u8, soft: u8| -> u8 {
                let val = soft as f32 + factor * (orig as f32 - soft as f32);
                val.clamp(0.0, 255.0) as u8
            };
            Rgba([blend(r, sr), blend(g, sg), blend(b, sb), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(sharpened),
        }
    }
}

/// Mean luminance of the image, 128 for an empty image.
fn mean_luma(image: &DynamicImage) -> f32 {
    let gray = image.to_luma8();
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 128.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    sum as f32 / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, Rgb};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            let v = (x * 255 / width.max(1)) as u8;
            Rgb([v, v, v])
        }))
    }

    #[test]
    fn fit_width_downscales_wide_images_only() {
        let wide = ImageProcessor::from_dynamic(gradient(5000, 100)).fit_width(2500);
        assert_eq!((wide.width(), wide.height()), (2500, 50));

        let narrow = ImageProcessor::from_dynamic(gradient(800, 100)).fit_width(2500);
        assert_eq!((narrow.width(), narrow.height()), (800, 100));
    }

    #[test]
    fn fit_min_height_upscales_short_images_only() {
        let short = ImageProcessor::from_dynamic(gradient(100, 50)).fit_min_height(200);
        assert_eq!((short.width(), short.height()), (400, 200));

        let tall = ImageProcessor::from_dynamic(gradient(100, 300)).fit_min_height(200);
        assert_eq!(tall.height(), 300);
    }

    #[test]
    fn crop_is_clamped_to_bounds() {
        let cropped = ImageProcessor::from_dynamic(gradient(100, 100)).crop(90, 40, 50, 500);
        assert_eq!((cropped.width(), cropped.height()), (10, 60));
    }

    #[test]
    fn contrast_spreads_values_around_mean() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(2, 1, |x, _| {
            Luma([if x == 0 { 100 } else { 150 }])
        }));
        let out = ImageProcessor::from_dynamic(img)
            .adjust_contrast(2.0)
            .into_dynamic()
            .to_luma8();
        // mean is 125: 100 -> 75, 150 -> 175
        assert_eq!(out.get_pixel(0, 0).0[0], 75);
        assert_eq!(out.get_pixel(1, 0).0[0], 175);
    }

    #[test]
    fn uniform_image_is_unchanged_by_contrast_and_sharpness() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90])));
        let out = ImageProcessor::from_dynamic(img)
            .adjust_contrast(1.3)
            .adjust_sharpness(1.4)
            .into_dynamic()
            .to_luma8();
        assert!(out.pixels().all(|p| p.0[0] == 90));
    }

    #[test]
    fn brightness_scales_channels() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([100])));
        let out = ImageProcessor::from_dynamic(img)
            .scale_brightness(1.1)
            .into_dynamic()
            .to_luma8();
        assert_eq!(out.get_pixel(0, 0).0[0], 110);
    }

    #[test]
    fn denoise_produces_grayscale_of_same_size() {
        let out = ImageProcessor::from_dynamic(gradient(30, 20)).denoise(0.5);
        assert_eq!((out.width(), out.height()), (30, 20));
        assert!(matches!(out.into_dynamic(), DynamicImage::ImageLuma8(_)));
    }
}
