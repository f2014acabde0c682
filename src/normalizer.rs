//! Download and re-encode the selected image as an opaque JPEG.

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::options::ScraperOptions;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

/// A JPEG ready to be written to disk.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone)]
pub struct ImageNormalizer {
    fetcher: Fetcher,
    timeout: Duration,
    quality: u8,
}

impl ImageNormalizer {
    pub fn new(fetcher: Fetcher, options: &ScraperOptions) -> Self {
        Self {
            fetcher,
            timeout: options.request_timeout(),
            quality: options.jpeg_quality,
        }
    }

    /// Fetch `url` and convert it.
    pub async fn normalize(&self, url: &str) -> Result<NormalizedImage> {
        let data = self.fetcher.fetch(url, self.timeout).await?;
        debug!(url, bytes = data.len(), "downloaded image");
        self.normalize_bytes(&data)
    }

    /// Decode any supported format and re-encode as JPEG.
    ///
    /// Transparent pixels are composited onto white; JPEG has no alpha.
    pub fn normalize_bytes(&self, data: &[u8]) -> Result<NormalizedImage> {
        let decoded = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let rgb = if decoded.color().has_alpha() {
            flatten_on_white(&decoded)
        } else {
            decoded.to_rgb8()
        };
        let (width, height) = rgb.dimensions();

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;

        Ok(NormalizedImage {
            bytes,
            width,
            height,
        })
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn normalizer() -> ImageNormalizer {
        let options = ScraperOptions::default();
        ImageNormalizer::new(Fetcher::new(&options).unwrap(), &options)
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn transparent_png_becomes_white_jpeg() {
        // Left half fully transparent, right half opaque red.
        let png = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([200, 0, 0, 255])
            }
        });
        let data = encode(DynamicImage::ImageRgba8(png), ImageFormat::Png);

        let normalized = normalizer().normalize_bytes(&data).unwrap();
        assert_eq!((normalized.width, normalized.height), (16, 16));

        let decoded = image::load_from_memory_with_format(&normalized.bytes, ImageFormat::Jpeg)
            .unwrap()
            .to_rgb8();
        let pixel = decoded.get_pixel(2, 2).0;
        assert!(pixel.iter().all(|&c| c > 245), "got {:?}", pixel);
    }

    #[test]
    fn opaque_image_keeps_dimensions() {
        let opaque = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, image::Rgb([10, 120, 200])));
        let data = encode(opaque, ImageFormat::Bmp);
        let normalized = normalizer().normalize_bytes(&data).unwrap();
        assert_eq!((normalized.width, normalized.height), (40, 30));
        assert_eq!(
            image::guess_format(&normalized.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let err = normalizer().normalize_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, crate::LeadImageError::ImageCodec(_)));
    }

    #[test]
    fn blend_math() {
        let half = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_on_white(&DynamicImage::ImageRgba8(half));
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }
}
