//! Size validation for the selected candidate.
//!
//! The validator only rejects what it can prove is unusable: a declared
//! `content-length` above the size limit, or decoded dimensions below the
//! minimum. Anything it cannot determine (network failure, non-2xx, a prefix
//! the decoder cannot read) is accepted.

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::options::ScraperOptions;
use crate::selection::SizeValidator;
use async_trait::async_trait;
use image::ImageReader;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ImageValidator {
    fetcher: Fetcher,
    head_timeout: Duration,
    probe_timeout: Duration,
    probe_bytes: usize,
    max_bytes: u64,
    min_width: u32,
    min_height: u32,
}

impl ImageValidator {
    pub fn new(fetcher: Fetcher, options: &ScraperOptions) -> Self {
        Self {
            fetcher,
            head_timeout: options.head_timeout(),
            probe_timeout: options.probe_timeout(),
            probe_bytes: options.probe_bytes,
            max_bytes: options.max_file_size_bytes(),
            min_width: options.min_image_width,
            min_height: options.min_image_height,
        }
    }

    fn exceeds_size_limit(&self, content_length: Option<u64>) -> bool {
        content_length.map_or(false, |len| len > self.max_bytes)
    }

    fn too_small(&self, (width, height): (u32, u32)) -> bool {
        width < self.min_width || height < self.min_height
    }

    async fn check(&self, url: &str) -> Result<bool> {
        let head = self.fetcher.head(url, self.head_timeout).await?;
        if self.exceeds_size_limit(head.content_length) {
            debug!(url, content_length = ?head.content_length, "image exceeds size limit");
            return Ok(false);
        }

        let prefix = self
            .fetcher
            .fetch_prefix(url, self.probe_bytes, self.probe_timeout)
            .await?;

        match probe_dimensions(&prefix) {
            Some(dimensions) if self.too_small(dimensions) => {
                debug!(url, width = dimensions.0, height = dimensions.1, "image too small");
                Ok(false)
            }
            Some(_) => Ok(true),
            None => {
                debug!(url, "could not read dimensions from prefix; accepting");
                Ok(true)
            }
        }
    }
}

/// Width and height from the leading bytes of an encoded image.
pub fn probe_dimensions(prefix: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(prefix))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[async_trait]
impl SizeValidator for ImageValidator {
    async fn is_acceptable_size(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(acceptable) => acceptable,
            Err(e) => {
                warn!(url, error = %e, "size validation failed; accepting");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn validator() -> ImageValidator {
        let options = ScraperOptions::builder()
            .retry_attempts(0)
            .retry_backoff_ms(1)
            .build();
        ImageValidator::new(Fetcher::new(&options).unwrap(), &options)
    }

    fn serve(server: &MockServer, path: &str, body: Vec<u8>) {
        server.mock(|when, then| {
            when.method(httpmock::Method::HEAD).path(path);
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).header("content-type", "image/png").body(body);
        });
    }

    #[test]
    fn probes_png_dimensions() {
        assert_eq!(probe_dimensions(&png(640, 360)), Some((640, 360)));
        assert_eq!(probe_dimensions(b"not an image"), None);
    }

    #[test]
    fn size_limit_applies_to_declared_length() {
        let v = validator();
        assert!(!v.exceeds_size_limit(None));
        assert!(!v.exceeds_size_limit(Some(10 * 1024 * 1024)));
        assert!(v.exceeds_size_limit(Some(10 * 1024 * 1024 + 1)));
    }

    #[tokio::test]
    async fn large_image_is_accepted() {
        let server = MockServer::start();
        serve(&server, "/big.png", png(800, 600));
        assert!(validator().is_acceptable_size(&server.url("/big.png")).await);
    }

    #[tokio::test]
    async fn small_image_is_rejected() {
        let server = MockServer::start();
        serve(&server, "/small.png", png(64, 400));
        assert!(!validator().is_acceptable_size(&server.url("/small.png")).await);
    }

    #[tokio::test]
    async fn undecodable_prefix_is_accepted() {
        let server = MockServer::start();
        serve(&server, "/mystery.jpg", b"<html>not an image</html>".to_vec());
        assert!(validator().is_acceptable_size(&server.url("/mystery.jpg")).await);
    }

    #[tokio::test]
    async fn fetch_failure_is_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::HEAD).path("/gone.jpg");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/gone.jpg");
            then.status(404);
        });
        assert!(validator().is_acceptable_size(&server.url("/gone.jpg")).await);
    }
}
