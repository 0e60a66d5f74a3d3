// Post-processing hook: trait boundary + the perceptual-hash enricher.
//
// Adapters pass every mapped item through `ServiceContext::finish`, which
// calls the configured enricher. Enrichment is best-effort: failures are
// logged and the item is returned as mapped.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use social_api_client::{ApiRequest, Transport};
use socialfeed_common::Item;

/// Trait boundary for item post-processing.
#[async_trait]
pub trait ItemEnricher: Send + Sync {
    async fn enrich(&self, item: &mut Item) -> Result<()>;
}

/// Computes a 64-bit average hash over the item's media image (or video
/// thumbnail) and stores it in `media.hash`.
pub struct PerceptualHasher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl PerceptualHasher {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }
}

#[async_trait]
impl ItemEnricher for PerceptualHasher {
    async fn enrich(&self, item: &mut Item) -> Result<()> {
        let Some(url) = item.media.preview_image().map(str::to_string) else {
            return Ok(());
        };

        let bytes = tokio::time::timeout(self.timeout, self.transport.send(ApiRequest::get(&url)))
            .await
            .with_context(|| format!("downloading {url} timed out"))?
            .with_context(|| format!("downloading {url}"))?;

        let hash = average_hash(&bytes)?;
        item.media.hash = Some(format!("{hash:016x}"));
        Ok(())
    }
}

/// Average hash: shrink to 8x8 grayscale, set a bit for every pixel at or
/// above the mean, row-major from the most significant bit.
pub fn average_hash(bytes: &[u8]) -> Result<u64> {
    let img = image::load_from_memory(bytes).context("decoding image")?;
    let small = img.resize_exact(8, 8, FilterType::Triangle).to_luma8();

    let pixels: Vec<u32> = small.pixels().map(|p| u32::from(p.0[0])).collect();
    let mean = pixels.iter().sum::<u32>() / pixels.len().max(1) as u32;

    let hash = pixels
        .iter()
        .enumerate()
        .filter(|(_, v)| **v >= mean)
        .fold(0u64, |acc, (i, _)| acc | (1u64 << (63 - i)));
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
    use std::io::Cursor;

    fn png(img: GrayImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn uniform_image_sets_every_bit() {
        let img = GrayImage::from_pixel(32, 32, Luma([128]));
        assert_eq!(average_hash(&png(img)).unwrap(), u64::MAX);
    }

    #[test]
    fn left_dark_right_light() {
        let img = GrayImage::from_fn(64, 64, |x, _| if x < 32 { Luma([0]) } else { Luma([255]) });
        let hash = average_hash(&png(img)).unwrap();
        // Pixel (0, 0) is the most significant bit, (7, 0) the eighth.
        assert_eq!(hash >> 63, 0);
        assert_eq!((hash >> 56) & 1, 1);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(average_hash(b"definitely not an image").is_err());
    }
}
