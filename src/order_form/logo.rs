//! Order form logo
//!
//! The logo is fetched over the network, flattened onto white and re-encoded
//! as JPEG so the PDF writer can embed it without decoding.

use crate::error::{ProcurementError, ProcurementResult};
use crate::offline::{Network, Request};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;
use url::Url;

/// A JPEG-encoded image ready to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl LogoImage {
    /// Decode any supported format and re-encode as JPEG
    pub fn from_bytes(bytes: &[u8]) -> ProcurementResult<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut flattened = RgbImage::new(width, height);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = u16::from(a);
            let blend = |channel: u8| -> u8 {
                ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            flattened.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
        }

        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(flattened).write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;

        Ok(Self {
            width,
            height,
            jpeg,
        })
    }

    /// Fetch and re-encode the logo at `url`
    pub async fn fetch<N: Network + ?Sized>(network: &N, url: &str) -> ProcurementResult<Self> {
        let parsed = Url::parse(url).map_err(|e| ProcurementError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = network.fetch(&Request::get(parsed)).await?;
        if !response.ok() {
            return Err(ProcurementError::network(
                url,
                format!("HTTP {}", response.status),
            ));
        }

        debug!("Fetched logo {} ({} bytes)", url, response.body.len());
        Self::from_bytes(&response.body)
    }
}
