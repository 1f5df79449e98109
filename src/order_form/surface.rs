//! Drawing port for the order form
//!
//! Coordinates are millimetres from the top-left corner of the page.

use super::logo::LogoImage;
use crate::error::ProcurementResult;

pub trait DrawingSurface {
    /// Page width in millimetres
    fn page_width(&self) -> f32;

    /// Font size in points for subsequent text
    fn set_font_size(&mut self, size: f32);

    /// Draw text with its baseline at `y`
    fn text(&mut self, text: &str, x: f32, y: f32);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);

    /// Draw an image with its top-left corner at `(x, y)`
    fn image(&mut self, image: &LogoImage, x: f32, y: f32, width: f32, height: f32);

    /// Serialize the finished document
    fn render(&self) -> ProcurementResult<Vec<u8>>;
}
