//! Order form export
//!
//! Lays out the current order list on one A4 page: header, item table, grand
//! total, contact block and an optional logo. Drawing goes through
//! [`DrawingSurface`]; the bundled [`PdfDocument`] is only compiled with the
//! `pdf` feature.

pub mod currency;
pub mod logo;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod surface;

pub use currency::{format_currency, format_money};
pub use logo::LogoImage;
#[cfg(feature = "pdf")]
pub use pdf::PdfDocument;
pub use surface::DrawingSurface;

use crate::cart::CartItem;
use crate::config::Config;
use crate::error::{ProcurementError, ProcurementResult};
use crate::notify::{NoticeLevel, Notifier};
use crate::offline::Network;
use chrono::{Datelike, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const EXPORT_SUCCESS: &str = "Order form PDF generated successfully";

const LEFT: f32 = 20.0;
const RULE_END: f32 = 190.0;
const QTY_X: f32 = 120.0;
const UNIT_PRICE_X: f32 = 140.0;
const TOTAL_X: f32 = 170.0;
const ROW_HEIGHT: f32 = 10.0;
const NAME_WIDTH: usize = 40;
const LOGO_SIZE: f32 = 20.0;

/// Texts printed on the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub title: String,
    pub department: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub logo_url: Option<String>,
    pub file_name: String,
}

impl OrderForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.order_form.title.clone(),
            department: config.organization.department_name.clone(),
            contact_email: config.organization.contact_email.clone(),
            contact_phone: config.organization.contact_phone.clone(),
            logo_url: config.order_form.logo_url.clone(),
            file_name: config.order_form.file_name.clone(),
        }
    }
}

/// The drawing surface this build can produce, if any
pub fn default_surface(title: &str) -> Option<Box<dyn DrawingSurface>> {
    #[cfg(feature = "pdf")]
    {
        Some(Box::new(PdfDocument::a4(title)))
    }
    #[cfg(not(feature = "pdf"))]
    {
        let _ = title;
        None
    }
}

/// Generation date as printed on the form, e.g. `3/7/2025`
pub fn format_generated(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Draws the order list and writes the document
pub struct OrderFormExporter<N> {
    form: OrderForm,
    network: N,
    generated: Option<NaiveDate>,
}

impl<N: Network> OrderFormExporter<N> {
    pub fn new(form: OrderForm, network: N) -> Self {
        Self {
            form,
            network,
            generated: None,
        }
    }

    /// Fix the printed generation date instead of using today's
    pub fn with_generated(mut self, date: NaiveDate) -> Self {
        self.generated = Some(date);
        self
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    /// Draw the form for `items` onto `surface` and render it.
    ///
    /// A missing surface is reported as an error notice and nothing is
    /// drawn. Logo failures are logged and the form is produced without it.
    pub async fn render<S, V>(
        &self,
        surface: Option<&mut S>,
        items: &[CartItem],
        notifier: &V,
    ) -> ProcurementResult<Vec<u8>>
    where
        S: DrawingSurface + ?Sized,
        V: Notifier + ?Sized,
    {
        let Some(surface) = surface else {
            let err = ProcurementError::PdfUnavailable;
            notifier.notify(NoticeLevel::Error, &err.to_string());
            return Err(err);
        };

        let y = self.draw_body(surface, items);
        self.draw_logo(surface, y).await;

        surface.render()
    }

    /// Render and write the document to `dir/<file_name>`, then notify
    pub async fn export<S, V>(
        &self,
        surface: Option<&mut S>,
        items: &[CartItem],
        dir: &Path,
        notifier: &V,
    ) -> ProcurementResult<PathBuf>
    where
        S: DrawingSurface + ?Sized,
        V: Notifier + ?Sized,
    {
        let bytes = self.render(surface, items, notifier).await?;

        let path = dir.join(&self.form.file_name);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            ProcurementError::io(format!("writing order form {}", path.display()), e)
        })?;

        info!("Wrote order form {} ({} bytes)", path.display(), bytes.len());
        notifier.notify(NoticeLevel::Success, EXPORT_SUCCESS);
        Ok(path)
    }

    /// Draw everything but the logo; returns the footer baseline
    fn draw_body<S: DrawingSurface + ?Sized>(&self, surface: &mut S, items: &[CartItem]) -> f32 {
        let generated = self.generated.unwrap_or_else(|| Local::now().date_naive());

        surface.set_font_size(20.0);
        surface.text(&self.form.title, LEFT, 30.0);

        surface.set_font_size(12.0);
        surface.text(&self.form.department, LEFT, 45.0);
        surface.text(&format!("Generated: {}", format_generated(generated)), LEFT, 55.0);

        let mut y = 80.0;
        surface.set_font_size(14.0);
        surface.text("Order Items:", LEFT, y);

        y += 15.0;
        surface.set_font_size(10.0);

        if items.is_empty() {
            surface.text("No items in order list", LEFT, y);
        } else {
            surface.text("Item", LEFT, y);
            surface.text("Qty", QTY_X, y);
            surface.text("Unit Price", UNIT_PRICE_X, y);
            surface.text("Total", TOTAL_X, y);
            y += ROW_HEIGHT;

            surface.line(LEFT, y, RULE_END, y);
            y += ROW_HEIGHT;

            for item in items {
                let name: String = item.name.chars().take(NAME_WIDTH).collect();
                surface.text(&name, LEFT, y);
                surface.text(&item.quantity.to_string(), QTY_X, y);
                surface.text(&format_money(item.price), UNIT_PRICE_X, y);
                surface.text(&format_money(item.line_total()), TOTAL_X, y);
                y += ROW_HEIGHT;
            }

            let total: f64 = items.iter().map(CartItem::line_total).sum();
            y += ROW_HEIGHT;
            surface.line(LEFT, y, RULE_END, y);
            y += 15.0;
            surface.set_font_size(12.0);
            surface.text(&format!("Total: {}", format_currency(total)), UNIT_PRICE_X, y);
        }

        y += 40.0;
        surface.set_font_size(10.0);
        surface.text("Contact Information:", LEFT, y);
        y += 15.0;
        surface.text(&format!("Email: {}", self.form.contact_email), LEFT, y);
        y += ROW_HEIGHT;
        surface.text(&format!("Phone: {}", self.form.contact_phone), LEFT, y);

        y
    }

    async fn draw_logo<S: DrawingSurface + ?Sized>(&self, surface: &mut S, y: f32) {
        let Some(url) = self.form.logo_url.as_deref() else {
            return;
        };

        match LogoImage::fetch(&self.network, url).await {
            Ok(logo) => {
                let x = surface.page_width() - LOGO_SIZE - LEFT;
                surface.image(&logo, x, y - 15.0, LOGO_SIZE, LOGO_SIZE);
                debug!("Added logo to order form");
            }
            Err(e) => warn!("Failed to add logo, continuing without it: {}", e),
        }
    }
}
