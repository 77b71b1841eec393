use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;
use thiserror::Error;

/// Errors that can occur when encoding a QR code
#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(String),
}

/// Encoded QR image ready to embed in a page
#[derive(Debug, Clone, PartialEq)]
pub struct QrImage {
    pub content_type: &'static str,
    pub base64: String,
}

impl QrImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.base64)
    }
}

/// Turns arbitrary text (a share link, usually) into a QR image
pub trait QrRenderer: Send + Sync {
    fn render(&self, data: &str) -> Result<QrImage, QrError>;
}

/// SVG renderer with a quiet zone, base64 encoded
#[derive(Debug, Clone, Copy)]
pub struct SvgQrRenderer {
    min_size: u32,
}

impl SvgQrRenderer {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl Default for SvgQrRenderer {
    fn default() -> Self {
        Self::new(250)
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, data: &str) -> Result<QrImage, QrError> {
        let code = QrCode::new(data.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;

        let image = code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.min_size, self.min_size)
            .quiet_zone(true)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();

        Ok(QrImage {
            content_type: "image/svg+xml",
            base64: base64::engine::general_purpose::STANDARD.encode(image.as_bytes()),
        })
    }
}
