//! PDF generator.
//!
//! The template is rendered as HTML with auto-escaping enabled, so payload
//! strings cannot inject markup, then handed to an [`HtmlToPdf`] converter.

use minijinja::AutoEscape;
use serde_json::Value;
use std::sync::Arc;

use super::engine::{HtmlToPdf, PdfOptions, WkHtmlToPdf};
use super::traits::Generator;
use super::{render_template, GeneratedOutput, GeneratorError, GeneratorKind};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Clone)]
pub struct PdfGenerator {
    options: PdfOptions,
    converter: Arc<dyn HtmlToPdf>,
}

impl Default for PdfGenerator {
    fn default() -> Self {
        Self::new(Arc::new(WkHtmlToPdf::default()))
    }
}

impl PdfGenerator {
    pub fn new(converter: Arc<dyn HtmlToPdf>) -> Self {
        Self::with_options(converter, PdfOptions::default())
    }

    pub fn with_options(converter: Arc<dyn HtmlToPdf>, options: PdfOptions) -> Self {
        Self { options, converter }
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    /// First stage only: the escaped HTML that would be converted.
    pub fn render_html(&self, template_source: &str, data: &Value) -> Result<String, GeneratorError> {
        render_template(AutoEscape::Html, template_source, data)
    }
}

impl Generator for PdfGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Pdf
    }

    fn generate(
        &self,
        template_source: &str,
        data: &Value,
    ) -> Result<GeneratedOutput, GeneratorError> {
        let html = self.render_html(template_source, data)?;
        let bytes = self.converter.convert(&html, &self.options)?;
        Ok(GeneratedOutput {
            bytes,
            content_type: PDF_CONTENT_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Converter stub that records the HTML and options it was given.
    #[derive(Default)]
    struct RecordingConverter {
        seen: Mutex<Vec<(String, PdfOptions)>>,
        fail: bool,
    }

    impl HtmlToPdf for RecordingConverter {
        fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, GeneratorError> {
            self.seen.lock().push((html.to_string(), *options));
            if self.fail {
                return Err(GeneratorError::ConverterExit {
                    code: 1,
                    stderr: "boom".to_string(),
                });
            }
            Ok(format!("%PDF-{}", html.len()).into_bytes())
        }
    }

    #[test]
    fn test_payload_markup_is_escaped() {
        let generator = PdfGenerator::new(Arc::new(RecordingConverter::default()));
        let html = generator
            .render_html(
                "<p>{{ name }}</p>",
                &json!({"name": "<script>alert('x')</script>"}),
            )
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_generate_converts_with_default_options() {
        let converter = Arc::new(RecordingConverter::default());
        let generator = PdfGenerator::new(converter.clone());

        let out = generator
            .generate("<h1>{{ title }}</h1>", &json!({"title": "Invoice"}))
            .unwrap();
        assert_eq!(out.content_type, "application/pdf");
        assert!(out.bytes.starts_with(b"%PDF"));

        let seen = converter.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "<h1>Invoice</h1>");
        assert_eq!(seen[0].1, PdfOptions::default());
    }

    #[test]
    fn test_custom_options_reach_converter() {
        use crate::generators::engine::{Orientation, PageSize};

        let converter = Arc::new(RecordingConverter::default());
        let options = PdfOptions {
            page_size: PageSize::Legal,
            orientation: Orientation::Landscape,
            dpi: 150,
        };
        let generator = PdfGenerator::with_options(converter.clone(), options);
        assert_eq!(generator.options(), &options);

        generator.generate("<p>x</p>", &json!({})).unwrap();
        assert_eq!(converter.seen.lock()[0].1, options);
    }

    #[test]
    fn test_render_failure_skips_conversion() {
        let converter = Arc::new(RecordingConverter::default());
        let generator = PdfGenerator::new(converter.clone());

        let err = generator.generate("{{ broken", &json!({})).unwrap_err();
        assert!(!err.is_conversion());
        assert!(converter.seen.lock().is_empty());
    }

    #[test]
    fn test_conversion_failure_is_surfaced() {
        let converter = Arc::new(RecordingConverter {
            fail: true,
            ..Default::default()
        });
        let err = PdfGenerator::new(converter)
            .generate("<p>ok</p>", &json!({}))
            .unwrap_err();
        assert!(err.is_conversion());
    }
}
