//! Generators module - rendering strategies that turn a template source and a
//! payload into output bytes.
//!
//! - `CsvGenerator` - text templating with CSV field helpers
//! - `PdfGenerator` - HTML templating with auto-escaping, converted to PDF
//!
//! `GeneratorRegistry` maps a template's output format onto one of these.

pub mod common;
pub mod csv;
pub mod engine;
pub mod pdf;
pub mod registry;
pub mod traits;

pub use csv::CsvGenerator;
pub use engine::{HtmlToPdf, Orientation, PageSize, PdfOptions, WkHtmlToPdf};
pub use pdf::PdfGenerator;
pub use registry::{GeneratorKind, GeneratorRegistry};
pub use traits::Generator;

use minijinja::value::Value as TemplateValue;
use minijinja::{AutoEscape, Environment};
use serde_json::Value;
use thiserror::Error;

use self::common::{csv_join, csv_quote, CsvField};

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid template: {0}")]
    TemplateSyntax(String),
    #[error("failed to render template: {0}")]
    Render(String),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("PDF converter execution failed: {0}")]
    ConverterIo(#[source] std::io::Error),
    #[error("PDF converter exited with status {code}: {stderr}")]
    ConverterExit { code: i32, stderr: String },
    #[error("PDF converter killed after {0:?}")]
    ConverterTimeout(std::time::Duration),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
}

impl GeneratorError {
    /// Whether the failure happened after templating, while producing the PDF.
    pub fn is_conversion(&self) -> bool {
        !matches!(self, Self::TemplateSyntax(_) | Self::Render(_))
    }
}

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedOutput {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Build a template environment with the CSV helpers registered as both
/// filters and functions.
pub(crate) fn template_environment<'source>(auto_escape: AutoEscape) -> Environment<'source> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(move |_| auto_escape.clone());
    env.add_filter("csv_quote", csv_quote_helper);
    env.add_filter("csv_join", csv_join_helper);
    env.add_filter("csv_str", csv_str_helper);
    env.add_function("csv_quote", csv_quote_helper);
    env.add_function("csv_join", csv_join_helper);
    env.add_function("csv_str", csv_str_helper);
    env
}

/// Render `source` against `data`, keeping syntax and execution failures apart.
pub(crate) fn render_template(
    auto_escape: AutoEscape,
    source: &str,
    data: &Value,
) -> Result<String, GeneratorError> {
    let env = template_environment(auto_escape);
    let template = env
        .template_from_str(source)
        .map_err(|err| GeneratorError::TemplateSyntax(err.to_string()))?;
    template
        .render(template_context(data))
        .map_err(|err| GeneratorError::Render(err.to_string()))
}

/// Object payloads expose their keys as top-level variables; anything else is
/// reachable as `data`.
fn template_context(data: &Value) -> TemplateValue {
    match data {
        Value::Object(_) => TemplateValue::from_serialize(data),
        other => minijinja::context! { data => TemplateValue::from_serialize(other) },
    }
}

fn csv_quote_helper(value: TemplateValue) -> String {
    csv_quote(&value.to_csv_field())
}

fn csv_join_helper(items: Vec<TemplateValue>) -> String {
    csv_join(items.iter().map(CsvField::to_csv_field))
}

fn csv_str_helper(value: TemplateValue) -> String {
    value.to_csv_field()
}
