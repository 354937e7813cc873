//! Generator registry - maps a template's output format onto a generator.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::csv::{CsvGenerator, CSV_CONTENT_TYPE};
use super::engine::HtmlToPdf;
use super::pdf::{PdfGenerator, PDF_CONTENT_TYPE};
use super::traits::Generator;

/// The closed set of output kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Csv,
    Pdf,
}

impl GeneratorKind {
    /// Kind used for empty or unrecognized output formats.
    pub const DEFAULT: GeneratorKind = GeneratorKind::Csv;

    /// Case-insensitive match on the output format. `pdf` selects PDF;
    /// `csv`, empty and unknown formats select [`GeneratorKind::DEFAULT`].
    pub fn from_output_format(output_format: &str) -> Self {
        match output_format.trim().to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "csv" => Self::Csv,
            _ => Self::DEFAULT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_CONTENT_TYPE,
            Self::Pdf => PDF_CONTENT_TYPE,
        }
    }

    pub fn file_extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table of generators by kind.
///
/// Selection depends only on `(output_format, engine)`; nothing is stored per
/// document.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<GeneratorKind, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    /// An empty registry; every selection fails until kinds are registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// CSV and PDF generators, the latter using `converter`.
    pub fn with_defaults(converter: Arc<dyn HtmlToPdf>) -> Self {
        Self::empty()
            .register(Arc::new(CsvGenerator::new()))
            .register(Arc::new(PdfGenerator::new(converter)))
    }

    pub fn register(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generators.insert(generator.kind(), generator);
        self
    }

    pub fn kinds(&self) -> Vec<GeneratorKind> {
        let mut kinds: Vec<_> = self.generators.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// `None` only when the resolved kind has no registered generator.
    pub fn select(&self, output_format: &str, engine: &str) -> Option<Arc<dyn Generator>> {
        let kind = GeneratorKind::from_output_format(output_format);
        log::debug!(
            "selected {} generator for output_format='{}' engine='{}'",
            kind,
            output_format,
            engine
        );
        self.generators.get(&kind).cloned()
    }
}
