//! HTML to PDF conversion engine.
//!
//! Handles the low-level details of writing HTML to a temporary file, invoking
//! the `wkhtmltopdf` converter, and reading back the PDF.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

use super::GeneratorError;

pub const DEFAULT_WKHTMLTOPDF_BIN: &str = "wkhtmltopdf";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A4 => "A4",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        })
    }
}

/// Page settings handed to the converter. Defaults to A4, portrait, 96 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub dpi: u32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            dpi: 96,
        }
    }
}

impl PdfOptions {
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--page-size".to_string(),
            self.page_size.to_string(),
            "--orientation".to_string(),
            self.orientation.to_string(),
            "--dpi".to_string(),
            self.dpi.to_string(),
        ]
    }
}

/// Converts rendered HTML into PDF bytes.
pub trait HtmlToPdf: Send + Sync {
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, GeneratorError>;
}

/// Stateless converter that shells out to `wkhtmltopdf`.
///
/// With a timeout set, a conversion that runs longer is killed and reported as
/// [`GeneratorError::ConverterTimeout`].
#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for WkHtmlToPdf {
    fn default() -> Self {
        Self::new(DEFAULT_WKHTMLTOPDF_BIN)
    }
}

impl WkHtmlToPdf {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl HtmlToPdf for WkHtmlToPdf {
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, GeneratorError> {
        // one scratch directory per conversion
        let temp_dir = tempdir().map_err(GeneratorError::TempDir)?;
        let html_path = temp_dir.path().join("document.html");
        let pdf_path = temp_dir.path().join("document.pdf");
        let stderr_path = temp_dir.path().join("stderr.log");

        fs::write(&html_path, html).map_err(GeneratorError::WriteHtml)?;
        let stderr_file = File::create(&stderr_path).map_err(GeneratorError::TempDir)?;

        let mut child = Command::new(&self.binary)
            .args(options.to_args())
            .arg(&html_path)
            .arg(&pdf_path)
            .current_dir(temp_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr_file)
            .spawn()
            .map_err(GeneratorError::ConverterIo)?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait().map_err(GeneratorError::ConverterIo)? {
                break status;
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    if let Err(e) = child.kill() {
                        log::warn!("failed to kill {}: {}", self.binary.display(), e);
                    }
                    let _ = child.wait();
                    log::warn!(
                        "{} killed after {:?}",
                        self.binary.display(),
                        timeout
                    );
                    return Err(GeneratorError::ConverterTimeout(timeout));
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            let stderr = fs::read_to_string(&stderr_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            log::warn!(
                "{} exited with status {}: {}",
                self.binary.display(),
                code,
                stderr
            );
            return Err(GeneratorError::ConverterExit { code, stderr });
        }

        fs::read(&pdf_path).map_err(GeneratorError::ReadPdf)
    }
}
