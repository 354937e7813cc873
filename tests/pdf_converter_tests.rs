//! Tests for the external PDF converter using stand-in shell scripts.
#![cfg(unix)]

use document_generator::generators::{
    Generator, GeneratorError, HtmlToPdf, PdfGenerator, PdfOptions, WkHtmlToPdf,
};
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// Scripts are written and executed from a single test so no concurrent fork
// can hold them open for writing.
#[test]
fn test_converter_process_outcomes() {
    let dir = tempfile::tempdir().unwrap();

    let ok = write_script(
        dir.path(),
        "fake-ok",
        r#"for last; do :; done
cat "$(dirname "$last")/document.html" > "$last""#,
    );
    let generator = PdfGenerator::new(Arc::new(WkHtmlToPdf::new(&ok)));
    let output = generator
        .generate("<p>{{ name }}</p>", &json!({ "name": "Ann" }))
        .unwrap();
    assert_eq!(output.content_type, "application/pdf");
    assert_eq!(output.bytes, b"<p>Ann</p>".to_vec());

    let failing = write_script(dir.path(), "fake-fail", "echo boom >&2\nexit 3");
    let err = WkHtmlToPdf::new(&failing)
        .convert("<p></p>", &PdfOptions::default())
        .unwrap_err();
    match err {
        GeneratorError::ConverterExit { code, stderr } => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }

    let silent = write_script(dir.path(), "fake-silent", "exit 0");
    let err = WkHtmlToPdf::new(&silent)
        .convert("<p></p>", &PdfOptions::default())
        .unwrap_err();
    assert!(matches!(err, GeneratorError::ReadPdf(_)));

    let hanging = write_script(dir.path(), "fake-hang", "exec sleep 30");
    let started = Instant::now();
    let err = WkHtmlToPdf::new(&hanging)
        .with_timeout(Duration::from_millis(200))
        .convert("<p></p>", &PdfOptions::default())
        .unwrap_err();
    assert!(matches!(err, GeneratorError::ConverterTimeout(_)));
    assert!(err.is_conversion());
    assert!(started.elapsed() < Duration::from_secs(10));

    let missing = WkHtmlToPdf::new(dir.path().join("does-not-exist"));
    let err = missing
        .convert("<p></p>", &PdfOptions::default())
        .unwrap_err();
    assert!(matches!(err, GeneratorError::ConverterIo(_)));
    assert!(err.is_conversion());
}
