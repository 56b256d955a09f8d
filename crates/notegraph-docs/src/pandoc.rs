//! External-tool codec: `pdftotext` for PDF extraction, `pandoc` for DOCX
//! extraction and for rendering notes back to PDF/DOCX.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use notegraph_core::defaults::CONVERT_CMD_TIMEOUT_SECS;
use notegraph_core::{DocumentCodec, DocumentFormat, Error, Result};

use crate::markdown::note_to_markdown;

/// Codec backed by poppler-utils and pandoc.
///
/// Input bytes are validated by magic before any tool runs: `%PDF` for PDF,
/// `PK` (ZIP) for DOCX. Every invocation works on a temp file and is guarded
/// by a per-command timeout.
pub struct PandocCodec;

/// Run a command with a timeout, returning stdout as a string.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    let output = tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::Codec(format!(
                "External command timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| Error::Codec(format!("Failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Codec(format!(
            "Command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Write upload bytes to a temp file with the given suffix.
fn write_temp_file(data: &[u8], suffix: &str) -> Result<NamedTempFile> {
    let mut tmpfile = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .map_err(|e| Error::Codec(format!("Failed to create temp file: {}", e)))?;
    tmpfile
        .write_all(data)
        .map_err(|e| Error::Codec(format!("Failed to write temp file: {}", e)))?;
    Ok(tmpfile)
}

fn validate_magic(data: &[u8], format: DocumentFormat) -> Result<()> {
    match format {
        DocumentFormat::Pdf => {
            if data.len() < 4 || &data[0..4] != b"%PDF" {
                return Err(Error::InvalidInput(
                    "Not a valid PDF (missing %PDF header)".to_string(),
                ));
            }
        }
        DocumentFormat::Docx => {
            if data.len() < 2 || &data[0..2] != b"PK" {
                return Err(Error::InvalidInput(
                    "Not a valid DOCX (missing ZIP header)".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Whether a binary is runnable. `pdftotext -v` prints its version to stderr
/// and exits with 0 or 99 depending on the version; both mean it exists.
async fn binary_available(program: &str, arg: &str) -> bool {
    match Command::new(program).arg(arg).output().await {
        Ok(output) => output.status.success() || output.status.code() == Some(99),
        Err(_) => false,
    }
}

#[async_trait]
impl DocumentCodec for PandocCodec {
    async fn extract_text(&self, data: &[u8], format: DocumentFormat) -> Result<String> {
        if data.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot extract text from an empty upload".to_string(),
            ));
        }
        validate_magic(data, format)?;

        let tmpfile = write_temp_file(data, &format!(".{}", format.extension()))?;
        let tmp_path = tmpfile.path().to_string_lossy().to_string();

        let text = match format {
            DocumentFormat::Pdf => {
                debug!(
                    subsystem = "docs",
                    component = "pdftotext",
                    op = "extract_text",
                    "Extracting PDF text"
                );
                run_cmd_with_timeout(
                    Command::new("pdftotext").arg(&tmp_path).arg("-"),
                    CONVERT_CMD_TIMEOUT_SECS,
                )
                .await?
            }
            DocumentFormat::Docx => {
                debug!(
                    subsystem = "docs",
                    component = "pandoc",
                    op = "extract_text",
                    "Extracting DOCX text"
                );
                run_cmd_with_timeout(
                    Command::new("pandoc")
                        .arg("-f")
                        .arg("docx")
                        .arg("-t")
                        .arg("plain")
                        .arg("--wrap=none")
                        .arg(&tmp_path),
                    CONVERT_CMD_TIMEOUT_SECS,
                )
                .await?
            }
        };

        Ok(text)
    }

    async fn render(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
        format: DocumentFormat,
    ) -> Result<Vec<u8>> {
        let markdown = note_to_markdown(title, content, tags);
        let input = write_temp_file(markdown.as_bytes(), ".md")?;
        let input_path = input.path().to_string_lossy().to_string();

        let output = tempfile::Builder::new()
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .map_err(|e| Error::Codec(format!("Failed to create temp file: {}", e)))?;
        let output_path = output.path().to_string_lossy().to_string();

        let mut cmd = Command::new("pandoc");
        cmd.arg("-f")
            .arg("markdown")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path);

        if format == DocumentFormat::Pdf {
            // wkhtmltopdf/weasyprint/typst all work; default engine needs a
            // LaTeX install, so deployments usually override this.
            if let Ok(engine) = std::env::var("PANDOC_PDF_ENGINE") {
                cmd.arg(format!("--pdf-engine={}", engine));
            }
        }

        debug!(
            subsystem = "docs",
            component = "pandoc",
            op = "render",
            format = format.extension(),
            "Rendering note"
        );
        run_cmd_with_timeout(&mut cmd, CONVERT_CMD_TIMEOUT_SECS).await?;

        let bytes = tokio::fs::read(output.path())
            .await
            .map_err(|e| Error::Codec(format!("Failed to read rendered output: {}", e)))?;
        if bytes.is_empty() {
            return Err(Error::Codec("Rendered document is empty".to_string()));
        }
        Ok(bytes)
    }

    async fn health_check(&self, format: DocumentFormat) -> Result<bool> {
        let ok = match format {
            // PDF needs pdftotext to extract and pandoc to render
            DocumentFormat::Pdf => {
                binary_available("pdftotext", "-v").await && binary_available("pandoc", "--version").await
            }
            DocumentFormat::Docx => binary_available("pandoc", "--version").await,
        };
        Ok(ok)
    }
}
