//! # notegraph-docs
//!
//! Document interchange codec for notegraph: plain-text extraction from
//! PDF/DOCX uploads and rendering of notes back to PDF/DOCX byte streams.
//!
//! Conversion is delegated to external tools, `pdftotext` (poppler-utils)
//! for PDF extraction and `pandoc` for everything else, each invocation
//! guarded by a per-command timeout and fed through self-cleaning temp files.

pub mod markdown;
pub mod pandoc;

pub use markdown::{note_to_markdown, title_from_filename};
pub use pandoc::PandocCodec;
