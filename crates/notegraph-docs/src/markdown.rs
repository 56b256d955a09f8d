//! Markdown intermediate for note export, and import title derivation.

use notegraph_core::defaults::UNTITLED_NOTE_TITLE;

/// Render a note to the Markdown document fed to pandoc.
///
/// Layout: an H1 title, the body, then a Tags section of `#tag` lines when
/// the note has tags. An empty title renders as "Untitled".
pub fn note_to_markdown(title: &str, content: &str, tags: &[String]) -> String {
    let title = title.trim();
    let mut doc = format!(
        "# {}\n",
        if title.is_empty() { "Untitled" } else { title }
    );

    let content = content.trim_end();
    if !content.is_empty() {
        doc.push('\n');
        doc.push_str(content);
        doc.push('\n');
    }

    if !tags.is_empty() {
        doc.push_str("\n## Tags\n\n");
        for tag in tags {
            doc.push_str(&format!("#{}\n", tag));
        }
    }

    doc
}

/// Derive a note title from an uploaded filename.
///
/// The final extension is stripped; a name that yields nothing usable falls
/// back to "Untitled Note".
pub fn title_from_filename(filename: &str) -> String {
    let name = filename.trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };
    let stem = stem.trim();
    if stem.is_empty() {
        UNTITLED_NOTE_TITLE.to_string()
    } else {
        stem.to_string()
    }
}
