// src/pipeline.rs
//
// End-to-end processing of one filing: read the outline, select the core
// sections, slice them into a request-scoped temporary PDF, convert to
// markdown, persist. Shared by the CLI and the HTTP service. When no
// section matches (or the PDF has no outline at all), the whole document
// is converted unchanged.

use crate::convert::Converter;
use crate::pdf;
use crate::selector::SectionSelector;
use crate::storage::{StorageManager, TempPdf};
use crate::utils::AppError;
use std::path::{Path, PathBuf};

/// Result of processing a single filing.
#[derive(Debug)]
pub struct FilingAnalysis {
    pub content: String,
    pub md_path: PathBuf,
    pub original_path: PathBuf,
    /// Pages in the document that was actually converted.
    pub extracted_pages: u32,
    /// Number of selected page ranges; 0 means whole-document pass-through.
    pub selected_sections: usize,
}

pub async fn process_filing(
    pdf_path: &Path,
    selector: &SectionSelector,
    converter: &Converter,
    storage: &StorageManager,
) -> Result<FilingAnalysis, AppError> {
    if !pdf_path.is_file() {
        return Err(AppError::Config(format!(
            "source file not found: {}",
            pdf_path.display()
        )));
    }

    let doc = pdf::load_filing(pdf_path)?;
    let total_pages = pdf::page_count(&doc);
    let outline = pdf::read_outline(&doc);
    tracing::debug!(
        entries = outline.len(),
        pages = total_pages,
        "loaded filing outline"
    );

    let ranges = selector.select(&outline, total_pages);

    // The guard must stay alive across the conversion call so the sliced
    // file is removed on every exit path.
    let slice_guard = if ranges.is_empty() {
        tracing::info!(
            path = %pdf_path.display(),
            "no sections matched; converting the whole document"
        );
        None
    } else {
        tracing::info!(sections = ranges.len(), "slicing filing to selected sections");
        let bytes = pdf::extract_ranges(&doc, &ranges)?;
        Some(TempPdf::create(pdf_path, &bytes)?)
    };

    let (target_path, extracted_pages) = match &slice_guard {
        Some(guard) => (
            guard.path().to_path_buf(),
            ranges.iter().map(|r| r.page_count()).sum(),
        ),
        None => (pdf_path.to_path_buf(), total_pages),
    };

    let content = converter.convert(&target_path).await?;

    let md_path = storage.save_markdown(pdf_path, &content)?;
    storage.save_metadata(pdf_path, &md_path, extracted_pages)?;

    Ok(FilingAnalysis {
        content,
        md_path,
        original_path: pdf_path.to_path_buf(),
        extracted_pages,
        selected_sections: ranges.len(),
    })
}
