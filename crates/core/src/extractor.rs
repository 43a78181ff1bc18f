use crate::error::IngestError;
use lopdf::Document as PdfDocument;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document =
            PdfDocument::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        Ok(pages)
    }
}

/// Joins page texts into one document string with an inline page marker after
/// each page, so chunk text keeps a trace of where a page ended. A document
/// whose pages hold no text comes back as an empty string; the caller decides
/// whether that is worth reporting.
pub fn assemble_document_text(pages: &[PageText]) -> String {
    let mut text = String::new();
    for page in pages {
        if page.text.trim().is_empty() {
            continue;
        }
        text.push_str(&page.text);
        text.push_str(&format!("\n--- Page {} ---\n", page.number));
    }
    text
}

pub fn extract_document_text<E: PdfExtractor>(
    extractor: &E,
    path: &Path,
) -> Result<String, IngestError> {
    let pages = extractor.extract_pages(path)?;
    Ok(assemble_document_text(&pages))
}
