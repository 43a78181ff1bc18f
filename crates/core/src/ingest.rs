use crate::error::IngestError;
use crate::extractor::{extract_document_text, PdfExtractor};
use crate::models::{Document, DocumentMetadata};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the pdf files directly inside `folder`, sorted for reproducible
/// ingestion order. Subdirectories are not descended into.
pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !folder.is_dir() {
        return Err(IngestError::NoInputFolder(folder.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

pub struct ExtractionReport {
    pub documents: Vec<Document>,
    pub skipped_files: Vec<SkippedPdf>,
}

/// Extracts every pdf in `folder` into a `Document`, skipping files that
/// fail to parse or extract to nothing but recording why. Fails only when
/// the folder itself is unusable: missing, holding no pdfs, or yielding no
/// non-empty document at all.
pub fn load_documents<E: PdfExtractor>(
    folder: &Path,
    extractor: &E,
) -> Result<ExtractionReport, IngestError> {
    let files = discover_pdf_files(folder)?;

    if files.is_empty() {
        return Err(IngestError::NoDocumentsFound(folder.display().to_string()));
    }

    let mut documents = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        match load_single_document(&path, extractor) {
            Ok(Some(document)) => documents.push(document),
            Ok(None) => skipped_files.push(SkippedPdf {
                path,
                reason: "no extractable text".to_string(),
            }),
            Err(error) => skipped_files.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    if documents.is_empty() {
        return Err(IngestError::EmptyCorpus);
    }

    Ok(ExtractionReport {
        documents,
        skipped_files,
    })
}

fn load_single_document<E: PdfExtractor>(
    path: &Path,
    extractor: &E,
) -> Result<Option<Document>, IngestError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?;

    let text = extract_document_text(extractor, path)?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(Document {
        text,
        metadata: DocumentMetadata {
            source: name.to_string(),
            file_path: path.to_string_lossy().to_string(),
        },
    }))
}
