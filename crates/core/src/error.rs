use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("documents folder not found: {0}")]
    NoInputFolder(String),

    #[error("no pdf files found in {0}")]
    NoDocumentsFound(String),

    #[error("every document extracted to empty text; nothing to index")]
    EmptyCorpus,

    #[error(transparent)]
    Service(#[from] QueryError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("index has not been built yet: {0}")]
    IndexNotReady(String),

    #[error("system not initialized; build the index before asking questions")]
    NotInitialized,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("{backend} call timed out")]
    Timeout { backend: String },

    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    /// Folds a reqwest failure into the taxonomy: timeouts become recoverable
    /// `Timeout` errors instead of opaque transport failures.
    pub fn from_http(backend: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            QueryError::Timeout {
                backend: backend.to_string(),
            }
        } else {
            QueryError::Http(error)
        }
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corpus_message_names_the_problem() {
        let message = IngestError::EmptyCorpus.to_string();
        assert!(message.contains("empty text"));
    }

    #[test]
    fn service_errors_pass_through_unchanged() {
        let wrapped = IngestError::from(QueryError::EmptyQuestion);
        assert_eq!(wrapped.to_string(), QueryError::EmptyQuestion.to_string());
    }
}
