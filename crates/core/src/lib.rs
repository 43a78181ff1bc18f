pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod indexer;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod relevance;
pub mod retrieval;
pub mod stores;
pub mod synthesis;
pub mod traits;

pub use chunking::{split_document, split_text, ChunkingConfig};
pub use embeddings::{
    Embedder, OpenAiEmbedder, DEFAULT_API_BASE, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_EMBEDDING_MODEL,
};
pub use error::{IngestError, QueryError};
pub use extractor::{extract_document_text, LopdfExtractor, PageText, PdfExtractor};
pub use generation::{OpenAiGenerator, DEFAULT_CHAT_MODEL};
pub use indexer::{index_documents, IndexSummary};
pub use ingest::{discover_pdf_files, load_documents, ExtractionReport, SkippedPdf};
pub use models::{
    Chunk, Confidence, Document, DocumentMetadata, IndexEntry, IngestionOptions, QueryResult,
    ScoredChunk,
};
pub use orchestrator::QueryWorkflow;
pub use relevance::assess;
pub use retrieval::{Retriever, DEFAULT_TOP_K};
pub use stores::{DiskVectorStore, InMemoryVectorStore};
pub use synthesis::{build_context, build_prompt, synthesize};
pub use traits::{Generator, VectorIndex};
