use crate::models::ScoredChunk;
use crate::traits::Generator;
use crate::QueryError;

/// Renders retrieved chunks into the grounding context: one block per chunk
/// in retrieval order, each headed by its source file, blank-line separated.
pub fn build_context(retrieved: &[ScoredChunk]) -> String {
    retrieved
        .iter()
        .map(|scored| {
            format!(
                "From {}:\n{}",
                scored.chunk.metadata.source, scored.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an expert document analyst. Use the provided document context to \
answer the user's question comprehensively.

Guidelines:
- Answer based only on the information in the provided documents
- If the documents don't contain enough information, say so clearly
- Cite which documents you're referencing
- Provide specific details and examples when available
- If there is conflicting information, mention it

Context from documents:
{context}

Question: {question}

Please provide a detailed answer based on the document context."
    )
}

/// One blocking generation call over the assembled prompt. An empty
/// retrieved set still goes to the generator with an empty context section;
/// the prompt's insufficiency rule makes the generator say there is nothing
/// to answer from.
pub async fn synthesize<G>(
    generator: &G,
    question: &str,
    retrieved: &[ScoredChunk],
) -> Result<String, QueryError>
where
    G: Generator + Send + Sync,
{
    let context = build_context(retrieved);
    let prompt = build_prompt(question, &context);
    generator.generate(&prompt).await
}
