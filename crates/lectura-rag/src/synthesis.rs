//! Constrained answer synthesis over the top-ranked evidence.
//!
//! The generator only ever sees the bounded context built here; the system
//! instruction forbids outside knowledge, and the evidence gate upstream
//! guarantees we do not call it at all on weak evidence.

use lectura_core::traits::GenerateProvider;
use lectura_core::types::{text_preview, ChunkRef, ScoredChunk};
use lectura_core::Result;

/// How many ranked chunks make it into the generation context.
pub const CONTEXT_CHUNKS: usize = 3;
/// Preview length for provenance entries.
pub const PREVIEW_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions based ONLY on the provided transcript snippets.

IMPORTANT RULES:
1. ONLY use information from the provided snippets
2. DO NOT add any outside knowledge or assumptions
3. If the answer is not in the snippets, say \"I don't have enough information in this transcript to answer that question.\"
4. Answer in the SAME LANGUAGE as the question. If the question is in Burmese, answer in Burmese. If in English, answer in English.
5. Use clear, natural formatting:
   - Use numbered lists (1., 2., 3.) for multiple points
   - Use bullet points (\u{2022}) for sub-items
   - DO NOT use markdown bold (**text**) or italic (*text*)
   - Write in plain text with proper paragraph breaks
6. Be concise and clear in B1-B2 level language
7. Preserve technical terms as-is without translation or modification.";

/// The full prompt: system rules, the question, then the evidence snippets.
pub fn build_prompt(question: &str, evidence: &[ScoredChunk]) -> String {
    let context = evidence
        .iter()
        .enumerate()
        .map(|(i, scored)| format!("Snippet {}:\n{}", i + 1, scored.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{SYSTEM_PROMPT}\n\nQuestion: {question}\n\nTranscript snippets:\n{context}\n\nAnswer:")
}

/// Provenance refs for the evidence shown to the model, in rank order.
pub fn provenance(evidence: &[ScoredChunk]) -> Vec<ChunkRef> {
    evidence
        .iter()
        .map(|scored| ChunkRef {
            chunk_id: scored.chunk.id.clone(),
            score: scored.combined_score,
            text_preview: text_preview(&scored.chunk.text, PREVIEW_CHARS),
            start_time: scored.chunk.start_time,
            end_time: scored.chunk.end_time,
        })
        .collect()
}

/// Invoke the generator on the bounded context. The answer comes back
/// verbatim; no post-processing.
pub fn synthesize(
    generator: &dyn GenerateProvider,
    question: &str,
    evidence: &[ScoredChunk],
) -> Result<String> {
    generator.generate(&build_prompt(question, evidence))
}
