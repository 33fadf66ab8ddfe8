//! Cached translation and summarization over the generation provider.
//!
//! These wrap the same external capability as answer synthesis but run on
//! the whole transcript, so long inputs are split into paragraph groups
//! and the prompt is applied per group. Results are memoized in the shared
//! cache under their own operation tags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use lectura_core::cache::{Operation, ResultCache};
use lectura_core::traits::GenerateProvider;
use lectura_core::{Error, Result};

/// Largest text block sent to the provider in one call.
pub const MAX_PROMPT_CHARS: usize = 4000;

const MIN_TRANSLATE_CHARS: usize = 10;
const MIN_SUMMARIZE_CHARS: usize = 20;

const TRANSLATION_PROMPT: &str = "You are a professional translator. Translate the following English text to Burmese (Myanmar language).
Preserve technical terms where possible. Maintain the original structure and tone.
Provide only the translated text without any additional commentary.";

const ENGLISH_SUMMARY_PROMPT: &str = "You are an educational assistant. Summarize the following English text for B1-B2 level students.
Keep the summary clear, concise, and suitable for learners. Focus on main points and key takeaways.
Use simple academic language. Provide only the summary without additional commentary.";

const BURMESE_SUMMARY_PROMPT: &str = "You are an educational assistant. Summarize the following English text in Burmese (Myanmar language) for B1-B2 level students.
Keep the summary clear, concise, and suitable for learners. Focus on main points and key takeaways.
Preserve important technical terms. Provide only the summary without additional commentary.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summaries {
    pub english: String,
    pub burmese: String,
}

/// Translate English transcript text to Burmese. Returns the translation
/// and whether it was served from cache.
pub fn translate(
    cache: &ResultCache,
    generator: &dyn GenerateProvider,
    text: &str,
) -> Result<(String, bool)> {
    if text.trim().chars().count() < MIN_TRANSLATE_CHARS {
        return Err(Error::Validation("text is too short to translate".to_string()));
    }
    if let Some(hit) = cache.get(Operation::Translation, text) {
        if let Some(cached) = hit.as_str() {
            debug!("translation served from cache");
            return Ok((cached.to_string(), true));
        }
    }

    let translated = run_prompt(generator, TRANSLATION_PROMPT, text)?;
    cache.set(Operation::Translation, text, Value::String(translated.clone()));
    Ok((translated, false))
}

/// Produce English and Burmese summaries. `from_cache` is true only when
/// both came from the cache.
pub fn summarize(
    cache: &ResultCache,
    generator: &dyn GenerateProvider,
    text: &str,
) -> Result<(Summaries, bool)> {
    if text.trim().chars().count() < MIN_SUMMARIZE_CHARS {
        return Err(Error::Validation("text is too short to summarize".to_string()));
    }

    let (english, english_hit) = cached_prompt(cache, generator, Operation::SummaryEn, ENGLISH_SUMMARY_PROMPT, text)?;
    let (burmese, burmese_hit) = cached_prompt(cache, generator, Operation::SummaryMm, BURMESE_SUMMARY_PROMPT, text)?;

    Ok((Summaries { english, burmese }, english_hit && burmese_hit))
}

fn cached_prompt(
    cache: &ResultCache,
    generator: &dyn GenerateProvider,
    operation: Operation,
    prompt: &str,
    text: &str,
) -> Result<(String, bool)> {
    if let Some(hit) = cache.get(operation, text) {
        if let Some(cached) = hit.as_str() {
            debug!(tag = operation.tag(), "summary served from cache");
            return Ok((cached.to_string(), true));
        }
    }
    let output = run_prompt(generator, prompt, text)?;
    cache.set(operation, text, Value::String(output.clone()));
    Ok((output, false))
}

/// Apply `prompt` to each paragraph group of `text` and join the results.
fn run_prompt(generator: &dyn GenerateProvider, prompt: &str, text: &str) -> Result<String> {
    let mut parts = Vec::new();
    for group in group_paragraphs(text, MAX_PROMPT_CHARS) {
        parts.push(generator.generate(&format!("{prompt}\n\nText:\n{group}"))?);
    }
    Ok(parts.join("\n\n"))
}

/// Greedily accumulate blank-line paragraphs into groups of at most
/// `max_chars`. A single oversized paragraph stays whole.
fn group_paragraphs(text: &str, max_chars: usize) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current = String::new();
    for paragraph in text.split("\n\n") {
        if !current.is_empty() && current.len() + paragraph.len() + 2 > max_chars {
            groups.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(paragraph);
        current.push_str("\n\n");
    }
    if !current.trim().is_empty() {
        groups.push(current.trim().to_string());
    }
    if groups.is_empty() {
        groups.push(text.to_string());
    }
    groups
}
