//! Gemini REST provider for the embed and generate capabilities.
//!
//! This is the only crate that talks to the network. Calls are blocking
//! and never retried here; the engine treats them as slow external I/O and
//! holds no locks across them. Everything inside the pipeline is tested
//! against deterministic stubs instead of this provider.

use serde::{Deserialize, Serialize};
use tracing::debug;

use lectura_core::traits::{EmbedProvider, GenerateProvider};
use lectura_core::{Error, Result};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Dimensionality of `text-embedding-004` vectors.
const EMBED_DIM: usize = 768;
/// Very long chunks are clipped before embedding, as the API rejects them.
const MAX_EMBED_CHARS: usize = 8000;

pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";
pub const DEFAULT_GENERATE_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    embed_model: String,
    generate_model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_models(
            api_key,
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_GENERATE_MODEL.to_string(),
        )
    }

    pub fn with_models(api_key: String, embed_model: String, generate_model: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            embed_model,
            generate_model,
        }
    }

    fn post<Req, Resp>(&self, url: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .map_err(|e| Error::Provider(format!("gemini request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Provider(format!(
                "gemini returned {status} for {url}"
            )));
        }
        response
            .json()
            .map_err(|e| Error::Provider(format!("malformed gemini response: {e}")))
    }
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl EmbedProvider for GeminiProvider {
    fn dim(&self) -> usize {
        EMBED_DIM
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{BASE_URL}/models/{}:embedContent", self.embed_model);
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let request = EmbedRequest {
                model: format!("models/{}", self.embed_model),
                content: Content {
                    parts: vec![Part {
                        text: truncate_chars(text, MAX_EMBED_CHARS),
                    }],
                },
            };
            let response: EmbedResponse = self.post(&url, &request)?;
            if response.embedding.values.len() != EMBED_DIM {
                return Err(Error::Provider(format!(
                    "gemini embedding has dimension {}, expected {EMBED_DIM}",
                    response.embedding.values.len()
                )));
            }
            embeddings.push(response.embedding.values);
        }
        debug!(count = embeddings.len(), model = %self.embed_model, "embedded batch");
        Ok(embeddings)
    }
}

impl GenerateProvider for GeminiProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{BASE_URL}/models/{}:generateContent", self.generate_model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        let response: GenerateResponse = self.post(&url, &request)?;
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| Error::Provider("gemini response contained no candidates".to_string()))
    }
}

/// Clip on character boundaries, never mid code point.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
