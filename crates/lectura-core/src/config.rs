//! Lightweight configuration loader.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `LECTURA_*`
//! env vars. Keys of interest: `gemini.api_key`, `gemini.embed_model`,
//! `gemini.generate_model`, `rag.top_k`, `rag.score_threshold`,
//! `chunk.target_chars`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("LECTURA_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| crate::Error::Validation(format!("failed to get '{key}': {e}")))
    }

    /// Typed lookup with a fallback for absent keys.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.get(key).unwrap_or(default)
    }
}
