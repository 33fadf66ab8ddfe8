use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use lectura_core::cache::ResultCache;
use lectura_core::config::Config;
use lectura_core::types::Segment;
use lectura_gemini::GeminiProvider;
use lectura_rag::transform::{summarize, translate};
use lectura_rag::{EngineConfig, RagEngine};
use lectura_text::chunk::{chunk_segments, chunk_windows, DEFAULT_TARGET_CHARS};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <ask|repl|chunks|translate|summarize> [args...]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

/// A `.json` transcript is a segment array with timestamps; anything else
/// is treated as plain text and chunked with sentence windows.
fn load_transcript(path: &Path) -> anyhow::Result<(String, Option<Vec<Segment>>)> {
    let raw = fs::read_to_string(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let segments: Vec<Segment> = serde_json::from_str(&raw)?;
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        Ok((text, Some(segments)))
    } else {
        Ok((raw, None))
    }
}

fn engine_config(config: &Config) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        top_k: config.get_or("rag.top_k", defaults.top_k),
        score_threshold: config.get_or("rag.score_threshold", defaults.score_threshold),
        target_chunk_chars: config.get_or("chunk.target_chars", defaults.target_chunk_chars),
    }
}

fn gemini_key(config: &Config) -> anyhow::Result<String> {
    if let Ok(key) = config.get::<String>("gemini.api_key") {
        return Ok(key);
    }
    env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow::anyhow!("set gemini.api_key in config.toml or GEMINI_API_KEY"))
}

fn build_engine(config: &Config, path: &Path) -> anyhow::Result<RagEngine> {
    let key = gemini_key(config)?;
    let engine = RagEngine::new(
        Box::new(GeminiProvider::new(key.clone())),
        Box::new(GeminiProvider::new(key)),
        Arc::new(ResultCache::new()),
        engine_config(config),
    );

    let (text, segments) = load_transcript(path)?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Indexing {}", path.display()));
    let chunk_count = engine.build_index(&text, segments.as_deref())?;
    spinner.finish_and_clear();
    println!("✅ Indexed {} chunks from {}", chunk_count, path.display());
    Ok(engine)
}

fn print_answer(engine: &RagEngine, question: &str) -> anyhow::Result<()> {
    let response = engine.query(question)?;
    println!("\n{}", response.answer);
    let cached = if response.from_cache { " (cached)" } else { "" };
    println!("\n⏱️  {}ms{}", response.elapsed_ms, cached);
    for chunk in &response.top_chunks {
        let span = match (chunk.start_time, chunk.end_time) {
            (Some(start), Some(end)) => format!(" [{start:.1}s–{end:.1}s]"),
            _ => String::new(),
        };
        println!("  📄 {} ({:.3}){}: {}", chunk.chunk_id, chunk.score, span, chunk.text_preview);
    }
    Ok(())
}

fn run_repl(engine: &RagEngine) -> anyhow::Result<()> {
    println!("Ask questions about the transcript (:stats, :clear, :quit)");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":stats" => {
                let stats = engine.stats();
                println!("indexed: {}, chunks: {}", stats.indexed, stats.chunk_count);
                for sample in stats.sample_chunks.unwrap_or_default() {
                    println!("  {} — {}", sample.chunk_id, sample.text_preview);
                }
            }
            ":clear" => {
                let was_indexed = engine.clear_index();
                println!("cleared (was indexed: {was_indexed})");
            }
            question => {
                if let Err(e) = print_answer(engine, question) {
                    eprintln!("❌ {e}");
                }
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ask" => {
            let (path, question) = match (args.first(), args.get(1)) {
                (Some(path), Some(question)) => (Path::new(path), question.as_str()),
                _ => {
                    eprintln!("Usage: lectura ask <transcript> \"<question>\"");
                    std::process::exit(1);
                }
            };
            let engine = build_engine(&config, path)?;
            print_answer(&engine, question)?;
        }
        "repl" => {
            let path = args.first().map(Path::new).unwrap_or_else(|| {
                eprintln!("Usage: lectura repl <transcript>");
                std::process::exit(1);
            });
            let engine = build_engine(&config, path)?;
            run_repl(&engine)?;
        }
        "chunks" => {
            // Chunk locally, no provider calls.
            let path = args.first().map(Path::new).unwrap_or_else(|| {
                eprintln!("Usage: lectura chunks <transcript>");
                std::process::exit(1);
            });
            let (text, segments) = load_transcript(path)?;
            let target: usize = config.get_or("chunk.target_chars", DEFAULT_TARGET_CHARS);
            let chunks = match segments {
                Some(segments) if !segments.is_empty() => chunk_segments(&segments, target)?,
                _ => chunk_windows(&text)?,
            };
            println!("📊 {} chunks", chunks.len());
            for chunk in &chunks {
                println!("{}", serde_json::to_string(chunk)?);
            }
        }
        "translate" => {
            let path = args.first().map(Path::new).unwrap_or_else(|| {
                eprintln!("Usage: lectura translate <file>");
                std::process::exit(1);
            });
            let text = fs::read_to_string(path)?;
            let cache = ResultCache::new();
            let generator = GeminiProvider::new(gemini_key(&config)?);
            let (translated, from_cache) = translate(&cache, &generator, &text)?;
            if from_cache {
                eprintln!("(cached)");
            }
            println!("{translated}");
        }
        "summarize" => {
            let path = args.first().map(Path::new).unwrap_or_else(|| {
                eprintln!("Usage: lectura summarize <file>");
                std::process::exit(1);
            });
            let text = fs::read_to_string(path)?;
            let cache = ResultCache::new();
            let generator = GeminiProvider::new(gemini_key(&config)?);
            let (summaries, from_cache) = summarize(&cache, &generator, &text)?;
            if from_cache {
                eprintln!("(cached)");
            }
            println!("── English ──\n{}\n", summaries.english);
            println!("── မြန်မာ ──\n{}", summaries.burmese);
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            std::process::exit(1);
        }
    }
    Ok(())
}
