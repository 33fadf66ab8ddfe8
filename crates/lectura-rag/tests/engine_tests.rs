use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use lectura_core::cache::ResultCache;
use lectura_core::traits::{EmbedProvider, GenerateProvider};
use lectura_core::types::{AnswerStatus, Segment};
use lectura_core::{Error, Result};
use lectura_rag::{EngineConfig, RagEngine};

const DIM: usize = 512;

/// Deterministic bag-of-words embedder: each token hashes into a bucket,
/// so texts sharing vocabulary get similar vectors without any model.
struct StubEmbedder {
    fail: Arc<AtomicBool>,
}

impl StubEmbedder {
    fn new(fail: Arc<AtomicBool>) -> Self {
        Self { fail }
    }

    fn embed_one(text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; DIM];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            // Seed 10 keeps every token used in these tests in its own
            // bucket; seed 0 collides "capital" into a lecture token and
            // defeats the off-topic gate scenario.
            let mut hasher = XxHash64::with_seed(10);
            token.hash(&mut hasher);
            let idx = (hasher.finish() as usize) % DIM;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl EmbedProvider for StubEmbedder {
    fn dim(&self) -> usize {
        DIM
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Provider("stub embedder offline".to_string()));
        }
        Ok(texts.iter().map(|t| Self::embed_one(t)).collect())
    }
}

/// Generator stub with a call counter, so tests can prove the evidence
/// gate never reached synthesis.
struct CountingGenerator {
    calls: Arc<AtomicUsize>,
    answer: &'static str,
}

impl GenerateProvider for CountingGenerator {
    fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.to_string())
    }
}

fn lecture_segments() -> Vec<Segment> {
    let texts = [
        "Photosynthesis occurs inside chloroplasts found within plant cells.",
        "Light reactions capture solar energy during daytime.",
        "Carbon fixation happens via Calvin cycle reactions.",
        "Homework assignments are due next Tuesday.",
    ];
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Segment {
            start: i as f64 * 10.0,
            end: i as f64 * 10.0 + 9.5,
            text: (*text).to_string(),
        })
        .collect()
}

struct Fixture {
    engine: RagEngine,
    cache: Arc<ResultCache>,
    generator_calls: Arc<AtomicUsize>,
    embed_fail: Arc<AtomicBool>,
}

fn fixture(answer: &'static str) -> Fixture {
    let cache = Arc::new(ResultCache::new());
    let generator_calls = Arc::new(AtomicUsize::new(0));
    let embed_fail = Arc::new(AtomicBool::new(false));
    let engine = RagEngine::new(
        Box::new(StubEmbedder::new(Arc::clone(&embed_fail))),
        Box::new(CountingGenerator {
            calls: Arc::clone(&generator_calls),
            answer,
        }),
        Arc::clone(&cache),
        EngineConfig {
            top_k: 5,
            score_threshold: 0.6,
            // Small target so every segment becomes its own chunk.
            target_chunk_chars: 10,
        },
    );
    Fixture {
        engine,
        cache,
        generator_calls,
        embed_fail,
    }
}

#[test]
fn query_without_index_is_not_indexed_error() {
    let f = fixture("unused");
    assert!(matches!(
        f.engine.query("anything at all?"),
        Err(Error::NotIndexed)
    ));
}

#[test]
fn empty_inputs_are_rejected_before_any_provider_call() {
    let f = fixture("unused");
    assert!(matches!(
        f.engine.build_index("  ", None),
        Err(Error::Validation(_))
    ));

    let backwards = vec![Segment {
        start: 9.0,
        end: 1.0,
        text: "time travel".to_string(),
    }];
    assert!(matches!(
        f.engine.build_index("text", Some(&backwards)),
        Err(Error::Validation(_))
    ));

    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");
    assert!(matches!(
        f.engine.query("   "),
        Err(Error::Validation(_))
    ));
    assert_eq!(f.generator_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn photosynthesis_question_is_answered_from_the_right_chunk() {
    let f = fixture("Photosynthesis occurs in the chloroplasts.");
    let count = f
        .engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");
    assert_eq!(count, 4);

    let response = f.engine.query("Where does photosynthesis occur?").expect("query");

    assert_eq!(response.status, AnswerStatus::Answered);
    assert!(!response.from_cache);
    assert!(response.answer.contains("chloroplast"));
    assert_eq!(response.top_chunks[0].chunk_id, "seg_0");
    assert_eq!(response.top_chunks[0].start_time, Some(0.0));
    assert_eq!(response.top_chunks[0].end_time, Some(9.5));
    assert!(response.top_chunks.len() <= 3);
    assert_eq!(f.generator_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn repeat_question_is_served_from_cache() {
    let f = fixture("Photosynthesis occurs in the chloroplasts.");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");

    let first = f.engine.query("Where does photosynthesis occur?").expect("query");
    let second = f.engine.query("Where does photosynthesis occur?").expect("query");

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.answer, first.answer);
    assert_eq!(second.status, first.status);
    assert_eq!(
        second
            .top_chunks
            .iter()
            .map(|c| c.chunk_id.as_str())
            .collect::<Vec<_>>(),
        first
            .top_chunks
            .iter()
            .map(|c| c.chunk_id.as_str())
            .collect::<Vec<_>>()
    );
    // The generator ran exactly once across both queries.
    assert_eq!(f.generator_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn off_topic_question_is_gated_without_calling_the_generator() {
    let f = fixture("should never be generated");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");

    let response = f.engine.query("What is the capital of France?").expect("query");

    assert_eq!(response.status, AnswerStatus::InsufficientEvidence);
    assert!(response.answer.starts_with("I can only answer"));
    assert_eq!(f.generator_calls.load(Ordering::SeqCst), 0);

    // The refusal is memoized too.
    let again = f.engine.query("What is the capital of France?").expect("query");
    assert!(again.from_cache);
    assert_eq!(again.status, AnswerStatus::InsufficientEvidence);
    assert_eq!(f.generator_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn burmese_question_gets_a_burmese_refusal() {
    let f = fixture("unused");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");

    let response = f
        .engine
        .query("\u{1015}\u{103C}\u{1004}\u{103A}\u{101E}\u{1005}\u{103A} \u{1019}\u{1031}\u{1038}\u{1001}\u{103D}\u{1014}\u{103A}\u{1038}")
        .expect("query");

    assert_eq!(response.status, AnswerStatus::InsufficientEvidence);
    assert!(response.answer.chars().any(|c| ('\u{1000}'..='\u{109F}').contains(&c)));
}

#[test]
fn plain_text_indexing_uses_sentence_windows() {
    let f = fixture("windowed answer");
    let text: String = (0..12)
        .map(|i| format!("Lecture sentence number {i} covers topic t{i}. "))
        .collect();

    let count = f.engine.build_index(&text, None).expect("build");
    assert_eq!(count, 4);

    let chunks = f.engine.dump_chunks();
    assert!(chunks.iter().all(|c| c.id.starts_with("win_")));
    assert!(chunks.iter().all(|c| c.start_time.is_none() && c.end_time.is_none()));
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.ordinal, i);
    }
}

#[test]
fn empty_segment_list_falls_back_to_window_chunking() {
    let f = fixture("unused");
    let count = f
        .engine
        .build_index("One sentence here. Another one there.", Some(&[]))
        .expect("build");
    assert_eq!(count, 1);
    assert_eq!(f.engine.dump_chunks()[0].id, "win_0");
}

#[test]
fn failed_rebuild_leaves_previous_index_intact() {
    let f = fixture("Photosynthesis occurs in the chloroplasts.");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");
    assert_eq!(f.engine.stats().chunk_count, 4);

    f.embed_fail.store(true, Ordering::SeqCst);
    let err = f.engine.build_index("Replacement transcript. It will not index.", None);
    assert!(matches!(err, Err(Error::Provider(_))));

    // The old index still answers.
    f.embed_fail.store(false, Ordering::SeqCst);
    let stats = f.engine.stats();
    assert!(stats.indexed);
    assert_eq!(stats.chunk_count, 4);
    let response = f.engine.query("Where does photosynthesis occur?").expect("query");
    assert_eq!(response.top_chunks[0].chunk_id, "seg_0");
}

#[test]
fn rebuild_replaces_the_index_wholesale() {
    let f = fixture("unused");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");
    assert_eq!(f.engine.stats().chunk_count, 4);

    let count = f
        .engine
        .build_index("A new transcript. Much shorter than before.", None)
        .expect("rebuild");
    assert_eq!(count, 1);
    assert_eq!(f.engine.stats().chunk_count, 1);
    assert_eq!(f.engine.dump_chunks()[0].id, "win_0");
}

#[test]
fn clear_index_forgets_the_index_but_not_the_cache() {
    let f = fixture("Photosynthesis occurs in the chloroplasts.");
    f.engine
        .build_index("", Some(&lecture_segments()))
        .expect("build");
    f.engine.query("Where does photosynthesis occur?").expect("query");
    let cached_entries = f.cache.len();
    assert_eq!(cached_entries, 1);

    assert!(f.engine.clear_index());
    assert!(!f.engine.clear_index(), "second clear finds nothing");

    let stats = f.engine.stats();
    assert!(!stats.indexed);
    assert_eq!(stats.chunk_count, 0);
    assert!(stats.sample_chunks.is_none());
    assert!(f.engine.dump_chunks().is_empty());

    // Cache lifecycle is independent: the memoized answer still serves.
    assert_eq!(f.cache.len(), cached_entries);
    let cached = f.engine.query("Where does photosynthesis occur?").expect("query");
    assert!(cached.from_cache);

    // A fresh question has no index to run against.
    assert!(matches!(
        f.engine.query("What about light reactions?"),
        Err(Error::NotIndexed)
    ));
}

#[test]
fn stats_expose_a_bounded_sample() {
    let f = fixture("unused");
    let text: String = (0..30)
        .map(|i| format!("Sentence {i} fills the transcript with topic t{i}. "))
        .collect();
    f.engine.build_index(&text, None).expect("build");

    let stats = f.engine.stats();
    assert!(stats.indexed);
    assert!(stats.chunk_count > 5);
    let sample = stats.sample_chunks.expect("sample");
    assert_eq!(sample.len(), 5);
    assert_eq!(sample[0].chunk_id, "win_0");
}

#[test]
fn identical_runs_rank_identically() {
    let question = "Where does photosynthesis occur?";
    let run = || {
        let f = fixture("Photosynthesis occurs in the chloroplasts.");
        f.engine
            .build_index("", Some(&lecture_segments()))
            .expect("build");
        f.engine.query(question).expect("query")
    };

    let first = run();
    let second = run();

    assert_eq!(first.top_chunks.len(), second.top_chunks.len());
    for (a, b) in first.top_chunks.iter().zip(&second.top_chunks) {
        assert_eq!(a.chunk_id, b.chunk_id);
        assert_eq!(a.score.to_bits(), b.score.to_bits(), "score drift on {}", a.chunk_id);
    }
}
