use lectura_core::Error;
use lectura_vector::VectorIndex;

fn filled_index() -> VectorIndex {
    let mut index = VectorIndex::new(3);
    index.insert("a".to_string(), vec![1.0, 0.0, 0.0]).expect("insert");
    index.insert("b".to_string(), vec![0.0, 1.0, 0.0]).expect("insert");
    index.insert("c".to_string(), vec![0.7, 0.7, 0.0]).expect("insert");
    index
}

#[test]
fn search_returns_most_similar_first() {
    let index = filled_index();
    let hits = index.search(&[1.0, 0.0, 0.0], 3).expect("search");

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[1].id, "c");
    assert_eq!(hits[2].id, "b");
}

#[test]
fn similarity_lands_in_unit_interval() {
    let mut index = VectorIndex::new(2);
    index.insert("same".to_string(), vec![1.0, 0.0]).expect("insert");
    index.insert("opposite".to_string(), vec![-1.0, 0.0]).expect("insert");
    index.insert("orthogonal".to_string(), vec![0.0, 1.0]).expect("insert");

    let hits = index.search(&[1.0, 0.0], 3).expect("search");

    let by_id = |id: &str| {
        hits.iter()
            .find(|h| h.id == id)
            .map(|h| h.similarity)
            .expect("hit")
    };
    // Known-range mapping: cos 1 -> 1.0, cos 0 -> 0.5, cos -1 -> 0.0.
    assert!((by_id("same") - 1.0).abs() < 1e-6);
    assert!((by_id("orthogonal") - 0.5).abs() < 1e-6);
    assert!(by_id("opposite").abs() < 1e-6);
}

#[test]
fn k_larger_than_index_returns_everything() {
    let index = filled_index();
    let hits = index.search(&[0.0, 1.0, 0.0], 100).expect("search");
    assert_eq!(hits.len(), 3);
}

#[test]
fn dimension_mismatch_is_rejected() {
    let mut index = VectorIndex::new(3);
    assert!(matches!(
        index.insert("bad".to_string(), vec![1.0, 0.0]),
        Err(Error::Validation(_))
    ));

    let index = filled_index();
    assert!(matches!(
        index.search(&[1.0, 0.0], 3),
        Err(Error::Validation(_))
    ));
}

#[test]
fn ties_keep_insertion_order() {
    let mut index = VectorIndex::new(2);
    // All identical vectors: every similarity ties at 1.0.
    for id in ["first", "second", "third"] {
        index.insert(id.to_string(), vec![0.5, 0.5]).expect("insert");
    }

    let hits = index.search(&[0.5, 0.5], 3).expect("search");
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn zero_vector_scores_midpoint_not_nan() {
    let mut index = VectorIndex::new(2);
    index.insert("zero".to_string(), vec![0.0, 0.0]).expect("insert");

    let hits = index.search(&[1.0, 0.0], 1).expect("search");
    assert!((hits[0].similarity - 0.5).abs() < 1e-6);
}

#[test]
fn empty_index_returns_no_hits() {
    let index = VectorIndex::new(4);
    assert!(index.is_empty());
    let hits = index.search(&[0.0, 0.0, 0.0, 1.0], 5).expect("search");
    assert!(hits.is_empty());
}
