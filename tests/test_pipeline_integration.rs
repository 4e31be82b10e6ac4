//! End-to-end pipeline tests over a canned engine
//!
//! Exercises the full hop1 -> augment -> hop2 -> rank -> document flow with a
//! deterministic in-memory engine, including the abort-on-shortfall contract.

use std::collections::HashMap;
use std::sync::Arc;

use hopchain::config::RetrievalConfig;
use hopchain::engine::{EngineError, PhraseMeta, PhraseSearch, SearchResponse};
use hopchain::pipeline::BatchRunner;

/// Engine with a fixed response table; unknown queries fall back to generated
/// candidates so hop-2 batches always resolve
struct TableEngine {
    /// query text -> (phrase, score) candidates
    table: HashMap<String, Vec<(String, f32)>>,
    /// candidates to return for queries missing from the table
    fallback_per_query: usize,
}

impl PhraseSearch for TableEngine {
    fn search(&self, queries: &[String], top_k: usize) -> Result<SearchResponse, EngineError> {
        let mut phrases = Vec::new();
        let mut metadata = Vec::new();
        for query in queries {
            let candidates: Vec<(String, f32)> = match self.table.get(query) {
                Some(entries) => entries.clone(),
                None => (0..self.fallback_per_query)
                    .map(|c| (format!("{} >> {}", query, c), 0.1 * c as f32))
                    .collect(),
            };
            let taken: Vec<(String, f32)> = candidates.into_iter().take(top_k).collect();
            phrases.push(taken.iter().map(|(p, _)| p.clone()).collect());
            metadata.push(
                taken
                    .iter()
                    .map(|(_, s)| PhraseMeta::from_score(*s))
                    .collect(),
            );
        }
        Ok(SearchResponse { phrases, metadata })
    }
}

fn config(top_k: usize, n_sel: usize) -> RetrievalConfig {
    RetrievalConfig {
        top_k,
        n_sel,
        separator: " ".to_string(),
    }
}

#[test]
fn test_two_queries_end_to_end() {
    let question_a = "What position was held by the actress from Kiss and Tell?";
    let question_b = "Who was known by the stage name Aladin?";

    let mut table = HashMap::new();
    table.insert(
        question_a.to_string(),
        vec![
            ("Shirley Temple".to_string(), 0.9),
            ("Corliss Archer".to_string(), 0.5),
        ],
    );
    table.insert(
        question_b.to_string(),
        vec![
            ("Eenasul Fateh".to_string(), 0.8),
            ("magician".to_string(), 0.4),
        ],
    );
    // Hop-2 rows: "<hop1 phrase> <question>" queries fall through to the
    // fallback, except one pinned row that should dominate question A
    table.insert(
        format!("Shirley Temple {}", question_a),
        vec![
            ("Chief of Protocol".to_string(), 0.8),
            ("child star".to_string(), 0.1),
        ],
    );

    let engine = TableEngine {
        table,
        fallback_per_query: 2,
    };
    let runner = BatchRunner::new(Arc::new(engine), &config(2, 2));

    let queries = vec![question_a.to_string(), question_b.to_string()];
    let document = runner.run(&queries).unwrap();

    assert_eq!(document.len(), 2);
    let entries = document.entries();
    assert_eq!(entries[0].query, question_a);
    assert_eq!(entries[1].query, question_b);

    // Question A: best path is hop1 "Shirley Temple" (0.9) + "Chief of
    // Protocol" (0.8) = 1.7, ahead of every fallback-scored alternative
    assert_eq!(entries[0].chains[0].hop1, "Shirley Temple");
    assert_eq!(entries[0].chains[0].hop2, "Chief of Protocol");
    assert!((entries[0].chains[0].score - 1.7).abs() < 1e-6);

    // Each chain set has exactly n_sel entries, sorted non-increasing
    for entry in entries {
        assert_eq!(entry.chains.len(), 2);
        for pair in entry.chains.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_document_serialization_shape() {
    let engine = TableEngine {
        table: HashMap::new(),
        fallback_per_query: 2,
    };
    let runner = BatchRunner::new(Arc::new(engine), &config(2, 3));

    let queries = vec!["lone question".to_string()];
    let document = runner.run(&queries).unwrap();

    let value = document.to_json();
    let chains = value["lone question"].as_array().unwrap();
    assert_eq!(chains.len(), 3);
    for chain in chains {
        // Every chain serializes as a [hop1_id, hop2_id] pair
        let pair = chain.as_array().unwrap();
        assert_eq!(pair.len(), 2);
        assert!(pair[0].is_string());
        assert!(pair[1].is_string());
    }
}

#[test]
fn test_runs_are_deterministic() {
    let engine = Arc::new(TableEngine {
        table: HashMap::new(),
        fallback_per_query: 3,
    });
    let queries = vec!["q one".to_string(), "q two".to_string()];

    let first = BatchRunner::new(engine.clone(), &config(3, 9))
        .run(&queries)
        .unwrap();
    let second = BatchRunner::new(engine, &config(3, 9))
        .run(&queries)
        .unwrap();

    assert_eq!(first.to_json(), second.to_json());
}

#[test]
fn test_shortfall_aborts_without_output() {
    // Engine can only produce 1 candidate per query; requesting top_k=2 must
    // abort the batch before anything is written
    let engine = TableEngine {
        table: HashMap::new(),
        fallback_per_query: 1,
    };
    let runner = BatchRunner::new(Arc::new(engine), &config(2, 2));

    let temp = tempfile::TempDir::new().unwrap();
    let out_path = temp.path().join("chains.json");

    let queries = vec!["any question".to_string()];
    let result = runner.run(&queries).and_then(|doc| {
        doc.write_json(&out_path)?;
        Ok(doc)
    });

    assert!(result.is_err());
    assert!(!out_path.exists(), "partial output must never be written");
}

#[test]
fn test_n_sel_capped_by_validation_is_honoured() {
    // n_sel == top_k^2 returns every path
    let engine = TableEngine {
        table: HashMap::new(),
        fallback_per_query: 2,
    };
    let runner = BatchRunner::new(Arc::new(engine), &config(2, 4));

    let document = runner.run(&["q".to_string()]).unwrap();
    assert_eq!(document.entries()[0].chains.len(), 4);
}
