//! The chain-scoring kernel
//!
//! Path score for pair (i, j) is `scores_1[i] + scores_2[i][j]`: both hops
//! report additive relevance scores from the same engine, so no rescaling or
//! renormalization happens here. All k*k paths are ranked and the best n_sel
//! emitted as (hop-1 id, hop-2 id) chains.

use super::{Chain, ChainSet, QueryChains};
use crate::retrieval::{Hop1Grid, Hop2Grid};
use ndarray::{ArrayView1, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    /// A grid dimension does not match top_k
    #[error("Invalid top_k: {context} has {got} entries, expected {expected}")]
    InvalidTopK {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// n_sel outside 1..=top_k*top_k
    #[error("Invalid selection: n_sel={n_sel} not in 1..={max} (top_k^2)")]
    InvalidSelection { n_sel: usize, max: usize },
}

/// Rank all two-hop paths for a single query and return the best `n_sel`
///
/// Sorting is stable over the row-major flattening, so equal scores resolve
/// to the lower hop-1 index first, then the lower hop-2 index. That order is
/// part of the contract, not an accident: reranking must be reproducible
/// across runs.
pub fn rank_chains(
    scores_1: ArrayView1<f32>,
    scores_2: ArrayView2<f32>,
    ids_1: &[String],
    ids_2: &[Vec<String>],
    top_k: usize,
    n_sel: usize,
) -> Result<ChainSet, RankError> {
    check_shapes(&scores_1, &scores_2, ids_1, ids_2, top_k)?;
    if n_sel == 0 || n_sel > top_k * top_k {
        return Err(RankError::InvalidSelection {
            n_sel,
            max: top_k * top_k,
        });
    }

    // path[i][j] = scores_1[i] + scores_2[i][j]; the hop-1 column vector
    // broadcasts across the k x k hop-2 grid
    let path = &scores_2 + &scores_1.insert_axis(Axis(1));

    let mut triples: Vec<(usize, usize, f32)> = Vec::with_capacity(top_k * top_k);
    for i in 0..top_k {
        for j in 0..top_k {
            triples.push((i, j, path[[i, j]]));
        }
    }

    // Stable sort keeps row-major order among ties
    triples.sort_by(|a, b| b.2.total_cmp(&a.2));
    triples.truncate(n_sel);

    Ok(triples
        .into_iter()
        .map(|(i, j, score)| Chain {
            hop1: ids_1[i].clone(),
            hop2: ids_2[i][j].clone(),
            score,
        })
        .collect())
}

/// Rank every query of a batch independently
///
/// Queries share no state; output order follows input order.
pub fn rank_batch(
    queries: &[String],
    hop1: &Hop1Grid,
    hop2: &Hop2Grid,
    top_k: usize,
    n_sel: usize,
) -> Result<Vec<QueryChains>, RankError> {
    let mut results = Vec::with_capacity(queries.len());
    for (q, query) in queries.iter().enumerate() {
        let chains = rank_chains(
            hop1.scores.row(q),
            hop2.scores.index_axis(Axis(0), q),
            &hop1.phrases[q],
            &hop2.phrases[q],
            top_k,
            n_sel,
        )?;
        results.push(QueryChains {
            query: query.clone(),
            chains,
        });
    }
    Ok(results)
}

fn check_shapes(
    scores_1: &ArrayView1<f32>,
    scores_2: &ArrayView2<f32>,
    ids_1: &[String],
    ids_2: &[Vec<String>],
    top_k: usize,
) -> Result<(), RankError> {
    if scores_1.len() != top_k {
        return Err(RankError::InvalidTopK {
            context: "scores_1",
            expected: top_k,
            got: scores_1.len(),
        });
    }
    if scores_2.shape() != [top_k, top_k] {
        return Err(RankError::InvalidTopK {
            context: "scores_2",
            expected: top_k,
            got: scores_2.len(),
        });
    }
    if ids_1.len() != top_k {
        return Err(RankError::InvalidTopK {
            context: "ids_1",
            expected: top_k,
            got: ids_1.len(),
        });
    }
    if ids_2.len() != top_k || ids_2.iter().any(|row| row.len() != top_k) {
        return Err(RankError::InvalidTopK {
            context: "ids_2",
            expected: top_k,
            got: ids_2.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ids2(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| ids(r)).collect()
    }

    #[test]
    fn test_two_hop_scenario() {
        // path scores: [[1.7, 1.0], [0.8, 1.2]]
        let scores_1 = arr1(&[0.9, 0.5]);
        let scores_2 = arr2(&[[0.8, 0.1], [0.3, 0.7]]);
        let ids_1 = ids(&["A", "B"]);
        let ids_2 = ids2(&[&["A1", "A2"], &["B1", "B2"]]);

        let chains =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 2).unwrap();

        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].hop1, "A");
        assert_eq!(chains[0].hop2, "A1");
        assert!((chains[0].score - 1.7).abs() < 1e-6);
        assert_eq!(chains[1].hop1, "B");
        assert_eq!(chains[1].hop2, "B2");
        assert!((chains[1].score - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_scores_exactly_additive() {
        let scores_1 = arr1(&[0.25, -1.5, 3.0]);
        let scores_2 = arr2(&[[0.1, 0.2, 0.3], [1.0, -2.0, 0.0], [0.5, 0.5, 0.5]]);
        let ids_1 = ids(&["a", "b", "c"]);
        let ids_2 = ids2(&[
            &["a0", "a1", "a2"],
            &["b0", "b1", "b2"],
            &["c0", "c1", "c2"],
        ]);

        let chains =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 3, 9).unwrap();

        // Every path present, each score the exact sum of its hops
        assert_eq!(chains.len(), 9);
        for chain in &chains {
            let i = ids_1.iter().position(|x| *x == chain.hop1).unwrap();
            let j = ids_2[i].iter().position(|x| *x == chain.hop2).unwrap();
            assert_eq!(chain.score, scores_1[i] + scores_2[[i, j]]);
        }
        // Sorted non-increasing
        for pair in chains.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_tie_break_row_major() {
        // All paths score 1.0; order must be (0,0), (0,1), (1,0), (1,1)
        let scores_1 = arr1(&[0.5, 0.5]);
        let scores_2 = arr2(&[[0.5, 0.5], [0.5, 0.5]]);
        let ids_1 = ids(&["X", "Y"]);
        let ids_2 = ids2(&[&["X0", "X1"], &["Y0", "Y1"]]);

        let chains =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 4).unwrap();

        let order: Vec<(&str, &str)> = chains
            .iter()
            .map(|c| (c.hop1.as_str(), c.hop2.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("X", "X0"), ("X", "X1"), ("Y", "Y0"), ("Y", "Y1")]
        );
    }

    #[test]
    fn test_deterministic_across_runs() {
        let scores_1 = arr1(&[0.3, 0.3]);
        let scores_2 = arr2(&[[0.7, 0.2], [0.7, 0.2]]);
        let ids_1 = ids(&["p", "q"]);
        let ids_2 = ids2(&[&["p0", "p1"], &["q0", "q1"]]);

        let first =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 4).unwrap();
        let second =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 4).unwrap();
        assert_eq!(first, second);

        // (0,0) and (1,0) tie at 1.0; lower hop-1 index wins
        assert_eq!(first[0].hop1, "p");
        assert_eq!(first[1].hop1, "q");
    }

    #[test]
    fn test_n_sel_equals_all_paths() {
        let scores_1 = arr1(&[1.0, 0.0]);
        let scores_2 = arr2(&[[0.0, 0.5], [0.25, 0.75]]);
        let ids_1 = ids(&["A", "B"]);
        let ids_2 = ids2(&[&["A0", "A1"], &["B0", "B1"]]);

        let chains =
            rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 4).unwrap();
        assert_eq!(chains.len(), 4);
        for pair in chains.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_invalid_top_k() {
        let scores_1 = arr1(&[0.9]);
        let scores_2 = arr2(&[[0.8, 0.1], [0.3, 0.7]]);
        let ids_1 = ids(&["A"]);
        let ids_2 = ids2(&[&["A1", "A2"], &["B1", "B2"]]);

        let err = rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 2)
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidTopK { .. }));
    }

    #[test]
    fn test_invalid_selection() {
        let scores_1 = arr1(&[0.9, 0.5]);
        let scores_2 = arr2(&[[0.8, 0.1], [0.3, 0.7]]);
        let ids_1 = ids(&["A", "B"]);
        let ids_2 = ids2(&[&["A1", "A2"], &["B1", "B2"]]);

        let err = rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 5)
            .unwrap_err();
        assert!(matches!(
            err,
            RankError::InvalidSelection { n_sel: 5, max: 4 }
        ));

        let err = rank_chains(scores_1.view(), scores_2.view(), &ids_1, &ids_2, 2, 0)
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidSelection { n_sel: 0, .. }));
    }
}
