/*
 * SimReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

//! Cosine similarities, either of one query against a whole corpus of term vectors or between
//! all pairs of items of a rating matrix. Zero-norm vectors have similarity 0 to everything,
//! including themselves.

use std::time::Instant;

use fnv::FnvHashMap;
use log::{info, warn};

use crate::error::{RecoError, Result};
use crate::ratings::{ItemUserMatrix, MissingRatingPolicy};
use crate::types::{self, DenseMatrix, SparseVector};
use crate::utils;

/// Cosine similarity of the query to every row of the corpus, in row order. Corpus norms are
/// computed in a single pass before scoring.
pub fn similarity_to_all(query: &SparseVector, corpus: &[SparseVector]) -> Vec<(usize, f64)> {

    let query_norm = utils::sparse_norm(query);
    let corpus_norms: Vec<f64> = corpus.iter().map(utils::sparse_norm).collect();

    corpus.iter()
        .zip(corpus_norms.iter())
        .enumerate()
        .map(|(row_index, (row, row_norm))| {
            let denominator = query_norm * row_norm;
            let score = if denominator > 0.0 {
                utils::sparse_dot(query, row) / denominator
            } else {
                0.0
            };
            (row_index, score)
        })
        .collect()
}

/// Pairwise cosine similarities between all items (rows) of the matrix. Only the upper triangle
/// is computed and mirrored, so the result is exactly symmetric.
pub fn similarity_matrix(matrix: &ItemUserMatrix) -> DenseMatrix {

    let start = Instant::now();
    let num_items = matrix.num_items();
    let mut similarities = types::new_dense_matrix(num_items, num_items);

    let norms: Vec<f64> = matrix.rows().iter().map(|row| utils::dense_norm(row)).collect();

    let num_zero_norm = norms.iter().filter(|norm| **norm == 0.0).count();
    if num_zero_norm > 0 {
        warn!("{} items have only zero ratings and will be similar to nothing", num_zero_norm);
    }

    for i in 0..num_items {
        for j in i..num_items {
            let similarity = match matrix.policy() {
                MissingRatingPolicy::Skip => co_rated_cosine(matrix, i, j),
                _ => {
                    let denominator = norms[i] * norms[j];
                    if denominator > 0.0 {
                        utils::dense_dot(matrix.row(i), matrix.row(j)) / denominator
                    } else {
                        0.0
                    }
                },
            };

            similarities[i][j] = similarity;
            similarities[j][i] = similarity;
        }
    }

    info!("Computed {}x{} item similarities over {} users in {}ms", num_items, num_items,
        matrix.num_users(), utils::to_millis(start.elapsed()));

    similarities
}

/// Cosine restricted to the users who rated both items.
fn co_rated_cosine(matrix: &ItemUserMatrix, i: usize, j: usize) -> f64 {

    let (mut dot, mut norm_i, mut norm_j) = (0.0_f64, 0.0_f64, 0.0_f64);

    for (user_index, (a, b)) in matrix.row(i).iter().zip(matrix.row(j).iter()).enumerate() {
        if matrix.is_observed(i, user_index) && matrix.is_observed(j, user_index) {
            dot += a * b;
            norm_i += a * a;
            norm_j += b * b;
        }
    }

    let denominator = norm_i.sqrt() * norm_j.sqrt();
    if denominator > 0.0 {
        dot / denominator
    } else {
        0.0
    }
}

/// Square item similarity matrix, indexed by unique labels on both axes.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    labels: Vec<String>,
    label_indices: FnvHashMap<String, usize>,
    values: DenseMatrix,
}

impl SimilarityMatrix {

    /// Fails if the labels collide or do not match the dimensions of the values.
    pub fn new(labels: Vec<String>, values: DenseMatrix) -> Result<Self> {

        if values.len() != labels.len() || values.iter().any(|row| row.len() != labels.len()) {
            return Err(RecoError::InvalidInput(format!(
                "similarity matrix must be square with one row per label ({} labels)",
                labels.len())));
        }

        let mut label_indices =
            FnvHashMap::with_capacity_and_hasher(labels.len(), Default::default());

        for (index, label) in labels.iter().enumerate() {
            if label_indices.insert(label.clone(), index).is_some() {
                return Err(RecoError::duplicate_key("similarity matrix labels", label.clone()));
            }
        }

        Ok(SimilarityMatrix { labels, label_indices, values })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.label_indices.get(label).cloned()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index]
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => Some(self.values[i][j]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use super::*;
    use crate::ratings::build_item_user_matrix;
    use crate::types::Rating;

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-6
    }

    fn movielens_sample() -> Vec<Rating> {
        vec![
            Rating::new(1, 101, 5.0),
            Rating::new(1, 102, 4.0),
            Rating::new(2, 101, 4.0),
            Rating::new(2, 103, 3.0),
            Rating::new(3, 102, 4.0),
        ]
    }

    #[test]
    fn query_against_corpus() {
        let corpus = vec![
            vec![(0, 1.0)],
            vec![(0, 1.0), (1, 1.0)],
            vec![(2, 3.0)],
            vec![],
        ];

        let scores = similarity_to_all(&vec![(0, 2.0)], &corpus);

        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0].0, 0);
        assert!(close_enough_to(scores[0].1, 1.0));
        assert!(close_enough_to(scores[1].1, 1.0 / 2.0_f64.sqrt()));
        assert_eq!(scores[2].1, 0.0);
        assert_eq!(scores[3].1, 0.0);
    }

    #[test]
    fn empty_query_scores_zero() {
        let corpus = vec![vec![(0, 1.0)], vec![(1, 1.0)]];
        let scores = similarity_to_all(&vec![], &corpus);
        assert!(scores.iter().all(|(_, score)| *score == 0.0));
    }

    #[test]
    fn item_similarities_of_movielens_sample() {
        let matrix = build_item_user_matrix(&movielens_sample(), MissingRatingPolicy::Zero)
            .unwrap();
        let similarities = similarity_matrix(&matrix);

        assert_eq!(similarities.len(), 3);
        for i in 0..3 {
            assert_eq!(similarities[i].len(), 3);
            assert!(close_enough_to(similarities[i][i], 1.0));
            for j in 0..3 {
                assert!(close_enough_to(similarities[i][j], similarities[j][i]));
            }
        }

        // [5, 4, 0] vs [4, 0, 4]
        assert!(close_enough_to(similarities[0][1], 20.0 / (41.0_f64.sqrt() * 32.0_f64.sqrt())));
        // [4, 0, 4] vs [0, 3, 0]
        assert_eq!(similarities[1][2], 0.0);
    }

    #[test]
    fn unrated_items_are_similar_to_nothing() {
        let ratings = vec![
            Rating::new(1, 1, 0.0),
            Rating::new(1, 2, 3.0),
            Rating::new(2, 2, 1.0),
        ];
        let matrix = build_item_user_matrix(&ratings, MissingRatingPolicy::Zero).unwrap();
        let similarities = similarity_matrix(&matrix);

        assert_eq!(similarities[0], vec![0.0, 0.0]);
        assert!(close_enough_to(similarities[1][1], 1.0));
        assert!(similarities.iter().flatten().all(|value| value.is_finite()));
    }

    #[test]
    fn largest_accepted_ratings_stay_finite() {
        let ratings = vec![
            Rating::new(1, 1, 1e100),
            Rating::new(2, 1, 1e100),
            Rating::new(1, 2, 1e100),
        ];
        let matrix = build_item_user_matrix(&ratings, MissingRatingPolicy::Zero).unwrap();
        let similarities = similarity_matrix(&matrix);

        assert!(similarities.iter().flatten().all(|value| value.is_finite()));
        assert!(close_enough_to(similarities[0][0], 1.0));
        assert!(close_enough_to(similarities[0][1], 1.0 / 2.0_f64.sqrt()));
    }

    #[test]
    fn skip_policy_compares_co_rating_users_only() {
        let ratings = vec![
            Rating::new(1, 1, 4.0),
            Rating::new(2, 1, 2.0),
            Rating::new(1, 2, 2.0),
            Rating::new(2, 2, 1.0),
            Rating::new(3, 2, 5.0),
            Rating::new(3, 3, 5.0),
        ];

        let skipping = build_item_user_matrix(&ratings, MissingRatingPolicy::Skip).unwrap();
        let similarities = similarity_matrix(&skipping);

        // Items 1 and 2 are proportional on users 1 and 2, user 3 is ignored
        assert!(close_enough_to(similarities[0][1], 1.0));
        assert_eq!(similarities[0][2], 0.0);
        assert!(close_enough_to(similarities[1][2], 1.0));

        let filling = build_item_user_matrix(&ratings, MissingRatingPolicy::Zero).unwrap();
        assert!(similarity_matrix(&filling)[0][1] < 0.5);
    }

    #[test]
    fn labelled_lookup() {
        let matrix = SimilarityMatrix::new(
            vec![String::from("A"), String::from("B")],
            vec![vec![1.0, 0.25], vec![0.25, 1.0]],
        ).unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.index_of("B"), Some(1));
        assert_eq!(matrix.get("A", "B"), Some(0.25));
        assert_eq!(matrix.get("A", "C"), None);
        assert_eq!(matrix.row(0), &[1.0, 0.25]);
    }

    #[test]
    fn colliding_labels_are_rejected() {
        let result = SimilarityMatrix::new(
            vec![String::from("Emma"), String::from("Emma")],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        );
        assert!(matches!(result, Err(RecoError::DuplicateKey { .. })));
    }

    #[test]
    fn shape_must_match_labels() {
        let result = SimilarityMatrix::new(vec![String::from("A")], vec![vec![1.0, 0.0]]);
        assert!(matches!(result, Err(RecoError::InvalidInput(_))));
    }

    fn arbitrary_ratings() -> impl Strategy<Value=Vec<Rating>> {
        prop::collection::btree_map((0_u32..8, 0_u32..6), 0_u32..=10, 1..40)
            .prop_map(|cells| cells.into_iter()
                .map(|((user, item), half_stars)| Rating::new(user, item, half_stars as f64 / 2.0))
                .collect::<Vec<Rating>>())
    }

    fn arbitrary_policy() -> impl Strategy<Value=MissingRatingPolicy> {
        prop_oneof![
            Just(MissingRatingPolicy::Zero),
            Just(MissingRatingPolicy::Skip),
            Just(MissingRatingPolicy::Mean),
        ]
    }

    proptest! {

        #[test]
        fn similarities_are_symmetric(ratings in arbitrary_ratings(), policy in arbitrary_policy()) {
            let matrix = build_item_user_matrix(&ratings, policy).unwrap();
            let similarities = similarity_matrix(&matrix);

            for i in 0..similarities.len() {
                for j in 0..similarities.len() {
                    prop_assert!((similarities[i][j] - similarities[j][i]).abs() < 1e-6);
                }
            }
        }

        #[test]
        fn self_similarity_is_one_for_rated_items(ratings in arbitrary_ratings()) {
            let matrix = build_item_user_matrix(&ratings, MissingRatingPolicy::Zero).unwrap();
            let similarities = similarity_matrix(&matrix);

            for i in 0..similarities.len() {
                if utils::dense_norm(matrix.row(i)) > 0.0 {
                    prop_assert!((similarities[i][i] - 1.0).abs() < 1e-6);
                } else {
                    prop_assert_eq!(similarities[i][i], 0.0);
                }
            }
        }
    }
}
