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

//! Item-to-item recommendations from small tabular datasets: content-based via tf-idf vectors of
//! item descriptions, collaborative via cosine similarities of item rating vectors, and a direct
//! tag lookup.

use std::sync::Mutex;
use std::time::Instant;

use log::info;
use scoped_pool::Pool;

pub mod error;
pub mod io;
pub mod ratings;
pub mod recommend;
pub mod similarity;
pub mod stats;
pub mod text;
pub mod types;
pub mod utils;

pub use crate::error::{RecoError, Result};
pub use crate::ratings::{build_item_user_matrix, ItemUserMatrix, MissingRatingPolicy};
pub use crate::recommend::{recommend, RecommendationMode, RecommendationSource, Recommendations};
pub use crate::similarity::{similarity_matrix, similarity_to_all, SimilarityMatrix};
pub use crate::stats::{DataDictionary, Labels};
pub use crate::text::{TermVectorizer, TermVectors, Vocabulary};
pub use crate::types::{ItemId, Movie, Rating, Tag, UserId};

/// Tf-idf vectors of the documents with english stop words removed, one per document.
pub fn build_term_vectors<S: AsRef<str>>(documents: &[S]) -> Result<TermVectors> {
    TermVectorizer::english().fit_transform(documents)
}

/// Item-to-item cosine similarities of the rating vectors, labelled with the item titles.
/// Fails if a rated item has no title, or if two rated items share a title.
pub fn ratings_similarity_matrix(
    ratings: &[Rating],
    labels: &Labels,
    policy: MissingRatingPolicy,
) -> Result<SimilarityMatrix> {

    let matrix = build_item_user_matrix(ratings, policy)?;
    let similarities = similarity_matrix(&matrix);

    let titles = matrix.item_ids().iter()
        .map(|item| labels.title(*item).map(String::from))
        .collect::<Result<Vec<String>>>()?;

    SimilarityMatrix::new(titles, similarities)
}

/// Computes recommendations for every item of a content or collaborative source in parallel.
/// Results are returned in row order, keyed by item title.
pub fn recommend_all(
    source: RecommendationSource,
    num_items: usize,
    pool_size: usize,
) -> Result<Vec<(String, Recommendations)>> {

    recommend::check_num_items(num_items)?;

    if pool_size == 0 {
        return Err(RecoError::InvalidArgument(String::from("pool size must be positive")));
    }

    let titles: &[String] = match source {
        RecommendationSource::Content { titles, vectors } => {
            recommend::check_alignment(titles, vectors)?;
            titles
        },
        RecommendationSource::Collaborative(matrix) => matrix.labels(),
        RecommendationSource::Tags(_) => {
            return Err(RecoError::UnsupportedMode(
                String::from("tags (batch recommendations need item titles)")));
        },
    };

    let batch_start = Instant::now();

    let slots: Vec<Mutex<Vec<String>>> = (0..titles.len())
        .map(|_| Mutex::new(Vec::new()))
        .collect();

    let pool = Pool::new(pool_size);

    pool.scoped(|scope| {
        for (row, slot) in slots.iter().enumerate() {
            scope.execute(move || {
                let recommended = match source {
                    RecommendationSource::Content { titles, vectors } =>
                        recommend::similar_by_content(row, titles, vectors, num_items),
                    RecommendationSource::Collaborative(matrix) =>
                        recommend::similar_by_ratings(row, matrix, num_items),
                    RecommendationSource::Tags(_) => Vec::new(),
                };

                if let Ok(mut slot) = slot.lock() {
                    *slot = recommended;
                }
            });
        }
    });

    pool.shutdown();

    info!("Computed recommendations for {} items with {} threads in {}ms", titles.len(),
        pool_size, utils::to_millis(batch_start.elapsed()));

    titles.iter()
        .zip(slots.into_iter())
        .map(|(title, slot)| {
            let recommended = slot.into_inner()
                .map_err(|_| RecoError::InvalidInput(
                    format!("computing recommendations for '{}' failed", title)))?;
            Ok((title.clone(), Recommendations::Labels(recommended)))
        })
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    fn movielens_sample() -> (Vec<Rating>, Labels) {
        let ratings = vec![
            Rating::new(1, 101, 5.0),
            Rating::new(1, 102, 4.0),
            Rating::new(2, 101, 4.0),
            Rating::new(2, 103, 3.0),
            Rating::new(3, 102, 4.0),
        ];
        let labels = Labels::new(vec![(101, "Movie A"), (102, "Movie B"), (103, "Movie C")])
            .unwrap();

        (ratings, labels)
    }

    #[test]
    fn similarity_matrix_structure() {
        let (ratings, labels) = movielens_sample();
        let matrix = ratings_similarity_matrix(&ratings, &labels, MissingRatingPolicy::Zero)
            .unwrap();

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.labels(), &["Movie A", "Movie B", "Movie C"]);

        for title in matrix.labels() {
            assert!((matrix.get(title, title).unwrap() - 1.0).abs() < 1e-6);
        }

        for a in matrix.labels() {
            for b in matrix.labels() {
                assert!((matrix.get(a, b).unwrap() - matrix.get(b, a).unwrap()).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn unlabelled_items_fail() {
        let (ratings, _) = movielens_sample();
        let labels = Labels::new(vec![(101, "Movie A"), (102, "Movie B")]).unwrap();

        match ratings_similarity_matrix(&ratings, &labels, MissingRatingPolicy::Zero) {
            Err(RecoError::UnknownIdentifier { id, .. }) => assert_eq!(id, "103"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn items_sharing_a_title_fail() {
        let (ratings, _) = movielens_sample();
        let labels = Labels::new(vec![(101, "Emma"), (102, "Emma"), (103, "Movie C")]).unwrap();

        let result = ratings_similarity_matrix(&ratings, &labels, MissingRatingPolicy::Zero);
        assert!(matches!(result, Err(RecoError::DuplicateKey { .. })));
    }

    #[test]
    fn batch_matches_single_queries() {
        let (ratings, labels) = movielens_sample();
        let matrix = ratings_similarity_matrix(&ratings, &labels, MissingRatingPolicy::Zero)
            .unwrap();
        let source = RecommendationSource::Collaborative(&matrix);

        let all = recommend_all(source, 2, 2).unwrap();

        assert_eq!(all.len(), 3);
        for (title, recommended) in all.iter() {
            assert_eq!(recommended, &recommend(title, source, 2).unwrap());
        }
    }

    #[test]
    fn batch_over_content() {
        let titles = vec![String::from("Heat"), String::from("Casino"), String::from("Antz")];
        let vectors = build_term_vectors(&["crime thriller", "crime drama", "animation"])
            .unwrap();
        let source = RecommendationSource::Content { titles: &titles, vectors: &vectors };

        let all = recommend_all(source, 1, 3).unwrap();

        assert_eq!(all[0], (String::from("Heat"),
            Recommendations::Labels(vec![String::from("Casino")])));
        assert_eq!(all[2].0, "Antz");
    }

    #[test]
    fn batch_skips_rows_sharing_the_title() {
        let titles = vec![String::from("Emma"), String::from("Heat"), String::from("Emma")];
        let vectors = build_term_vectors(&["comedy romance", "crime", "comedy romance"]).unwrap();
        let source = RecommendationSource::Content { titles: &titles, vectors: &vectors };

        let all = recommend_all(source, 5, 2).unwrap();

        assert_eq!(all[0].1, Recommendations::Labels(vec![String::from("Heat")]));
        assert_eq!(all[2].1, Recommendations::Labels(vec![String::from("Heat")]));
    }

    #[test]
    fn batch_rejects_tags_and_bad_arguments() {
        let tags = vec![Tag::new(1, "funny")];
        assert!(matches!(recommend_all(RecommendationSource::Tags(&tags), 3, 1),
            Err(RecoError::UnsupportedMode(_))));

        let (ratings, labels) = movielens_sample();
        let matrix = ratings_similarity_matrix(&ratings, &labels, MissingRatingPolicy::Zero)
            .unwrap();
        let source = RecommendationSource::Collaborative(&matrix);

        assert!(matches!(recommend_all(source, 0, 1), Err(RecoError::InvalidArgument(_))));
        assert!(matches!(recommend_all(source, 1, 0), Err(RecoError::InvalidArgument(_))));
    }
}
