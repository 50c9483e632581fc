/**
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

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::str::FromStr;

use fnv::FnvHashSet;
use serde_derive::Serialize;

use crate::error::{RecoError, Result};
use crate::similarity::{self, SimilarityMatrix};
use crate::text::TermVectors;
use crate::types::{ItemId, Tag};

/// Result type used to find the top-n most similar rows via a binary heap.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ScoredItem {
    pub index: usize,
    pub score: f64,
}

/// Ordering for our max-heap: the top of the heap is the worst candidate seen so far. Equal
/// scores are ordered by row index, so earlier rows win ties. There is no total order on floating
/// point numbers, incomparable scores count as equal.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.index.cmp(&scored_item_b.index),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// The n highest scoring rows apart from `excluded`, best first.
pub fn top_n<I>(scores: I, excluded: usize, n: usize) -> Vec<ScoredItem>
    where I: IntoIterator<Item=(usize, f64)> {

    let mut heap = BinaryHeap::new();

    for (index, score) in scores {
        if index == excluded {
            continue;
        }

        let scored_item = ScoredItem { index, score };

        if heap.len() < n {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}

/// The closed set of recommendation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationMode {
    /// Titles ranked by tf-idf similarity of their descriptions
    Content,
    /// Items carrying a tag, matched case-insensitively
    Tags,
    /// Titles ranked by the similarity of their rating vectors
    Collaborative,
}

impl FromStr for RecommendationMode {
    type Err = RecoError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "movies" | "content" => Ok(RecommendationMode::Content),
            "tags" => Ok(RecommendationMode::Tags),
            "ratings" | "collaborative" => Ok(RecommendationMode::Collaborative),
            _ => Err(RecoError::UnsupportedMode(name.to_owned())),
        }
    }
}

/// The precomputed data a recommendation mode ranks against.
#[derive(Debug, Clone, Copy)]
pub enum RecommendationSource<'a> {
    /// Titles aligned row by row with the tf-idf vectors of their descriptions
    Content { titles: &'a [String], vectors: &'a TermVectors },
    Tags(&'a [Tag]),
    Collaborative(&'a SimilarityMatrix),
}

impl<'a> RecommendationSource<'a> {

    pub fn mode(&self) -> RecommendationMode {
        match *self {
            RecommendationSource::Content { .. } => RecommendationMode::Content,
            RecommendationSource::Tags(_) => RecommendationMode::Tags,
            RecommendationSource::Collaborative(_) => RecommendationMode::Collaborative,
        }
    }
}

/// Ordered recommendations: titles for the similarity based modes, item identifiers for tags.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Recommendations {
    Labels(Vec<String>),
    Items(Vec<ItemId>),
}

impl Recommendations {

    pub fn len(&self) -> usize {
        match self {
            Recommendations::Labels(labels) => labels.len(),
            Recommendations::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recommends at most `num_items` entries for `query`, never including the query itself.
///
/// Titles are matched exactly in the content and collaborative modes. Tags are matched ignoring
/// case and return the identifiers of the tagged items in order of first occurrence.
pub fn recommend(
    query: &str,
    source: RecommendationSource,
    num_items: usize,
) -> Result<Recommendations> {

    check_num_items(num_items)?;

    match source {
        RecommendationSource::Content { titles, vectors } => {
            check_alignment(titles, vectors)?;
            let row = titles.iter()
                .position(|title| title == query)
                .ok_or_else(|| RecoError::not_found(query, "movies"))?;

            Ok(Recommendations::Labels(similar_by_content(row, titles, vectors, num_items)))
        },
        RecommendationSource::Tags(tags) => tagged_items(query, tags, num_items),
        RecommendationSource::Collaborative(matrix) => {
            let row = matrix.index_of(query)
                .ok_or_else(|| RecoError::not_found(query, "ratings similarity matrix"))?;

            Ok(Recommendations::Labels(similar_by_ratings(row, matrix, num_items)))
        },
    }
}

pub(crate) fn check_num_items(num_items: usize) -> Result<()> {
    if num_items == 0 {
        return Err(RecoError::InvalidArgument(
            String::from("number of recommendations must be positive")));
    }
    Ok(())
}

pub(crate) fn check_alignment(titles: &[String], vectors: &TermVectors) -> Result<()> {
    if titles.len() != vectors.len() {
        return Err(RecoError::InvalidInput(format!(
            "{} titles for {} term vectors", titles.len(), vectors.len())));
    }
    Ok(())
}

pub(crate) fn similar_by_content(
    row: usize,
    titles: &[String],
    vectors: &TermVectors,
    num_items: usize,
) -> Vec<String> {

    let scores = similarity::similarity_to_all(&vectors.vectors()[row], vectors.vectors())
        .into_iter()
        .filter(|(index, _)| titles[*index] != titles[row]);

    // Rows sharing the query's title count as the query itself
    top_n(scores, row, num_items).into_iter()
        .map(|scored_item| titles[scored_item.index].clone())
        .collect()
}

pub(crate) fn similar_by_ratings(
    row: usize,
    matrix: &SimilarityMatrix,
    num_items: usize,
) -> Vec<String> {

    let scores = matrix.row(row).iter().cloned().enumerate();

    top_n(scores, row, num_items).into_iter()
        .map(|scored_item| matrix.labels()[scored_item.index].clone())
        .collect()
}

fn tagged_items(query: &str, tags: &[Tag], num_items: usize) -> Result<Recommendations> {

    let lowercase_query = query.to_lowercase();
    let mut seen = FnvHashSet::default();

    let items: Vec<ItemId> = tags.iter()
        .filter(|tag| tag.tag.to_lowercase() == lowercase_query)
        .map(|tag| tag.item)
        .filter(|item| seen.insert(*item))
        .take(num_items)
        .collect();

    if items.is_empty() {
        return Err(RecoError::not_found(query, "tags"));
    }

    Ok(Recommendations::Items(items))
}
