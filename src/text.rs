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

//! Turns a corpus of short texts into tf-idf weighted term vectors over a shared vocabulary.

use std::collections::BTreeSet;
use std::time::Instant;

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info};

use crate::error::{RecoError, Result};
use crate::types::SparseVector;
use crate::utils;

/// Common english words which carry no signal for similarity.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
    "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
    "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at", "be",
    "became", "because", "become", "becomes", "been", "before", "being", "below", "beside",
    "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do",
    "does", "doing", "done", "down", "during", "each", "either", "else", "elsewhere", "enough",
    "etc", "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few",
    "for", "former", "from", "further", "had", "has", "have", "having", "he", "hence", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "ie", "if", "in",
    "indeed", "into", "is", "it", "its", "itself", "just", "last", "latter", "least", "less",
    "many", "may", "me", "meanwhile", "might", "more", "moreover", "most", "mostly", "much",
    "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on",
    "once", "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves",
    "out", "over", "own", "per", "perhaps", "rather", "same", "seem", "seemed", "seems",
    "several", "she", "should", "since", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "thereafter", "therefore", "these", "they",
    "this", "those", "though", "through", "throughout", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whenever", "where", "whereas", "wherever",
    "whether", "which", "while", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// The learned term space, terms are indexed in lexicographic order.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<String>,
    term_indices: FnvHashMap<String, u32>,
}

impl Vocabulary {

    fn from_terms(terms: BTreeSet<String>) -> Self {
        let terms: Vec<String> = terms.into_iter().collect();
        let term_indices = terms.iter()
            .enumerate()
            .map(|(index, term)| (term.clone(), index as u32))
            .collect();

        Vocabulary { terms, term_indices }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index(&self, term: &str) -> Option<u32> {
        self.term_indices.get(term).cloned()
    }

    pub fn term(&self, index: u32) -> &str {
        &self.terms[index as usize]
    }
}

/// Tokenization and weighting settings for the tf-idf features.
#[derive(Debug, Clone)]
pub struct TermVectorizer {
    stop_words: FnvHashSet<String>,
    min_token_length: usize,
}

impl Default for TermVectorizer {
    fn default() -> Self {
        TermVectorizer::english()
    }
}

impl TermVectorizer {

    pub fn english() -> Self {
        TermVectorizer::with_stop_words(ENGLISH_STOP_WORDS)
    }

    pub fn with_stop_words<I, S>(stop_words: I) -> Self
        where I: IntoIterator<Item=S>, S: AsRef<str> {

        let stop_words = stop_words.into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();

        TermVectorizer { stop_words, min_token_length: 2 }
    }

    /// Tokens shorter than this many characters are dropped (defaults to 2).
    pub fn min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length.max(1);
        self
    }

    /// Lowercases, splits on non-word characters and drops short tokens and stop words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= self.min_token_length)
            .map(|token| token.to_lowercase())
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Learns the vocabulary and idf weights from the documents and returns one L2-normalized
    /// tf-idf vector per document, in document order.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<TermVectors> {

        if documents.is_empty() {
            return Err(RecoError::InvalidInput(String::from("no documents to vectorize")));
        }

        let start = Instant::now();

        let tokenized: Vec<Vec<String>> = documents.iter()
            .map(|document| self.tokenize(document.as_ref()))
            .collect();

        let distinct_terms: BTreeSet<String> = tokenized.iter()
            .flat_map(|tokens| tokens.iter().cloned())
            .collect();

        if distinct_terms.is_empty() {
            return Err(RecoError::InvalidInput(
                String::from("documents contain no terms apart from stop words")));
        }

        let vocabulary = Vocabulary::from_terms(distinct_terms);

        let mut document_frequencies = vec![0_u32; vocabulary.len()];
        let term_counts: Vec<FnvHashMap<u32, u32>> = tokenized.iter()
            .map(|tokens| count_terms(tokens, &vocabulary))
            .collect();

        for counts in term_counts.iter() {
            for term_index in counts.keys() {
                document_frequencies[*term_index as usize] += 1;
            }
        }

        // Smoothed idf, as if an extra document contained every term once
        let num_documents = documents.len() as f64;
        let idf: Vec<f64> = document_frequencies.iter()
            .map(|df| ((1.0 + num_documents) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let vectors: Vec<SparseVector> = term_counts.iter()
            .map(|counts| weigh(counts, &idf))
            .collect();

        let num_empty = vectors.iter().filter(|vector| vector.is_empty()).count();

        debug!("Vocabulary of {} terms over {} documents ({} without any term)",
            vocabulary.len(), documents.len(), num_empty);
        info!("Built tf-idf vectors in {}ms", utils::to_millis(start.elapsed()));

        Ok(TermVectors { vectors, vocabulary, idf, vectorizer: self.clone() })
    }
}

fn count_terms(tokens: &[String], vocabulary: &Vocabulary) -> FnvHashMap<u32, u32> {
    let mut counts = FnvHashMap::with_capacity_and_hasher(tokens.len(), Default::default());
    for token in tokens {
        if let Some(term_index) = vocabulary.index(token) {
            *counts.entry(term_index).or_insert(0) += 1;
        }
    }
    counts
}

fn weigh(counts: &FnvHashMap<u32, u32>, idf: &[f64]) -> SparseVector {

    let mut vector: SparseVector = counts.iter()
        .map(|(term_index, count)| (*term_index, *count as f64 * idf[*term_index as usize]))
        .collect();

    vector.sort_unstable_by_key(|(term_index, _)| *term_index);

    let norm = utils::sparse_norm(&vector);
    if norm > 0.0 {
        for entry in vector.iter_mut() {
            entry.1 /= norm;
        }
    }

    vector
}

/// Tf-idf vectors of a corpus together with the vocabulary and weights they were built with.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct TermVectors {
    vectors: Vec<SparseVector>,
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    vectorizer: TermVectorizer,
}

impl TermVectors {

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.vectors.get(index)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.index(term).map(|index| self.idf[index as usize])
    }

    /// Projects arbitrary text into the learned term space, unknown terms are ignored.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let tokens = self.vectorizer.tokenize(text);
        weigh(&count_terms(&tokens, &self.vocabulary), &self.idf)
    }
}

#[cfg(test)]
mod tests {

    use super::TermVectorizer;
    use crate::error::RecoError;
    use crate::utils;

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-9
    }

    #[test]
    fn tokenize_drops_stop_words_and_short_tokens() {
        let vectorizer = TermVectorizer::english();
        let tokens = vectorizer.tokenize("The Action|Sci-Fi of a Film-Noir, X");

        assert_eq!(tokens, vec!["action", "sci", "fi", "film", "noir"]);
    }

    #[test]
    fn rows_share_vocabulary_and_keep_order() {
        let documents = vec!["Action Comedy", "Action Drama", "Documentary"];
        let term_vectors = TermVectorizer::english().fit_transform(&documents).unwrap();

        assert_eq!(term_vectors.len(), 3);
        assert_eq!(term_vectors.vocabulary().len(), 4);
        assert_eq!(term_vectors.vocabulary().term(0), "action");
        assert_eq!(term_vectors.vocabulary().index("documentary"), Some(2));

        let documentary = term_vectors.row(2).unwrap();
        assert_eq!(documentary.len(), 1);
        assert_eq!(documentary[0].0, 2);
        assert!(close_enough_to(documentary[0].1, 1.0));

        for vector in term_vectors.vectors() {
            assert!(close_enough_to(utils::sparse_norm(vector), 1.0));
        }
    }

    #[test]
    fn idf_downweights_common_terms() {
        let documents = vec!["action comedy", "action drama"];
        let term_vectors = TermVectorizer::english().fit_transform(&documents).unwrap();

        assert!(close_enough_to(term_vectors.idf("action").unwrap(), 1.0));
        assert!(close_enough_to(term_vectors.idf("comedy").unwrap(), 1.5_f64.ln() + 1.0));

        let first = term_vectors.row(0).unwrap();
        let action_weight = first[0].1;
        let comedy_weight = first[1].1;
        assert!(action_weight < comedy_weight);
    }

    #[test]
    fn repeated_terms_count_more() {
        let documents = vec!["war war drama", "drama"];
        let term_vectors = TermVectorizer::english().fit_transform(&documents).unwrap();
        let first = term_vectors.row(0).unwrap();

        let drama = term_vectors.vocabulary().index("drama").unwrap();
        let war = term_vectors.vocabulary().index("war").unwrap();
        let weight_of = |term_index: u32| first.iter()
            .find(|(index, _)| *index == term_index)
            .map(|(_, weight)| *weight)
            .unwrap();

        assert!(weight_of(war) > 2.0 * weight_of(drama));
    }

    #[test]
    fn documents_with_only_stop_words_get_empty_vectors() {
        let documents = vec!["horror", "the of and"];
        let term_vectors = TermVectorizer::english().fit_transform(&documents).unwrap();

        assert!(term_vectors.row(1).unwrap().is_empty());
    }

    #[test]
    fn empty_corpus_is_invalid() {
        let documents: Vec<&str> = vec![];
        let result = TermVectorizer::english().fit_transform(&documents);
        assert!(matches!(result, Err(RecoError::InvalidInput(_))));
    }

    #[test]
    fn vocabulary_of_stop_words_only_is_invalid() {
        let documents = vec!["the", "and of", "a"];
        let result = TermVectorizer::english().fit_transform(&documents);
        assert!(matches!(result, Err(RecoError::InvalidInput(_))));
    }

    #[test]
    fn custom_stop_words_and_token_length() {
        let vectorizer = TermVectorizer::with_stop_words(vec!["Drama"]).min_token_length(1);
        assert_eq!(vectorizer.tokenize("drama x the"), vec!["x", "the"]);
    }

    #[test]
    fn vectorize_ignores_unknown_terms() {
        let documents = vec!["adventure animation", "crime thriller"];
        let term_vectors = TermVectorizer::english().fit_transform(&documents).unwrap();

        let query = term_vectors.vectorize("Animation and musical");
        let animation = term_vectors.vocabulary().index("animation").unwrap();

        assert_eq!(query.len(), 1);
        assert_eq!(query[0].0, animation);
        assert!(close_enough_to(query[0].1, 1.0));

        assert!(term_vectors.vectorize("western").is_empty());
    }
}
