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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecoError>;

/// All failures raised by the recommenders. Errors are returned at the point of detection, we
/// never hand out partial results.
#[derive(Error, Debug)]
pub enum RecoError {

    /// Empty or malformed input collections (no documents, no ratings, empty vocabulary)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("'{query}' not found in {dataset}")]
    NotFound { query: String, dataset: String },

    /// Ambiguous keys, e.g. a (user, item) pair rated twice with different values
    #[error("Duplicate key in {dataset}: {key}")]
    DuplicateKey { dataset: String, key: String },

    #[error("Identifier {id} in {dataset} has no label")]
    UnknownIdentifier { dataset: String, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported mode '{0}', expected one of movies, tags, ratings")]
    UnsupportedMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RecoError {

    pub(crate) fn not_found(query: &str, dataset: &str) -> Self {
        RecoError::NotFound { query: query.to_owned(), dataset: dataset.to_owned() }
    }

    pub(crate) fn duplicate_key(dataset: &str, key: String) -> Self {
        RecoError::DuplicateKey { dataset: dataset.to_owned(), key }
    }
}
