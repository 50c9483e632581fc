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

use serde_derive::{Deserialize, Serialize};

pub type ItemId = u32;
pub type UserId = u32;

/// Sparse vector as (dimension, weight) pairs, sorted by dimension
pub type SparseVector = Vec<(u32, f64)>;

pub type DenseVector = Vec<f64>;
pub type DenseMatrix = Vec<DenseVector>;

pub fn new_dense_matrix(num_rows: usize, num_columns: usize) -> DenseMatrix {
    vec![vec![0.0; num_columns]; num_rows]
}

/// A single (user, item, rating) observation. Field names follow the MovieLens csv headers.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Rating {
    #[serde(rename = "userId")]
    pub user: UserId,
    #[serde(rename = "movieId")]
    pub item: ItemId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user: UserId, item: ItemId, rating: f64) -> Self {
        Rating { user, item, rating }
    }
}

/// A free-text tag which a user attached to an item.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Tag {
    #[serde(rename = "movieId")]
    pub item: ItemId,
    pub tag: String,
}

impl Tag {
    pub fn new(item: ItemId, tag: &str) -> Self {
        Tag { item, tag: tag.to_owned() }
    }
}

/// An item with its display title and the text we vectorize for content-based recommendations.
#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub item: ItemId,
    pub title: String,
    pub description: String,
}

impl Movie {
    pub fn new(item: ItemId, title: &str, description: &str) -> Self {
        Movie { item, title: title.to_owned(), description: description.to_owned() }
    }
}
