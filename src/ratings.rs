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

use std::str::FromStr;

use log::debug;
use serde_derive::Deserialize;

use crate::error::{RecoError, Result};
use crate::stats::DataDictionary;
use crate::types::{self, DenseMatrix, ItemId, Rating};

/// Larger ratings would let squared norms overflow to infinity.
pub const MAX_RATING_MAGNITUDE: f64 = 1e100;

fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && rating.abs() <= MAX_RATING_MAGNITUDE
}

/// How to treat (item, user) pairs for which no rating was observed.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingRatingPolicy {
    /// Unobserved ratings count as 0.
    Zero,
    /// Unobserved ratings are ignored, items are compared on co-rating users only.
    Skip,
    /// Unobserved ratings are replaced by the mean observed rating of the item.
    Mean,
}

impl Default for MissingRatingPolicy {
    fn default() -> Self {
        MissingRatingPolicy::Zero
    }
}

impl FromStr for MissingRatingPolicy {
    type Err = RecoError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "zero" => Ok(MissingRatingPolicy::Zero),
            "skip" => Ok(MissingRatingPolicy::Skip),
            "mean" => Ok(MissingRatingPolicy::Mean),
            _ => Err(RecoError::InvalidArgument(
                format!("unknown missing rating policy '{}', expected zero, skip or mean", name))),
        }
    }
}

/// Dense item-by-user matrix of ratings, built fresh for each invocation.
#[derive(Debug, Clone)]
pub struct ItemUserMatrix {
    values: DenseMatrix,
    observed: Vec<Vec<bool>>,
    data_dict: DataDictionary,
    policy: MissingRatingPolicy,
}

impl ItemUserMatrix {

    pub fn num_items(&self) -> usize {
        self.values.len()
    }

    pub fn num_users(&self) -> usize {
        self.data_dict.num_users()
    }

    pub fn policy(&self) -> MissingRatingPolicy {
        self.policy
    }

    pub fn data_dict(&self) -> &DataDictionary {
        &self.data_dict
    }

    /// Item identifiers in row order
    pub fn item_ids(&self) -> &[ItemId] {
        self.data_dict.item_ids()
    }

    pub fn rows(&self) -> &DenseMatrix {
        &self.values
    }

    pub fn row(&self, item_index: usize) -> &[f64] {
        &self.values[item_index]
    }

    pub fn is_observed(&self, item_index: usize, user_index: usize) -> bool {
        self.observed[item_index][user_index]
    }
}

/// Reshapes rating triples into an item-by-user matrix. Items form the rows and users the
/// columns, both in ascending identifier order. A (user, item) pair rated more than once is
/// only accepted if all ratings agree.
pub fn build_item_user_matrix(
    ratings: &[Rating],
    policy: MissingRatingPolicy,
) -> Result<ItemUserMatrix> {

    if ratings.is_empty() {
        return Err(RecoError::InvalidInput(String::from("no ratings given")));
    }

    if let Some(rating) = ratings.iter().find(|rating| !is_valid_rating(rating.rating)) {
        return Err(RecoError::InvalidInput(format!(
            "rating {} of user {} for item {} is not a number within +/-{:e}",
            rating.rating, rating.user, rating.item, MAX_RATING_MAGNITUDE)));
    }

    let data_dict = DataDictionary::from(ratings);
    let num_items = data_dict.num_items();
    let num_users = data_dict.num_users();

    let mut values = types::new_dense_matrix(num_items, num_users);
    let mut observed = vec![vec![false; num_users]; num_items];

    for rating in ratings {
        let (item_index, user_index) =
            match (data_dict.item_index(rating.item), data_dict.user_index(rating.user)) {
                (Some(item_index), Some(user_index)) => (item_index as usize, user_index as usize),
                _ => return Err(RecoError::UnknownIdentifier {
                    dataset: String::from("ratings"),
                    id: format!("(user {}, item {})", rating.user, rating.item),
                }),
            };

        if observed[item_index][user_index] {
            if values[item_index][user_index] != rating.rating {
                return Err(RecoError::duplicate_key(
                    "ratings",
                    format!("(user {}, item {}) rated both {} and {}", rating.user, rating.item,
                        values[item_index][user_index], rating.rating),
                ));
            }
            continue;
        }

        values[item_index][user_index] = rating.rating;
        observed[item_index][user_index] = true;
    }

    if policy == MissingRatingPolicy::Mean {
        fill_with_item_means(&mut values, &observed);
    }

    debug!("Item-user matrix with {} items and {} users from {} ratings",
        num_items, num_users, data_dict.num_interactions());

    Ok(ItemUserMatrix { values, observed, data_dict, policy })
}

fn fill_with_item_means(values: &mut DenseMatrix, observed: &[Vec<bool>]) {
    for (row, observed_in_row) in values.iter_mut().zip(observed.iter()) {

        let (sum, count) = row.iter()
            .zip(observed_in_row.iter())
            .filter(|(_, is_observed)| **is_observed)
            .fold((0.0_f64, 0_usize), |(sum, count), (value, _)| (sum + *value, count + 1));

        // Every row has at least one rating, otherwise its item would not exist
        let mean = sum / count.max(1) as f64;

        for (value, is_observed) in row.iter_mut().zip(observed_in_row.iter()) {
            if !is_observed {
                *value = mean;
            }
        }
    }
}
