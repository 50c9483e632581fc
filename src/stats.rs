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

use fnv::FnvHashMap;

use crate::error::{RecoError, Result};
use crate::types::{ItemId, Rating, UserId};

/// Maps user and item identifiers from the ratings to consecutive indices. Identifiers are
/// indexed in ascending order, so rows and columns of derived matrices are deterministic.
#[derive(Debug, Clone)]
pub struct DataDictionary {
    user_ids: Vec<UserId>,
    item_ids: Vec<ItemId>,
    user_dict: FnvHashMap<UserId, u32>,
    item_dict: FnvHashMap<ItemId, u32>,
    num_interactions: u64,
}

impl DataDictionary {

    pub fn num_users(&self) -> usize {
        self.user_dict.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_dict.len()
    }

    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn user_index(&self, user: UserId) -> Option<u32> {
        self.user_dict.get(&user).cloned()
    }

    pub fn item_index(&self, item: ItemId) -> Option<u32> {
        self.item_dict.get(&item).cloned()
    }

    pub fn user_id(&self, user_index: u32) -> UserId {
        self.user_ids[user_index as usize]
    }

    pub fn item_id(&self, item_index: u32) -> ItemId {
        self.item_ids[item_index as usize]
    }

    /// Item identifiers in row order
    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }
}

impl<'a> From<&'a [Rating]> for DataDictionary {

    fn from(ratings: &'a [Rating]) -> Self {

        let mut user_ids: Vec<UserId> = ratings.iter().map(|rating| rating.user).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut item_ids: Vec<ItemId> = ratings.iter().map(|rating| rating.item).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let user_dict: FnvHashMap<UserId, u32> = user_ids.iter()
            .enumerate()
            .map(|(index, user)| (*user, index as u32))
            .collect();

        let item_dict: FnvHashMap<ItemId, u32> = item_ids.iter()
            .enumerate()
            .map(|(index, item)| (*item, index as u32))
            .collect();

        DataDictionary {
            user_ids,
            item_ids,
            user_dict,
            item_dict,
            num_interactions: ratings.len() as u64,
        }
    }
}

/// Two-way mapping between item identifiers and their human-readable titles. Several items may
/// share a title, in which case the reverse lookup resolves to the first item seen.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    titles: FnvHashMap<ItemId, String>,
    items_by_title: FnvHashMap<String, ItemId>,
}

impl Labels {

    pub fn new<I, S>(entries: I) -> Result<Self>
        where I: IntoIterator<Item=(ItemId, S)>, S: Into<String> {

        let mut labels = Labels::default();

        for (item, title) in entries {
            let title: String = title.into();

            if labels.titles.contains_key(&item) {
                return Err(RecoError::duplicate_key("labels", format!("item {}", item)));
            }

            labels.items_by_title.entry(title.clone()).or_insert(item);
            labels.titles.insert(item, title);
        }

        Ok(labels)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn title(&self, item: ItemId) -> Result<&str> {
        self.titles.get(&item)
            .map(|title| title.as_str())
            .ok_or_else(|| RecoError::UnknownIdentifier {
                dataset: String::from("labels"),
                id: item.to_string(),
            })
    }

    pub fn item(&self, title: &str) -> Option<ItemId> {
        self.items_by_title.get(title).cloned()
    }
}
