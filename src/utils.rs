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

use std::time::Duration;

use crate::types::SparseVector;

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// Dot product of two sparse vectors, merging over their sorted dimensions.
pub fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f64 {

    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (dim_a, weight_a) = a[i];
        let (dim_b, weight_b) = b[j];

        if dim_a == dim_b {
            dot += weight_a * weight_b;
            i += 1;
            j += 1;
        } else if dim_a < dim_b {
            i += 1;
        } else {
            j += 1;
        }
    }

    dot
}

pub fn sparse_norm(vector: &SparseVector) -> f64 {
    vector.iter().map(|(_, weight)| weight * weight).sum::<f64>().sqrt()
}

pub fn dense_dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn dense_norm(vector: &[f64]) -> f64 {
    dense_dot(vector, vector).sqrt()
}
