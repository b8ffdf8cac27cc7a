// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use rayon::prelude::*;

use crate::error::{Result, SortError};

/// How needles map onto haystack rows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SearchPlan {
	/// Length of one sorted row.
	pub search_range: usize,
	/// Needles served by one sorted row.
	pub per_row: usize,
	/// Whether the haystack has one row per needle row.
	pub batched: bool,
	pub total: usize,
}

impl SearchPlan {
	/// A 1-D haystack serves every needle. An N-D haystack needs the same
	/// rank as `values` and matching leading dimensions.
	pub fn new(
		sorted: &[usize],
		values: &[usize],
	) -> Result<Self> {
		let total = values.iter().product();
		let mismatch = || SortError::SearchShapeMismatch {
			sorted: sorted.into(),
			values: values.into(),
		};

		match sorted.len() {
			0 => Err(mismatch()),
			1 => Ok(Self {
				search_range: sorted[0],
				per_row: total,
				batched: false,
				total,
			}),
			rank => {
				if values.len() != rank || sorted[..rank - 1] != values[..rank - 1] {
					return Err(mismatch());
				}
				Ok(Self {
					search_range: sorted[rank - 1],
					per_row: values[rank - 1],
					batched: true,
					total,
				})
			},
		}
	}

	fn offset(
		&self,
		needle: usize,
	) -> usize {
		if self.batched && self.per_row > 0 {
			(needle / self.per_row) * self.search_range
		} else {
			0
		}
	}
}

/// Host binary search of every needle, in parallel.
pub fn search_rows<N: PartialOrd + Sync>(
	sorted: &[N],
	values: &[N],
	plan: &SearchPlan,
	right: bool,
) -> Vec<usize> {
	values
		.par_iter()
		.enumerate()
		.map(|(n, v)| {
			let start = plan.offset(n);
			let row = &sorted[start..start + plan.search_range];
			if right {
				row.partition_point(|h| h <= v)
			} else {
				row.partition_point(|h| h < v)
			}
		})
		.collect()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_left_and_right() {
		let plan = SearchPlan::new(&[4], &[1]).unwrap();
		assert_eq!(search_rows(&[1, 3, 3, 5], &[3], &plan, false), vec![1]);
		assert_eq!(search_rows(&[1, 3, 3, 5], &[3], &plan, true), vec![3]);
	}

	#[test]
	fn test_bounds() {
		let plan = SearchPlan::new(&[3], &[2, 2]).unwrap();
		let out = search_rows(&[1.0, 2.0, 3.0], &[-1.0, 9.0, 2.0, 2.5], &plan, false);
		assert_eq!(out, vec![0, 3, 1, 2]);
	}

	#[test]
	fn test_batched_rows() {
		let plan = SearchPlan::new(&[2, 3], &[2, 2]).unwrap();
		assert!(plan.batched);
		let sorted = [1, 2, 3, 10, 20, 30];
		let out = search_rows(&sorted, &[2, 4, 10, 31], &plan, true);
		assert_eq!(out, vec![2, 3, 1, 3]);
	}

	#[test]
	fn test_shape_mismatch() {
		assert!(matches!(
			SearchPlan::new(&[2, 3], &[3, 3]),
			Err(SortError::SearchShapeMismatch { .. })
		));
		assert!(SearchPlan::new(&[2, 3], &[6]).is_err());
		assert!(SearchPlan::new(&[], &[1]).is_err());
	}
}
