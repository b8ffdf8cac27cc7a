// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use crate::error::{Result, SortError};

/// A tensor viewed as `(outer, axis_len, inner)` around one axis.
///
/// A row is every element sharing one `(outer, inner)` coordinate; rows are
/// numbered `o * inner + i` and walk the axis with stride `inner`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RowLayout {
	pub outer: usize,
	pub axis_len: usize,
	pub inner: usize,
}

impl RowLayout {
	pub fn new(
		shape: &[usize],
		axis: usize,
	) -> Result<Self> {
		if axis >= shape.len() {
			return Err(SortError::InvalidAxis {
				axis: axis as isize,
				rank: shape.len(),
			});
		}
		Ok(Self {
			outer: shape[..axis].iter().product(),
			axis_len: shape[axis],
			inner: shape[axis + 1..].iter().product(),
		})
	}

	/// Layout of `rows` contiguous rows of `axis_len` elements.
	pub fn rows(
		rows: usize,
		axis_len: usize,
	) -> Self {
		Self {
			outer: rows,
			axis_len,
			inner: 1,
		}
	}

	pub fn rows_count(&self) -> usize {
		self.outer * self.inner
	}

	pub fn total(&self) -> usize {
		self.outer * self.axis_len * self.inner
	}

	pub fn is_trailing(&self) -> bool {
		self.inner == 1
	}

	#[inline]
	pub fn index(
		&self,
		row: usize,
		pos: usize,
	) -> usize {
		let o = row / self.inner;
		let i = row % self.inner;
		(o * self.axis_len + pos) * self.inner + i
	}
}

/// Resolves a possibly negative axis against `rank`.
pub fn normalize_axis(
	axis: isize,
	rank: usize,
) -> Result<usize> {
	let resolved = if axis < 0 { axis + rank as isize } else { axis };
	if resolved < 0 || resolved as usize >= rank {
		return Err(SortError::InvalidAxis { axis, rank });
	}
	Ok(resolved as usize)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_layout_product() {
		let l = RowLayout::new(&[2, 5, 3], 1).unwrap();
		assert_eq!((l.outer, l.axis_len, l.inner), (2, 5, 3));
		assert_eq!(l.total(), 30);
		assert_eq!(l.rows_count(), 6);
	}

	#[test]
	fn test_layout_index_walks_axis_with_inner_stride() {
		let l = RowLayout::new(&[2, 5, 3], 1).unwrap();
		// row 4 is outer 1, inner 1
		assert_eq!(l.index(4, 0), 15 + 1);
		assert_eq!(l.index(4, 1), 15 + 1 + 3);
	}

	#[test]
	fn test_normalize_axis() {
		assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
		assert_eq!(normalize_axis(0, 3).unwrap(), 0);
		assert!(matches!(
			normalize_axis(3, 3),
			Err(SortError::InvalidAxis { axis: 3, rank: 3 })
		));
		assert!(normalize_axis(-4, 3).is_err());
	}
}
