// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Tensor level sort, argsort, topk and searchsorted.
//!
//! Any axis is moved to the trailing position, sorted row by row on the
//! backend and moved back.

use std::str::FromStr;

use tracing::debug;

use crate::backend::SortBackend;
use crate::direction::SortOrder;
use crate::elem::{IndexElem, SortElem};
use crate::error::{Result, SortError};
use crate::layout::normalize_axis;
use crate::search::SearchPlan;
use crate::tensor::Tensor;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum RetType {
	#[default]
	Both,
	Values,
	Indices,
}

impl FromStr for RetType {
	type Err = SortError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"both" => Ok(RetType::Both),
			"values" => Ok(RetType::Values),
			"indices" => Ok(RetType::Indices),
			other => Err(SortError::InvalidRetType(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopK<N: SortElem, I: IndexElem> {
	Both(Tensor<N>, Tensor<I>),
	Values(Tensor<N>),
	Indices(Tensor<I>),
}

impl<N: SortElem, I: IndexElem> TopK<N, I> {
	pub fn values(&self) -> Option<&Tensor<N>> {
		match self {
			TopK::Both(v, _) | TopK::Values(v) => Some(v),
			TopK::Indices(_) => None,
		}
	}

	pub fn indices(&self) -> Option<&Tensor<I>> {
		match self {
			TopK::Both(_, i) | TopK::Indices(i) => Some(i),
			TopK::Values(_) => None,
		}
	}
}

/// Data moved so that the sort axis is the last one.
struct Trailing<N: SortElem> {
	axis: usize,
	last: usize,
	moved: Tensor<N>,
}

impl<N: SortElem> Trailing<N> {
	fn new(
		data: &Tensor<N>,
		axis: isize,
	) -> Result<Self> {
		let axis = normalize_axis(axis, data.rank())?;
		let last = data.rank() - 1;
		let moved = data.swap_axes(axis, last)?;
		Ok(Self { axis, last, moved })
	}

	fn axis_len(&self) -> usize {
		self.moved.shape()[self.last]
	}

	/// Wraps row-sorted output, narrows it to `k` and restores the axis.
	fn restore<T: SortElem>(
		&self,
		data: Vec<T>,
		k: Option<usize>,
	) -> Result<Tensor<T>> {
		let mut out = Tensor::from_shape(data, self.moved.shape())?;
		if let Some(k) = k {
			out = out.narrow(self.last, k)?;
		}
		out.swap_axes(self.axis, self.last)
	}
}

fn check_index<I: IndexElem>(len: usize) -> Result<()> {
	if !I::fits(len) {
		return Err(SortError::IndexRange {
			axis_len: len,
			dtype: I::NAME,
		});
	}
	Ok(())
}

pub struct SortOps<B: SortBackend> {
	backend: B,
}

impl<B: SortBackend> SortOps<B> {
	pub fn new(backend: B) -> Self {
		Self { backend }
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn sort<N: SortElem>(
		&self,
		data: &Tensor<N>,
		axis: isize,
		order: SortOrder,
	) -> Result<Tensor<N>> {
		let t = Trailing::new(data, axis)?;
		let values = self
			.backend
			.sort_rows(&t.moved.data, t.axis_len(), order)?;
		t.restore(values, None)
	}

	pub fn argsort<N: SortElem, I: IndexElem>(
		&self,
		data: &Tensor<N>,
		axis: isize,
		order: SortOrder,
	) -> Result<Tensor<I>> {
		let (_, indices) = self.sort_with_indices::<N, I>(data, axis, order)?;
		Ok(indices)
	}

	pub fn sort_with_indices<N: SortElem, I: IndexElem>(
		&self,
		data: &Tensor<N>,
		axis: isize,
		order: SortOrder,
	) -> Result<(Tensor<N>, Tensor<I>)> {
		let t = Trailing::new(data, axis)?;
		check_index::<I>(t.axis_len())?;
		let (values, indices) = self
			.backend
			.argsort_rows::<N, I>(&t.moved.data, t.axis_len(), order)?;
		Ok((t.restore(values, None)?, t.restore(indices, None)?))
	}

	/// Leading `k` entries along `axis`. `k < 1` keeps the whole axis and
	/// `k` past the axis length is clamped.
	pub fn topk<N: SortElem, I: IndexElem>(
		&self,
		data: &Tensor<N>,
		k: isize,
		axis: isize,
		ret_type: RetType,
		order: SortOrder,
	) -> Result<TopK<N, I>> {
		let t = Trailing::new(data, axis)?;
		let axis_len = t.axis_len();
		let k = (k >= 1).then(|| (k as usize).min(axis_len));
		debug!(?k, axis_len, ?ret_type, backend = self.backend.name(), "topk");

		if ret_type == RetType::Values {
			let values = self
				.backend
				.sort_rows(&t.moved.data, axis_len, order)?;
			return Ok(TopK::Values(t.restore(values, k)?));
		}

		check_index::<I>(axis_len)?;
		let (values, indices) = self
			.backend
			.argsort_rows::<N, I>(&t.moved.data, axis_len, order)?;
		let indices = t.restore(indices, k)?;
		match ret_type {
			RetType::Indices => Ok(TopK::Indices(indices)),
			_ => Ok(TopK::Both(t.restore(values, k)?, indices)),
		}
	}

	/// Insertion points of `values` into the last axis of `sorted`.
	pub fn searchsorted<N: SortElem, I: IndexElem>(
		&self,
		sorted: &Tensor<N>,
		values: &Tensor<N>,
		right: bool,
	) -> Result<Tensor<I>> {
		let plan = SearchPlan::new(sorted.shape(), values.shape())?;
		check_index::<I>(plan.search_range + 1)?;
		let found = self
			.backend
			.search_rows(&sorted.data, &values.data, &plan, right)?;
		let out = found.into_iter().map(I::from_usize).collect();
		Tensor::from_shape(out, values.shape())
	}
}

#[cfg(test)]
mod test {
	use proptest::prelude::*;

	use super::*;
	use crate::backend::{HostEngine, ParallelSliceBackend};
	use crate::config::EngineConfig;

	fn tiny_ops() -> SortOps<HostEngine> {
		let cfg = EngineConfig::builder()
			.with_max_lanes(2)
			.with_tile(4)
			.with_thread_work(2)
			.build()
			.unwrap();
		SortOps::new(HostEngine::with_config(cfg).unwrap())
	}

	#[test]
	fn test_argsort_keeps_ties_in_order() {
		let ops = SortOps::new(HostEngine::new());
		let data = Tensor::vector(vec![5, 1, 4, 2, 2]);
		let (v, i) = ops
			.sort_with_indices::<i32, i64>(&data, -1, SortOrder::Ascending)
			.unwrap();
		assert_eq!(v.data, vec![1, 2, 2, 4, 5]);
		assert_eq!(i.data, vec![1, 3, 4, 2, 0]);
	}

	#[test]
	fn test_topk_descending() {
		let ops = SortOps::new(HostEngine::new());
		let data = Tensor::vector(vec![5, 1, 4, 2, 2]);
		let top = ops
			.topk::<i32, i32>(&data, 2, 0, RetType::Both, SortOrder::Descending)
			.unwrap();
		assert_eq!(top.values().unwrap().data, vec![5, 4]);
		assert_eq!(top.indices().unwrap().data, vec![0, 2]);
	}

	#[test]
	fn test_topk_k_bounds() {
		let ops = SortOps::new(ParallelSliceBackend::new());
		let data = Tensor::vector(vec![3.0f32, 1.0, 2.0]);
		let full = ops
			.topk::<f32, u32>(&data, 0, 0, RetType::Values, SortOrder::Ascending)
			.unwrap();
		assert_eq!(full.values().unwrap().data, vec![1.0, 2.0, 3.0]);
		assert!(full.indices().is_none());

		let clamped = ops
			.topk::<f32, u32>(&data, 10, 0, RetType::Indices, SortOrder::Ascending)
			.unwrap();
		assert_eq!(clamped.indices().unwrap().data, vec![1, 2, 0]);
		assert!(clamped.values().is_none());
	}

	#[test]
	fn test_sort_inner_axis() {
		let ops = tiny_ops();
		// shape [2, 3, 2], sort along axis 1
		let data = Tensor::from_shape(vec![6, 1, 4, 5, 2, 3, 9, 7, 8, 8, 7, 9], &[2, 3, 2]).unwrap();
		let (v, i) = ops
			.sort_with_indices::<i32, u32>(&data, 1, SortOrder::Ascending)
			.unwrap();
		assert_eq!(v.shape(), &[2, 3, 2]);
		assert_eq!(v.data, vec![2, 1, 4, 3, 6, 5, 7, 7, 8, 8, 9, 9]);
		assert_eq!(i.data, vec![2, 0, 1, 2, 0, 1, 2, 0, 1, 1, 0, 2]);
	}

	#[test]
	fn test_topk_along_first_axis() {
		let ops = tiny_ops();
		let data = Tensor::from_shape(vec![1, 9, 7, 3, 5, 5], &[3, 2]).unwrap();
		let top = ops
			.topk::<i32, i64>(&data, 1, 0, RetType::Both, SortOrder::Descending)
			.unwrap();
		let values = top.values().unwrap();
		assert_eq!(values.shape(), &[1, 2]);
		assert_eq!(values.data, vec![7, 9]);
		assert_eq!(top.indices().unwrap().data, vec![1, 0]);
	}

	#[test]
	fn test_invalid_axis_and_ret_type() {
		let ops = SortOps::new(HostEngine::new());
		let data = Tensor::from_shape(vec![1, 2, 3, 4], &[2, 2]).unwrap();
		assert!(matches!(
			ops.sort(&data, 2, SortOrder::Ascending),
			Err(SortError::InvalidAxis { axis: 2, rank: 2 })
		));
		assert!(ops.sort(&data, -3, SortOrder::Ascending).is_err());
		assert!(ops.sort(&data, -2, SortOrder::Ascending).is_ok());
		assert!(matches!(
			"top".parse::<RetType>(),
			Err(SortError::InvalidRetType(_))
		));
		assert_eq!("indices".parse::<RetType>().unwrap(), RetType::Indices);
	}

	#[test]
	fn test_searchsorted_sides() {
		let ops = SortOps::new(HostEngine::new());
		let sorted = Tensor::vector(vec![1, 3, 3, 5]);
		let needle = Tensor::vector(vec![3]);
		let left = ops.searchsorted::<i32, i64>(&sorted, &needle, false).unwrap();
		let right = ops.searchsorted::<i32, i64>(&sorted, &needle, true).unwrap();
		assert_eq!(left.data, vec![1]);
		assert_eq!(right.data, vec![3]);

		let batched = Tensor::from_shape(vec![1, 3, 3, 5], &[2, 2]).unwrap();
		let needles = Tensor::from_shape(vec![3, 3, 2], &[3, 1]).unwrap();
		assert!(matches!(
			ops.searchsorted::<i32, i64>(&batched, &needles, false),
			Err(SortError::SearchShapeMismatch { .. })
		));
	}

	#[test]
	fn test_empty_axis() {
		let ops = SortOps::new(HostEngine::new());
		let data = Tensor::<f32>::from_shape(vec![], &[3, 0]).unwrap();
		let (v, i) = ops
			.sort_with_indices::<f32, i32>(&data, 1, SortOrder::Ascending)
			.unwrap();
		assert_eq!(v.shape(), &[3, 0]);
		assert!(i.is_empty());
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(48))]

		#[test]
		fn prop_sort_orders_and_permutes(
			rows in 1usize..4,
			data in prop::collection::vec(-50i32..50, 1..120),
			descending in any::<bool>(),
		) {
			let axis_len = data.len();
			let data: Vec<i32> = data.iter().cycle().take(rows * axis_len).copied().collect();
			let tensor = Tensor::from_shape(data.clone(), &[rows, axis_len]).unwrap();
			let order = SortOrder::from_ascending(!descending);
			let (v, i) = tiny_ops()
				.sort_with_indices::<i32, u32>(&tensor, -1, order)
				.unwrap();

			for r in 0..rows {
				let row_in = &data[r * axis_len..(r + 1) * axis_len];
				let row_v = &v.data[r * axis_len..(r + 1) * axis_len];
				let row_i = &i.data[r * axis_len..(r + 1) * axis_len];
				for w in row_v.windows(2) {
					prop_assert!(order.in_order(&w[0], &w[1]));
				}
				for w in row_i.windows(2) {
					if row_in[w[0] as usize] == row_in[w[1] as usize] {
						prop_assert!(w[0] < w[1]);
					}
				}
				let mut seen = row_i.to_vec();
				seen.sort_unstable();
				prop_assert_eq!(seen, (0..axis_len as u32).collect::<Vec<_>>());
				for (p, &src) in row_i.iter().enumerate() {
					prop_assert_eq!(row_in[src as usize], row_v[p]);
				}
			}
		}

		#[test]
		fn prop_topk_is_sorted_prefix(
			data in prop::collection::vec(-20i32..20, 1..80),
			k in 1isize..90,
		) {
			let ops = tiny_ops();
			let tensor = Tensor::vector(data);
			let (v, i) = ops
				.sort_with_indices::<i32, i64>(&tensor, 0, SortOrder::Descending)
				.unwrap();
			let top = ops
				.topk::<i32, i64>(&tensor, k, 0, RetType::Both, SortOrder::Descending)
				.unwrap();
			let kk = (k as usize).min(tensor.len());
			prop_assert_eq!(&top.values().unwrap().data[..], &v.data[..kk]);
			prop_assert_eq!(&top.indices().unwrap().data[..], &i.data[..kk]);
		}

		#[test]
		fn prop_sort_is_idempotent(
			mut data in prop::collection::vec(-20i32..20, 0..200),
			cols in 1usize..40,
		) {
			data.truncate(data.len() / cols * cols);
			let rows = data.len() / cols;
			let ops = tiny_ops();
			let tensor = Tensor::from_shape(data, &[rows, cols]).unwrap();

			for order in [SortOrder::Ascending, SortOrder::Descending] {
				let once = ops.sort(&tensor, -1, order).unwrap();
				let (twice, idx) = ops
					.sort_with_indices::<i32, u32>(&once, -1, order)
					.unwrap();
				prop_assert_eq!(&once, &twice);
				for row in idx.data.chunks(cols) {
					prop_assert_eq!(row, &(0..cols as u32).collect::<Vec<_>>()[..]);
				}
			}
		}

		#[test]
		fn prop_searchsorted_bounds(
			mut hay in prop::collection::vec(-30i32..30, 0..40),
			needles in prop::collection::vec(-35i32..35, 1..20),
			right in any::<bool>(),
		) {
			hay.sort();
			let ops = SortOps::new(ParallelSliceBackend::new());
			let n = needles.len();
			let out = ops
				.searchsorted::<i32, u64>(&Tensor::vector(hay.clone()), &Tensor::vector(needles.clone()), right)
				.unwrap();
			for (&idx, &v) in out.data.iter().zip(&needles) {
				let idx = idx as usize;
				prop_assert!(idx <= hay.len());
				if right {
					prop_assert!(hay[..idx].iter().all(|h| *h <= v));
					prop_assert!(hay[idx..].iter().all(|h| *h > v));
				} else {
					prop_assert!(hay[..idx].iter().all(|h| *h < v));
					prop_assert!(hay[idx..].iter().all(|h| *h >= v));
				}
			}
			prop_assert_eq!(out.len(), n);
		}
	}
}
