// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Row sorters behind the public operations.
//!
//! Every backend sorts contiguous rows of `axis_len` elements. Values come
//! back sorted directly, never gathered again through the permutation.

use std::sync::Mutex;

use cubecl::prelude::Runtime;
use rayon::prelude::*;
use tracing::debug;

use crate::config::EngineConfig;
use crate::direction::SortOrder;
use crate::elem::{IndexElem, SortElem};
use crate::error::{Result, SortError};
use crate::host::{ExecutionReport, HostExecutor, PingPong};
use crate::kernels::CubeEngine;
use crate::program::{sort_ir, Slot};
use crate::search::{search_rows, SearchPlan};

pub trait SortBackend {
	fn name(&self) -> &'static str;

	fn sort_rows<N: SortElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<Vec<N>>;

	/// Sorted values and the source position of each along its row.
	fn argsort_rows<N: SortElem, I: IndexElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<(Vec<N>, Vec<I>)>;

	fn search_rows<N: SortElem>(
		&self,
		sorted: &[N],
		values: &[N],
		plan: &SearchPlan,
		right: bool,
	) -> Result<Vec<usize>> {
		Ok(search_rows(sorted, values, plan, right))
	}
}

fn row_shape(
	len: usize,
	axis_len: usize,
) -> Result<[usize; 2]> {
	if axis_len == 0 || len % axis_len != 0 {
		return Err(SortError::ShapeMismatch {
			shape: vec![axis_len].into(),
			len,
		});
	}
	Ok([len / axis_len, axis_len])
}

/// The mergepath engine on the CPU.
#[derive(Debug, Default)]
pub struct HostEngine {
	config: EngineConfig,
	executor: HostExecutor,
}

impl HostEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: EngineConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			executor: HostExecutor::new(),
		})
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn report(&self) -> ExecutionReport {
		self.executor.report()
	}
}

impl SortBackend for HostEngine {
	fn name(&self) -> &'static str {
		"host-mergepath"
	}

	fn sort_rows<N: SortElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<Vec<N>> {
		if data.is_empty() {
			return Ok(Vec::new());
		}
		let shape = row_shape(data.len(), axis_len)?;
		let program = sort_ir(&shape, 1, order, false, &self.config)?;
		let mut keys = PingPong::new(data.len());
		self.executor.run::<N, u32>(&program, data, &mut keys, None)?;
		Ok(keys.into_slot(Slot::Primary))
	}

	fn argsort_rows<N: SortElem, I: IndexElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<(Vec<N>, Vec<I>)> {
		if data.is_empty() {
			return Ok((Vec::new(), Vec::new()));
		}
		let shape = row_shape(data.len(), axis_len)?;
		let program = sort_ir(&shape, 1, order, true, &self.config)?;
		let mut keys = PingPong::new(data.len());
		let mut indices = PingPong::<I>::new(data.len());
		self.executor
			.run(&program, data, &mut keys, Some(&mut indices))?;
		Ok((keys.into_slot(Slot::Primary), indices.into_slot(Slot::Primary)))
	}
}

impl<R: Runtime> SortBackend for CubeEngine<R> {
	fn name(&self) -> &'static str {
		"cube-mergepath"
	}

	fn sort_rows<N: SortElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<Vec<N>> {
		if data.is_empty() {
			return Ok(Vec::new());
		}
		let shape = row_shape(data.len(), axis_len)?;
		let program = sort_ir(&shape, 1, order, false, self.config())?;
		let (values, _) = self.run_program(&program, data)?;
		Ok(values)
	}

	fn argsort_rows<N: SortElem, I: IndexElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<(Vec<N>, Vec<I>)> {
		if data.is_empty() {
			return Ok((Vec::new(), Vec::new()));
		}
		let shape = row_shape(data.len(), axis_len)?;
		let program = sort_ir(&shape, 1, order, true, self.config())?;
		let (values, perm) = self.run_program(&program, data)?;
		let perm = perm.ok_or(SortError::BufferMismatch {
			expected: data.len(),
			actual: 0,
		})?;
		let indices = perm
			.into_iter()
			.map(|i| I::from_usize(i as usize))
			.collect();
		Ok((values, indices))
	}

	fn search_rows<N: SortElem>(
		&self,
		sorted: &[N],
		values: &[N],
		plan: &SearchPlan,
		right: bool,
	) -> Result<Vec<usize>> {
		let out = self.search_sorted(
			sorted,
			values,
			plan.search_range,
			plan.per_row,
			plan.batched,
			right,
		)?;
		Ok(out.into_iter().map(|i| i as usize).collect())
	}
}

/// Stable parallel slice sort, one rayon task per row.
///
/// With a workspace the permutation scratch of argsort is kept between
/// calls instead of being allocated per call.
#[derive(Debug, Default)]
pub struct ParallelSliceBackend {
	workspace: Option<Mutex<Vec<usize>>>,
}

impl ParallelSliceBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_workspace(capacity: usize) -> Self {
		Self {
			workspace: Some(Mutex::new(Vec::with_capacity(capacity))),
		}
	}

	pub fn workspace_capacity(&self) -> Result<usize> {
		match &self.workspace {
			Some(ws) => Ok(ws.lock()?.capacity()),
			None => Ok(0),
		}
	}

	fn argsort_into<N: SortElem, I: IndexElem>(
		data: &[N],
		axis_len: usize,
		order: SortOrder,
		perm: &mut Vec<usize>,
	) -> (Vec<N>, Vec<I>) {
		perm.clear();
		perm.extend((0..data.len()).map(|i| i % axis_len));
		perm.par_chunks_mut(axis_len)
			.zip(data.par_chunks(axis_len))
			.for_each(|(p, row)| p.sort_by(|&a, &b| order.compare(&row[a], &row[b])));

		let values = perm
			.chunks(axis_len)
			.zip(data.chunks(axis_len))
			.flat_map(|(p, row)| p.iter().map(move |&i| row[i]))
			.collect();
		let indices = perm.iter().map(|&i| I::from_usize(i)).collect();
		(values, indices)
	}
}

impl SortBackend for ParallelSliceBackend {
	fn name(&self) -> &'static str {
		"parallel-slice"
	}

	fn sort_rows<N: SortElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<Vec<N>> {
		if data.is_empty() {
			return Ok(Vec::new());
		}
		row_shape(data.len(), axis_len)?;
		let mut out = data.to_vec();
		out.par_chunks_mut(axis_len)
			.for_each(|row| row.sort_by(|a, b| order.compare(a, b)));
		Ok(out)
	}

	fn argsort_rows<N: SortElem, I: IndexElem>(
		&self,
		data: &[N],
		axis_len: usize,
		order: SortOrder,
	) -> Result<(Vec<N>, Vec<I>)> {
		if data.is_empty() {
			return Ok((Vec::new(), Vec::new()));
		}
		row_shape(data.len(), axis_len)?;
		match &self.workspace {
			Some(ws) => {
				let mut perm = ws.lock()?;
				debug!(capacity = perm.capacity(), need = data.len(), "reusing argsort workspace");
				Ok(Self::argsort_into(data, axis_len, order, &mut perm))
			},
			None => {
				let mut perm = Vec::with_capacity(data.len());
				Ok(Self::argsort_into(data, axis_len, order, &mut perm))
			},
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn tiny_host() -> HostEngine {
		HostEngine::with_config(
			EngineConfig::builder()
				.with_max_lanes(2)
				.with_tile(4)
				.with_thread_work(2)
				.build()
				.unwrap(),
		)
		.unwrap()
	}

	#[test]
	fn test_backends_agree() {
		let data: Vec<f32> = (0..90).map(|v| ((v * 37) % 23) as f32 - 11.0).collect();
		let host = tiny_host();
		let slice = ParallelSliceBackend::with_workspace(16);

		for order in [SortOrder::Ascending, SortOrder::Descending] {
			let (hv, hi) = host.argsort_rows::<f32, i64>(&data, 30, order).unwrap();
			let (sv, si) = slice.argsort_rows::<f32, i64>(&data, 30, order).unwrap();
			assert_eq!(hv, sv);
			assert_eq!(hi, si);
			assert_eq!(host.sort_rows(&data, 30, order).unwrap(), sv);
			assert_eq!(slice.sort_rows(&data, 30, order).unwrap(), sv);
		}
		assert!(slice.workspace_capacity().unwrap() >= 90);
	}

	#[test]
	fn test_row_shape_checked() {
		let res = HostEngine::new().sort_rows(&[1, 2, 3], 2, SortOrder::Ascending);
		assert!(matches!(res, Err(SortError::ShapeMismatch { .. })));
		let res = ParallelSliceBackend::new().sort_rows(&[1, 2, 3], 0, SortOrder::Ascending);
		assert!(res.is_err());
	}

	#[test]
	fn test_empty_rows() {
		let (v, i) = HostEngine::new()
			.argsort_rows::<i32, u32>(&[], 4, SortOrder::Ascending)
			.unwrap();
		assert!(v.is_empty() && i.is_empty());
	}
}
