// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! CPU execution of a [`KernelProgram`].
//!
//! Launches run one after another. Inside a launch the rows run in parallel
//! on the rayon pool, the blocks of a row run in grid order and the lanes of
//! a block run phase by phase between explicit barriers.

mod block;
mod buffers;
mod kernels;

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::trace;

pub use block::{Block, SharedScratch};
pub use buffers::PingPong;

use kernels::{init_row, merge_row, odd_even_row, reconcile_row, RowBuffers, RowStats};

use crate::elem::{IndexElem, SortElem};
use crate::error::{Result, SortError};
use crate::program::{KernelProgram, Stage};

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
	pub launches: u64,
	pub blocks: u64,
	pub barriers: u64,
}

#[derive(Debug, Default)]
pub struct HostExecutor {
	launches: AtomicU64,
	blocks: AtomicU64,
	barriers: AtomicU64,
}

impl HostExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Totals since creation or the last [`reset`](Self::reset).
	pub fn report(&self) -> ExecutionReport {
		ExecutionReport {
			launches: self.launches.load(Ordering::Relaxed),
			blocks: self.blocks.load(Ordering::Relaxed),
			barriers: self.barriers.load(Ordering::Relaxed),
		}
	}

	pub fn reset(&self) {
		self.launches.store(0, Ordering::Relaxed);
		self.blocks.store(0, Ordering::Relaxed);
		self.barriers.store(0, Ordering::Relaxed);
	}

	/// Runs `program` over `input`. Results land in the primary slots.
	pub fn run<N: SortElem, I: IndexElem>(
		&self,
		program: &KernelProgram,
		input: &[N],
		keys: &mut PingPong<N>,
		indices: Option<&mut PingPong<I>>,
	) -> Result<()> {
		let layout = program.layout;
		let total = layout.total();
		check_len(total, input.len())?;
		check_len(total, keys.len())?;

		let mut indices = if program.with_indices {
			let idx = indices.ok_or(SortError::BufferMismatch {
				expected: total,
				actual: 0,
			})?;
			check_len(total, idx.len())?;
			Some(idx)
		} else {
			None
		};

		if program.is_empty() {
			return Ok(());
		}
		debug_assert!(layout.is_trailing());

		let size = layout.axis_len;
		let order = program.order;
		for (n, launch) in program.launches.iter().enumerate() {
			let rows = split_rows(size, keys, indices.as_deref_mut());
			let stats = rows
				.into_par_iter()
				.map(|mut row| match launch.stage {
					Stage::Init => init_row(input, &layout, &launch.grid, &mut row),
					Stage::BlockSort { tile } => {
						odd_even_row(tile as usize, size, &launch.grid, order, &mut row)
					},
					Stage::Merge { src, merge, .. } => merge_row(src, &merge, size, order, &mut row),
					Stage::Reconcile => reconcile_row(size, &launch.grid, &mut row),
				})
				.reduce(RowStats::default, |a, b| a + b);

			self.launches.fetch_add(1, Ordering::Relaxed);
			self.blocks.fetch_add(stats.blocks, Ordering::Relaxed);
			self.barriers.fetch_add(stats.barriers, Ordering::Relaxed);
			trace!(
				launch = n,
				stage = ?launch.stage,
				blocks = stats.blocks,
				barriers = stats.barriers,
				"host launch"
			);
		}
		Ok(())
	}
}

fn check_len(
	expected: usize,
	actual: usize,
) -> Result<()> {
	if expected != actual {
		return Err(SortError::BufferMismatch { expected, actual });
	}
	Ok(())
}

fn split_rows<'a, N, I>(
	axis_len: usize,
	keys: &'a mut PingPong<N>,
	indices: Option<&'a mut PingPong<I>>,
) -> Vec<RowBuffers<'a, N, I>> {
	let key_rows = keys.rows(axis_len);
	match indices {
		Some(idx) => key_rows
			.into_iter()
			.zip(idx.rows(axis_len))
			.enumerate()
			.map(|(row, (keys, indices))| RowBuffers {
				row,
				keys,
				indices: Some(indices),
			})
			.collect(),
		None => key_rows
			.into_iter()
			.enumerate()
			.map(|(row, keys)| RowBuffers {
				row,
				keys,
				indices: None,
			})
			.collect(),
	}
}
