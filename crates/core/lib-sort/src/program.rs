// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Lowering of a trailing-axis sort into an ordered list of launches.
//!
//! The program is backend neutral. Launch order is the only ordering between
//! blocks: init, one block-sort launch, one launch per merge pass and an
//! optional reconcile copy.

use tracing::debug;

use crate::config::EngineConfig;
use crate::direction::SortOrder;
use crate::error::{Result, SortError};
use crate::geometry::{ceil_log2, Geometry, MergeGeometry};
use crate::layout::RowLayout;

/// One side of a ping-pong buffer pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Slot {
	Primary,
	Swap,
}

impl Slot {
	pub fn other(self) -> Self {
		match self {
			Slot::Primary => Slot::Swap,
			Slot::Swap => Slot::Primary,
		}
	}

	/// Source of merge pass `pass`; even passes read the primary buffer.
	pub fn source_of(pass: u32) -> Self {
		if pass % 2 == 0 {
			Slot::Primary
		} else {
			Slot::Swap
		}
	}

	pub(crate) fn index(self) -> usize {
		match self {
			Slot::Primary => 0,
			Slot::Swap => 1,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Stage {
	/// Row-wise copy of the input into the primary keys, identity indices.
	Init,
	/// Odd/even transposition sort of every tile, written to both slots.
	BlockSort { tile: u32 },
	/// One doubling pass of the mergepath merge.
	Merge {
		pass: u32,
		src: Slot,
		dst: Slot,
		merge: MergeGeometry,
	},
	/// Copies the swap slot back into the primary slot.
	Reconcile,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Launch {
	pub stage: Stage,
	pub grid: Geometry,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KernelProgram {
	pub layout: RowLayout,
	pub order: SortOrder,
	pub with_indices: bool,
	pub launches: Vec<Launch>,
}

impl KernelProgram {
	fn empty(
		layout: RowLayout,
		order: SortOrder,
		with_indices: bool,
	) -> Self {
		Self {
			layout,
			order,
			with_indices,
			launches: Vec::new(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.launches.is_empty()
	}

	pub fn merge_passes(&self) -> u32 {
		self.launches
			.iter()
			.filter(|l| matches!(l.stage, Stage::Merge { .. }))
			.count() as u32
	}

	pub fn reconciles(&self) -> bool {
		self.launches
			.iter()
			.any(|l| matches!(l.stage, Stage::Reconcile))
	}
}

/// Lowers a sort along the trailing `axis` of `shape`.
///
/// Fails when `axis` is not the last axis or the configuration is invalid.
/// A zero-length axis or an empty tensor yields an empty program.
pub fn sort_ir(
	shape: &[usize],
	axis: usize,
	order: SortOrder,
	with_indices: bool,
	config: &EngineConfig,
) -> Result<KernelProgram> {
	config.validate()?;

	let layout = RowLayout::new(shape, axis)?;
	if !layout.is_trailing() {
		return Err(SortError::InvalidAxis {
			axis: axis as isize,
			rank: shape.len(),
		});
	}
	if layout.total() == 0 {
		return Ok(KernelProgram::empty(layout, order, with_indices));
	}

	let size = layout.axis_len;
	let rows = layout.rows_count();
	let limits = &config.limits;
	let tuning = &config.tuning;

	let mut launches = vec![
		Launch {
			stage: Stage::Init,
			grid: Geometry::linear(size, rows, limits)?,
		},
		Launch {
			stage: Stage::BlockSort { tile: tuning.tile },
			grid: Geometry::tiled(size, rows, tuning)?,
		},
	];

	let lower = tuning.log_tile();
	let upper = ceil_log2(size);
	let passes = upper.saturating_sub(lower);
	for pass in 0..passes {
		let width = 2usize << (pass + lower);
		let merge = MergeGeometry::new(width, size, rows, limits, tuning)?;
		let src = Slot::source_of(pass);
		launches.push(Launch {
			stage: Stage::Merge {
				pass,
				src,
				dst: src.other(),
				merge,
			},
			grid: merge.grid,
		});
	}

	if passes % 2 == 1 {
		launches.push(Launch {
			stage: Stage::Reconcile,
			grid: Geometry::linear(size, rows, limits)?,
		});
	}

	debug!(
		rows,
		axis_len = size,
		passes,
		launches = launches.len(),
		?order,
		with_indices,
		"lowered sort program"
	);

	Ok(KernelProgram {
		layout,
		order,
		with_indices,
		launches,
	})
}
