// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Mapping of problem sizes onto the lane / block / grid hierarchy.
//!
//! Every launch asks for its shape here. `blocks_y` folds the independent
//! rows (and for merge passes the segments of each row) so that rows never
//! share a block.

use crate::config::{DeviceLimits, SortTuning};
use crate::error::{Result, SortError};

/// Largest grid extent along `y` before the remainder spills into `z`.
pub const MAX_GRID_Y: u32 = 65_535;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Geometry {
	pub lanes_per_block: u32,
	pub blocks_x: u32,
	pub blocks_y: u32,
}

impl Geometry {
	/// One lane per element, `ceil(size / lanes)` blocks per row.
	pub fn linear(
		size: usize,
		rows: usize,
		limits: &DeviceLimits,
	) -> Result<Self> {
		check_sizes(size, rows)?;
		let lanes = (limits.max_lanes_per_block as usize).min(size);
		Ok(Self {
			lanes_per_block: to_u32(lanes, "lanes")?,
			blocks_x: to_u32(size.div_ceil(lanes), "blocks_x")?,
			blocks_y: to_u32(rows, "blocks_y")?,
		})
	}

	/// One block per tile, two tile slots per lane.
	pub fn tiled(
		size: usize,
		rows: usize,
		tuning: &SortTuning,
	) -> Result<Self> {
		check_sizes(size, rows)?;
		Ok(Self {
			lanes_per_block: tuning.tile_lanes(),
			blocks_x: to_u32(size.div_ceil(tuning.tile as usize), "blocks_x")?,
			blocks_y: to_u32(rows, "blocks_y")?,
		})
	}

	pub fn blocks(&self) -> u64 {
		self.blocks_x as u64 * self.blocks_y as u64
	}

	/// `blocks_y` split across the `y` and `z` grid axes.
	pub fn grid_yz(&self) -> (u32, u32) {
		if self.blocks_y <= MAX_GRID_Y {
			(self.blocks_y, 1)
		} else {
			(MAX_GRID_Y, self.blocks_y.div_ceil(MAX_GRID_Y))
		}
	}
}

/// How one segment's merge is divided between blocks and lanes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MergeSplit {
	/// One block per segment, each lane merges `step` outputs.
	Single { step: u32 },
	/// Each block owns `step_count` outputs, each lane `thread_work` of them.
	TwoLevel { step_count: u32, thread_work: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MergeGeometry {
	pub grid: Geometry,
	pub width: u32,
	pub segments: u32,
	pub split: MergeSplit,
}

impl MergeGeometry {
	pub fn new(
		width: usize,
		size: usize,
		rows: usize,
		limits: &DeviceLimits,
		tuning: &SortTuning,
	) -> Result<Self> {
		check_sizes(size, rows)?;
		if width < 2 {
			return Err(SortError::InvalidGeometry("merge width below 2"));
		}

		let max_lanes = limits.max_lanes_per_block as usize;
		let lanes = if limits.fixed_block_dim {
			max_lanes
		} else {
			max_lanes.min(width)
		};
		let step_count = max_lanes * tuning.thread_work as usize;
		let blocks_per_segment = width.div_ceil(step_count);
		let segments = size.div_ceil(width);

		let split = if blocks_per_segment == 1 {
			MergeSplit::Single {
				step: to_u32(width.div_ceil(lanes), "step")?,
			}
		} else {
			MergeSplit::TwoLevel {
				step_count: to_u32(step_count, "step_count")?,
				thread_work: tuning.thread_work,
			}
		};

		let blocks_y = rows
			.checked_mul(segments)
			.ok_or(SortError::InvalidGeometry("blocks_y overflow"))?;

		Ok(Self {
			grid: Geometry {
				lanes_per_block: to_u32(lanes, "lanes")?,
				blocks_x: to_u32(blocks_per_segment, "blocks_x")?,
				blocks_y: to_u32(blocks_y, "blocks_y")?,
			},
			width: to_u32(width, "width")?,
			segments: to_u32(segments, "segments")?,
			split,
		})
	}

	pub fn blocks_per_segment(&self) -> u32 {
		self.grid.blocks_x
	}
}

/// Smallest `p` with `2^p >= n`; zero for `n <= 1`.
pub fn ceil_log2(n: usize) -> u32 {
	if n <= 1 {
		0
	} else {
		(n - 1).ilog2() + 1
	}
}

fn check_sizes(
	size: usize,
	rows: usize,
) -> Result<()> {
	if size == 0 {
		return Err(SortError::InvalidGeometry("problem size is zero"));
	}
	if rows == 0 {
		return Err(SortError::InvalidGeometry("row count is zero"));
	}
	Ok(())
}

fn to_u32(
	v: usize,
	what: &'static str,
) -> Result<u32> {
	u32::try_from(v).map_err(|_| SortError::InvalidGeometry(what))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_ceil_log2() {
		assert_eq!(ceil_log2(0), 0);
		assert_eq!(ceil_log2(1), 0);
		assert_eq!(ceil_log2(2), 1);
		assert_eq!(ceil_log2(5), 3);
		assert_eq!(ceil_log2(128), 7);
		assert_eq!(ceil_log2(129), 8);
	}

	#[test]
	fn test_linear() {
		let g = Geometry::linear(2500, 3, &DeviceLimits::new(1024)).unwrap();
		assert_eq!(g.lanes_per_block, 1024);
		assert_eq!(g.blocks_x, 3);
		assert_eq!(g.blocks_y, 3);

		let small = Geometry::linear(5, 1, &DeviceLimits::new(1024)).unwrap();
		assert_eq!((small.lanes_per_block, small.blocks_x), (5, 1));
	}

	#[test]
	fn test_zero_sizes_fail() {
		let limits = DeviceLimits::default();
		assert!(matches!(
			Geometry::linear(0, 1, &limits),
			Err(SortError::InvalidGeometry(_))
		));
		assert!(Geometry::linear(4, 0, &limits).is_err());
		assert!(Geometry::tiled(0, 1, &SortTuning::default()).is_err());
	}

	#[test]
	fn test_tiled() {
		let g = Geometry::tiled(300, 2, &SortTuning::default()).unwrap();
		assert_eq!(g.lanes_per_block, 64);
		assert_eq!(g.blocks_x, 3);
		assert_eq!(g.blocks_y, 2);
	}

	#[test]
	fn test_merge_single_level() {
		let g = MergeGeometry::new(256, 1000, 2, &DeviceLimits::new(1024), &SortTuning::default())
			.unwrap();
		assert_eq!(g.grid.lanes_per_block, 256);
		assert_eq!(g.blocks_per_segment(), 1);
		assert_eq!(g.segments, 4);
		assert_eq!(g.grid.blocks_y, 8);
		assert_eq!(g.split, MergeSplit::Single { step: 1 });
	}

	#[test]
	fn test_merge_two_level() {
		let tuning = SortTuning {
			tile: 4,
			thread_work: 2,
		};
		let g = MergeGeometry::new(32, 40, 1, &DeviceLimits::new(2), &tuning).unwrap();
		assert_eq!(g.grid.lanes_per_block, 2);
		assert_eq!(g.blocks_per_segment(), 8);
		assert_eq!(g.segments, 2);
		assert_eq!(
			g.split,
			MergeSplit::TwoLevel {
				step_count: 4,
				thread_work: 2
			}
		);
	}

	#[test]
	fn test_fixed_block_dim_uses_max_lanes() {
		let limits = DeviceLimits::new(64).with_fixed_block_dim(true);
		let g = MergeGeometry::new(16, 16, 1, &limits, &SortTuning::default()).unwrap();
		assert_eq!(g.grid.lanes_per_block, 64);
		assert_eq!(g.split, MergeSplit::Single { step: 1 });
	}

	#[test]
	fn test_grid_yz_folding() {
		let g = Geometry {
			lanes_per_block: 1,
			blocks_x: 1,
			blocks_y: MAX_GRID_Y + 1,
		};
		assert_eq!(g.grid_yz(), (MAX_GRID_Y, 2));
	}
}
