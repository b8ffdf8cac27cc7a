// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use super::block::Block;
use super::buffers::RowPair;
use crate::direction::SortOrder;
use crate::elem::{IndexElem, SortElem};
use crate::geometry::{Geometry, MergeGeometry};
use crate::layout::RowLayout;
use crate::mergepath::{merge_lane, plan_block, Segment};
use crate::program::Slot;

/// Key and optional index buffers of one row.
pub(crate) struct RowBuffers<'a, N, I> {
	pub row: usize,
	pub keys: RowPair<'a, N>,
	pub indices: Option<RowPair<'a, I>>,
}

/// Blocks and barriers consumed by one row of a launch.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub(crate) struct RowStats {
	pub blocks: u64,
	pub barriers: u64,
}

impl std::ops::Add for RowStats {
	type Output = Self;

	fn add(
		self,
		rhs: Self,
	) -> Self {
		Self {
			blocks: self.blocks + rhs.blocks,
			barriers: self.barriers + rhs.barriers,
		}
	}
}

impl RowStats {
	fn record(
		&mut self,
		block: &Block,
	) {
		self.blocks += 1;
		self.barriers += block.barriers();
	}
}

pub(crate) fn init_row<N: SortElem, I: IndexElem>(
	input: &[N],
	layout: &RowLayout,
	grid: &Geometry,
	row: &mut RowBuffers<'_, N, I>,
) -> RowStats {
	let mut stats = RowStats::default();
	let keys = row.keys.get_mut(Slot::Primary);
	let mut indices = row.indices.as_mut().map(|p| p.get_mut(Slot::Primary));

	for bx in 0..grid.blocks_x as usize {
		let block = Block::new(grid.lanes_per_block as usize);
		let base = bx * block.lane_count();
		block.lanes(|lane| {
			let pos = base + lane;
			if pos < layout.axis_len {
				keys[pos] = input[layout.index(row.row, pos)];
				if let Some(idx) = indices.as_mut() {
					idx[pos] = I::from_usize(pos);
				}
			}
		});
		stats.record(&block);
	}
	stats
}

/// Odd/even transposition sort of every tile of the row in shared scratch.
pub(crate) fn odd_even_row<N: SortElem, I: IndexElem>(
	tile: usize,
	axis_len: usize,
	grid: &Geometry,
	order: SortOrder,
	row: &mut RowBuffers<'_, N, I>,
) -> RowStats {
	let mut stats = RowStats::default();
	let (keys, keys_swap) = row.keys.both_mut();
	let mut indices = row.indices.as_mut().map(|p| p.both_mut());
	let index_tile = if indices.is_some() { tile } else { 0 };

	for bx in 0..grid.blocks_x as usize {
		let mut block = Block::new(grid.lanes_per_block as usize);
		let start = bx * tile;
		let sort_num = tile.min(axis_len - start);

		block.with_shared::<N, _>(tile, |block, sk| {
			block.with_shared::<I, _>(index_tile, |block, si| {
				block.lanes(|lane| {
					for t in [2 * lane, 2 * lane + 1] {
						if t < sort_num {
							sk[t] = keys[start + t];
							if let Some((idx, _)) = indices.as_ref() {
								si[t] = idx[start + t];
							}
						}
					}
				});
				block.sync();

				for k in 0..sort_num {
					block.lanes(|lane| {
						let i = 2 * lane + k % 2;
						if i + 1 < sort_num && order.out_of_order(&sk[i], &sk[i + 1]) {
							sk.swap(i, i + 1);
							if !si.is_empty() {
								si.swap(i, i + 1);
							}
						}
					});
					block.sync();
				}

				block.lanes(|lane| {
					for t in [2 * lane, 2 * lane + 1] {
						if t < sort_num {
							keys[start + t] = sk[t];
							keys_swap[start + t] = sk[t];
							if let Some((idx, idx_swap)) = indices.as_mut() {
								idx[start + t] = si[t];
								idx_swap[start + t] = si[t];
							}
						}
					}
				});
			});
		});
		stats.record(&block);
	}
	stats
}

pub(crate) fn merge_row<N: SortElem, I: IndexElem>(
	src_slot: Slot,
	merge: &MergeGeometry,
	axis_len: usize,
	order: SortOrder,
	row: &mut RowBuffers<'_, N, I>,
) -> RowStats {
	let mut stats = RowStats::default();
	let (src, dst) = row.keys.split(src_slot);
	let mut indices = row.indices.as_mut().map(|p| p.split(src_slot));

	for seg in 0..merge.segments as usize {
		let segment = Segment::new(seg, merge.width as usize, axis_len);
		for bx in 0..merge.blocks_per_segment() as usize {
			let block = Block::new(merge.grid.lanes_per_block as usize);
			if let Some(plan) = plan_block(src, &segment, merge.split, bx, order) {
				block.lanes(|lane| {
					merge_lane(src, &plan, lane, order, |s, d| {
						dst[d] = src[s];
						if let Some((idx_src, idx_dst)) = indices.as_mut() {
							idx_dst[d] = idx_src[s];
						}
					});
				});
			}
			stats.record(&block);
		}
	}
	stats
}

pub(crate) fn reconcile_row<N: SortElem, I: IndexElem>(
	axis_len: usize,
	grid: &Geometry,
	row: &mut RowBuffers<'_, N, I>,
) -> RowStats {
	let mut stats = RowStats::default();
	let (src, dst) = row.keys.split(Slot::Swap);
	let mut indices = row.indices.as_mut().map(|p| p.split(Slot::Swap));

	for bx in 0..grid.blocks_x as usize {
		let block = Block::new(grid.lanes_per_block as usize);
		let base = bx * block.lane_count();
		block.lanes(|lane| {
			let pos = base + lane;
			if pos < axis_len {
				dst[pos] = src[pos];
				if let Some((idx_src, idx_dst)) = indices.as_mut() {
					idx_dst[pos] = idx_src[pos];
				}
			}
		});
		stats.record(&block);
	}
	stats
}
