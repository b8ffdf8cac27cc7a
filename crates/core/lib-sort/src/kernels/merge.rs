// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;

use crate::direction::in_order;
use crate::geometry::MergeSplit;

/// Launch-invariant settings of one merge pass.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MergeCfg {
	pub thread_work: u32,
	pub two_level: bool,
	pub asc: u32,
	pub with_indices: bool,
}

impl MergeCfg {
	/// The comptime config and the runtime `step` scalar of a pass.
	pub fn new(
		split: MergeSplit,
		asc: u32,
		with_indices: bool,
	) -> (Self, u32) {
		let (step, thread_work, two_level) = match split {
			MergeSplit::Single { step } => (step, 1, false),
			MergeSplit::TwoLevel {
				step_count,
				thread_work,
			} => (step_count, thread_work, true),
		};
		(
			Self {
				thread_work,
				two_level,
				asc,
				with_indices,
			},
			step,
		)
	}
}

#[cube]
fn merge_begin<N: Numeric>(
	src: &Tensor<N>,
	a_start: u32,
	a_count: u32,
	b_start: u32,
	b_count: u32,
	diag: u32,
	#[comptime] asc: u32,
) -> u32 {
	let mut first = 0u32;
	if diag > b_count {
		first = diag - b_count;
	}
	let mut last = select(diag < a_count, diag, a_count);

	loop {
		if first >= last {
			break;
		}
		let mid = (first + last) / 2u32;
		let a = src[a_start + mid];
		let b = src[b_start + diag - 1u32 - mid];
		if in_order::<N>(a, b, asc) {
			first = mid + 1u32;
		} else {
			last = mid;
		}
	}
	first
}

#[cube]
fn serial_merge<N: Numeric>(
	src: &Tensor<N>,
	dst: &mut Tensor<N>,
	src_idx: &Tensor<u32>,
	dst_idx: &mut Tensor<u32>,
	a_start: u32,
	a_count: u32,
	b_start: u32,
	b_count: u32,
	k_start: u32,
	diag: u32,
	step: u32,
	first: u32,
	#[comptime] asc: u32,
	#[comptime] with_indices: bool,
) {
	let a_end = a_start + a_count;
	let b_end = b_start + b_count;
	let mut i = a_start + first;
	let mut j = b_start + diag - first;

	let rest = a_count + b_count - diag;
	let count = select(rest < step, rest, step);

	for c in 0..count {
		let out = k_start + diag + c;
		let mut take_left = false;
		if i < a_end {
			take_left = true;
			if j < b_end {
				take_left = in_order::<N>(src[i], src[j], asc);
			}
		}

		if take_left {
			dst[out] = src[i];
			if comptime!(with_indices) {
				dst_idx[out] = src_idx[i];
			}
			i += 1u32;
		} else {
			dst[out] = src[j];
			if comptime!(with_indices) {
				dst_idx[out] = src_idx[j];
			}
			j += 1u32;
		}
	}
}

/// One doubling pass. `CUBE_POS_Y` folds `segment * rows + row`.
///
/// Single level: `step` is the per-unit output budget of the whole segment.
/// Two level: `step` is the per-cube budget and every unit merges
/// `thread_work` outputs of its cube's slice.
#[cube(launch_unchecked)]
pub fn merge_pass<N: Numeric>(
	src: &Tensor<N>,
	dst: &mut Tensor<N>,
	src_idx: &Tensor<u32>,
	dst_idx: &mut Tensor<u32>,
	axis_len: u32,
	width: u32,
	rows: u32,
	segments: u32,
	step: u32,
	#[comptime] cfg: MergeCfg,
) {
	let asc = comptime!(cfg.asc);
	let with_indices = comptime!(cfg.with_indices);
	let thread_work = comptime!(cfg.thread_work);
	let by = CUBE_POS_Z * CUBE_COUNT_Y + CUBE_POS_Y;

	if by < rows * segments {
		let row = by % rows;
		let seg = by / rows;
		let base = row * axis_len;

		let start = width * seg;
		let half = start + width / 2u32;
		let full = start + width;
		let middle = select(half < axis_len, half, axis_len);
		let end = select(full < axis_len, full, axis_len);

		if comptime!(cfg.two_level) {
			let diag = CUBE_POS_X * step;
			if diag < end - start {
				let first = merge_begin::<N>(
					src,
					base + start,
					middle - start,
					base + middle,
					end - middle,
					diag,
					asc,
				);
				let a_start = start + first;
				let b_start = middle + diag - first;
				let a_left = middle - a_start;
				let b_left = end - b_start;
				let a_count = select(a_left < step, a_left, step);
				let b_count = select(b_left < step, b_left, step);

				let lane_diag = UNIT_POS_X * thread_work;
				if lane_diag < a_count + b_count {
					let lane_first = merge_begin::<N>(
						src,
						base + a_start,
						a_count,
						base + b_start,
						b_count,
						lane_diag,
						asc,
					);
					serial_merge::<N>(
						src,
						dst,
						src_idx,
						dst_idx,
						base + a_start,
						a_count,
						base + b_start,
						b_count,
						base + start + diag,
						lane_diag,
						thread_work,
						lane_first,
						asc,
						with_indices,
					);
				}
			}
		} else {
			let diag = UNIT_POS_X * step;
			if diag < end - start {
				let first = merge_begin::<N>(
					src,
					base + start,
					middle - start,
					base + middle,
					end - middle,
					diag,
					asc,
				);
				serial_merge::<N>(
					src,
					dst,
					src_idx,
					dst_idx,
					base + start,
					middle - start,
					base + middle,
					end - middle,
					base + start,
					diag,
					step,
					first,
					asc,
					with_indices,
				);
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_cfg_from_single_split() {
		let (cfg, step) = MergeCfg::new(MergeSplit::Single { step: 6 }, 1, true);
		assert_eq!(step, 6);
		assert_eq!(cfg.thread_work, 1);
		assert!(!cfg.two_level);
		assert!(cfg.with_indices);
	}

	#[test]
	fn test_cfg_from_two_level_split() {
		let split = MergeSplit::TwoLevel {
			step_count: 64,
			thread_work: 4,
		};
		let (cfg, step) = MergeCfg::new(split, 0, false);
		assert_eq!(step, 64);
		assert_eq!(cfg.thread_work, 4);
		assert!(cfg.two_level);
		assert_eq!(cfg.asc, 0);

		let (same, _) = MergeCfg::new(split, 0, false);
		assert_eq!(cfg, same);
	}
}
