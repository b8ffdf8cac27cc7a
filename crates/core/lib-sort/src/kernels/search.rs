// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;

/// One unit per needle. A batched haystack holds one sorted row of
/// `search_range` elements per `per_row` needles.
#[cube(launch_unchecked)]
pub fn search_sorted<N: Numeric>(
	sorted: &Tensor<N>,
	values: &Tensor<N>,
	out: &mut Tensor<u32>,
	search_range: u32,
	per_row: u32,
	total: u32,
	#[comptime] right: bool,
	#[comptime] batched: bool,
) {
	let tid = CUBE_POS_X * CUBE_DIM_X + UNIT_POS_X;

	if tid < total {
		let mut offset = 0u32;
		if comptime!(batched) {
			offset = (tid / per_row) * search_range;
		}

		let v = values[tid];
		let mut lo = 0u32;
		let mut hi = search_range;
		loop {
			if lo >= hi {
				break;
			}
			let mid = (lo + hi) / 2u32;
			let h = sorted[offset + mid];
			let mut advance = h < v;
			if comptime!(right) {
				advance = h <= v;
			}
			if advance {
				lo = mid + 1u32;
			} else {
				hi = mid;
			}
		}
		out[tid] = lo;
	}
}
