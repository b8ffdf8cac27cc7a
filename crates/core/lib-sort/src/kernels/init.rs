// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;

/// Copies the input into the primary keys and writes the per-row identity
/// permutation. Addressing follows `(outer, axis_len, inner)`.
#[cube(launch_unchecked)]
pub fn sort_init<N: Numeric>(
	data: &Tensor<N>,
	keys: &mut Tensor<N>,
	indices: &mut Tensor<u32>,
	axis_len: u32,
	inner: u32,
	rows: u32,
	#[comptime] with_indices: bool,
) {
	let pos = CUBE_POS_X * CUBE_DIM_X + UNIT_POS_X;
	let row = CUBE_POS_Z * CUBE_COUNT_Y + CUBE_POS_Y;

	if pos < axis_len && row < rows {
		let outer = row / inner;
		let idx = (outer * axis_len + pos) * inner + row % inner;
		keys[idx] = data[idx];
		if comptime!(with_indices) {
			indices[idx] = pos;
		}
	}
}
