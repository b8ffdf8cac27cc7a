// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;

/// Swap to primary, keys and indices, one unit per element.
#[cube(launch_unchecked)]
pub fn reconcile_copy<N: Numeric>(
	keys_swap: &Tensor<N>,
	keys: &mut Tensor<N>,
	indices_swap: &Tensor<u32>,
	indices: &mut Tensor<u32>,
	axis_len: u32,
	rows: u32,
	#[comptime] with_indices: bool,
) {
	let pos = CUBE_POS_X * CUBE_DIM_X + UNIT_POS_X;
	let row = CUBE_POS_Z * CUBE_COUNT_Y + CUBE_POS_Y;

	if pos < axis_len && row < rows {
		let idx = row * axis_len + pos;
		keys[idx] = keys_swap[idx];
		if comptime!(with_indices) {
			indices[idx] = indices_swap[idx];
		}
	}
}
