// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;

use crate::direction::out_of_order;

/// Sorts one tile per cube in shared memory. Each unit owns two slots and
/// the sorted tile is written to both key buffers.
#[cube(launch_unchecked)]
pub fn odd_even_sort<N: Numeric>(
	keys: &mut Tensor<N>,
	keys_swap: &mut Tensor<N>,
	indices: &mut Tensor<u32>,
	indices_swap: &mut Tensor<u32>,
	axis_len: u32,
	rows: u32,
	#[comptime] tile: u32,
	#[comptime] asc: u32,
	#[comptime] with_indices: bool,
) {
	let row = CUBE_POS_Z * CUBE_COUNT_Y + CUBE_POS_Y;
	let start = CUBE_POS_X * tile;
	let t0 = UNIT_POS_X * 2u32;
	let idx_len = comptime!(if with_indices { tile } else { 1u32 });

	let mut sk = SharedMemory::<N>::new(tile);
	let mut si = SharedMemory::<u32>::new(idx_len);

	if row < rows {
		let base = row * axis_len + start;
		let rest = axis_len - start;
		let sort_num = select(rest < tile, rest, tile);

		#[unroll]
		for s in 0..2u32 {
			let t = t0 + s;
			if t < sort_num {
				sk[t] = keys[base + t];
				if comptime!(with_indices) {
					si[t] = indices[base + t];
				}
			}
		}
		sync_cube();

		for k in 0..sort_num {
			let i = t0 + k % 2u32;
			if i + 1u32 < sort_num {
				let a = sk[i];
				let b = sk[i + 1u32];
				if out_of_order::<N>(a, b, asc) {
					sk[i] = b;
					sk[i + 1u32] = a;
					if comptime!(with_indices) {
						let ia = si[i];
						si[i] = si[i + 1u32];
						si[i + 1u32] = ia;
					}
				}
			}
			sync_cube();
		}

		#[unroll]
		for s in 0..2u32 {
			let t = t0 + s;
			if t < sort_num {
				let v = sk[t];
				keys[base + t] = v;
				keys_swap[base + t] = v;
				if comptime!(with_indices) {
					let iv = si[t];
					indices[base + t] = iv;
					indices_swap[base + t] = iv;
				}
			}
		}
	}
}
