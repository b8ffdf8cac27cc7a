// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::ops::{Index, IndexMut};

use bytemuck::Zeroable;

/// Cooperative model of one block.
///
/// A phase runs every lane once; `sync` closes the phase. Lanes of one phase
/// must write disjoint addresses, which makes running them in lane order
/// equivalent to running them in lockstep.
#[derive(Debug)]
pub struct Block {
	lanes: usize,
	barriers: u64,
}

impl Block {
	pub fn new(lanes: usize) -> Self {
		Self { lanes, barriers: 0 }
	}

	pub fn lane_count(&self) -> usize {
		self.lanes
	}

	pub fn lanes(
		&self,
		mut f: impl FnMut(usize),
	) {
		for lane in 0..self.lanes {
			f(lane);
		}
	}

	pub fn sync(&mut self) {
		self.barriers += 1;
	}

	pub fn barriers(&self) -> u64 {
		self.barriers
	}

	/// Scratch visible to this block only, released when `f` returns.
	pub fn with_shared<T: Zeroable + Copy, R>(
		&mut self,
		len: usize,
		f: impl FnOnce(&mut Self, &mut SharedScratch<T>) -> R,
	) -> R {
		let mut scratch = SharedScratch {
			data: vec![T::zeroed(); len],
		};
		f(self, &mut scratch)
	}
}

pub struct SharedScratch<T> {
	data: Vec<T>,
}

impl<T> SharedScratch<T> {
	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn swap(
		&mut self,
		a: usize,
		b: usize,
	) {
		self.data.swap(a, b);
	}
}

impl<T> Index<usize> for SharedScratch<T> {
	type Output = T;

	fn index(
		&self,
		i: usize,
	) -> &T {
		&self.data[i]
	}
}

impl<T> IndexMut<usize> for SharedScratch<T> {
	fn index_mut(
		&mut self,
		i: usize,
	) -> &mut T {
		&mut self.data[i]
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_phases_and_barriers() {
		let mut block = Block::new(4);
		let mut seen = Vec::new();
		block.lanes(|lane| seen.push(lane));
		block.sync();
		block.lanes(|lane| seen.push(lane * 10));
		block.sync();

		assert_eq!(seen, vec![0, 1, 2, 3, 0, 10, 20, 30]);
		assert_eq!(block.barriers(), 2);
	}

	#[test]
	fn test_shared_scratch_is_zeroed_and_scoped() {
		let mut block = Block::new(2);
		let sum = block.with_shared::<u32, _>(4, |block, sm| {
			assert!(sm.len() == 4 && sm[3] == 0);
			block.lanes(|lane| sm[lane] = lane as u32 + 1);
			block.sync();
			sm.swap(0, 1);
			sm[0] + sm[1] * 10
		});
		assert_eq!(sum, 2 + 10);
		assert_eq!(block.barriers(), 1);
	}
}
