// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use bytemuck::Zeroable;

use crate::program::Slot;

/// Two equally sized buffers addressed by [`Slot`].
#[derive(Debug, Clone, PartialEq)]
pub struct PingPong<T> {
	slots: [Vec<T>; 2],
}

impl<T: Zeroable + Copy> PingPong<T> {
	pub fn new(len: usize) -> Self {
		Self {
			slots: [vec![T::zeroed(); len], vec![T::zeroed(); len]],
		}
	}
}

impl<T> PingPong<T> {
	pub fn len(&self) -> usize {
		self.slots[0].len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots[0].is_empty()
	}

	pub fn slot(
		&self,
		slot: Slot,
	) -> &[T] {
		&self.slots[slot.index()]
	}

	pub fn into_slot(
		self,
		slot: Slot,
	) -> Vec<T> {
		let [primary, swap] = self.slots;
		match slot {
			Slot::Primary => primary,
			Slot::Swap => swap,
		}
	}

	/// Splits both buffers into rows of `axis_len` elements.
	pub(crate) fn rows(
		&mut self,
		axis_len: usize,
	) -> Vec<RowPair<'_, T>> {
		let [primary, swap] = &mut self.slots;
		primary
			.chunks_mut(axis_len)
			.zip(swap.chunks_mut(axis_len))
			.map(|(p, s)| RowPair { slots: [p, s] })
			.collect()
	}
}

/// One row of a [`PingPong`].
pub(crate) struct RowPair<'a, T> {
	slots: [&'a mut [T]; 2],
}

impl<'a, T> RowPair<'a, T> {
	pub fn get_mut(
		&mut self,
		slot: Slot,
	) -> &mut [T] {
		&mut *self.slots[slot.index()]
	}

	/// `(primary, swap)`.
	pub fn both_mut(&mut self) -> (&mut [T], &mut [T]) {
		let [primary, swap] = &mut self.slots;
		(&mut **primary, &mut **swap)
	}

	/// Read side `src`, write side the other slot.
	pub fn split(
		&mut self,
		src: Slot,
	) -> (&[T], &mut [T]) {
		let [primary, swap] = &mut self.slots;
		match src {
			Slot::Primary => (&**primary, &mut **swap),
			Slot::Swap => (&**swap, &mut **primary),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_split_never_aliases() {
		let mut pp = PingPong::<i32>::new(4);
		{
			let mut rows = pp.rows(2);
			let (src, dst) = rows[1].split(Slot::Primary);
			assert_eq!(src.len(), 2);
			dst[0] = 7;
		}
		assert_eq!(pp.slot(Slot::Swap), &[0, 0, 7, 0]);
		assert_eq!(pp.slot(Slot::Primary), &[0, 0, 0, 0]);

		{
			let mut rows = pp.rows(2);
			let (src, dst) = rows[1].split(Slot::Swap);
			let v = src[0];
			dst[1] = v;
		}
		assert_eq!(pp.into_slot(Slot::Primary), vec![0, 0, 0, 7]);
	}
}
