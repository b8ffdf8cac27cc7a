// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::cmp::Ordering;

use cubecl::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Ascending,
	Descending,
}

impl SortOrder {
	pub fn from_ascending(ascending: bool) -> Self {
		if ascending {
			SortOrder::Ascending
		} else {
			SortOrder::Descending
		}
	}

	/// Comptime flag handed to the device kernels.
	pub fn asc(self) -> u32 {
		match self {
			SortOrder::Ascending => 1,
			SortOrder::Descending => 0,
		}
	}

	/// `a` may precede `b`. Equal keys are in order, so merges keep the left one.
	#[inline]
	pub fn in_order<T: PartialOrd>(
		self,
		a: &T,
		b: &T,
	) -> bool {
		match self {
			SortOrder::Ascending => a <= b,
			SortOrder::Descending => b <= a,
		}
	}

	/// Strict inversion. Equal keys never count, so exchanges keep ties in place.
	#[inline]
	pub fn out_of_order<T: PartialOrd>(
		self,
		a: &T,
		b: &T,
	) -> bool {
		match self {
			SortOrder::Ascending => a > b,
			SortOrder::Descending => a < b,
		}
	}

	/// Total comparator for slice sorts. Unordered pairs compare equal.
	pub fn compare<T: PartialOrd>(
		self,
		a: &T,
		b: &T,
	) -> Ordering {
		let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
		match self {
			SortOrder::Ascending => ord,
			SortOrder::Descending => ord.reverse(),
		}
	}
}

#[cube]
pub fn in_order<N: Numeric>(
	a: N,
	b: N,
	#[comptime] asc: u32,
) -> bool {
	let mut res = a <= b;
	if comptime!(asc == 0) {
		res = b <= a;
	}
	res
}

#[cube]
pub fn out_of_order<N: Numeric>(
	a: N,
	b: N,
	#[comptime] asc: u32,
) -> bool {
	let mut res = a > b;
	if comptime!(asc == 0) {
		res = a < b;
	}
	res
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_ties_are_in_order_both_ways() {
		for order in [SortOrder::Ascending, SortOrder::Descending] {
			assert!(order.in_order(&2, &2));
			assert!(!order.out_of_order(&2, &2));
		}
	}

	#[test]
	fn test_descending_inverts() {
		let order = SortOrder::Descending;
		assert!(order.in_order(&5, &4));
		assert!(order.out_of_order(&4, &5));
		assert_eq!(order.asc(), 0);
		assert_eq!(SortOrder::from_ascending(true), SortOrder::Ascending);
		assert_eq!(order.compare(&1.0, &2.0), Ordering::Greater);
		assert_eq!(order.compare(&f32::NAN, &2.0), Ordering::Equal);
	}
}
