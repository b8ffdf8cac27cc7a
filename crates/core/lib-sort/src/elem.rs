// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::fmt::Debug;

use cubecl::prelude::Numeric;
use cubecl::CubeElement;

/// Element types the engine can order. Host executors need nothing beyond
/// `PartialOrd`, device executors need the cubecl bounds.
pub trait SortElem: Numeric + CubeElement + PartialOrd + Copy + Debug + Send + Sync + 'static {}

impl<T> SortElem for T where T: Numeric + CubeElement + PartialOrd + Copy + Debug + Send + Sync + 'static {}

/// Integer element used for argsort and searchsorted outputs.
pub trait IndexElem: SortElem {
	const NAME: &'static str;
	const MAX: usize;

	fn from_usize(v: usize) -> Self;

	fn fits(len: usize) -> bool {
		len == 0 || len - 1 <= Self::MAX
	}
}

macro_rules! index_elem {
	($($ty:ty),*) => {
		$(
			impl IndexElem for $ty {
				const NAME: &'static str = stringify!($ty);
				const MAX: usize = if (<$ty>::MAX as u128) > (usize::MAX as u128) {
					usize::MAX
				} else {
					<$ty>::MAX as usize
				};

				#[inline]
				fn from_usize(v: usize) -> Self {
					v as $ty
				}
			}
		)*
	};
}

index_elem!(i32, i64, u32, u64);

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_index_fits() {
		assert!(i32::fits(0));
		assert!(i32::fits(i32::MAX as usize + 1));
		assert!(!i32::fits(i32::MAX as usize + 2));
		assert!(u64::fits(usize::MAX));
	}

	#[test]
	fn test_index_conversion() {
		assert_eq!(i64::from_usize(7), 7i64);
		assert_eq!(u32::from_usize(40), 40u32);
		assert_eq!(<u32 as IndexElem>::NAME, "u32");
	}
}
