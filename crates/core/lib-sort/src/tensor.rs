// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::Numeric;
use cubecl::CubeElement;

use crate::error::{Result, SortError};

/// Dense row-major tensor living in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<N: Numeric + CubeElement> {
	pub data: Vec<N>,
	pub metadata: MetaData,
}

impl<N: Numeric + CubeElement> Tensor<N> {
	pub fn new(
		data: Vec<N>,
		metadata: MetaData,
	) -> Result<Self> {
		if metadata.total_elements() != data.len() {
			return Err(SortError::ShapeMismatch {
				shape: metadata.shape.clone(),
				len: data.len(),
			});
		}
		Ok(Self { data, metadata })
	}

	pub fn from_shape(
		data: Vec<N>,
		shape: &[usize],
	) -> Result<Self> {
		Self::new(data, MetaData::contiguous(shape))
	}

	pub fn vector(data: Vec<N>) -> Self {
		let metadata = MetaData::contiguous(&[data.len()]);
		Self { data, metadata }
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn shape(&self) -> &[usize] {
		&self.metadata.shape
	}

	pub fn stride(&self) -> &[usize] {
		&self.metadata.stride
	}

	pub fn rank(&self) -> usize {
		self.metadata.ndim()
	}

	/// Exchanges two axes and materializes the result in row-major order.
	/// Exchanging the same pair twice restores the original tensor.
	pub fn swap_axes(
		&self,
		a: usize,
		b: usize,
	) -> Result<Self> {
		let rank = self.rank();
		if a >= rank || b >= rank {
			return Err(SortError::InvalidAxis {
				axis: a.max(b) as isize,
				rank,
			});
		}
		if a == b {
			return Ok(self.clone());
		}

		let mut shape = self.shape().to_vec();
		shape.swap(a, b);
		let metadata = MetaData::contiguous(&shape);

		let mut src_stride = self.stride().to_vec();
		src_stride.swap(a, b);

		let mut data = Vec::with_capacity(self.len());
		let mut coord = vec![0usize; rank];
		for _ in 0..self.len() {
			let src: usize = coord.iter().zip(&src_stride).map(|(c, s)| c * s).sum();
			data.push(self.data[src]);
			for d in (0..rank).rev() {
				coord[d] += 1;
				if coord[d] < shape[d] {
					break;
				}
				coord[d] = 0;
			}
		}

		Ok(Self { data, metadata })
	}

	/// Keeps the leading `len` entries along `axis`, clamped to the axis size.
	pub fn narrow(
		&self,
		axis: usize,
		len: usize,
	) -> Result<Self> {
		let rank = self.rank();
		if axis >= rank {
			return Err(SortError::InvalidAxis {
				axis: axis as isize,
				rank,
			});
		}

		let shape = self.shape();
		let len = len.min(shape[axis]);
		let outer: usize = shape[..axis].iter().product();
		let inner: usize = shape[axis + 1..].iter().product();
		let axis_len = shape[axis];

		let mut data = Vec::with_capacity(outer * len * inner);
		for o in 0..outer {
			let base = o * axis_len * inner;
			data.extend_from_slice(&self.data[base..base + len * inner]);
		}

		let mut new_shape = shape.to_vec();
		new_shape[axis] = len;
		Ok(Self {
			data,
			metadata: MetaData::contiguous(&new_shape),
		})
	}
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct MetaData {
	pub stride: Box<[usize]>,
	pub shape: Box<[usize]>,
}

impl MetaData {
	pub fn contiguous(shape: &[usize]) -> Self {
		Self {
			stride: Self::row_strides(shape),
			shape: shape.into(),
		}
	}

	pub fn row_strides(shape: &[usize]) -> Box<[usize]> {
		if shape.is_empty() {
			return Box::new([]);
		}

		let mut strides = vec![1; shape.len()];
		for i in (0..shape.len() - 1).rev() {
			strides[i] = strides[i + 1] * shape[i + 1];
		}
		strides.into_boxed_slice()
	}

	pub fn total_elements(&self) -> usize {
		self.shape.iter().product()
	}

	pub fn ndim(&self) -> usize {
		self.shape.len()
	}

	pub fn is_row_major(&self) -> bool {
		*self.stride == *Self::row_strides(&self.shape)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_row_major_strides() {
		let strides = MetaData::row_strides(&[2, 3, 4]);
		assert_eq!(*strides, [12, 4, 1]);
	}

	#[test]
	fn test_tensor_creation() {
		let tensor = Tensor::from_shape(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();

		assert_eq!(tensor.len(), 4);
		assert_eq!(tensor.shape(), &[2, 2]);
		assert!(tensor.metadata.is_row_major());
	}

	#[test]
	fn test_tensor_shape_mismatch() {
		let result = Tensor::from_shape(vec![1i32, 2, 3], &[2, 2]);
		assert!(matches!(result, Err(SortError::ShapeMismatch { len: 3, .. })));
	}

	#[test]
	fn test_swap_axes() {
		let t = Tensor::from_shape((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
		let s = t.swap_axes(0, 1).unwrap();

		assert_eq!(s.shape(), &[3, 2]);
		assert_eq!(s.data, vec![0, 3, 1, 4, 2, 5]);
		assert_eq!(s.swap_axes(0, 1).unwrap(), t);
	}

	#[test]
	fn test_swap_axes_3d() {
		let t = Tensor::from_shape((0..24).collect::<Vec<i32>>(), &[2, 3, 4]).unwrap();
		let s = t.swap_axes(0, 2).unwrap();

		assert_eq!(s.shape(), &[4, 3, 2]);
		// s[k][j][i] == t[i][j][k]
		assert_eq!(s.data[(1 * 3 + 2) * 2 + 1], t.data[(1 * 3 + 2) * 4 + 1]);
		assert_eq!(s.swap_axes(0, 2).unwrap(), t);
	}

	#[test]
	fn test_narrow() {
		let t = Tensor::from_shape((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
		let n = t.narrow(1, 2).unwrap();
		assert_eq!(n.shape(), &[3, 2]);
		assert_eq!(n.data, vec![0, 1, 4, 5, 8, 9]);

		let clamped = t.narrow(1, 10).unwrap();
		assert_eq!(clamped, t);
	}
}
