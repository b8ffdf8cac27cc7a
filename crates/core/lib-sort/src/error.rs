// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::sync::PoisonError;

use serde_json::Error as SerdeError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, SortError>;

#[derive(Debug, Error)]
pub enum SortError {
	#[error("axis {axis} is out of range for a tensor of rank {rank}")]
	InvalidAxis { axis: isize, rank: usize },

	#[error("unknown return type '{0}', expected one of both, values, indices")]
	InvalidRetType(String),

	#[error("searchsorted shape mismatch: sorted {sorted:?} vs values {values:?}")]
	SearchShapeMismatch {
		sorted: Box<[usize]>,
		values: Box<[usize]>,
	},

	#[error("invalid geometry: {0}")]
	InvalidGeometry(&'static str),

	#[error("buffer mismatch: expected {expected} elements, got {actual}")]
	BufferMismatch { expected: usize, actual: usize },

	#[error("axis length {axis_len} does not fit index type {dtype}")]
	IndexRange { axis_len: usize, dtype: &'static str },

	#[error("shape {shape:?} does not match {len} elements")]
	ShapeMismatch { shape: Box<[usize]>, len: usize },

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("config version {found} is not supported, expected {expected}")]
	ConfigVersion { found: String, expected: String },

	#[error(transparent)]
	SerdeJsonError(#[from] SerdeError),

	#[error("IO Config Error")]
	IOError(#[from] std::io::Error),

	#[error("Poisoned lock: {0}")]
	PoisonError(String),

	#[error("device error: {0}")]
	Device(String),
}

impl<T> From<PoisonError<T>> for SortError {
	fn from(err: PoisonError<T>) -> Self {
		SortError::PoisonError(err.to_string())
	}
}
