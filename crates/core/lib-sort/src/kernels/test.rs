// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;
use cubecl_common::rand::{get_seeded_rng, Rng};

use super::engine::CubeEngine;
use crate::config::EngineConfig;
use crate::direction::SortOrder;
use crate::program::sort_ir;

fn random_rows(
	rows: usize,
	axis_len: usize,
) -> Vec<f32> {
	let mut rng = get_seeded_rng();
	(0..rows * axis_len)
		.map(|_| (rng.random::<f32>() * 1000.0).floor())
		.collect()
}

fn verify_rows(
	input: &[f32],
	values: &[f32],
	perm: &[u32],
	axis_len: usize,
	order: SortOrder,
) {
	for (r, (row_v, row_i)) in values
		.chunks(axis_len)
		.zip(perm.chunks(axis_len))
		.enumerate()
	{
		for w in row_v.windows(2) {
			assert!(order.in_order(&w[0], &w[1]), "row {} out of order", r);
		}
		let row_in = &input[r * axis_len..(r + 1) * axis_len];
		let mut seen = vec![false; axis_len];
		for (p, &src) in row_i.iter().enumerate() {
			assert_eq!(row_in[src as usize], row_v[p]);
			assert!(!seen[src as usize], "index {} repeated", src);
			seen[src as usize] = true;
		}
	}
}

pub fn test_argsort_rows<R: Runtime>(
	engine: &CubeEngine<R>,
	rows: usize,
	axis_len: usize,
	order: SortOrder,
) {
	let input = random_rows(rows, axis_len);
	let program = sort_ir(&[rows, axis_len], 1, order, true, engine.config()).unwrap();
	let (values, perm) = engine.run_program(&program, &input).unwrap();
	verify_rows(&input, &values, &perm.unwrap(), axis_len, order);
	assert_eq!(engine.pool().live().unwrap(), 0);
}

pub fn test_sort_without_indices<R: Runtime>(engine: &CubeEngine<R>) {
	let input = random_rows(1, 5000);
	let program = sort_ir(&[5000], 0, SortOrder::Ascending, false, engine.config()).unwrap();
	let (values, perm) = engine.run_program(&program, &input).unwrap();
	assert!(perm.is_none());

	let mut expected = input.clone();
	expected.sort_by(|a, b| a.total_cmp(b));
	assert_eq!(values, expected);
}

pub fn test_ties_are_stable<R: Runtime>(engine: &CubeEngine<R>) {
	let input: Vec<f32> = (0..3000).map(|v| (v % 7) as f32).collect();
	let program = sort_ir(&[3000], 0, SortOrder::Ascending, true, engine.config()).unwrap();
	let (_, perm) = engine.run_program(&program, &input).unwrap();
	let perm = perm.unwrap();
	for w in perm.windows(2) {
		if input[w[0] as usize] == input[w[1] as usize] {
			assert!(w[0] < w[1]);
		}
	}
}

pub fn test_search_sorted<R: Runtime>(engine: &CubeEngine<R>) {
	let sorted = [1.0f32, 3.0, 3.0, 5.0];
	let values = [3.0f32, 0.0, 6.0];
	let left = engine.search_sorted(&sorted, &values, 4, 3, false, false).unwrap();
	let right = engine.search_sorted(&sorted, &values, 4, 3, false, true).unwrap();
	assert_eq!(left, vec![1, 0, 4]);
	assert_eq!(right, vec![3, 0, 4]);

	let batched = [1.0f32, 2.0, 3.0, 10.0, 20.0, 30.0];
	let needles = [2.0f32, 25.0];
	let out = engine.search_sorted(&batched, &needles, 3, 1, true, false).unwrap();
	assert_eq!(out, vec![1, 2]);
}

pub fn tiny_config() -> EngineConfig {
	EngineConfig::builder()
		.with_max_lanes(32)
		.with_tile(16)
		.with_thread_work(2)
		.build()
		.unwrap()
}

#[cfg(all(test, feature = "cuda"))]
mod test_cuda {
	use super::*;
	use cubecl_cuda::{CudaDevice, CudaRuntime};

	fn engine() -> CubeEngine<CudaRuntime> {
		CubeEngine::new(&CudaDevice::default()).unwrap()
	}

	#[test]
	fn cuda_argsort_short_rows() {
		test_argsort_rows(&engine(), 17, 100, SortOrder::Ascending);
	}

	#[test]
	fn cuda_argsort_long_descending() {
		test_argsort_rows(&engine(), 2, 70_000, SortOrder::Descending);
	}

	#[test]
	fn cuda_two_level_with_tiny_limits() {
		let engine = CubeEngine::<CudaRuntime>::with_config(&CudaDevice::default(), tiny_config()).unwrap();
		test_argsort_rows(&engine, 3, 1000, SortOrder::Ascending);
	}

	#[test]
	fn cuda_sort_without_indices() {
		test_sort_without_indices(&engine());
	}

	#[test]
	fn cuda_ties_are_stable() {
		test_ties_are_stable(&engine());
	}

	#[test]
	fn cuda_search_sorted() {
		test_search_sorted(&engine());
	}
}
