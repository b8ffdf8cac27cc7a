// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

mod error;

use lib_sort::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

fn init_logging() {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_from_env("SORT_LOG"))
		.unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Engine config from the path in `SORT_CONFIG`, defaults otherwise.
fn load_config() -> Result<EngineConfig> {
	match std::env::var("SORT_CONFIG") {
		Ok(path) => {
			info!(%path, "loading engine config");
			Ok(EngineConfig::get_config(path)?)
		},
		Err(_) => Ok(EngineConfig::default()),
	}
}

fn demo<B: SortBackend>(ops: &SortOps<B>) -> Result<()> {
	let name = ops.backend().name();
	let row = Tensor::vector(vec![5.0f32, 1.0, 4.0, 2.0, 2.0]);

	let (values, indices) = ops.sort_with_indices::<f32, i64>(&row, -1, SortOrder::Ascending)?;
	println!("[{}] sort     {:?} -> {:?} {:?}", name, row.data, values.data, indices.data);

	let top = ops.topk::<f32, i64>(&row, 2, -1, "both".parse()?, SortOrder::Descending)?;
	let top_v = top.values().ok_or(Error::Missing("topk values"))?;
	let top_i = top.indices().ok_or(Error::Missing("topk indices"))?;
	println!("[{}] topk k=2 {:?} {:?}", name, top_v.data, top_i.data);

	let grid = Tensor::from_shape((0..24).map(|v| ((v * 7) % 11) as f32).collect(), &[2, 3, 4])?;
	let by_middle = ops.argsort::<f32, u32>(&grid, 1, SortOrder::Descending)?;
	println!("[{}] argsort axis 1 of {:?}: {:?}", name, grid.shape(), by_middle.data);

	let sorted = Tensor::vector(vec![1.0f32, 3.0, 3.0, 5.0]);
	let needle = Tensor::vector(vec![3.0f32]);
	let left = ops.searchsorted::<f32, i64>(&sorted, &needle, false)?;
	let right = ops.searchsorted::<f32, i64>(&sorted, &needle, true)?;
	println!("[{}] searchsorted 3 -> left {:?} right {:?}", name, left.data, right.data);
	Ok(())
}

fn main() -> Result<()> {
	init_logging();
	let config = load_config()?;

	let program = sort_ir(&[4, 3000], 1, SortOrder::Ascending, true, &config)?;
	for launch in &program.launches {
		info!(stage = ?launch.stage, grid = ?launch.grid, "launch");
	}

	let host = SortOps::new(HostEngine::with_config(config.clone())?);
	demo(&host)?;
	info!(report = ?host.backend().report(), "host executor");

	demo(&SortOps::new(ParallelSliceBackend::with_workspace(1024)))?;

	#[cfg(feature = "cuda")]
	{
		use cubecl_cuda::{CudaDevice, CudaRuntime};
		let engine = CubeEngine::<CudaRuntime>::new(&CudaDevice::default())?;
		demo(&SortOps::new(engine))?;
	}

	Ok(())
}
