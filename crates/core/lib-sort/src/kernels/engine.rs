// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use cubecl::prelude::*;
use cubecl::server::Handle;
use tracing::{debug, trace};

use super::copy::reconcile_copy;
use super::init::sort_init;
use super::merge::{merge_pass, MergeCfg};
use super::odd_even::odd_even_sort;
use super::pool::{DeviceBuffer, DevicePool};
use super::search::search_sorted;
use crate::config::{DeviceLimits, EngineConfig};
use crate::elem::SortElem;
use crate::error::{Result, SortError};
use crate::geometry::Geometry;
use crate::program::{KernelProgram, Slot, Stage};

#[derive(Debug, Clone)]
pub struct LaunchDims {
	pub cc: CubeCount,
	pub cd: CubeDim,
}

impl LaunchDims {
	pub fn from_grid(grid: &Geometry) -> Self {
		let (y, z) = grid.grid_yz();
		Self {
			cc: CubeCount::Static(grid.blocks_x, y, z),
			cd: CubeDim::new(grid.lanes_per_block, 1, 1),
		}
	}
}

/// Runs a [`KernelProgram`] on a cubecl runtime.
pub struct CubeEngine<R: Runtime> {
	pool: DevicePool<R>,
	config: EngineConfig,
}

impl<R: Runtime> CubeEngine<R> {
	/// Engine shaped by the limits the device reports.
	pub fn new(device: &R::Device) -> Result<Self> {
		let client = R::client(device);
		let limits = DeviceLimits::from_client::<R>(&client);
		let config = EngineConfig::builder().with_limits(limits).build()?;
		Ok(Self {
			pool: DevicePool::new(client),
			config,
		})
	}

	pub fn with_config(
		device: &R::Device,
		config: EngineConfig,
	) -> Result<Self> {
		config.validate()?;
		let client = R::client(device);
		let device_lanes = client.properties().hardware.max_units_per_cube;
		if config.limits.max_lanes_per_block > device_lanes {
			return Err(SortError::InvalidConfig(format!(
				"max_lanes_per_block {} exceeds the device limit {}",
				config.limits.max_lanes_per_block, device_lanes
			)));
		}
		Ok(Self {
			pool: DevicePool::new(client),
			config,
		})
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn pool(&self) -> &DevicePool<R> {
		&self.pool
	}

	/// Sorted keys of the primary slot, plus the permutation when the
	/// program tracks indices. Every buffer of the call is released before
	/// returning.
	pub fn run_program<N: SortElem>(
		&self,
		program: &KernelProgram,
		input: &[N],
	) -> Result<(Vec<N>, Option<Vec<u32>>)> {
		let mut owned = Vec::new();
		let res = self.execute(program, input, &mut owned);
		for buffer in &owned {
			self.pool.deallocate(buffer)?;
		}
		res
	}

	/// Insertion points of `values` into rows of `search_range` sorted
	/// elements. Batched haystacks serve `per_row` consecutive needles each.
	pub fn search_sorted<N: SortElem>(
		&self,
		sorted: &[N],
		values: &[N],
		search_range: usize,
		per_row: usize,
		batched: bool,
		right: bool,
	) -> Result<Vec<u32>> {
		if values.is_empty() {
			return Ok(Vec::new());
		}
		if sorted.is_empty() || search_range == 0 {
			return Ok(vec![0; values.len()]);
		}
		let mut owned = Vec::new();
		let res = self.search_inner(sorted, values, search_range, per_row, batched, right, &mut owned);
		for buffer in &owned {
			self.pool.deallocate(buffer)?;
		}
		res
	}

	fn check_shared<N: SortElem>(&self) -> Result<()> {
		let tile = self.config.tuning.tile as usize;
		let needed = tile * (size_of::<N>() + size_of::<u32>());
		if needed > self.config.limits.max_shared_bytes {
			return Err(SortError::InvalidConfig(format!(
				"tile {} needs {} bytes of shared memory, device has {}",
				tile, needed, self.config.limits.max_shared_bytes
			)));
		}
		Ok(())
	}

	fn track(
		owned: &mut Vec<DeviceBuffer>,
		buffer: Result<DeviceBuffer>,
	) -> Result<DeviceBuffer> {
		let buffer = buffer?;
		owned.push(buffer);
		Ok(buffer)
	}

	fn execute<N: SortElem>(
		&self,
		program: &KernelProgram,
		input: &[N],
		owned: &mut Vec<DeviceBuffer>,
	) -> Result<(Vec<N>, Option<Vec<u32>>)> {
		let layout = program.layout;
		let total = layout.total();
		if input.len() != total {
			return Err(SortError::BufferMismatch {
				expected: total,
				actual: input.len(),
			});
		}
		if program.is_empty() {
			return Ok((Vec::new(), program.with_indices.then(Vec::new)));
		}
		self.check_shared::<N>()?;

		let with_indices = program.with_indices;
		let idx_len = if with_indices { total } else { 1 };

		let data = Self::track(owned, self.pool.create(input))?;
		let keys = [
			Self::track(owned, self.pool.empty::<N>(total))?,
			Self::track(owned, self.pool.empty::<N>(total))?,
		];
		let indices = [
			Self::track(owned, self.pool.empty::<u32>(idx_len))?,
			Self::track(owned, self.pool.empty::<u32>(idx_len))?,
		];

		let data_h = self.pool.handle(&data)?;
		let key_h = [self.pool.handle(&keys[0])?, self.pool.handle(&keys[1])?];
		let idx_h = [self.pool.handle(&indices[0])?, self.pool.handle(&indices[1])?];

		let axis_len = to_u32(layout.axis_len)?;
		let inner = to_u32(layout.inner)?;
		let rows = to_u32(layout.rows_count())?;
		let asc = program.order.asc();
		let client = self.pool.client();

		for launch in &program.launches {
			let dims = LaunchDims::from_grid(&launch.grid);
			trace!(stage = ?launch.stage, cc = ?dims.cc, "device launch");

			match launch.stage {
				Stage::Init => unsafe {
					sort_init::launch_unchecked::<N, R>(
						client,
						dims.cc,
						dims.cd,
						TensorArg::from_raw_parts::<N>(&data_h, &[1], &[total], 1),
						TensorArg::from_raw_parts::<N>(&key_h[0], &[1], &[total], 1),
						TensorArg::from_raw_parts::<u32>(&idx_h[0], &[1], &[idx_len], 1),
						ScalarArg::new(axis_len),
						ScalarArg::new(inner),
						ScalarArg::new(rows),
						with_indices,
					);
				},
				Stage::BlockSort { tile } => unsafe {
					odd_even_sort::launch_unchecked::<N, R>(
						client,
						dims.cc,
						dims.cd,
						TensorArg::from_raw_parts::<N>(&key_h[0], &[1], &[total], 1),
						TensorArg::from_raw_parts::<N>(&key_h[1], &[1], &[total], 1),
						TensorArg::from_raw_parts::<u32>(&idx_h[0], &[1], &[idx_len], 1),
						TensorArg::from_raw_parts::<u32>(&idx_h[1], &[1], &[idx_len], 1),
						ScalarArg::new(axis_len),
						ScalarArg::new(rows),
						tile,
						asc,
						with_indices,
					);
				},
				Stage::Merge { src, dst, merge, .. } => {
					let (cfg, step) = MergeCfg::new(merge.split, asc, with_indices);
					let (src_k, dst_k) = pair(&key_h, src, dst);
					let (src_i, dst_i) = pair(&idx_h, src, dst);
					unsafe {
						merge_pass::launch_unchecked::<N, R>(
							client,
							dims.cc,
							dims.cd,
							TensorArg::from_raw_parts::<N>(src_k, &[1], &[total], 1),
							TensorArg::from_raw_parts::<N>(dst_k, &[1], &[total], 1),
							TensorArg::from_raw_parts::<u32>(src_i, &[1], &[idx_len], 1),
							TensorArg::from_raw_parts::<u32>(dst_i, &[1], &[idx_len], 1),
							ScalarArg::new(axis_len),
							ScalarArg::new(merge.width),
							ScalarArg::new(rows),
							ScalarArg::new(merge.segments),
							ScalarArg::new(step),
							cfg,
						);
					}
				},
				Stage::Reconcile => unsafe {
					reconcile_copy::launch_unchecked::<N, R>(
						client,
						dims.cc,
						dims.cd,
						TensorArg::from_raw_parts::<N>(&key_h[1], &[1], &[total], 1),
						TensorArg::from_raw_parts::<N>(&key_h[0], &[1], &[total], 1),
						TensorArg::from_raw_parts::<u32>(&idx_h[1], &[1], &[idx_len], 1),
						TensorArg::from_raw_parts::<u32>(&idx_h[0], &[1], &[idx_len], 1),
						ScalarArg::new(axis_len),
						ScalarArg::new(rows),
						with_indices,
					);
				},
			}
		}

		let values = self.pool.read::<N>(&keys[Slot::Primary.index()])?;
		let perm = if with_indices {
			Some(self.pool.read::<u32>(&indices[Slot::Primary.index()])?)
		} else {
			None
		};
		debug!(total, launches = program.launches.len(), "device sort finished");
		Ok((values, perm))
	}

	#[allow(clippy::too_many_arguments)]
	fn search_inner<N: SortElem>(
		&self,
		sorted: &[N],
		values: &[N],
		search_range: usize,
		per_row: usize,
		batched: bool,
		right: bool,
		owned: &mut Vec<DeviceBuffer>,
	) -> Result<Vec<u32>> {
		let total = values.len();
		let haystack = Self::track(owned, self.pool.create(sorted))?;
		let needles = Self::track(owned, self.pool.create(values))?;
		let out = Self::track(owned, self.pool.empty::<u32>(total))?;

		let hay_h = self.pool.handle(&haystack)?;
		let needle_h = self.pool.handle(&needles)?;
		let out_h = self.pool.handle(&out)?;

		let grid = Geometry::linear(total, 1, &self.config.limits)?;
		let dims = LaunchDims::from_grid(&grid);
		unsafe {
			search_sorted::launch_unchecked::<N, R>(
				self.pool.client(),
				dims.cc,
				dims.cd,
				TensorArg::from_raw_parts::<N>(&hay_h, &[1], &[sorted.len()], 1),
				TensorArg::from_raw_parts::<N>(&needle_h, &[1], &[total], 1),
				TensorArg::from_raw_parts::<u32>(&out_h, &[1], &[total], 1),
				ScalarArg::new(to_u32(search_range)?),
				ScalarArg::new(to_u32(per_row.max(1))?),
				ScalarArg::new(to_u32(total)?),
				right,
				batched,
			);
		}
		self.pool.read::<u32>(&out)
	}
}

fn pair(
	handles: &[Handle; 2],
	src: Slot,
	dst: Slot,
) -> (&Handle, &Handle) {
	(&handles[src.index()], &handles[dst.index()])
}

fn to_u32(v: usize) -> Result<u32> {
	u32::try_from(v).map_err(|_| SortError::InvalidGeometry("extent exceeds u32"))
}
