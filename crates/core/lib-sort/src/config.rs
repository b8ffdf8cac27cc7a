// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cubecl::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SortError};

/// Capability of the target that shapes every launch geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceLimits {
	pub max_lanes_per_block: u32,
	/// Targets that compile a single block size for every merge pass.
	#[serde(default)]
	pub fixed_block_dim: bool,
	#[serde(default = "DeviceLimits::default_shared_bytes")]
	pub max_shared_bytes: usize,
}

impl Default for DeviceLimits {
	fn default() -> Self {
		Self {
			max_lanes_per_block: 1024,
			fixed_block_dim: false,
			max_shared_bytes: Self::default_shared_bytes(),
		}
	}
}

impl DeviceLimits {
	fn default_shared_bytes() -> usize {
		48 * 1024
	}

	pub fn new(max_lanes_per_block: u32) -> Self {
		Self {
			max_lanes_per_block,
			..Self::default()
		}
	}

	pub fn with_fixed_block_dim(
		mut self,
		fixed: bool,
	) -> Self {
		self.fixed_block_dim = fixed;
		self
	}

	pub fn from_client<R: Runtime>(client: &ComputeClient<R::Server>) -> Self {
		let hardware = &client.properties().hardware;
		let limits = Self {
			max_lanes_per_block: hardware.max_units_per_cube,
			fixed_block_dim: false,
			max_shared_bytes: hardware.max_shared_memory_size,
		};
		debug!(
			max_lanes = limits.max_lanes_per_block,
			shared = limits.max_shared_bytes,
			"queried device limits"
		);
		limits
	}
}

/// Algorithm constants of the block sort and the merge passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortTuning {
	/// Elements sorted by one block in shared scratch. Power of two.
	pub tile: u32,
	/// Outputs each lane produces in a two-level merge.
	pub thread_work: u32,
}

impl Default for SortTuning {
	fn default() -> Self {
		Self {
			tile: 128,
			thread_work: 4,
		}
	}
}

impl SortTuning {
	pub fn log_tile(&self) -> u32 {
		self.tile.ilog2()
	}

	/// Lanes of a block-sort launch; each lane owns two tile slots.
	pub fn tile_lanes(&self) -> u32 {
		self.tile / 2
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
	pub version: String,
	#[serde(default)]
	pub limits: DeviceLimits,
	#[serde(default)]
	pub tuning: SortTuning,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			version: Self::cfg_version(),
			limits: DeviceLimits::default(),
			tuning: SortTuning::default(),
		}
	}
}

impl EngineConfig {
	pub fn cfg_version() -> String {
		"0.1".to_string()
	}

	pub fn builder() -> Self {
		Self::default()
	}

	pub fn with_limits(
		mut self,
		limits: DeviceLimits,
	) -> Self {
		self.limits = limits;
		self
	}

	pub fn with_max_lanes(
		mut self,
		max_lanes_per_block: u32,
	) -> Self {
		self.limits.max_lanes_per_block = max_lanes_per_block;
		self
	}

	pub fn with_tile(
		mut self,
		tile: u32,
	) -> Self {
		self.tuning.tile = tile;
		self
	}

	pub fn with_thread_work(
		mut self,
		thread_work: u32,
	) -> Self {
		self.tuning.thread_work = thread_work;
		self
	}

	pub fn build(self) -> Result<Self> {
		self.validate()?;
		Ok(self)
	}

	pub fn get_config<P: AsRef<Path>>(path: P) -> Result<Self> {
		let file = File::open(path.as_ref())?;
		let reader = BufReader::new(file);

		let config: EngineConfig = serde_json::from_reader(reader)?;
		if config.version != Self::cfg_version() {
			return Err(SortError::ConfigVersion {
				found: config.version,
				expected: Self::cfg_version(),
			});
		}
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		let SortTuning { tile, thread_work } = self.tuning;
		if tile < 2 || !tile.is_power_of_two() {
			return Err(SortError::InvalidConfig(format!(
				"tile must be a power of two >= 2, got {tile}"
			)));
		}
		if thread_work == 0 {
			return Err(SortError::InvalidConfig(
				"thread_work must be at least 1".to_string(),
			));
		}
		if self.limits.max_lanes_per_block == 0 {
			return Err(SortError::InvalidConfig(
				"max_lanes_per_block must be at least 1".to_string(),
			));
		}
		if self.tuning.tile_lanes() > self.limits.max_lanes_per_block {
			return Err(SortError::InvalidConfig(format!(
				"tile {tile} needs {} lanes, device allows {}",
				self.tuning.tile_lanes(),
				self.limits.max_lanes_per_block
			)));
		}
		Ok(())
	}
}
