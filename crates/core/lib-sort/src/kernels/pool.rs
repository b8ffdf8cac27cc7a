// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cubecl::prelude::*;
use cubecl::server::Handle;
use tracing::trace;

use crate::error::{Result, SortError};

/// Host-side name of one device allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DeviceBuffer {
	pub id: usize,
	pub len: usize,
	pub elem_size: usize,
}

impl DeviceBuffer {
	pub fn bytes(&self) -> usize {
		self.len * self.elem_size
	}
}

/// Tracks every handle created for a sort invocation so they can be released
/// together.
pub struct DevicePool<R: Runtime> {
	client: ComputeClient<R::Server>,
	allocations: Arc<Mutex<HashMap<DeviceBuffer, Handle>>>,
	next_id: Arc<Mutex<usize>>,
}

impl<R: Runtime> DevicePool<R> {
	pub fn new(client: ComputeClient<R::Server>) -> Self {
		Self {
			client,
			allocations: Arc::new(Mutex::new(HashMap::new())),
			next_id: Arc::new(Mutex::new(0)),
		}
	}

	fn register<E: CubeElement>(
		&self,
		len: usize,
		handle: Handle,
	) -> Result<DeviceBuffer> {
		let mut next_id = self.next_id.lock()?;
		let buffer = DeviceBuffer {
			id: *next_id,
			len,
			elem_size: size_of::<E>(),
		};
		*next_id += 1;

		self.allocations.lock()?.insert(buffer, handle);
		trace!(id = buffer.id, bytes = buffer.bytes(), "device allocation");
		Ok(buffer)
	}

	pub fn create<E: CubeElement>(
		&self,
		data: &[E],
	) -> Result<DeviceBuffer> {
		let handle = self.client.create(bytemuck::cast_slice(data));
		self.register::<E>(data.len(), handle)
	}

	/// Uninitialised buffer of `len` elements; never zero bytes.
	pub fn empty<E: CubeElement>(
		&self,
		len: usize,
	) -> Result<DeviceBuffer> {
		let handle = self.client.empty(len.max(1) * size_of::<E>());
		self.register::<E>(len, handle)
	}

	pub fn handle(
		&self,
		buffer: &DeviceBuffer,
	) -> Result<Handle> {
		let allocations = self.allocations.lock()?;
		allocations
			.get(buffer)
			.cloned()
			.ok_or_else(|| SortError::Device(format!("buffer {} is not allocated", buffer.id)))
	}

	pub fn read<E: CubeElement>(
		&self,
		buffer: &DeviceBuffer,
	) -> Result<Vec<E>> {
		let handle = self.handle(buffer)?;
		let bytes = self.client.read_one(handle);
		let mut out: Vec<E> = match bytes.try_into_vec() {
			Ok(vec) => vec,
			Err(bytes) => bytemuck::cast_slice(&bytes).to_vec(),
		};
		out.truncate(buffer.len);
		Ok(out)
	}

	pub fn deallocate(
		&self,
		buffer: &DeviceBuffer,
	) -> Result<()> {
		match self.allocations.lock()?.remove(buffer) {
			Some(_) => Ok(()),
			None => Err(SortError::Device(format!("buffer {} is not allocated", buffer.id))),
		}
	}

	/// Drops every tracked handle and returns how many there were.
	pub fn release_all(&self) -> Result<usize> {
		let mut allocations = self.allocations.lock()?;
		let count = allocations.len();
		allocations.clear();
		Ok(count)
	}

	pub fn live(&self) -> Result<usize> {
		Ok(self.allocations.lock()?.len())
	}

	pub fn client(&self) -> &ComputeClient<R::Server> {
		&self.client
	}
}
