// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Device kernels of every stage and the engine that launches them.

mod copy;
mod engine;
mod init;
mod merge;
mod odd_even;
mod pool;
mod search;

#[cfg(test)]
pub mod test;

pub use copy::reconcile_copy;
pub use engine::{CubeEngine, LaunchDims};
pub use init::sort_init;
pub use merge::{merge_pass, MergeCfg};
pub use odd_even::odd_even_sort;
pub use pool::{DeviceBuffer, DevicePool};
pub use search::search_sorted;
