// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Axis sort, argsort, topk and searchsorted built on a block-local
//! odd/even sort followed by mergepath merge passes.
//!
//! A sort is first lowered by [`sort_ir`] into a [`KernelProgram`]. The
//! program runs either on the CPU through [`HostExecutor`] or on a cubecl
//! runtime through [`CubeEngine`]. [`SortOps`] wraps any [`SortBackend`] with
//! the tensor level operations.

mod backend;
mod config;
mod direction;
mod elem;
mod error;
mod geometry;
pub mod host;
pub mod kernels;
mod layout;
mod mergepath;
mod ops;
mod program;
mod search;
mod tensor;

pub use backend::{HostEngine, ParallelSliceBackend, SortBackend};
pub use config::{DeviceLimits, EngineConfig, SortTuning};
pub use direction::SortOrder;
pub use elem::{IndexElem, SortElem};
pub use error::{Result, SortError};
pub use geometry::{ceil_log2, Geometry, MergeGeometry, MergeSplit, MAX_GRID_Y};
pub use host::{ExecutionReport, HostExecutor, PingPong};
pub use kernels::{CubeEngine, DevicePool};
pub use layout::{normalize_axis, RowLayout};
pub use mergepath::{merge_begin, merge_lane, plan_block, serial_merge, BlockPlan, MergeRun, Segment};
pub use ops::{RetType, SortOps, TopK};
pub use program::{sort_ir, KernelProgram, Launch, Slot, Stage};
pub use search::{search_rows, SearchPlan};
pub use tensor::{MetaData, Tensor};
