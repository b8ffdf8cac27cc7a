// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Mergepath partitioning of a merge between two adjacent sorted runs.
//!
//! Output position `diag` of the merged run lies on a diagonal of the
//! `a x b` merge grid. A binary search along that diagonal finds how many
//! elements of the left run precede it, which lets every lane start its
//! serial merge without knowing what any other lane does.

use crate::direction::SortOrder;
use crate::geometry::MergeSplit;

/// Bounds of one merge segment inside a row.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Segment {
	pub start: usize,
	pub middle: usize,
	pub end: usize,
}

impl Segment {
	pub fn new(
		segment: usize,
		width: usize,
		size: usize,
	) -> Self {
		let start = width * segment;
		Self {
			start,
			middle: (start + width / 2).min(size),
			end: (start + width).min(size),
		}
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.end == self.start
	}

	pub fn whole(&self) -> MergeRun {
		MergeRun {
			a_start: self.start,
			a_count: self.middle - self.start,
			b_start: self.middle,
			b_count: self.end - self.middle,
		}
	}
}

/// Left run `[a_start, a_start + a_count)` merged with right run
/// `[b_start, b_start + b_count)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MergeRun {
	pub a_start: usize,
	pub a_count: usize,
	pub b_start: usize,
	pub b_count: usize,
}

impl MergeRun {
	pub fn total(&self) -> usize {
		self.a_count + self.b_count
	}
}

/// Work of one block: the run it merges, where its outputs start and how
/// many outputs each lane owns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockPlan {
	pub run: MergeRun,
	pub k_start: usize,
	pub lane_step: usize,
}

/// Number of left-run elements among the first `diag` merged outputs.
pub fn merge_begin<N: PartialOrd>(
	src: &[N],
	run: &MergeRun,
	diag: usize,
	order: SortOrder,
) -> usize {
	let mut first = diag.saturating_sub(run.b_count);
	let mut last = diag.min(run.a_count);

	while first < last {
		let mid = (first + last) / 2;
		let a = &src[run.a_start + mid];
		let b = &src[run.b_start + diag - 1 - mid];
		if order.in_order(a, b) {
			first = mid + 1;
		} else {
			last = mid;
		}
	}
	first
}

/// Merges up to `step` outputs starting at merged position `diag`.
///
/// `first` is the partition returned by [`merge_begin`] for `diag`. Each move
/// is reported as `(source, destination)` so keys and indices move together.
pub fn serial_merge<N: PartialOrd>(
	src: &[N],
	run: &MergeRun,
	k_start: usize,
	diag: usize,
	step: usize,
	first: usize,
	order: SortOrder,
	mut emit: impl FnMut(usize, usize),
) {
	let a_end = run.a_start + run.a_count;
	let b_end = run.b_start + run.b_count;
	let mut i = run.a_start + first;
	let mut j = run.b_start + diag - first;

	let count = (run.total() - diag).min(step);
	for c in 0..count {
		let out = k_start + diag + c;
		let take_left = i < a_end && (j >= b_end || order.in_order(&src[i], &src[j]));
		if take_left {
			emit(i, out);
			i += 1;
		} else {
			emit(j, out);
			j += 1;
		}
	}
}

/// Plans block `block_x` of a segment merge. Blocks past the end of a short
/// trailing segment get no work.
pub fn plan_block<N: PartialOrd>(
	src: &[N],
	segment: &Segment,
	split: MergeSplit,
	block_x: usize,
	order: SortOrder,
) -> Option<BlockPlan> {
	match split {
		MergeSplit::Single { step } => (block_x == 0 && !segment.is_empty()).then(|| BlockPlan {
			run: segment.whole(),
			k_start: segment.start,
			lane_step: step as usize,
		}),
		MergeSplit::TwoLevel {
			step_count,
			thread_work,
		} => {
			let step_count = step_count as usize;
			let diag = block_x * step_count;
			if diag >= segment.len() {
				return None;
			}

			let whole = segment.whole();
			let first = merge_begin(src, &whole, diag, order);
			let a_start = segment.start + first;
			let b_start = segment.middle + diag - first;
			Some(BlockPlan {
				run: MergeRun {
					a_start,
					a_count: (segment.middle - a_start).min(step_count),
					b_start,
					b_count: (segment.end - b_start).min(step_count),
				},
				k_start: segment.start + diag,
				lane_step: thread_work as usize,
			})
		},
	}
}

/// Lane-level search and serial merge inside a planned block.
pub fn merge_lane<N: PartialOrd>(
	src: &[N],
	plan: &BlockPlan,
	lane: usize,
	order: SortOrder,
	emit: impl FnMut(usize, usize),
) {
	let diag = lane * plan.lane_step;
	if diag >= plan.run.total() {
		return;
	}
	let first = merge_begin(src, &plan.run, diag, order);
	serial_merge(
		src,
		&plan.run,
		plan.k_start,
		diag,
		plan.lane_step,
		first,
		order,
		emit,
	);
}
