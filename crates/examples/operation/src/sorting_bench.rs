// SPDX-License-Identifier: LicenseRef-PolyForm-Perimeter-1.0.1
// Copyright (c) 2026 Use-AI.rs
//
// This file is part of Use-Ai.rs
// See LICENSE for details

//! Mergepath Argsort Benchmark
//!
//! Measures row-wise argsort on every available backend:
//! - Latency (min, max, median, P95, P99)
//! - Throughput (GB/s of keys)
//! - Stability (coefficient of variation)
//!
//! **Run with**: cargo run --release --bin sorting_bench [SIZE] [ITERATIONS] [ROWS]
//!   SIZE: 64kb, 4mb, 1gb, or exact element count (default: 256k elements)
//!   ITERATIONS: number of benchmark iterations (default: 20)
//!   ROWS: independent rows the elements are split into (default: 1)

use cubecl_common::rand::{get_seeded_rng, Rng};
use std::env;
use std::io::{self, Write};
use std::time::Instant;

use lib_sort::{sort_ir, EngineConfig, HostEngine, ParallelSliceBackend, SortBackend, SortOrder};
use tracing_subscriber::EnvFilter;

const KB: usize = 1024;
const MB: usize = 1024 * 1024;
const GB: usize = 1024 * 1024 * 1024;

#[derive(Debug, Clone)]
struct BenchmarkResult {
	name: String,
	iterations: usize,
	min_ms: f64,
	max_ms: f64,
	median_ms: f64,
	avg_ms: f64,
	p95_ms: f64,
	p99_ms: f64,
	cv_percent: f64,
	avg_throughput_gbs: f64,
	peak_throughput_gbs: f64,
}

impl BenchmarkResult {
	fn from_times(
		name: String,
		size_bytes: usize,
		mut times: Vec<f64>,
	) -> Self {
		times.sort_by(|a, b| a.total_cmp(b));

		let n = times.len();
		let min_ms = times[0];
		let max_ms = times[n - 1];
		let avg_ms: f64 = times.iter().sum::<f64>() / n as f64;
		let median_ms = if n % 2 == 0 {
			(times[n / 2 - 1] + times[n / 2]) / 2.0
		} else {
			times[n / 2]
		};

		let variance: f64 = times.iter().map(|&t| (t - avg_ms).powi(2)).sum::<f64>() / n as f64;
		let cv_percent = (variance.sqrt() / avg_ms) * 100.0;

		let p95_ms = times[((n as f64 * 0.95) as usize).min(n - 1)];
		let p99_ms = times[((n as f64 * 0.99) as usize).min(n - 1)];

		let gb = size_bytes as f64 / GB as f64;
		BenchmarkResult {
			name,
			iterations: n,
			min_ms,
			max_ms,
			median_ms,
			avg_ms,
			p95_ms,
			p99_ms,
			cv_percent,
			avg_throughput_gbs: gb / (avg_ms / 1000.0),
			peak_throughput_gbs: gb / (min_ms / 1000.0),
		}
	}
}

/// Byte sizes become f32 element counts, bare numbers are element counts.
fn parse_size(s: &str) -> Option<usize> {
	let s = s.to_lowercase();
	let s = s.strip_suffix('b').unwrap_or(&s);
	for (suffix, unit) in [('g', GB), ('m', MB), ('k', KB)] {
		if let Some(n) = s.strip_suffix(suffix) {
			return n.parse::<usize>().ok().map(|n| n * unit / size_of::<f32>());
		}
	}
	s.parse::<usize>().ok()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.init();

	let args: Vec<String> = env::args().collect();

	// Parse optional size argument (in bytes: KB, MB, GB or raw element count)
	let size: usize = if args.len() > 1 {
		parse_size(&args[1]).unwrap_or_else(|| {
			eprintln!("Invalid size: {}. Use 64kb, 256mb, 1gb, or element count", args[1]);
			std::process::exit(1);
		})
	} else {
		256 * KB
	};

	let benchmark_iterations: usize = if args.len() > 2 {
		args[2].parse().unwrap_or_else(|_| {
			eprintln!("Invalid iterations: {}. Use a positive number", args[2]);
			std::process::exit(1);
		})
	} else {
		20
	};

	let rows: usize = if args.len() > 3 {
		args[3].parse().unwrap_or_else(|_| {
			eprintln!("Invalid rows: {}. Use a positive number", args[3]);
			std::process::exit(1);
		})
	} else {
		1
	};
	if rows == 0 || size % rows != 0 {
		eprintln!("Size {} is not divisible into {} rows", size, rows);
		std::process::exit(1);
	}
	let axis_len = size / rows;

	let benchmark_iterations = benchmark_iterations.max(1);
	let warmup_iterations = benchmark_iterations.min(5);

	println!("\n== mergepath argsort benchmark ==\n");

	let config = EngineConfig::default();
	let program = sort_ir(&[rows, axis_len], 1, SortOrder::Ascending, true, &config)?;

	println!("Configuration:");
	println!("  Size:       {} elements ({})", size, format_size(size * 4));
	println!("  Rows:       {} x {}", rows, axis_len);
	println!("  Passes:     {} merge, reconcile={}", program.merge_passes(), program.reconciles());
	println!("  Warmup:     {} iterations", warmup_iterations);
	println!("  Benchmark:  {} iterations", benchmark_iterations);
	println!();

	let mut rng = get_seeded_rng();
	let data: Vec<f32> = (0..size).map(|_| rng.random::<f32>() * 10000.0 - 5000.0).collect();
	let launches = program.launches.len();

	let host = HostEngine::with_config(config.clone())?;
	let result = benchmark_backend(&host, &data, axis_len, warmup_iterations, benchmark_iterations)?;
	print_result(&result, Some(launches));

	let slice = ParallelSliceBackend::with_workspace(size);
	let result = benchmark_backend(&slice, &data, axis_len, warmup_iterations, benchmark_iterations)?;
	print_result(&result, None);

	#[cfg(feature = "cuda")]
	{
		use cubecl_cuda::{CudaDevice, CudaRuntime};
		let engine = lib_sort::CubeEngine::<CudaRuntime>::new(&CudaDevice::default())?;
		let result = benchmark_backend(&engine, &data, axis_len, warmup_iterations, benchmark_iterations)?;
		print_result(&result, Some(launches));
	}

	println!("\nBenchmark complete!\n");
	Ok(())
}

fn format_size(bytes: usize) -> String {
	if bytes >= GB {
		format!("{:.2} GB", bytes as f64 / GB as f64)
	} else if bytes >= MB {
		format!("{:.2} MB", bytes as f64 / MB as f64)
	} else if bytes >= KB {
		format!("{:.2} KB", bytes as f64 / KB as f64)
	} else {
		format!("{} B", bytes)
	}
}

fn benchmark_backend<B: SortBackend>(
	backend: &B,
	data: &[f32],
	axis_len: usize,
	warmup_iterations: usize,
	benchmark_iterations: usize,
) -> Result<BenchmarkResult, Box<dyn std::error::Error>> {
	println!("----------------------------------------");
	println!("{}: {} elements ({})", backend.name(), data.len(), format_size(data.len() * 4));
	println!("----------------------------------------");

	print!("Warming up ({} iterations)...", warmup_iterations);
	io::stdout().flush().ok();
	for _ in 0..warmup_iterations {
		run_argsort_pass(backend, data, axis_len)?;
		print!(".");
		io::stdout().flush().ok();
	}
	println!(" done");

	print!("Benchmarking ({} iterations)...", benchmark_iterations);
	io::stdout().flush().ok();

	let mut times = Vec::with_capacity(benchmark_iterations);
	for i in 0..benchmark_iterations {
		times.push(run_argsort_pass(backend, data, axis_len)?);
		if i % 5 == 4 {
			print!(".");
			io::stdout().flush().ok();
		}
	}
	println!(" done");

	Ok(BenchmarkResult::from_times(
		format!("{} argsort", backend.name()),
		data.len() * size_of::<f32>(),
		times,
	))
}

fn run_argsort_pass<B: SortBackend>(
	backend: &B,
	data: &[f32],
	axis_len: usize,
) -> Result<f64, Box<dyn std::error::Error>> {
	let start = Instant::now();
	let (values, indices) = backend.argsort_rows::<f32, u32>(data, axis_len, SortOrder::Ascending)?;
	let elapsed = start.elapsed().as_secs_f64() * 1000.0;

	if values.len() != data.len() || indices.len() != data.len() {
		return Err(format!("{} returned {} values", backend.name(), values.len()).into());
	}
	Ok(elapsed)
}

fn print_result(
	result: &BenchmarkResult,
	launches: Option<usize>,
) {
	println!();
	println!("  {} ({} iterations)", result.name, result.iterations);
	println!("  Timing Statistics:");
	println!("    Min (best):    {:>8.3} ms", result.min_ms);
	println!("    Median (P50):  {:>8.3} ms", result.median_ms);
	println!("    Average:       {:>8.3} ms", result.avg_ms);
	if let Some(launches) = launches {
		let avg_launch_us = (result.avg_ms * 1000.0) / launches.max(1) as f64;
		println!("    Avg/Launch:    {:>8.2} µs  ({} launches)", avg_launch_us, launches);
	}
	println!("    P95:           {:>8.3} ms", result.p95_ms);
	println!("    P99:           {:>8.3} ms", result.p99_ms);
	println!("    Max (worst):   {:>8.3} ms", result.max_ms);
	println!("    CV:            {:>8.2}%", result.cv_percent);

	println!();
	println!("  Throughput:");
	println!("    Peak:          {:>8.2} GB/s", result.peak_throughput_gbs);
	println!("    Average:       {:>8.2} GB/s", result.avg_throughput_gbs);
	println!();
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_size() {
		assert_eq!(parse_size("64kb"), Some(16 * KB));
		assert_eq!(parse_size("4M"), Some(MB));
		assert_eq!(parse_size("1000"), Some(1000));
		assert_eq!(parse_size("big"), None);
	}

	#[test]
	fn test_from_times_statistics() {
		let r = BenchmarkResult::from_times("x".into(), GB, vec![4.0, 1.0, 3.0, 2.0]);
		assert_eq!(r.iterations, 4);
		assert_eq!(r.min_ms, 1.0);
		assert_eq!(r.max_ms, 4.0);
		assert_eq!(r.median_ms, 2.5);
		assert_eq!(r.avg_ms, 2.5);
		assert_eq!(r.p95_ms, 4.0);
		assert_eq!(r.peak_throughput_gbs, 1000.0);
	}
}
