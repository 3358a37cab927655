//! Stats-text extraction benchmarks
//!
//! A full gem5 dump runs to several thousand counter lines, and a sweep
//! extracts one per configuration. Measures scanning plus counter matching
//! against the built-in vocabulary.
//!
//! Run with: cargo bench --bench extraction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use simsweep::extract::{extract_text, CounterMap, StatsText};

/// Synthetic dump with `filler` unrelated counters around the real ones.
fn stats_dump(filler: usize) -> String {
    let mut text = String::from("\n---------- Begin Simulation Statistics ----------\n");
    for i in 0..filler / 2 {
        text.push_str(&format!(
            "system.cpu.op_class_{i}::IntAlu {}   45.00%   45.00% # Class of executed instruction\n",
            i * 7
        ));
    }
    text.push_str("sim_seconds 0.012345 # Number of seconds simulated\n");
    text.push_str("sim_insts 98765432 # Number of instructions simulated\n");
    text.push_str("system.cpu.numCycles 24691358 # number of cpu cycles simulated\n");
    text.push_str("system.cpu.ipc 4.000000 # IPC\n");
    text.push_str("system.cpu.dcache.overall_miss_rate::total 0.05 # miss rate\n");
    text.push_str("system.cpu.branchPred.condIncorrect 250000 # incorrect\n");
    for i in filler / 2..filler {
        text.push_str(&format!("system.mem_ctrls.bank{i}.reads {i} # reads\n"));
    }
    text.push_str("---------- End Simulation Statistics   ----------\n");
    text
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_stats_text");
    for filler in [100, 1_000, 10_000] {
        let text = stats_dump(filler);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(filler), &text, |b, text| {
            b.iter(|| StatsText::parse(black_box(text)).len());
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let map = CounterMap::gem5();
    let mut group = c.benchmark_group("extract_gem5_vocabulary");
    for filler in [100, 1_000, 10_000] {
        let text = stats_dump(filler);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(filler), &text, |b, text| {
            b.iter(|| extract_text(&map, black_box(text)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan, bench_extract);
criterion_main!(benches);
