//! Sweep Planning Example
//!
//! Builds the configuration matrix of a latency study, prints the simulator
//! command of every configuration, then analyses a canned stats dump the way
//! a finished sweep would, without needing a simulator installed.
//!
//! Run with: cargo run --example plan_matrix

use simsweep::experiment::{Axis, Constraint, ExperimentMatrix, MatrixGenerator, RunResult};
use simsweep::extract::{extract_text, CounterMap};
use simsweep::report::{best_by, render, speedup, ReportOptions};
use simsweep::sweep::{RunExecutor, SweepSettings, Workload};

fn main() -> simsweep::Result<()> {
    println!("=== simsweep: planning a latency study ===\n");

    // -------------------------------------------------------------------------
    // 1. Axes: issue width, and operation/issue latency pairs summing to 7
    // -------------------------------------------------------------------------
    let generator = MatrixGenerator::new()
        .axis(Axis::new("width", ["1", "4"]).with_param("issue-width"))
        .constrained(
            vec![
                Axis::new("oplat", ["1", "2", "3", "4", "5", "6"]),
                Axis::new("issuelat", ["6", "5", "4", "3", "2", "1"]),
            ],
            Constraint::SumEquals(7.0),
        );
    let configs = generator.generate()?;
    println!("1. {} configurations over {:?}\n", configs.len(), generator.axis_names());

    // -------------------------------------------------------------------------
    // 2. Command lines (dry run)
    // -------------------------------------------------------------------------
    let settings = SweepSettings::builder(
        "/opt/gem5/build/X86/gem5.opt",
        "configs/superscalar.py",
        Workload::new("workloads/matrix_multiply").with_args(["128"]),
        "results/latency",
    )
    .simulator_flags(["--quiet"])
    .build();
    let executor = RunExecutor::new(&settings);

    println!("2. Simulator commands:");
    for config in configs.iter().take(3) {
        let argv: Vec<String> = executor
            .command_line(config)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        println!("   {}", argv.join(" "));
    }
    println!("   ... {} more\n", configs.len().saturating_sub(3));

    // -------------------------------------------------------------------------
    // 3. Pretend every run finished and analyse canned stats
    // -------------------------------------------------------------------------
    let map = CounterMap::gem5();
    let results: Vec<RunResult> = configs
        .iter()
        .enumerate()
        .map(|(i, config)| {
            let width: f64 = config
                .value("width")
                .and_then(|w| w.parse().ok())
                .unwrap_or(1.0);
            let stats = format!(
                "sim_seconds {:.6}\nsystem.cpu.ipc {:.3}\nsystem.cpu.dcache.overall_miss_rate::total 0.0{}\n",
                0.9 / width + 0.01 * i as f64,
                0.4 * width,
                i % 9 + 1
            );
            let mut result = RunResult::builder(config.clone(), settings.run_dir(config.id()))
                .exit_code(Some(0))
                .build();
            result.attach_metrics(extract_text(&map, &stats));
            result
        })
        .collect();
    let matrix = ExperimentMatrix::new(generator.axis_names(), settings.stats_file(), results)?;

    let best = best_by(&matrix, &map, "sim_seconds")?;
    println!("3. Fastest configuration: {} ({:.6} s)", best.config_id, best.value);
    let baseline = configs[0].id();
    println!(
        "   Speedup over {baseline}: {}\n",
        speedup(&matrix, &map, "sim_seconds", baseline, &best.config_id)?
    );

    let options = ReportOptions::new()
        .with_key_metrics(["sim_seconds", "ipc", "dcache_hit_rate"])
        .with_baseline(baseline, "sim_seconds");
    println!("{}", render(&matrix, &map, &options)?);
    Ok(())
}
