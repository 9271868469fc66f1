use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use clap::Parser;
use hierlib::config::HierarchyConfig;
use hierlib::io::{parse_trace, read_trace};
use hierlib::simulator::{CacheHierarchy, HierarchyResult};

#[derive(Parser, Debug)]
#[command(about = String::from("Multi-level cache hierarchy simulator"))]
struct Args {
    /// Path to the JSON hierarchy configuration
    config: String,

    /// Path to the address trace file (decimal or 0x-prefixed hex literals)
    trace: Option<String>,

    /// Inline comma-separated trace, used when no trace file is given
    #[arg(short, long)]
    addresses: Option<String>,

    /// Emit the results as JSON instead of the text report
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let start = Instant::now();
    let args = Args::parse();

    let config_file = File::open(&args.config)
        .map_err(|e| format!("Couldn't open the config file at path {}: {e}", args.config))?;
    let config: HierarchyConfig = serde_json::from_reader(BufReader::new(config_file))
        .map_err(|e| format!("Couldn't parse the config file: {e}"))?;
    let mut hierarchy =
        CacheHierarchy::new(&config).map_err(|e| format!("Invalid cache configuration: {e}"))?;
    for diagnostic in hierarchy.diagnostics() {
        eprintln!("Warning: {diagnostic}");
    }

    let addresses = match (&args.trace, &args.addresses) {
        (Some(path), _) => read_trace(Path::new(path)).map_err(|e| e.to_string())?,
        (None, Some(inline)) => parse_trace(inline),
        (None, None) => {
            return Err("No trace provided: pass a trace file or use --addresses".to_string())
        }
    };
    if addresses.is_empty() {
        println!("No valid addresses provided. Simulation not run.");
        return Ok(());
    }

    hierarchy.run_simulation(&addresses);
    let result = hierarchy.results();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result)
                .map_err(|e| format!("Couldn't serialise the output: {e}"))?
        );
    } else {
        print_report(&result);
    }
    if args.performance {
        let total_time = Instant::now() - start;
        println!(
            "Total execution time (includes parsing, configuration, and output): {}s",
            total_time.as_nanos() as f64 / 1e9
        );
    }
    Ok(())
}

fn print_report(result: &HierarchyResult) {
    println!("=============== Simulation Results ===============");
    println!("Total Memory Accesses Requested: {}", result.total_accesses);
    println!("Total Simulation Cycles:         {}", result.total_cycles);
    match result.simulated_amat {
        Some(amat) => println!("Average Memory Access Time (AMAT): {amat:.4} cycles"),
        None => println!("Average Memory Access Time (AMAT): N/A (No accesses)"),
    }
    for level in &result.levels {
        println!();
        println!("--- L{} Cache Stats ---", level.level);
        println!(" Accesses: {}", level.accesses);
        println!(" Hits:     {}", level.hits);
        println!(" Misses:   {}", level.misses);
        println!(" Hit Rate: {:.4}%", level.hit_rate * 100.0);
        println!(" Miss Rate: {:.4}%", level.miss_rate * 100.0);
    }
    println!();
    println!("AMAT Calculation (Formula-based):");
    // Innermost level first, so each line's penalty is the one above it
    for estimate in &result.formula_amat {
        println!(
            "  AMAT L{} = {} + ({:.4} * {:.4}) = {:.4}",
            estimate.level,
            estimate.hit_latency_cycles,
            estimate.miss_rate,
            estimate.miss_penalty,
            estimate.amat
        );
    }
    if let Some(amat) = result.simulated_amat {
        println!("(Formula AMAT should closely match the simulated AMAT: {amat:.4})");
    }
    println!("==================================================");
}
