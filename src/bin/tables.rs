//! Ukeire table generator
//!
//! Offline tool that enumerates every reachable suit holding, computes
//! its distances to the canonical winning sub-shapes, and writes the
//! binary shanten tables plus the JSON decomposition pattern files
//! consumed at runtime.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;

use ukeire::error::TableError;
use ukeire::patterns::{
    HONOR_PATTERNS_FILE, SUIT_PATTERNS_FILE, generate_honor_patterns, generate_suit_patterns,
    write_patterns,
};
use ukeire::tablegen::{generate_honors_table, generate_suits_table};
use ukeire::tables::{HONORS_TABLE_FILE, SUITS_TABLE_FILE, write_table};

#[derive(Parser)]
#[command(name = "ukeire-tables")]
#[command(version)]
#[command(about = "Generate the precomputed shanten and pattern tables")]
struct Args {
    /// Output directory for the four table files
    #[arg(short, long, default_value = "data")]
    out: PathBuf,

    /// Skip the binary shanten tables
    #[arg(long)]
    no_shanten: bool,

    /// Skip the JSON decomposition pattern files
    #[arg(long)]
    no_patterns: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = std::fs::create_dir_all(&args.out) {
        eprintln!("❌ Cannot create {}: {}", args.out.display(), e);
        process::exit(1);
    }

    let started = Instant::now();
    let result = run(&args);
    match result {
        Ok(()) => println!(
            "{} in {:.1}s",
            "Done".green().bold(),
            started.elapsed().as_secs_f64()
        ),
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<(), TableError> {
    if !args.no_shanten {
        println!("Generating numbered-suit shanten table...");
        let rows = generate_suits_table();
        let path = args.out.join(SUITS_TABLE_FILE);
        write_table(&path, &rows)?;
        println!("  {} rows -> {}", rows.len(), path.display());

        println!("Generating honor shanten table...");
        let rows = generate_honors_table();
        let path = args.out.join(HONORS_TABLE_FILE);
        write_table(&path, &rows)?;
        println!("  {} rows -> {}", rows.len(), path.display());
    }

    if !args.no_patterns {
        println!("Generating numbered-suit decomposition patterns...");
        let records = generate_suit_patterns();
        let path = args.out.join(SUIT_PATTERNS_FILE);
        write_patterns(&path, &records)?;
        println!("  {} keys -> {}", records.len(), path.display());

        println!("Generating honor decomposition patterns...");
        let records = generate_honor_patterns();
        let path = args.out.join(HONOR_PATTERNS_FILE);
        write_patterns(&path, &records)?;
        println!("  {} keys -> {}", records.len(), path.display());
    }

    Ok(())
}
