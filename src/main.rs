//! Stacks Vanity Address Generator CLI
//!
//! Usage:
//!   stacks_vanity C0PA              # Stacks address starting with "C0PA"
//!   stacks_vanity -s 123 456        # Stacks addresses ending with "123" and "456"
//!   stacks_vanity -b -n -c Dead     # Native segwit address starting with "Dead"

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stacks_vanity::{Config, SearchCoordinator, SearchResult};

/// Exit status after Ctrl+C (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() {
    init_tracing();

    let config = Config::parse();

    // Validate configuration
    let plan = match config.plan() {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let cores = num_cpus::get();
    if plan.patterns.len() > cores {
        tracing::warn!(
            slices = plan.patterns.len(),
            cores,
            "more slices than CPU cores; searches will share cores"
        );
    }

    // Print startup info
    println!("Stacks Vanity Address Generator");
    println!("===============================");
    println!("Target:     {} address ({})", config.target(), config.network());
    println!("Mode:       {}", config.pattern_type());
    println!("Mnemonic:   {}", plan.options.strength);
    for pattern in &plan.patterns {
        println!(
            "Searching for \"{}\" {}ed addresses (~{} wallets, {})...",
            pattern.slice(),
            pattern.pattern_type(),
            format_number(pattern.estimated_difficulty()),
            pattern.difficulty_description()
        );
    }
    println!();

    let mut coordinator = match SearchCoordinator::start(plan.patterns, plan.options) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Set up ctrl-c handler
    ctrlc_handler(coordinator.stop_flag_clone());

    let report_interval = match config.report_interval {
        0 => Duration::from_secs(1),
        secs => Duration::from_secs(secs),
    };

    while !coordinator.is_complete() {
        match coordinator.wait_for_result(report_interval) {
            Ok(Some(result)) => print_result(&result),
            Ok(None) => {
                if config.report_interval > 0 && !coordinator.is_stopped() {
                    print_progress(&coordinator);
                }
            }
            Err(e) => {
                if coordinator.is_stopped() {
                    break;
                }
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }

        // Check if we should stop (ctrl-c was pressed)
        if coordinator.is_stopped() {
            break;
        }
    }

    print_statistics(&coordinator);

    if !coordinator.is_complete() {
        println!(
            "\nStopped by user after {} of {} slices.",
            coordinator.matched_count(),
            coordinator.num_workers()
        );
        drop(coordinator);
        process::exit(INTERRUPTED_EXIT_CODE);
    }

    match coordinator.wait_all() {
        Ok(results) => println!("done searching for {} vanity addresses.", results.len()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: &SearchResult) {
    let wallet = &result.wallet;
    println!("# {} found:", result.slice);
    println!("address:  {}", wallet.addresses().stacks);
    println!("bitcoin:  {}", wallet.addresses().bitcoin);
    println!("wif:      {}", wallet.wif());
    println!("mnemonic: {}", wallet.mnemonic());
    println!("mileage:  {}", result.mileage);
    println!("-------------------------------");
}

fn print_progress(coordinator: &SearchCoordinator) {
    let wallets = coordinator.total_wallets();
    let rate = coordinator.wallets_per_second();
    let elapsed = coordinator.elapsed().as_secs();

    println!(
        "[{:>4}s] Generated {} wallets ({}/s), {}/{} slices found",
        elapsed,
        format_number(wallets),
        format_number(rate as u64),
        coordinator.matched_count(),
        coordinator.num_workers()
    );
}

fn print_statistics(coordinator: &SearchCoordinator) {
    println!("\n--- Final Statistics ---");
    println!(
        "Total wallets generated: {}",
        format_number(coordinator.total_wallets())
    );
    println!(
        "Candidates discarded:    {}",
        format_number(coordinator.total_discarded())
    );
    println!("Total matches found:     {}", coordinator.total_matches());
    println!(
        "Time elapsed:            {:.2}s",
        coordinator.elapsed().as_secs_f64()
    );
    println!(
        "Average speed:           {}/s",
        format_number(coordinator.wallets_per_second() as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
}
