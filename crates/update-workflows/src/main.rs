//! update-workflows CLI
//!
//! Regenerates the test-infra periodic job files for kinder workflows from
//! the job groups declared in the config file.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod logging;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    if let Err(error) = run_main() {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

fn run_main() -> miette::Result<()> {
    let cli = cli::parse();

    logging::init_tracing(cli.tracing_config())?;

    let reports = commands::execute_generate(&cli.settings(), &cli.groups)?;
    for report in &reports {
        println!("{report}");
    }

    Ok(())
}
