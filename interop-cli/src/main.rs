//! shape-interop binary.
//!
//! Entry point for the `shape-interop` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use interop_cli::commands::run::process_launcher;
use interop_cli::exit::{codes, exit_code, outcome_code};
use interop_cli::io::render_summary;
use interop_cli::{
    execute_list, execute_matrix, execute_run, Cli, Command, CommandError, Implementation,
    ListArgs, MatrixArgs, RunArgs, ShutdownFlag, SystemClock,
};
use interop_fs::RealFilesystem;
use interop_harness::{Launcher, RealSleeper, StderrLogger};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Stop between test cases on Ctrl+C
    let shutdown = ShutdownFlag::new();

    let result = match cli.command {
        Command::Run(args) => run_run(args, &shutdown),
        Command::Matrix(args) => run_matrix(args, &shutdown),
        Command::List(args) => run_list(args),
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the run command.
fn run_run(args: RunArgs, shutdown: &ShutdownFlag) -> Result<i32, CommandError> {
    let launcher = process_launcher(&args.publisher, &args.subscriber, &args.options);
    let logger = StderrLogger::new(args.options.verbosity());

    let result = execute_run(
        &args,
        &launcher,
        &RealFilesystem,
        &SystemClock,
        &RealSleeper,
        &logger,
        shutdown,
    )?;

    println!(
        "{}",
        render_summary(&result.publisher, &result.subscriber, &result.suite)
    );
    if let Some(path) = &result.report_path {
        println!("Report: {}", path.display());
    }

    Ok(outcome_code(
        result.suite.all_passed(),
        result.suite.interrupted,
    ))
}

/// Run the matrix command.
fn run_matrix(args: MatrixArgs, shutdown: &ShutdownFlag) -> Result<i32, CommandError> {
    let logger = StderrLogger::new(args.options.verbosity());
    let options = args.options.clone();
    let make_launcher = |publisher: &Implementation, subscriber: &Implementation| {
        Box::new(process_launcher(&publisher.path, &subscriber.path, &options)) as Box<dyn Launcher>
    };

    let result = execute_matrix(
        &args,
        make_launcher,
        &RealFilesystem,
        &SystemClock,
        &RealSleeper,
        &logger,
        shutdown,
    )?;

    for pair in &result.pairs {
        println!(
            "{}",
            render_summary(&pair.publisher, &pair.subscriber, &pair.suite)
        );
        if let Some(path) = &pair.report_path {
            println!("Report: {}", path.display());
        }
    }

    Ok(outcome_code(result.all_passed(), result.interrupted))
}

/// Run the list command.
fn run_list(args: ListArgs) -> Result<i32, CommandError> {
    print!("{}", execute_list(&args, &RealFilesystem)?);
    Ok(codes::SUCCESS)
}
