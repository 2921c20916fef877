//! # minidb CLI Entry Point
//!
//! ```bash
//! # Open (or create) a database file and start the REPL
//! minidb ./users.db
//!
//! # Show version / help
//! minidb --version
//! minidb --help
//! ```

use std::env;
use std::process::ExitCode;

use eyre::{bail, Result, WrapErr};
use minidb::cli::Repl;
use minidb::Table;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<String> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(ExitCode::SUCCESS);
            }
            "--version" | "-v" => {
                println!("minidb {}", env!("CARGO_PKG_VERSION"));
                return Ok(ExitCode::SUCCESS);
            }
            flag if flag.starts_with('-') => {
                bail!("Unknown option: {}", flag);
            }
            path => {
                if db_path.is_some() {
                    bail!("Multiple database paths specified");
                }
                db_path = Some(path.to_string());
            }
        }
    }

    let Some(db_path) = db_path else {
        eprintln!("Must supply a database filename.");
        eprintln!();
        print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let table = Table::open(&db_path)
        .wrap_err_with(|| format!("failed to open database at '{}'", db_path))?;

    Repl::new(table)?.run()?;
    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    println!("minidb - embedded single-file key/value store");
    println!();
    println!("USAGE:");
    println!("    minidb <DATABASE_FILE>");
    println!();
    println!("ARGS:");
    println!("    <DATABASE_FILE>    Path to the database file (created if missing)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
    println!();
    println!("Inside the REPL:");
    println!("    insert <id> <username> <email>");
    println!("    select");
    println!("    .btree | .constants | .exit");
}
