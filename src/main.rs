//! mdbsql CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, and reports failures as
//! a JSON error on stdout plus a line on stderr with a non-zero exit.

use mdbsql::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
