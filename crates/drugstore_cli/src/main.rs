//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `drugstore_core` linkage and schema bootstrap without the mobile runtime.
//! - Keep output deterministic for quick local sanity checks.

use drugstore_core::db::migrations::latest_version;
use drugstore_core::db::open_db_in_memory;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("drugstore_core ping={}", drugstore_core::ping());
    println!("drugstore_core version={}", drugstore_core::core_version());

    match open_db_in_memory() {
        Ok(_) => {
            println!("drugstore_core schema_version={}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("drugstore_core schema bootstrap failed: {err}");
            ExitCode::FAILURE
        }
    }
}
