//! The gqlite command-line interface and server.
//!
//! Point it at a SQLite database file, or at a file of SQL statements, and
//! it serves a GraphQL query and mutation API generated from the tables,
//! columns and foreign keys it finds there.

#[macro_use]
extern crate tracing;

mod cli;
mod cnf;
mod err;
mod net;
mod telemetry;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
	cli::init().await
}
