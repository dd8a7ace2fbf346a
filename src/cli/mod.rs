mod abstraction;
mod schema;
mod start;
mod version;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema::SchemaCommandArguments;
use start::StartCommandArguments;

use crate::cnf::LOGO;

const INFO: &str = "
gqlite serves a GraphQL API generated from the structure of an existing SQLite database.

Every table becomes an object type with list and single-record queries, and create,
update and delete mutations. Foreign keys become relationship fields, and junction
tables become many-to-many relationships with link and unlink mutations.
";

#[derive(Parser, Debug)]
#[command(name = "gqlite command-line interface and server", bin_name = "gqlite")]
#[command(about = INFO, before_help = LOGO)]
#[command(disable_version_flag = true, arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	#[command(about = "Start the GraphQL server")]
	Start(Box<StartCommandArguments>),
	#[command(about = "Print the generated GraphQL schema in SDL form")]
	Schema(SchemaCommandArguments),
	#[command(about = "Output the command-line tool version information")]
	Version,
}

pub async fn init() -> ExitCode {
	let args = Cli::parse();
	let output = match args.command {
		Commands::Start(args) => start::init(*args).await,
		Commands::Schema(args) => schema::init(args).await,
		Commands::Version => version::init(),
	};
	if let Err(e) = output {
		error!("{}", e);
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}
