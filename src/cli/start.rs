use std::net::SocketAddr;

use clap::Args;
use gqlite_core::gql::{Optimistic, Pessimistic};

use super::abstraction::SourceArguments;
use crate::cnf::{DEFAULT_LOG_LEVEL, LOGO};
use crate::err::Error;
use crate::net::{self, Config};

#[derive(Args, Debug)]
pub struct StartCommandArguments {
	#[command(flatten)]
	pub(crate) source: SourceArguments,
	#[arg(help = "The hostname or ip address to listen for connections on")]
	#[arg(env = "GQLITE_BIND", short = 'b', long = "bind", default_value = "127.0.0.1:4000")]
	pub(crate) bind: SocketAddr,
	#[arg(help = "Serve the GraphiQL explorer on GET requests to the GraphQL endpoint")]
	#[arg(env = "GQLITE_GRAPHIQL", long = "graphiql")]
	pub(crate) graphiql: bool,
	#[arg(help = "Rebuild the schema on every request, so that changes to the tables are picked up")]
	#[arg(env = "GQLITE_REBUILD_SCHEMA", long = "rebuild-schema")]
	pub(crate) rebuild_schema: bool,
	#[arg(help = "The logging level, or a full log filter, for the server")]
	#[arg(env = "GQLITE_LOG", short = 'l', long = "log", default_value = DEFAULT_LOG_LEVEL)]
	pub(crate) log: String,
	#[arg(help = "Whether to hide the startup banner")]
	#[arg(env = "GQLITE_NO_BANNER", long)]
	pub(crate) no_banner: bool,
}

pub async fn init(
	StartCommandArguments {
		source,
		bind,
		graphiql,
		rebuild_schema,
		log,
		no_banner,
	}: StartCommandArguments,
) -> Result<(), Error> {
	// Initialize logging
	crate::telemetry::builder().with_log_level(&log).init()?;
	// Check if a banner should be outputted
	if !no_banner {
		println!("{LOGO}");
	}
	// Open the database
	let ds = source.open().await?;
	// Start the web server
	let config = Config {
		bind,
		graphiql,
	};
	if rebuild_schema {
		net::init::<Pessimistic>(ds, config).await
	} else {
		net::init::<Optimistic>(ds, config).await
	}
}
