use clap::Args;
use gqlite_core::gql::{Resolvers, build_schema};
use tracing_subscriber::EnvFilter;

use super::abstraction::SourceArguments;
use crate::err::Error;

#[derive(Args, Debug)]
pub struct SchemaCommandArguments {
	#[command(flatten)]
	pub(crate) source: SourceArguments,
}

pub async fn init(
	SchemaCommandArguments {
		source,
	}: SchemaCommandArguments,
) -> Result<(), Error> {
	// Only warnings and errors, stdout carries the schema
	crate::telemetry::builder().with_filter(EnvFilter::new("warn")).init()?;
	let ds = source.open().await?;
	let schema = build_schema(ds, &Resolvers::default()).await?;
	println!("{}", schema.sdl());
	Ok(())
}
