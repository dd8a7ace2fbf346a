use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cnf::DEFAULT_LOG_LEVEL;
use crate::err::Error;

#[derive(Default, Debug)]
pub struct Builder {
	log_level: Option<String>,
	filter: Option<EnvFilter>,
}

pub fn builder() -> Builder {
	Builder::default()
}

impl Builder {
	/// Set the log level on the builder
	pub fn with_log_level(mut self, log_level: &str) -> Self {
		self.log_level = Some(log_level.to_string());
		self
	}

	/// Set the filter on the builder, taking precedence over the log level
	pub fn with_filter(mut self, filter: EnvFilter) -> Self {
		self.filter = Some(filter);
		self
	}

	/// Build a tracing dispatcher with a compact fmt subscriber
	pub fn build(self) -> Result<Box<dyn Subscriber + Send + Sync + 'static>, Error> {
		let filter = match (self.filter, self.log_level) {
			(Some(filter), _) => filter,
			(None, Some(level)) => filter_from_value(&level)?,
			(None, None) => filter_from_value(DEFAULT_LOG_LEVEL)?,
		};
		let registry = tracing_subscriber::registry().with(
			tracing_subscriber::fmt::layer()
				.compact()
				.with_ansi(true)
				.with_target(true)
				.with_span_events(FmtSpan::NONE)
				.with_writer(std::io::stderr)
				.with_filter(filter),
		);
		Ok(Box::new(registry))
	}

	/// Install the tracing pipeline globally
	pub fn init(self) -> Result<(), Error> {
		self.build()?.try_init()?;
		Ok(())
	}
}

/// Parses a log level or a full filter directive.
///
/// A plain level applies to gqlite and its HTTP layer, while every other
/// crate only reports errors.
pub fn filter_from_value(v: &str) -> Result<EnvFilter, ParseError> {
	match v {
		// Don't show any logs at all
		"none" => Ok(EnvFilter::default()),
		// Otherwise, let's show only errors for dependencies
		"error" | "warn" | "info" | "debug" | "trace" => EnvFilter::builder()
			.parse(format!("error,gqlite={v},gqlite_core={v},tower_http={v}")),
		// Let's try to parse the custom log level
		_ => EnvFilter::builder().parse(v),
	}
}
