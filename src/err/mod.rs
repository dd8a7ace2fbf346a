use std::io;
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gqlite_core::err::Error as CoreError;
use gqlite_core::gql::ResolverError;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

#[derive(Error, Debug)]
pub enum Error {
	#[error("{0}")]
	Core(#[from] CoreError),

	#[error("Unable to listen for connections on {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		source: io::Error,
	},

	#[error("There was a problem with the web server: {0}")]
	Io(#[from] io::Error),

	#[error("Unable to parse the log filter: {0}")]
	LogFilter(#[from] ParseError),

	#[error("Unable to initialise logging: {0}")]
	Logging(#[from] TryInitError),
}

impl Error {
	fn status(&self) -> StatusCode {
		match self {
			Error::Core(CoreError::Resolver(ResolverError::InvalidArgument(_))) => {
				StatusCode::BAD_REQUEST
			}
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			error!("{self}");
		}
		(status, self.to_string()).into_response()
	}
}
