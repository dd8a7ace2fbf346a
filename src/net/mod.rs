mod gql;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use gqlite_core::dbs::Datastore;
use gqlite_core::gql::{Invalidator, SchemaCache};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cnf::PKG_NAME;
use crate::err::Error;

#[derive(Debug, Clone, Copy)]
pub struct Config {
	pub bind: SocketAddr,
	pub graphiql: bool,
}

pub async fn init<I: Invalidator>(ds: Arc<dyn Datastore>, config: Config) -> Result<(), Error> {
	let cache = SchemaCache::<I>::new(ds);
	// Refuse to start with a database which can not be served
	let schema = cache.get_schema().await?;
	debug!("Serving GraphQL schema:\n{}", schema.sdl());

	let app = router(cache, config.graphiql);

	let listener = TcpListener::bind(config.bind).await.map_err(|source| Error::Bind {
		addr: config.bind,
		source,
	})?;

	info!("Started web server on {}", config.bind);

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	info!("Web server stopped. Bye!");

	Ok(())
}

pub(crate) fn router<I: Invalidator>(cache: SchemaCache<I>, graphiql: bool) -> Router {
	if graphiql {
		warn!("The GraphiQL explorer is enabled on {}", crate::cnf::GRAPHQL_PATH);
	}
	Router::new()
		.route("/", get(health))
		.merge(gql::router(cache, graphiql))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
	PKG_NAME
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => warn!("Received shutdown signal, stopping the web server"),
		Err(e) => {
			error!("Unable to listen for the shutdown signal: {e}");
			std::future::pending::<()>().await
		}
	}
}
