use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use gqlite_core::gql::{Invalidator, SchemaCache};

use crate::cnf::GRAPHQL_PATH;
use crate::err::Error;

pub(super) fn router<I: Invalidator>(cache: SchemaCache<I>, graphiql: bool) -> Router {
	let route = match graphiql {
		true => get(graphiql_page).post(execute::<I>),
		false => post(execute::<I>),
	};
	Router::new().route(GRAPHQL_PATH, route).with_state(cache)
}

async fn execute<I: Invalidator>(
	State(cache): State<SchemaCache<I>>,
	req: GraphQLRequest,
) -> Result<GraphQLResponse, Error> {
	let schema = cache.get_schema().await?;
	Ok(schema.execute(req.into_inner()).await.into())
}

async fn graphiql_page() -> impl IntoResponse {
	Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}
