use std::path::Path;
use std::sync::Arc;

use async_graphql::dynamic::{Scalar, Schema, Type};
use async_graphql::Value as GqlValue;

use super::error::SchemaError;
use super::filter::{entity_types, scalar_filters};
use super::hooks::Resolvers;
use super::mutations::{GENERIC_RESPONSE, GenericResponse, entity_mutations};
use super::relations::{link_mutations, relation_field};
use super::tables::{entity_object, query_fields};
use super::utils::{BLOB, FieldSet, NUMERIC, TypeNames};
use crate::catalog::{AssociationKind, EntityModel};
use crate::cnf::{MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH};
use crate::dbs::{self, Datastore, SqliteDatastore};
use crate::err::Error;

/// Synthesizes the GraphQL schema of an entity model.
///
/// Every resolver of the schema reads and writes through the given datastore.
/// The build either returns a complete schema, or an error and no schema.
pub fn generate_schema(
	model: &EntityModel,
	ds: Arc<dyn Datastore>,
	resolvers: &Resolvers,
) -> Result<Schema, SchemaError> {
	if model.is_empty() {
		return Err(SchemaError::NoTables);
	}
	let mut names = TypeNames::default();
	let mut types: Vec<Type> = Vec::new();
	let mut query = FieldSet::new("Query");
	let mut mutation = FieldSet::new("Mutation");
	for name in [query.name(), mutation.name(), GENERIC_RESPONSE, NUMERIC, BLOB] {
		names.claim(name)?;
	}

	for (name, filter) in scalar_filters() {
		names.claim(name)?;
		types.push(Type::InputObject(filter));
	}

	// Every entity type exists before any relation field refers to one
	let mut objects = Vec::new();
	for entity in model.entities() {
		names.claim(&entity.type_name)?;
		for (name, ty) in entity_types(entity) {
			names.claim(name)?;
			types.push(ty);
		}
		objects.push(entity_object(entity)?);
	}

	for (entity, object) in model.entities().zip(objects.iter_mut()) {
		let entity = Arc::new(entity.clone());
		query_fields(&entity, &ds, &mut query, resolvers)?;
		let input = entity_mutations(&entity, &ds, &mut mutation, &mut names, resolvers)?;
		types.push(Type::InputObject(input));
		for association in model.associations_from(&entity.table) {
			relation_field(model, association, &ds, object)?;
			if association.kind == AssociationKind::BelongsToMany {
				link_mutations(model, association, &ds, &mut mutation, resolvers)?;
			}
		}
	}
	resolvers.check(&query, &mutation);

	info!(
		entities = objects.len(),
		associations = model.associations().len(),
		"Generated GraphQL schema with {} queries and {} mutations",
		query.names().count(),
		mutation.names().count()
	);

	let mut schema = Schema::build("Query", Some("Mutation"), None)
		.register(query.into_object())
		.register(mutation.into_object())
		.register(GenericResponse::object())
		.register(
			Scalar::new(NUMERIC)
				.description("A decimal value, as a number or a string")
				.validator(|v| matches!(v, GqlValue::Number(_) | GqlValue::String(_))),
		)
		.register(
			Scalar::new(BLOB)
				.description("Binary data, encoded as a base64 string")
				.validator(|v| matches!(v, GqlValue::Number(_) | GqlValue::String(_))),
		);
	for object in objects {
		schema = schema.register(object.into_object());
	}
	for ty in types {
		trace!("adding type: {ty:?}");
		schema = schema.register(ty);
	}
	schema
		.limit_depth(*MAX_QUERY_DEPTH)
		.limit_complexity(*MAX_QUERY_COMPLEXITY)
		.finish()
		.map_err(|e| SchemaError::Invalid(e.0))
}

/// Introspects a datastore and builds its GraphQL schema
pub async fn build_schema(ds: Arc<dyn Datastore>, resolvers: &Resolvers) -> Result<Schema, Error> {
	let tables = dbs::introspect(ds.as_ref()).await?;
	debug!("Introspected {} tables from {}", tables.len(), ds.id());
	let model = EntityModel::build(&tables)?;
	Ok(generate_schema(&model, ds, resolvers)?)
}

/// Builds the GraphQL schema of an existing database file
pub async fn build_schema_from_database(
	path: impl AsRef<Path>,
	resolvers: &Resolvers,
) -> Result<Schema, Error> {
	let ds = SqliteDatastore::open(path).await?;
	build_schema(Arc::new(ds), resolvers).await
}

/// Runs a batch of statements against an in-memory database, and builds the
/// GraphQL schema of the result
pub async fn build_schema_from_statements(sql: &str, resolvers: &Resolvers) -> Result<Schema, Error> {
	let ds = SqliteDatastore::from_statements(sql).await?;
	build_schema(Arc::new(ds), resolvers).await
}

/// Like [`build_schema_from_statements`], with the statements read from a file
pub async fn build_schema_from_infile(
	path: impl AsRef<Path>,
	resolvers: &Resolvers,
) -> Result<Schema, Error> {
	let ds = SqliteDatastore::from_infile(path).await?;
	build_schema(Arc::new(ds), resolvers).await
}
