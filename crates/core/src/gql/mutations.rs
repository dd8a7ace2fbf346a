use std::sync::Arc;

use async_graphql::dynamic::{
	Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, TypeRef,
};
use async_graphql::Value as GqlValue;
use futures::FutureExt;

use super::args::{Arg, create_args, delete_args, key_from_args, row_from_args, update_args};
use super::error::{ResolverError, SchemaError, internal_error, invalid_argument, not_found};
use super::filter::{cond_from_filter, filter_name};
use super::hooks::{self, Resolver, Resolvers, resolver};
use super::tables::row_list;
use super::utils::{FieldSet, TypeNames};
use crate::catalog::Entity;
use crate::catalog::naming::pluralize;
use crate::dbs::{Cond, Datastore};

pub const GENERIC_RESPONSE: &str = "GenericResponse";

/// The result of mutations which return no row.
#[derive(Clone, Copy, Debug)]
pub struct GenericResponse {
	pub success: bool,
}

impl GenericResponse {
	pub fn success() -> FieldValue<'static> {
		FieldValue::owned_any(GenericResponse {
			success: true,
		})
	}

	pub fn object() -> Object {
		Object::new(GENERIC_RESPONSE).field(Field::new(
			"success",
			TypeRef::named(TypeRef::BOOLEAN),
			|ctx: ResolverContext| {
				FieldFuture::new(async move {
					let res = ctx
						.parent_value
						.downcast_ref::<GenericResponse>()
						.ok_or_else(|| internal_error("failed to downcast response"))?;
					Ok(Some(FieldValue::value(res.success)))
				})
			},
		))
	}
}

fn create_input_name(entity: &Entity) -> String {
	format!("{}CreateInput", entity.type_name)
}

/// The input object accepted by a bulk create mutation
pub fn create_input(entity: &Entity) -> InputObject {
	create_args(entity)
		.iter()
		.map(Arg::input)
		.fold(InputObject::new(create_input_name(entity)), InputObject::field)
}

/// Adds the create, update and delete mutations of an entity, returning the
/// input type of its bulk create mutation
pub fn entity_mutations(
	entity: &Arc<Entity>,
	ds: &Arc<dyn Datastore>,
	mutation: &mut FieldSet,
	types: &mut TypeNames,
	resolvers: &Resolvers,
) -> Result<InputObject, SchemaError> {
	let ty = &entity.type_name;
	let plural = pluralize(ty);

	let name = format!("create{ty}");
	let field = hooks::field(
		&name,
		TypeRef::named_nn(ty),
		resolvers.wrap_mutation(&name, create_resolver(entity.clone(), ds.clone())),
	);
	mutation.insert(&name, with_args(field, create_args(entity)))?;

	let name = format!("create{plural}");
	let input = create_input(entity);
	types.claim(create_input_name(entity))?;
	let field = hooks::field(
		&name,
		TypeRef::named_nn_list_nn(ty),
		resolvers.wrap_mutation(&name, create_many_resolver(entity.clone(), ds.clone())),
	)
	.argument(InputValue::new("input", TypeRef::named_nn_list_nn(create_input_name(entity))));
	mutation.insert(&name, field)?;

	let name = format!("update{ty}");
	let field = hooks::field(
		&name,
		TypeRef::named(ty),
		resolvers.wrap_mutation(&name, update_resolver(entity.clone(), ds.clone())),
	);
	mutation.insert(&name, with_args(field, update_args(entity)))?;

	let name = format!("delete{ty}");
	let field = hooks::field(
		&name,
		TypeRef::named_nn(GENERIC_RESPONSE),
		resolvers.wrap_mutation(&name, delete_resolver(entity.clone(), ds.clone())),
	);
	mutation.insert(&name, with_args(field, delete_args(entity)))?;

	let name = format!("delete{plural}");
	let field = hooks::field(
		&name,
		TypeRef::named_nn(GENERIC_RESPONSE),
		resolvers.wrap_mutation(&name, delete_many_resolver(entity.clone(), ds.clone())),
	)
	.argument(InputValue::new("filter", TypeRef::named_nn(filter_name(ty))));
	mutation.insert(&name, field)?;

	Ok(input)
}

fn with_args(field: Field, args: Vec<Arg>) -> Field {
	args.iter().map(Arg::input).fold(field, Field::argument)
}

fn create_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let row = row_from_args(ctx.args.as_index_map(), &entity)?;
			let created = ds.create(&entity.table, row).await?;
			Ok(Some(FieldValue::owned_any(created)))
		}
		.boxed()
	})
}

fn create_many_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let rows = match ctx.args.as_index_map().get("input") {
				Some(GqlValue::List(list)) => list
					.iter()
					.map(|v| match v {
						GqlValue::Object(o) => row_from_args(o, &entity),
						_ => Err(invalid_argument("input should contain objects")),
					})
					.collect::<Result<Vec<_>, ResolverError>>()?,
				_ => return Err(invalid_argument("input should be a list").into()),
			};
			let created = ds.create_many(&entity.table, rows).await?;
			Ok(Some(row_list(created)))
		}
		.boxed()
	})
}

fn update_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let args = ctx.args.as_index_map();
			let key = key_from_args(args, &entity.key.name, &entity.key)?;
			let mut changes = row_from_args(args, &entity)?;
			changes.shift_remove(&entity.key.column);
			let cond = Cond::eq(&entity.key.column, key);
			match ds.update(&entity.table, &cond, changes).await? {
				Some(row) => Ok(Some(FieldValue::owned_any(row))),
				None => Err(not_found(&entity.table).into()),
			}
		}
		.boxed()
	})
}

fn delete_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let key = key_from_args(ctx.args.as_index_map(), &entity.key.name, &entity.key)?;
			let cond = Cond::eq(&entity.key.column, key);
			match ds.delete(&entity.table, &cond).await? {
				0 => Err(not_found(&entity.table).into()),
				_ => Ok(Some(GenericResponse::success())),
			}
		}
		.boxed()
	})
}

fn delete_many_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let cond = match ctx.args.as_index_map().get("filter") {
				Some(GqlValue::Object(o)) => cond_from_filter(o, &entity)?,
				_ => return Err(invalid_argument("filter should be an object").into()),
			};
			trace!(?cond, "deleting rows from {}", entity.table);
			match ds.delete(&entity.table, &cond).await? {
				0 => Err(not_found(&entity.table).into()),
				count => {
					debug!("Deleted {count} rows from {}", entity.table);
					Ok(Some(GenericResponse::success()))
				}
			}
		}
		.boxed()
	})
}
