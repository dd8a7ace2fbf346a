use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, ResolverContext, TypeRef};
use futures::FutureExt;

use super::args::{key_arg, key_from_args};
use super::error::{ResolverError, SchemaError, internal_error};
use super::filter::{list_args, query_from_args};
use super::hooks::{self, Resolver, Resolvers, resolver};
use super::utils::{FieldSet, column_value, field_type, value_to_gql};
use crate::catalog::naming::{pluralize, singularize, to_field_name};
use crate::catalog::{Entity, FieldDefinition};
use crate::dbs::{Cond, Datastore, Row};

/// The name of the root field listing the rows of a table
pub fn list_field_name(table: &str) -> String {
	pluralize(&to_field_name(table))
}

/// The name of the root field fetching a single row by primary key
pub fn get_field_name(table: &str) -> String {
	singularize(&to_field_name(table))
}

/// Builds the object type of an entity with only its scalar fields.
///
/// Relationship fields are added in a second pass, once every entity type
/// exists, so that types can reference each other in any order.
pub fn entity_object(entity: &Entity) -> Result<FieldSet, SchemaError> {
	trace!("Adding table: {}", entity.table);
	let mut object = FieldSet::new(&entity.type_name)
		.description(format!("Generated from table `{}`", entity.table));
	for fd in entity.fields.values() {
		object.insert(&fd.name, scalar_field(fd))?;
	}
	Ok(object)
}

fn scalar_field(fd: &FieldDefinition) -> Field {
	let column = fd.column.clone();
	let kind = fd.kind;
	Field::new(&fd.name, field_type(fd), move |ctx: ResolverContext| {
		let column = column.clone();
		FieldFuture::new(async move {
			let row = parent_row(&ctx)?;
			match value_to_gql(kind, column_value(row, &column)?)? {
				async_graphql::Value::Null => Ok(None),
				v => Ok(Some(FieldValue::value(v))),
			}
		})
	})
}

/// Adds the list and single row fields of an entity to the query root
pub fn query_fields(
	entity: &Arc<Entity>,
	ds: &Arc<dyn Datastore>,
	query: &mut FieldSet,
	resolvers: &Resolvers,
) -> Result<(), SchemaError> {
	let list_name = list_field_name(&entity.table);
	let mut list = hooks::field(
		&list_name,
		TypeRef::named_nn_list_nn(&entity.type_name),
		resolvers.wrap_query(&list_name, list_resolver(entity.clone(), ds.clone())),
	)
	.description(format!(
		"Generated from table `{}`\nallows querying a table with filters",
		entity.table
	));
	for arg in list_args(entity) {
		list = list.argument(arg);
	}
	query.insert(list_name, list)?;

	let get_name = get_field_name(&entity.table);
	let get = hooks::field(
		&get_name,
		TypeRef::named(&entity.type_name),
		resolvers.wrap_query(&get_name, get_resolver(entity.clone(), ds.clone())),
	)
	.description(format!(
		"Generated from table `{}`\nallows querying a single record in a table by primary key",
		entity.table
	))
	.argument(key_arg(entity).input());
	query.insert(get_name, get)
}

fn list_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		async move {
			let args = ctx.args.as_index_map();
			trace!("received request with args: {args:?}");
			let query = query_from_args(args, &entity)?;
			let rows = ds.find_many(&entity.table, &query).await?;
			Ok(Some(row_list(rows)))
		}
		.boxed()
	})
}

fn get_resolver(entity: Arc<Entity>, ds: Arc<dyn Datastore>) -> Resolver {
	let arg = key_arg(&entity).name;
	resolver(move |ctx| {
		let entity = entity.clone();
		let ds = ds.clone();
		let arg = arg.clone();
		async move {
			let key = key_from_args(ctx.args.as_index_map(), &arg, &entity.key)?;
			let row = ds.find_one(&entity.table, &Cond::eq(&entity.key.column, key)).await?;
			Ok(row.map(FieldValue::owned_any))
		}
		.boxed()
	})
}

/// The row an object field is resolved against
pub fn parent_row<'a>(ctx: &ResolverContext<'a>) -> Result<&'a Row, ResolverError> {
	ctx.parent_value.downcast_ref::<Row>().ok_or_else(|| internal_error("failed to downcast parent row"))
}

pub fn row_list(rows: Vec<Row>) -> FieldValue<'static> {
	FieldValue::list(rows.into_iter().map(FieldValue::owned_any))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("users", "users", "user")]
	#[case("blog_posts", "blogPosts", "blogPost")]
	#[case("Category", "categories", "category")]
	#[case("people", "people", "person")]
	fn root_field_names(#[case] table: &str, #[case] list: &str, #[case] get: &str) {
		assert_eq!(list_field_name(table), list);
		assert_eq!(get_field_name(table), get);
	}
}
