//! Relationship fields between entity types, and the mutations linking
//! rows of many-to-many pairs.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, ResolverContext, TypeRef};
use futures::FutureExt;
use heck::ToUpperCamelCase;

use super::args::{key_from_args, link_args};
use super::error::{SchemaError, duplicate_field, not_found};
use super::filter::{list_args, query_from_args};
use super::hooks::{self, Resolver, Resolvers, resolver};
use super::mutations::{GenericResponse, GENERIC_RESPONSE};
use super::tables::{parent_row, row_list};
use super::utils::{FieldSet, column_value};
use crate::catalog::naming::{pluralize, singularize, to_field_name};
use crate::catalog::{Association, AssociationKind, Entity, EntityModel};
use crate::dbs::{Cond, Datastore, Through};

/// Picks the name of a relationship field on an object type.
///
/// The name derived from the related table is preferred. When it is taken,
/// a name derived from the foreign key or junction table is used instead.
pub fn relation_field_name(
	association: &Association,
	object: &FieldSet,
) -> Result<String, SchemaError> {
	let related = to_field_name(&association.to);
	let (preferred, fallback) = match association.kind {
		AssociationKind::HasMany => {
			let name = pluralize(&related);
			let fallback = format!("{name}By{}", association.foreign_key.to_upper_camel_case());
			(name, fallback)
		}
		AssociationKind::BelongsTo => {
			let fk = &association.foreign_key;
			let fallback = fk.strip_suffix("Id").filter(|s| !s.is_empty()).unwrap_or(fk);
			(singularize(&related), fallback.to_owned())
		}
		AssociationKind::BelongsToMany => {
			let name = pluralize(&related);
			let through = association.through.as_deref().unwrap_or_default();
			let fallback = format!("{name}By{}", through.to_upper_camel_case());
			(name, fallback)
		}
	};
	if !object.contains(&preferred) {
		Ok(preferred)
	} else if !object.contains(&fallback) {
		debug!(
			"Field `{preferred}` is taken on `{}`, naming the {} relation `{fallback}`",
			object.name(),
			association.kind
		);
		Ok(fallback)
	} else {
		Err(duplicate_field(object.name(), preferred))
	}
}

/// Adds a relationship field to the object type of the association's source
pub fn relation_field(
	model: &EntityModel,
	association: &Association,
	ds: &Arc<dyn Datastore>,
	object: &mut FieldSet,
) -> Result<(), SchemaError> {
	let from = entity(model, &association.from)?;
	let to = entity(model, &association.to)?;
	let name = relation_field_name(association, object)?;
	trace!(field = %name, from = %from.table, to = %to.table, "adding relation field");
	let field = match association.kind {
		AssociationKind::HasMany => {
			let field = has_many(&name, from, to.clone(), association.column.clone(), ds.clone());
			list_args(&to).into_iter().fold(field, Field::argument)
		}
		AssociationKind::BelongsTo => belongs_to(&name, to, association.column.clone(), ds.clone()),
		AssociationKind::BelongsToMany => {
			let through = through(model, association)?;
			let field = belongs_to_many(&name, from, to.clone(), through, ds.clone());
			list_args(&to).into_iter().fold(field, Field::argument)
		}
	};
	object.insert(name, field)
}

fn entity(model: &EntityModel, table: &str) -> Result<Arc<Entity>, SchemaError> {
	model.entity(table).cloned().map(Arc::new).ok_or_else(|| SchemaError::UnresolvedEntity {
		name: table.to_owned(),
	})
}

fn through(model: &EntityModel, association: &Association) -> Result<Through, SchemaError> {
	let from = entity(model, &association.from)?;
	let to = entity(model, &association.to)?;
	match (&association.through, &association.other_key) {
		(Some(table), Some(other_key)) => Ok(Through {
			table: table.clone(),
			source: from.table.clone(),
			source_key: from.key.column.clone(),
			source_column: association.column.clone(),
			target: to.table.clone(),
			target_key: to.key.column.clone(),
			target_column: other_key.clone(),
		}),
		_ => Err(SchemaError::Invalid(format!(
			"the {} relation from `{}` to `{}` has no junction table",
			association.kind, association.from, association.to
		))),
	}
}

fn has_many(
	name: &str,
	parent: Arc<Entity>,
	child: Arc<Entity>,
	column: String,
	ds: Arc<dyn Datastore>,
) -> Field {
	Field::new(name, TypeRef::named_nn_list_nn(&child.type_name), move |ctx: ResolverContext| {
		let parent = parent.clone();
		let child = child.clone();
		let column = column.clone();
		let ds = ds.clone();
		FieldFuture::new(async move {
			let key = column_value(parent_row(&ctx)?, &parent.key.column)?.clone();
			let query = query_from_args(ctx.args.as_index_map(), &child)?.with_cond(Cond::eq(column, key));
			let rows = ds.find_many(&child.table, &query).await?;
			Ok(Some(row_list(rows)))
		})
	})
}

fn belongs_to(name: &str, parent: Arc<Entity>, column: String, ds: Arc<dyn Datastore>) -> Field {
	Field::new(name, TypeRef::named(&parent.type_name), move |ctx: ResolverContext| {
		let parent = parent.clone();
		let column = column.clone();
		let ds = ds.clone();
		FieldFuture::new(async move {
			let key = column_value(parent_row(&ctx)?, &column)?.clone();
			if key.is_null() {
				return Ok(None);
			}
			let row = ds.find_one(&parent.table, &Cond::eq(&parent.key.column, key)).await?;
			Ok(row.map(FieldValue::owned_any))
		})
	})
}

fn belongs_to_many(
	name: &str,
	from: Arc<Entity>,
	to: Arc<Entity>,
	through: Through,
	ds: Arc<dyn Datastore>,
) -> Field {
	let through = Arc::new(through);
	Field::new(name, TypeRef::named_nn_list_nn(&to.type_name), move |ctx: ResolverContext| {
		let from = from.clone();
		let to = to.clone();
		let through = through.clone();
		let ds = ds.clone();
		FieldFuture::new(async move {
			let key = column_value(parent_row(&ctx)?, &from.key.column)?.clone();
			let query = query_from_args(ctx.args.as_index_map(), &to)?;
			let rows = ds.find_through(&through, &key, &query).await?;
			Ok(Some(row_list(rows)))
		})
	})
}

/// Adds the `add<A>To<B>` and `remove<A>From<B>` mutations of a many-to-many
/// association
pub fn link_mutations(
	model: &EntityModel,
	association: &Association,
	ds: &Arc<dyn Datastore>,
	mutation: &mut FieldSet,
	resolvers: &Resolvers,
) -> Result<(), SchemaError> {
	let from = entity(model, &association.from)?;
	let to = entity(model, &association.to)?;
	let through = Arc::new(through(model, association)?);
	let args = link_args(&from, &to);
	for (link, name) in [
		(true, format!("add{}To{}", from.type_name, to.type_name)),
		(false, format!("remove{}From{}", from.type_name, to.type_name)),
	] {
		let resolver = link_resolver(link, &from, &to, through.clone(), ds.clone());
		let field = hooks::field(&name, TypeRef::named_nn(GENERIC_RESPONSE), resolvers.wrap_mutation(&name, resolver))
			.argument(args[0].input())
			.argument(args[1].input());
		mutation.insert(name, field)?;
	}
	Ok(())
}

fn link_resolver(
	link: bool,
	from: &Arc<Entity>,
	to: &Arc<Entity>,
	through: Arc<Through>,
	ds: Arc<dyn Datastore>,
) -> Resolver {
	let [source_arg, target_arg] = link_args(from, to).map(|a| a.name);
	let from = from.clone();
	let to = to.clone();
	resolver(move |ctx| {
		let (from, to) = (from.clone(), to.clone());
		let (source_arg, target_arg) = (source_arg.clone(), target_arg.clone());
		let through = through.clone();
		let ds = ds.clone();
		async move {
			let args = ctx.args.as_index_map();
			let source = key_from_args(args, &source_arg, &from.key)?;
			let target = key_from_args(args, &target_arg, &to.key)?;
			let done = if link {
				ds.link(&through, &source, &target).await?
			} else {
				ds.unlink(&through, &source, &target).await?
			};
			if !done {
				return Err(not_found(&through.table).into());
			}
			Ok(Some(GenericResponse::success()))
		}
		.boxed()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn association(kind: AssociationKind, to: &str, foreign_key: &str, through: Option<&str>) -> Association {
		Association {
			from: "users".to_owned(),
			to: to.to_owned(),
			kind,
			foreign_key: foreign_key.to_owned(),
			column: foreign_key.to_owned(),
			other_key: None,
			through: through.map(str::to_owned),
		}
	}

	fn taken(names: &[&str]) -> FieldSet {
		let mut object = FieldSet::new("User");
		for name in names {
			object.insert(*name, Field::new(*name, TypeRef::named(TypeRef::INT), |_| FieldFuture::from_value(None)))
				.unwrap();
		}
		object
	}

	#[test]
	fn preferred_names_come_from_the_related_table() {
		let object = taken(&["id", "name"]);
		let has_many = association(AssociationKind::HasMany, "posts", "userId", None);
		assert_eq!(relation_field_name(&has_many, &object).unwrap(), "posts");
		let belongs_to = association(AssociationKind::BelongsTo, "teams", "teamId", None);
		assert_eq!(relation_field_name(&belongs_to, &object).unwrap(), "team");
		let many = association(AssociationKind::BelongsToMany, "groups", "user_id", Some("group_user"));
		assert_eq!(relation_field_name(&many, &object).unwrap(), "groups");
	}

	#[test]
	fn taken_names_fall_back_to_the_key() {
		let object = taken(&["id", "posts", "user"]);
		let has_many = association(AssociationKind::HasMany, "posts", "editorId", None);
		assert_eq!(relation_field_name(&has_many, &object).unwrap(), "postsByEditorId");
		let belongs_to = association(AssociationKind::BelongsTo, "users", "managerId", None);
		assert_eq!(relation_field_name(&belongs_to, &object).unwrap(), "manager");
		let many = association(AssociationKind::BelongsToMany, "posts", "user_id", Some("post_user"));
		assert_eq!(relation_field_name(&many, &object).unwrap(), "postsByPostUser");
	}

	#[test]
	fn taken_fallbacks_are_duplicates() {
		let object = taken(&["team", "teamName"]);
		let belongs_to = association(AssociationKind::BelongsTo, "teams", "team", None);
		let err = relation_field_name(&belongs_to, &object).unwrap_err();
		assert!(matches!(err, SchemaError::DuplicateField { ref name, .. } if name == "team"));
	}
}
