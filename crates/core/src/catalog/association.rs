use std::fmt;

use heck::ToSnakeCase;

use super::naming::{pluralize, singularize, to_field_name};
use super::{ColumnInfo, TableInfo};
use crate::gql::error::SchemaError;

/// Strips the `_id` or `Id` suffix marking a column as a foreign key by
/// naming convention, even without a declared constraint.
fn strip_fk_suffix(column: &str) -> Option<&str> {
	column.strip_suffix("_id").or_else(|| column.strip_suffix("Id"))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AssociationKind {
	/// The `from` entity owns many `to` rows through a foreign key on `to`
	HasMany,
	/// The `from` entity points at one `to` row through its own foreign key
	BelongsTo,
	/// Both entities are linked through a junction table
	BelongsToMany,
}

impl fmt::Display for AssociationKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::HasMany => f.write_str("has many"),
			Self::BelongsTo => f.write_str("belongs to"),
			Self::BelongsToMany => f.write_str("belongs to many"),
		}
	}
}

/// A directional relationship between two entities, keyed by table name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Association {
	pub from: String,
	pub to: String,
	pub kind: AssociationKind,
	/// The normalized foreign key field for has-many and belongs-to pairs, or
	/// the raw junction column pointing at `from` for many-to-many pairs.
	pub foreign_key: String,
	/// The raw column holding the foreign key. It lives on the child table
	/// for has-many and belongs-to pairs, and on the junction table otherwise.
	pub column: String,
	/// The raw junction column pointing at `to`
	pub other_key: Option<String>,
	/// The junction table of a many-to-many pair
	pub through: Option<String>,
}

impl Association {
	fn pair(parent: &str, child: &str, column: &str) -> [Association; 2] {
		let foreign_key = to_field_name(column);
		[
			Association {
				from: parent.to_owned(),
				to: child.to_owned(),
				kind: AssociationKind::HasMany,
				foreign_key: foreign_key.clone(),
				column: column.to_owned(),
				other_key: None,
				through: None,
			},
			Association {
				from: child.to_owned(),
				to: parent.to_owned(),
				kind: AssociationKind::BelongsTo,
				foreign_key,
				column: column.to_owned(),
				other_key: None,
				through: None,
			},
		]
	}

	fn junction(a: &str, a_key: &str, b: &str, b_key: &str, table: &str) -> [Association; 2] {
		[
			Association {
				from: a.to_owned(),
				to: b.to_owned(),
				kind: AssociationKind::BelongsToMany,
				foreign_key: a_key.to_owned(),
				column: a_key.to_owned(),
				other_key: Some(b_key.to_owned()),
				through: Some(table.to_owned()),
			},
			Association {
				from: b.to_owned(),
				to: a.to_owned(),
				kind: AssociationKind::BelongsToMany,
				foreign_key: b_key.to_owned(),
				column: b_key.to_owned(),
				other_key: Some(a_key.to_owned()),
				through: Some(table.to_owned()),
			},
		]
	}
}

/// Checks whether a table only exists to link two other tables.
///
/// The name must split on underscores into exactly two segments, and each
/// segment, pluralized, must name a table in the full table set.
pub fn is_join_table<S: AsRef<str>>(name: &str, tables: &[S]) -> bool {
	let parts: Vec<String> = name.split('_').map(pluralize).collect();
	parts.len() == 2 && parts.iter().all(|part| tables.iter().any(|t| t.as_ref() == part))
}

/// Resolves a possibly singular or plural table reference to an entity key,
/// trying an exact match, then the plural form, then the singular form.
pub fn find_entity_key<'a, S: AsRef<str>>(name: &str, keys: &'a [S]) -> Result<&'a str, SchemaError> {
	let lookup = |candidate: &str| keys.iter().map(AsRef::<str>::as_ref).find(|k| *k == candidate);
	lookup(name)
		.or_else(|| lookup(&pluralize(name)))
		.or_else(|| lookup(&singularize(name)))
		.ok_or_else(|| SchemaError::UnresolvedEntity {
			name: name.to_owned(),
		})
}

/// Infers the many-to-many pair contributed by a junction table.
pub fn junction_associations<S: AsRef<str>>(
	table: &TableInfo,
	entities: &[S],
) -> Result<[Association; 2], SchemaError> {
	let ((a, a_key), (b, b_key)) = match table.foreign_keys.as_slice() {
		[first, second] => (
			(first.referenced_table.clone(), first.from_column.clone()),
			(second.referenced_table.clone(), second.from_column.clone()),
		),
		[] => {
			let mut sides = table.name.split('_').map(pluralize);
			let (Some(a), Some(b)) = (sides.next(), sides.next()) else {
				return Err(ambiguous(&table.name, "the table name has no two sides".to_owned()));
			};
			let a_key = junction_column(table, &a)?;
			let b_key = junction_column(table, &b)?;
			if a_key == b_key {
				return Err(ambiguous(
					&table.name,
					format!("column '{a_key}' matches both '{a}' and '{b}'"),
				));
			}
			((a, a_key), (b, b_key))
		}
		fks => {
			return Err(ambiguous(
				&table.name,
				format!("expected two foreign keys, found {}", fks.len()),
			));
		}
	};
	let a = find_entity_key(&a, entities)?;
	let b = find_entity_key(&b, entities)?;
	Ok(Association::junction(a, &a_key, b, &b_key, &table.name))
}

/// Picks the junction column pointing at one side of the pair, preferring an
/// exact `{side}_id` or `{side}Id` column over a unique prefix match.
fn junction_column(table: &TableInfo, side: &str) -> Result<String, SchemaError> {
	let singular = singularize(side);
	let exact = [format!("{singular}_id"), format!("{singular}Id")];
	if let Some(column) = table.columns.iter().find(|c| exact.contains(&c.name)) {
		return Ok(column.name.clone());
	}
	let candidates: Vec<&ColumnInfo> =
		table.columns.iter().filter(|c| c.name.starts_with(singular.as_str())).collect();
	match candidates.as_slice() {
		[column] => Ok(column.name.clone()),
		[] => Err(ambiguous(&table.name, format!("no column refers to '{side}'"))),
		many => Err(ambiguous(
			&table.name,
			format!(
				"columns {} all refer to '{side}'",
				many.iter().map(|c| format!("'{}'", c.name)).collect::<Vec<_>>().join(", ")
			),
		)),
	}
}

fn ambiguous(table: &str, detail: String) -> SchemaError {
	SchemaError::AmbiguousJunctionKey {
		table: table.to_owned(),
		detail,
	}
}

/// Infers the has-many and belongs-to pairs contributed by an entity table,
/// from declared foreign keys first and then from column naming conventions.
pub fn table_associations<S: AsRef<str>>(
	table: &TableInfo,
	entities: &[S],
) -> Result<Vec<Association>, SchemaError> {
	let mut associations = Vec::new();
	for fk in &table.foreign_keys {
		let parent = find_entity_key(&fk.referenced_table, entities)?;
		associations.extend(Association::pair(parent, &table.name, &fk.from_column));
	}
	let candidates = table.columns.iter().filter(|c| {
		!c.primary_key && !table.foreign_keys.iter().any(|fk| fk.from_column == c.name)
	});
	for column in candidates {
		let Some(root) = strip_fk_suffix(&column.name) else {
			continue;
		};
		let target = pluralize(root);
		let parent = find_entity_key(&target, entities)
			.or_else(|_| find_entity_key(&target.to_snake_case(), entities));
		match parent {
			Ok(parent) => {
				debug!(table = %table.name, column = %column.name, parent, "inferred foreign key from column name");
				associations.extend(Association::pair(parent, &table.name, &column.name));
			}
			Err(_) => {
				debug!(table = %table.name, column = %column.name, "no table matches the column name, skipping");
			}
		}
	}
	Ok(associations)
}
