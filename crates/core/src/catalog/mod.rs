//! The entity model derived from database introspection.
//!
//! The model is built once per schema build from the complete set of table
//! metadata, and is read-only afterwards. GraphQL synthesis only ever reads
//! from it, so it can be shared between concurrent resolvers without locks.

pub mod association;
pub mod definition;
pub mod kind;
pub mod naming;

use std::collections::HashMap;

use indexmap::IndexMap;

pub use self::association::{Association, AssociationKind};
pub use self::definition::{Entity, FieldDefinition};
pub use self::kind::ScalarKind;
use crate::gql::error::SchemaError;

/// A column as reported by the datastore, in declaration order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnInfo {
	pub name: String,
	pub declared_type: String,
	pub primary_key: bool,
	pub not_null: bool,
	pub default_value: Option<String>,
}

/// A declared foreign key constraint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForeignKeyInfo {
	pub from_column: String,
	pub referenced_table: String,
}

/// The structural metadata of a single table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableInfo {
	pub name: String,
	pub columns: Vec<ColumnInfo>,
	pub foreign_keys: Vec<ForeignKeyInfo>,
}

#[derive(Clone, Debug, Default)]
pub struct EntityModel {
	entities: IndexMap<String, Entity>,
	associations: Vec<Association>,
	/// Association positions keyed by their `from` entity
	index: HashMap<String, Vec<usize>>,
}

impl EntityModel {
	/// Builds the model from the metadata of every table in the database.
	///
	/// Junction tables do not become entities. They only contribute
	/// many-to-many associations between the two tables they link.
	pub fn build(tables: &[TableInfo]) -> Result<Self, SchemaError> {
		let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
		let (junctions, others): (Vec<&TableInfo>, Vec<&TableInfo>) =
			tables.iter().partition(|t| association::is_join_table(&t.name, &names));
		let mut entities = IndexMap::with_capacity(others.len());
		for table in &others {
			trace!(table = %table.name, "building entity definition");
			entities.insert(table.name.clone(), Entity::build(&table.name, &table.columns)?);
		}
		let keys: Vec<&str> = entities.keys().map(String::as_str).collect();
		let mut associations = Vec::new();
		for table in &others {
			associations.extend(association::table_associations(table, &keys)?);
		}
		for table in &junctions {
			trace!(table = %table.name, "treating table as a junction");
			associations.extend(association::junction_associations(table, &keys)?);
		}
		let mut index: HashMap<String, Vec<usize>> = HashMap::new();
		for (i, association) in associations.iter().enumerate() {
			debug!(from = %association.from, to = %association.to, kind = %association.kind, "inferred association");
			index.entry(association.from.clone()).or_default().push(i);
		}
		Ok(EntityModel {
			entities,
			associations,
			index,
		})
	}

	/// Iterates over all entities in table order
	pub fn entities(&self) -> impl Iterator<Item = &Entity> {
		self.entities.values()
	}

	pub fn entity(&self, table: &str) -> Option<&Entity> {
		self.entities.get(table)
	}

	pub fn associations(&self) -> &[Association] {
		&self.associations
	}

	/// Iterates over the associations starting at the given entity
	pub fn associations_from(&self, table: &str) -> impl Iterator<Item = &Association> {
		self.index.get(table).into_iter().flatten().filter_map(|&i| self.associations.get(i))
	}

	/// Resolves a singular or plural table reference to an entity key
	pub fn find_entity_key(&self, name: &str) -> Result<&str, SchemaError> {
		let keys: Vec<&str> = self.entities.keys().map(String::as_str).collect();
		let found = association::find_entity_key(name, &keys)?;
		match self.entities.get_key_value(found) {
			Some((key, _)) => Ok(key.as_str()),
			None => Err(SchemaError::UnresolvedEntity {
				name: name.to_owned(),
			}),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}
}
