//! Filter, ordering and pagination arguments of list fields.

use async_graphql::dynamic::indexmap::IndexMap;
use async_graphql::dynamic::{Enum, InputObject, InputValue, Type, TypeRef};
use async_graphql::{Name, Value as GqlValue};

use super::error::{ResolverError, invalid_argument};
use super::utils::{gql_to_value, kind_to_type_name};
use crate::catalog::{Entity, ScalarKind};
use crate::dbs::{Cond, Direction, Operator, Query};

type GqlObject = IndexMap<Name, GqlValue>;

const SCALARS: [ScalarKind; 6] = [
	ScalarKind::Integer,
	ScalarKind::Text,
	ScalarKind::Real,
	ScalarKind::Numeric,
	ScalarKind::Boolean,
	ScalarKind::Binary,
];

pub fn filter_name(type_name: &str) -> String {
	format!("_filter_{type_name}")
}

pub fn order_name(type_name: &str) -> String {
	format!("_order_{type_name}")
}

pub fn orderable_name(type_name: &str) -> String {
	format!("_orderable_{type_name}")
}

macro_rules! filter_impl {
	($filter:ident, $ty:expr_2021, $name:expr_2021) => {
		$filter = $filter.field(InputValue::new($name, $ty));
	};
}

/// The operator input objects for every scalar type, one per kind, with
/// their names
pub fn scalar_filters() -> Vec<(String, InputObject)> {
	SCALARS
		.into_iter()
		.map(|kind| {
			let scalar = kind_to_type_name(kind);
			let name = filter_name(scalar);
			let mut filter = InputObject::new(&name);
			filter_impl!(filter, TypeRef::named(scalar), "eq");
			filter_impl!(filter, TypeRef::named(scalar), "ne");
			filter_impl!(filter, TypeRef::named(scalar), "gt");
			filter_impl!(filter, TypeRef::named(scalar), "gte");
			filter_impl!(filter, TypeRef::named(scalar), "lt");
			filter_impl!(filter, TypeRef::named(scalar), "lte");
			filter_impl!(filter, TypeRef::named_nn_list(scalar), "in");
			filter_impl!(filter, TypeRef::named(TypeRef::STRING), "like");
			filter_impl!(filter, TypeRef::named(TypeRef::BOOLEAN), "isNull");
			(name, filter)
		})
		.collect()
}

/// The filter, order and orderable types of an entity, with their names
pub fn entity_types(entity: &Entity) -> [(String, Type); 3] {
	let name = &entity.type_name;
	let filter_name = filter_name(name);
	let mut filter = InputObject::new(&filter_name)
		.description(format!("Generated from `{}` a predicate over its rows", entity.table));
	let orderable_name = orderable_name(name);
	let mut orderable = Enum::new(&orderable_name).description(format!(
		"Generated from `{}` the fields which a query can be ordered by",
		entity.table
	));
	for fd in entity.fields.values() {
		filter = filter.field(InputValue::new(
			&fd.name,
			TypeRef::named(self::filter_name(kind_to_type_name(fd.kind))),
		));
		orderable = orderable.item(&fd.name);
	}
	filter = filter
		.field(InputValue::new("and", TypeRef::named_nn_list(&filter_name)))
		.field(InputValue::new("or", TypeRef::named_nn_list(&filter_name)))
		.field(InputValue::new("not", TypeRef::named(&filter_name)));
	let order_name = order_name(name);
	let order = InputObject::new(&order_name)
		.description(format!("Generated from `{}` an object representing a query ordering", entity.table))
		.field(InputValue::new("asc", TypeRef::named(&orderable_name)))
		.field(InputValue::new("desc", TypeRef::named(&orderable_name)))
		.field(InputValue::new("then", TypeRef::named(&order_name)));
	[
		(filter_name, Type::InputObject(filter)),
		(order_name, Type::InputObject(order)),
		(orderable_name, Type::Enum(orderable)),
	]
}

/// The arguments accepted by every list field returning the entity
pub fn list_args(entity: &Entity) -> [InputValue; 4] {
	[
		InputValue::new("limit", TypeRef::named(TypeRef::INT)),
		InputValue::new("start", TypeRef::named(TypeRef::INT)),
		InputValue::new("order", TypeRef::named(order_name(&entity.type_name))),
		InputValue::new("filter", TypeRef::named(filter_name(&entity.type_name))),
	]
}

/// Parses the arguments of a list field into a storage query
pub fn query_from_args(args: &GqlObject, entity: &Entity) -> Result<Query, ResolverError> {
	let limit = count_arg(args, "limit")?;
	let start = count_arg(args, "start")?;
	let order = match args.get("order") {
		Some(GqlValue::Object(o)) => order_from_args(o, entity)?,
		Some(GqlValue::Null) | None => Vec::new(),
		Some(v) => return Err(invalid_argument(format!("order should be an object, found {v}"))),
	};
	let cond = match args.get("filter") {
		Some(GqlValue::Object(o)) => Some(cond_from_filter(o, entity)?),
		Some(GqlValue::Null) | None => None,
		Some(v) => return Err(invalid_argument(format!("filter should be an object, found {v}"))),
	};
	let query = Query {
		cond,
		order,
		limit,
		start,
	};
	trace!(?query, "parsed list arguments");
	Ok(query)
}

fn count_arg(args: &GqlObject, name: &str) -> Result<Option<i64>, ResolverError> {
	match args.get(name) {
		Some(GqlValue::Number(n)) => match n.as_i64() {
			Some(v) if v >= 0 => Ok(Some(v)),
			_ => Err(invalid_argument(format!("{name} must be a non-negative integer"))),
		},
		Some(GqlValue::Null) | None => Ok(None),
		Some(v) => Err(invalid_argument(format!("{name} must be an integer, found {v}"))),
	}
}

fn order_from_args(order: &GqlObject, entity: &Entity) -> Result<Vec<(String, Direction)>, ResolverError> {
	let mut orders = vec![];
	let mut current = order;
	loop {
		let asc = current.get("asc").filter(|v| !matches!(v, GqlValue::Null));
		let desc = current.get("desc").filter(|v| !matches!(v, GqlValue::Null));
		let (field, direction) = match (asc, desc) {
			(Some(_), Some(_)) => {
				return Err(invalid_argument("Found both ASC and DESC in order"));
			}
			(Some(a), None) => (order_field(a)?, Direction::Asc),
			(None, Some(d)) => (order_field(d)?, Direction::Desc),
			(None, None) => break,
		};
		let fd = entity
			.fields
			.get(field)
			.ok_or_else(|| invalid_argument(format!("Field `{field}` cannot be ordered by")))?;
		orders.push((fd.column.clone(), direction));
		if let Some(GqlValue::Object(next)) = current.get("then") {
			current = next;
		} else {
			break;
		}
	}
	Ok(orders)
}

// Variables deliver enum values as strings
fn order_field(value: &GqlValue) -> Result<&str, ResolverError> {
	match value {
		GqlValue::Enum(n) => Ok(n.as_str()),
		GqlValue::String(s) => Ok(s.as_str()),
		v => Err(invalid_argument(format!("Order field must be a field name, found {v}"))),
	}
}

/// Parses a filter object into a predicate over the entity's columns.
///
/// Every key of an object is a separate predicate, and all of them must hold.
pub fn cond_from_filter(filter: &GqlObject, entity: &Entity) -> Result<Cond, ResolverError> {
	let mut conds = Vec::with_capacity(filter.len());
	for (k, v) in filter {
		if matches!(v, GqlValue::Null) {
			continue;
		}
		let cond = match k.as_str() {
			"and" => Cond::And(filter_list(v, "and", entity)?),
			"or" => Cond::Or(filter_list(v, "or", entity)?),
			"not" => match v {
				GqlValue::Object(o) => Cond::Not(Box::new(cond_from_filter(o, entity)?)),
				_ => return Err(invalid_argument("Value of not must be an object")),
			},
			name => field_cond(name, v, entity)?,
		};
		conds.push(cond);
	}
	Ok(match conds.len() {
		1 => conds.remove(0),
		_ => Cond::And(conds),
	})
}

fn filter_list(value: &GqlValue, op: &str, entity: &Entity) -> Result<Vec<Cond>, ResolverError> {
	let GqlValue::List(list) = value else {
		return Err(invalid_argument(format!("Value of {op} should be a list")));
	};
	list.iter()
		.map(|v| match v {
			GqlValue::Object(o) => cond_from_filter(o, entity),
			_ => Err(invalid_argument(format!("List of {op} should contain objects"))),
		})
		.collect()
}

fn field_cond(name: &str, value: &GqlValue, entity: &Entity) -> Result<Cond, ResolverError> {
	let Some(fd) = entity.fields.get(name) else {
		return Err(invalid_argument(format!("Field `{name}` not found")));
	};
	let GqlValue::Object(ops) = value else {
		return Err(invalid_argument("Field filter should be an object"));
	};
	let mut conds = Vec::with_capacity(ops.len());
	for (op, v) in ops {
		let column = fd.column.clone();
		let cond = match op.as_str() {
			"in" => {
				let GqlValue::List(list) = v else {
					return Err(invalid_argument("Value of in should be a list"));
				};
				let values =
					list.iter().map(|v| gql_to_value(fd.kind, v)).collect::<Result<_, _>>()?;
				Cond::In {
					column,
					values,
				}
			}
			"isNull" => match v {
				GqlValue::Boolean(null) => Cond::IsNull {
					column,
					null: *null,
				},
				GqlValue::Null => continue,
				_ => return Err(invalid_argument("Value of isNull should be a boolean")),
			},
			"like" => Cond::Compare {
				column,
				op: Operator::Like,
				value: gql_to_value(ScalarKind::Text, v)?,
			},
			op => {
				let op = parse_op(op)?;
				let value = gql_to_value(fd.kind, v)?;
				if value.is_null() && !matches!(op, Operator::Equal | Operator::NotEqual) {
					continue;
				}
				Cond::Compare {
					column,
					op,
					value,
				}
			}
		};
		conds.push(cond);
	}
	Ok(match conds.len() {
		1 => conds.remove(0),
		_ => Cond::And(conds),
	})
}

fn parse_op(name: &str) -> Result<Operator, ResolverError> {
	match name {
		"eq" => Ok(Operator::Equal),
		"ne" => Ok(Operator::NotEqual),
		"gt" => Ok(Operator::MoreThan),
		"gte" => Ok(Operator::MoreThanOrEqual),
		"lt" => Ok(Operator::LessThan),
		"lte" => Ok(Operator::LessThanOrEqual),
		op => Err(invalid_argument(format!("Unsupported op: {op}"))),
	}
}
