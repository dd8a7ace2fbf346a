//! # gqlite core
//!
//! This crate turns the structural metadata of a relational database into a
//! ready-to-execute GraphQL schema. The pipeline is:
//!
//! - [`dbs`] introspects the database (tables, columns, foreign keys) and
//!   executes the CRUD requests issued by generated resolvers.
//! - [`catalog`] normalizes that metadata into an immutable [`catalog::EntityModel`]
//!   with inferred one-to-many, many-to-one and many-to-many associations.
//! - [`gql`] walks the entity model and synthesizes object types, query root
//!   fields and mutation root fields, bound to resolvers over a [`dbs::Datastore`].
//!

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod catalog;
pub mod cnf;
pub mod dbs;
pub mod err;
pub mod gql;
