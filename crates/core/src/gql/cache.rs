use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tokio::sync::RwLock;

use super::hooks::Resolvers;
use super::schema::build_schema;
use crate::dbs::Datastore;
use crate::err::Error;

#[async_trait::async_trait]
pub trait Invalidator: Debug + Clone + Send + Sync + 'static {
	type MetaData: Debug + Clone + Send + Sync;

	fn is_valid(datastore: &dyn Datastore, meta: &Self::MetaData) -> bool;

	async fn generate(
		datastore: &Arc<dyn Datastore>,
		resolvers: &Resolvers,
	) -> Result<(Schema, Self::MetaData), Error>;
}

/// Rebuilds the schema for every request.
#[derive(Debug, Clone, Copy)]
pub struct Pessimistic;

#[async_trait::async_trait]
impl Invalidator for Pessimistic {
	type MetaData = ();

	fn is_valid(_datastore: &dyn Datastore, _meta: &Self::MetaData) -> bool {
		false
	}

	async fn generate(
		datastore: &Arc<dyn Datastore>,
		resolvers: &Resolvers,
	) -> Result<(Schema, Self::MetaData), Error> {
		let schema = build_schema(datastore.clone(), resolvers).await?;
		Ok((schema, ()))
	}
}

/// Keeps a built schema until the cache is invalidated.
#[derive(Debug, Clone, Copy)]
pub struct Optimistic;

#[async_trait::async_trait]
impl Invalidator for Optimistic {
	type MetaData = ();

	fn is_valid(_datastore: &dyn Datastore, _meta: &Self::MetaData) -> bool {
		true
	}

	async fn generate(
		datastore: &Arc<dyn Datastore>,
		resolvers: &Resolvers,
	) -> Result<(Schema, Self::MetaData), Error> {
		let schema = build_schema(datastore.clone(), resolvers).await?;
		Ok((schema, ()))
	}
}

/// Generated schemas keyed by the identity of their source database.
#[derive(Clone)]
pub struct SchemaCache<I: Invalidator = Pessimistic> {
	inner: Arc<RwLock<BTreeMap<String, (Schema, I::MetaData)>>>,
	pub datastore: Arc<dyn Datastore>,
	resolvers: Resolvers,
	_invalidator: PhantomData<I>,
}

impl<I: Invalidator + Debug> Debug for SchemaCache<I> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaCache")
			.field("datastore", &self.datastore.id())
			.field("resolvers", &self.resolvers)
			.field("_invalidator", &self._invalidator)
			.finish()
	}
}

impl<I: Invalidator> SchemaCache<I> {
	pub fn new(datastore: Arc<dyn Datastore>) -> Self {
		Self::with_resolvers(datastore, Resolvers::default())
	}

	pub fn with_resolvers(datastore: Arc<dyn Datastore>, resolvers: Resolvers) -> Self {
		SchemaCache {
			inner: Default::default(),
			datastore,
			resolvers,
			_invalidator: PhantomData,
		}
	}

	pub async fn get_schema(&self) -> Result<Schema, Error> {
		let id = self.datastore.id();
		{
			let guard = self.inner.read().await;
			if let Some(cand) = guard.get(id) {
				if I::is_valid(self.datastore.as_ref(), &cand.1) {
					return Ok(cand.0.clone());
				}
			}
		};

		debug!("Generating schema for {id}");
		let (schema, meta) = I::generate(&self.datastore, &self.resolvers).await?;

		{
			let mut guard = self.inner.write().await;
			guard.insert(id.to_owned(), (schema.clone(), meta));
		}

		Ok(schema)
	}

	/// Drops the cached schema, so that the next request rebuilds it
	pub async fn invalidate(&self) {
		let mut guard = self.inner.write().await;
		if guard.remove(self.datastore.id()).is_some() {
			debug!("Invalidated schema for {}", self.datastore.id());
		}
	}
}
