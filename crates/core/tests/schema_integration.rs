#![allow(clippy::unwrap_used)]

mod schema_integration {
	use std::collections::HashSet;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use async_graphql::dynamic::{FieldValue, Schema};
	use async_graphql::{Request, Variables};
	use futures::FutureExt;
	use gqlite_core::dbs::SqliteDatastore;
	use gqlite_core::err::Error;
	use gqlite_core::gql::{
		Resolver, Resolvers, SchemaError, build_schema, build_schema_from_database,
		build_schema_from_statements, resolver,
	};
	use serde_json::{Value, json};
	use test_log::test;

	const BLOG: &str = "
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE posts (
	id INTEGER PRIMARY KEY,
	title TEXT NOT NULL,
	user_id INTEGER REFERENCES users(id)
);
CREATE TABLE categories (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE category_post (category_id INTEGER NOT NULL, post_id INTEGER NOT NULL);
INSERT INTO users (id, name) VALUES (1, 'Ada'), (2, 'Grace');
INSERT INTO posts (id, title, user_id) VALUES (1, 'Notes on Rust', 1), (2, 'Compilers', 2), (3, 'Rust again', 1);
INSERT INTO categories (id, name) VALUES (1, 'Languages'), (2, 'History');
INSERT INTO category_post (category_id, post_id) VALUES (1, 1), (1, 3), (2, 2);
";

	async fn blog(resolvers: &Resolvers) -> Schema {
		build_schema_from_statements(BLOG, resolvers).await.unwrap()
	}

	async fn run(schema: &Schema, query: &str) -> Value {
		let res = schema.execute(query).await;
		serde_json::to_value(&res).unwrap()
	}

	fn error_code(body: &Value) -> &str {
		body["errors"][0]["extensions"]["code"].as_str().unwrap_or_default()
	}

	fn names(body: &Value, root: &str) -> HashSet<String> {
		body["data"]["__schema"][root]["fields"]
			.as_array()
			.unwrap()
			.iter()
			.map(|f| f["name"].as_str().unwrap().to_owned())
			.collect()
	}

	#[test(tokio::test)]
	async fn root_fields() -> Result<(), Box<dyn std::error::Error>> {
		let schema = blog(&Resolvers::default()).await;
		let body = run(
			&schema,
			"{ __schema { queryType { fields { name } } mutationType { fields { name } } } }",
		)
		.await;
		let queries = names(&body, "queryType");
		let expected: HashSet<String> = ["users", "user", "posts", "post", "categories", "category"]
			.into_iter()
			.map(String::from)
			.collect();
		assert_eq!(queries, expected);

		let mutations = names(&body, "mutationType");
		for name in [
			"createUser",
			"createUsers",
			"updateUser",
			"deleteUser",
			"deleteUsers",
			"createPost",
			"createPosts",
			"updatePost",
			"deletePost",
			"deletePosts",
			"addPostToCategory",
			"removePostFromCategory",
			"addCategoryToPost",
			"removeCategoryFromPost",
		] {
			assert!(mutations.contains(name), "missing mutation {name}");
		}
		assert!(!mutations.iter().any(|m| m.contains("CategoryPost")));
		Ok(())
	}

	#[test(tokio::test)]
	async fn relationships() -> Result<(), Box<dyn std::error::Error>> {
		let schema = blog(&Resolvers::default()).await;
		// Belongs to, and many to many
		{
			let body = run(
				&schema,
				"{ post(id: 1) { title user { name } categories { name } } }",
			)
			.await;
			assert_eq!(
				body,
				json!({ "data": { "post": {
					"title": "Notes on Rust",
					"user": { "name": "Ada" },
					"categories": [{ "name": "Languages" }],
				}}})
			);
		}
		// Has many, with list arguments
		{
			let body = run(
				&schema,
				"{ users(order: { asc: id }) { name posts(order: { desc: id }, limit: 1) { title } } }",
			)
			.await;
			assert_eq!(
				body,
				json!({ "data": { "users": [
					{ "name": "Ada", "posts": [{ "title": "Rust again" }] },
					{ "name": "Grace", "posts": [{ "title": "Compilers" }] },
				]}})
			);
		}
		// Many to many from the other side
		{
			let body = run(&schema, "{ category(id: 1) { posts(order: { asc: title }) { title } } }").await;
			assert_eq!(
				body,
				json!({ "data": { "category": { "posts": [
					{ "title": "Notes on Rust" },
					{ "title": "Rust again" },
				]}}})
			);
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn list_arguments() -> Result<(), Box<dyn std::error::Error>> {
		let schema = blog(&Resolvers::default()).await;
		{
			let body = run(
				&schema,
				r#"{ posts(filter: { title: { like: "%Rust%" } }, order: { desc: id }) { id } }"#,
			)
			.await;
			assert_eq!(body, json!({ "data": { "posts": [{ "id": 3 }, { "id": 1 }] } }));
		}
		{
			let body = run(
				&schema,
				"{ posts(filter: { or: [{ id: { eq: 2 } }, { userId: { in: [1] } }], not: { id: { gte: 3 } } }) { id } }",
			)
			.await;
			assert_eq!(body, json!({ "data": { "posts": [{ "id": 1 }, { "id": 2 }] } }));
		}
		{
			let req = Request::new("query($o: _order_Post) { posts(order: $o) { id } }")
				.variables(Variables::from_json(json!({ "o": { "desc": "id" } })));
			let body = serde_json::to_value(schema.execute(req).await)?;
			assert_eq!(body, json!({ "data": { "posts": [{ "id": 3 }, { "id": 2 }, { "id": 1 }] } }));
		}
		{
			let body = run(&schema, "{ posts(start: 1, limit: 1) { id } }").await;
			assert_eq!(body, json!({ "data": { "posts": [{ "id": 2 }] } }));
		}
		{
			let body = run(&schema, "{ user(id: 42) { name } }").await;
			assert_eq!(body, json!({ "data": { "user": null } }));
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn mutations() -> Result<(), Box<dyn std::error::Error>> {
		let schema = blog(&Resolvers::default()).await;
		{
			let body = run(&schema, r#"mutation { createUser(name: "Linus") { id name } }"#).await;
			assert_eq!(body, json!({ "data": { "createUser": { "id": 3, "name": "Linus" } } }));
		}
		{
			let body = run(&schema, r#"mutation { updateUser(id: 3, name: "Barbara") { name posts { id } } }"#).await;
			assert_eq!(body, json!({ "data": { "updateUser": { "name": "Barbara", "posts": [] } } }));
		}
		{
			let body = run(&schema, "mutation { updateUser(id: 3) { name } }").await;
			assert_eq!(body, json!({ "data": { "updateUser": { "name": "Barbara" } } }));
		}
		{
			let body = run(&schema, r#"mutation { updateUser(id: 99, name: "Nobody") { name } }"#).await;
			assert_eq!(body["data"]["updateUser"], Value::Null);
			assert_eq!(error_code(&body), "NOT_FOUND");
		}
		{
			let body = run(&schema, "mutation { deleteUser(id: 3) { success } }").await;
			assert_eq!(body, json!({ "data": { "deleteUser": { "success": true } } }));
			let body = run(&schema, "mutation { deleteUser(id: 3) { success } }").await;
			assert_eq!(error_code(&body), "NOT_FOUND");
		}
		{
			let body = run(
				&schema,
				r#"mutation { createPosts(input: [{ title: "Draft", userId: 2 }, { title: "Orphan" }]) { id user { name } } }"#,
			)
			.await;
			assert_eq!(
				body,
				json!({ "data": { "createPosts": [
					{ "id": 4, "user": { "name": "Grace" } },
					{ "id": 5, "user": null },
				]}})
			);
		}
		{
			let body = run(&schema, "mutation { deletePosts(filter: { userId: { isNull: true } }) { success } }").await;
			assert_eq!(body, json!({ "data": { "deletePosts": { "success": true } } }));
			let body = run(&schema, "mutation { deletePosts(filter: { userId: { isNull: true } }) { success } }").await;
			assert_eq!(error_code(&body), "NOT_FOUND");
		}
		{
			let body = run(&schema, r#"mutation { createPosts(input: [{ title: "Ok" }, { userId: 1 }]) { id } }"#).await;
			assert!(body["errors"].is_array(), "body: {body}");
			let body = run(&schema, "{ posts { id } }").await;
			assert_eq!(body["data"]["posts"].as_array().map(Vec::len), Some(4));
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn link_mutations() -> Result<(), Box<dyn std::error::Error>> {
		let schema = blog(&Resolvers::default()).await;
		{
			let body = run(&schema, "mutation { addPostToCategory(id: 2, categoryId: 1) { success } }").await;
			assert_eq!(body, json!({ "data": { "addPostToCategory": { "success": true } } }));
			let body = run(&schema, "{ post(id: 2) { categories(order: { asc: id }) { id } } }").await;
			assert_eq!(body, json!({ "data": { "post": { "categories": [{ "id": 1 }, { "id": 2 }] } } }));
		}
		{
			let body = run(&schema, "mutation { addPostToCategory(id: 99, categoryId: 1) { success } }").await;
			assert_eq!(error_code(&body), "NOT_FOUND");
		}
		{
			let body = run(&schema, "mutation { removeCategoryFromPost(id: 1, postId: 2) { success } }").await;
			assert_eq!(body, json!({ "data": { "removeCategoryFromPost": { "success": true } } }));
			let body = run(&schema, "mutation { removeCategoryFromPost(id: 1, postId: 2) { success } }").await;
			assert_eq!(error_code(&body), "NOT_FOUND");
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn scalar_kinds() -> Result<(), Box<dyn std::error::Error>> {
		let schema = build_schema_from_statements(
			"CREATE TABLE products (sku TEXT PRIMARY KEY, price DECIMAL(10,2), active BOOLEAN NOT NULL DEFAULT 1, image BLOB);
INSERT INTO products (sku, price, image) VALUES ('a', 9.5, X'6869');",
			&Resolvers::default(),
		)
		.await?;
		{
			let body = run(&schema, "{ products { sku price active image } }").await;
			assert_eq!(
				body,
				json!({ "data": { "products": [
					{ "sku": "a", "price": 9.5, "active": true, "image": "aGk=" },
				]}})
			);
		}
		{
			let body = run(&schema, r#"mutation { createProduct(sku: "b", active: false) { sku active price } }"#).await;
			assert_eq!(
				body,
				json!({ "data": { "createProduct": { "sku": "b", "active": false, "price": null } } })
			);
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn resolver_wrappers() -> Result<(), Box<dyn std::error::Error>> {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let resolvers = Resolvers::new()
			.query("users", move |next: Resolver| {
				let counter = counter.clone();
				resolver(move |ctx| {
					let next = next.clone();
					counter.fetch_add(1, Ordering::SeqCst);
					async move { next(ctx).await }.boxed()
				})
			})
			.mutation("deleteUser", |_: Resolver| {
				resolver(|_| {
					async { Err::<Option<FieldValue>, _>(async_graphql::Error::new("forbidden")) }.boxed()
				})
			})
			.query("missing", |next| next);
		let schema = blog(&resolvers).await;
		{
			let body = run(&schema, "{ users { name } }").await;
			assert_eq!(body["data"]["users"].as_array().map(Vec::len), Some(2));
			let body = run(&schema, "{ posts { id } }").await;
			assert!(body["errors"].is_null());
			assert_eq!(calls.load(Ordering::SeqCst), 1);
		}
		{
			let body = run(&schema, "mutation { deleteUser(id: 1) { success } }").await;
			assert_eq!(body["errors"][0]["message"], "forbidden");
			let body = run(&schema, "{ user(id: 1) { name } }").await;
			assert_eq!(body, json!({ "data": { "user": { "name": "Ada" } } }));
		}
		Ok(())
	}

	#[test(tokio::test)]
	async fn build_errors() {
		let err = build_schema_from_statements("CREATE TABLE logs (message TEXT);", &Resolvers::default())
			.await
			.unwrap_err();
		assert!(matches!(err, Error::Schema(SchemaError::NoPrimaryKey { ref table }) if table == "logs"));

		let err = build_schema_from_statements(
			"CREATE TABLE user (id INTEGER PRIMARY KEY);\nCREATE TABLE users (id INTEGER PRIMARY KEY);",
			&Resolvers::default(),
		)
		.await
		.unwrap_err();
		assert!(matches!(err, Error::Schema(SchemaError::DuplicateField { .. })), "{err}");

		let err = build_schema_from_statements("", &Resolvers::default()).await.unwrap_err();
		assert!(matches!(err, Error::Schema(SchemaError::NoTables)));

		let err = build_schema_from_statements(
			"CREATE TABLE pairs (a INTEGER, b INTEGER, PRIMARY KEY (a, b));",
			&Resolvers::default(),
		)
		.await
		.unwrap_err();
		assert!(matches!(err, Error::Schema(SchemaError::CompositePrimaryKey { .. })));
	}

	#[test(tokio::test)]
	async fn database_files() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("blog.sqlite");
		std::fs::File::create(&path)?;
		SqliteDatastore::open(&path).await?.execute_batch(BLOG).await?;

		let schema = build_schema_from_database(&path, &Resolvers::default()).await?;
		let body = run(&schema, "{ posts(filter: { userId: { eq: 2 } }) { title user { name } } }").await;
		assert_eq!(
			body,
			json!({ "data": { "posts": [{ "title": "Compilers", "user": { "name": "Grace" } }] } })
		);

		let missing = build_schema_from_database(dir.path().join("missing.sqlite"), &Resolvers::default()).await;
		assert!(matches!(missing, Err(Error::Io { .. })));

		let ds = Arc::new(SqliteDatastore::open(&path).await?);
		let schema = build_schema(ds, &Resolvers::default()).await?;
		assert!(schema.sdl().contains("type Category"));
		Ok(())
	}
}
