use std::sync::LazyLock;

/// The maximum number of tables introspected concurrently while a schema is built
pub static INTROSPECTION_CONCURRENCY: LazyLock<usize> =
	lazy_env_parse!("GQLITE_INTROSPECTION_CONCURRENCY", usize, 8);

/// The maximum depth of a GraphQL query accepted by a generated schema
pub static MAX_QUERY_DEPTH: LazyLock<usize> = lazy_env_parse!("GQLITE_MAX_QUERY_DEPTH", usize, 16);

/// The maximum complexity of a GraphQL query accepted by a generated schema
pub static MAX_QUERY_COMPLEXITY: LazyLock<usize> =
	lazy_env_parse!("GQLITE_MAX_QUERY_COMPLEXITY", usize, 1000);
