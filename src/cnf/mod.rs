pub const LOGO: &str = "
             _ _ _
  __ _  __ _| (_) |_ ___
 / _` |/ _` | | | __/ _ \\
| (_| | (_| | | | ||  __/
 \\__, |\\__, |_|_|\\__\\___|
 |___/    |_|
";

/// The publicly visible name of the server
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// The version of the server
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The path which generated GraphQL schemas are served on
pub const GRAPHQL_PATH: &str = "/graphql";

/// The log level used when none is specified
pub const DEFAULT_LOG_LEVEL: &str = "info";
