use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use gqlite_core::dbs::{Datastore, SqliteDatastore};

use crate::err::Error;

/// Where the served database comes from
#[derive(Args, Debug)]
pub(crate) struct SourceArguments {
	#[arg(help = "Path to the SQLite database file to serve")]
	#[arg(env = "GQLITE_DB", long = "db", default_value = "database.sqlite")]
	#[arg(conflicts_with = "infile")]
	pub(crate) db: PathBuf,
	#[arg(help = "Path to a file of SQL statements, executed against an in-memory database")]
	#[arg(env = "GQLITE_INFILE", long = "infile")]
	pub(crate) infile: Option<PathBuf>,
}

impl SourceArguments {
	pub(crate) async fn open(&self) -> Result<Arc<dyn Datastore>, Error> {
		let ds = match &self.infile {
			Some(path) => {
				info!("Loading SQL statements from {} into memory", path.display());
				SqliteDatastore::from_infile(path).await?
			}
			None => {
				info!("Opening database file {}", self.db.display());
				SqliteDatastore::open(&self.db).await?
			}
		};
		Ok(Arc::new(ds))
	}
}
