use std::env::consts::{ARCH, OS};

use crate::cnf::{PKG_NAME, PKG_VERSION};
use crate::err::Error;

fn release() -> String {
	format!("{PKG_NAME} {PKG_VERSION} for {OS} on {ARCH}")
}

pub fn init() -> Result<(), Error> {
	println!("{}", release());
	Ok(())
}
