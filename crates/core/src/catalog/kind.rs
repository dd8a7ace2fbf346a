use std::fmt;

/// The canonical value category a column maps to, independent of the way
/// the source database spells its declared type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ScalarKind {
	Integer,
	Text,
	Real,
	Numeric,
	Boolean,
	Binary,
}

impl fmt::Display for ScalarKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Integer => f.write_str("integer"),
			Self::Text => f.write_str("text"),
			Self::Real => f.write_str("real"),
			Self::Numeric => f.write_str("numeric"),
			Self::Boolean => f.write_str("boolean"),
			Self::Binary => f.write_str("binary"),
		}
	}
}

/// Maps a declared column type onto a [`ScalarKind`].
///
/// Matching is case-insensitive and the checks run in a fixed order: the
/// integer check comes first so that no numeric family check can claim an
/// integer type, and anything unrecognised is treated as binary.
pub fn map_type(declared: &str) -> ScalarKind {
	let declared = declared.trim().to_lowercase();
	match declared.as_str() {
		v if v.contains("int") => ScalarKind::Integer,
		v if v.contains("char") || v == "clob" || v == "text" => ScalarKind::Text,
		v if v.contains("double") || v == "real" || v == "float" => ScalarKind::Real,
		v if v.contains("decimal") || v.contains("numeric") || v == "date" || v == "datetime" => {
			ScalarKind::Numeric
		}
		"boolean" => ScalarKind::Boolean,
		_ => ScalarKind::Binary,
	}
}
