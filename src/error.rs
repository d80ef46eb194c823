use thiserror::Error;

/// Failures surfaced by parsing, validation and the build pipeline.
///
/// The library never exits the process; every failure is returned to the
/// caller carrying a complete human-readable message. Compilation failures
/// are aggregated across all source files; everything else is fail-fast.
#[derive(Error, Debug)]
pub enum Error {
	#[error("configuration is empty")]
	EmptyDocument,

	#[error("{0}")]
	MalformedBlock(String),

	#[error("unknown property '{0}'")]
	UnknownProperty(String),

	#[error("error parsing property '{name}': {source}")]
	Property { name: String, source: Box<Error> },

	#[error("missing {0}")]
	MissingField(&'static str),

	#[error("invalid project type '{0}'")]
	InvalidType(String),

	#[error("{0}")]
	Environment(String),

	#[error("{failed} file(s) failed to compile:\n{diagnostics}")]
	CompilationFailed { failed: usize, diagnostics: String },

	#[error("link failed: {0}")]
	LinkFailed(String),

	#[error("no object files to link")]
	NoArtifacts,
}

impl Error {
	pub(crate) fn malformed(msg: impl Into<String>) -> Error {
		Error::MalformedBlock(msg.into())
	}

	pub(crate) fn in_property(self, name: &str) -> Error {
		Error::Property { name: name.to_owned(), source: Box::new(self) }
	}
}
