use std::{
	fs, //
	path::Path,
};

use serde::Deserialize;

use crate::error::Error;

/// Optional `toolchain.toml` next to the project file. Any field left out
/// falls back to the default tool.
#[derive(Debug, Deserialize)]
pub struct ToolchainFile {
	compiler: Option<Vec<String>>,
	archiver: Option<Vec<String>>,
	linker: Option<Vec<String>>,
}

/// Commands for the external tools the pipeline invokes. Each command is the
/// argv prefix the tool-specific arguments are appended to.
#[derive(Debug, Clone)]
pub struct Toolchain {
	pub compiler: Vec<String>,
	pub archiver: Vec<String>,
	pub linker: Vec<String>,
}

impl Default for Toolchain {
	fn default() -> Toolchain {
		Toolchain {
			compiler: vec!["g++".to_owned()],
			archiver: vec!["ar".to_owned(), "crs".to_owned()],
			linker: vec!["g++".to_owned()],
		}
	}
}

pub fn read_toolchain(toolchain_path: &Path) -> Result<Toolchain, Error> {
	let toolchain_toml = match fs::read_to_string(toolchain_path) {
		Ok(x) => x,
		Err(e) => {
			return Err(Error::Environment(format!(
				"error opening toolchain file \"{}\": {}",
				toolchain_path.display(),
				e
			)))
		}
	};

	let toolchain_file = match toml::from_str::<ToolchainFile>(&toolchain_toml) {
		Ok(x) => x,
		Err(e) => {
			return Err(Error::Environment(format!(
				"error reading toolchain file \"{}\": {}",
				toolchain_path.display(),
				e
			)))
		}
	};

	let defaults = Toolchain::default();
	let toolchain = Toolchain {
		compiler: toolchain_file.compiler.unwrap_or(defaults.compiler),
		archiver: toolchain_file.archiver.unwrap_or(defaults.archiver),
		linker: toolchain_file.linker.unwrap_or(defaults.linker),
	};

	for (tool, cmd) in [
		("compiler", &toolchain.compiler),
		("archiver", &toolchain.archiver),
		("linker", &toolchain.linker),
	] {
		if cmd.is_empty() {
			return Err(Error::Environment(format!(
				"toolchain file \"{}\": {} command is empty",
				toolchain_path.display(),
				tool
			)));
		}
	}

	log::debug!("compiler: {}", toolchain.compiler.join(" "));
	log::debug!("archiver: {}", toolchain.archiver.join(" "));
	log::debug!("  linker: {}", toolchain.linker.join(" "));

	Ok(toolchain)
}

/// Load the toolchain for the current directory. A missing file is not an
/// error; the defaults are used.
pub fn load(toolchain_path: &Path) -> Result<Toolchain, Error> {
	if toolchain_path.exists() {
		read_toolchain(toolchain_path)
	} else {
		Ok(Toolchain::default())
	}
}
