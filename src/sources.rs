use std::path::Path;

use crate::error::Error;

const SOURCE_EXTENSIONS: [&str; 5] = ["c", "cc", "cpp", "cxx", "c++"];

pub(crate) fn is_source_file(filename: &str) -> bool {
	match filename.rsplit_once('.') {
		Some((stem, ext)) => !stem.is_empty() && SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
		None => false,
	}
}

/// All C/C++ source files under `dir`, as `dir/name` strings, sorted and
/// deduplicated. A directory that does not exist yields an empty list.
pub fn source_files_in_dir(dir: &str, recurse: bool) -> Result<Vec<String>, Error> {
	let mut output = Vec::new();
	if Path::new(dir).is_dir() {
		collect_source_files(dir, recurse, &mut output)?;
		output.sort();
		output.dedup();
	}
	Ok(output)
}

/// Source files in the current directory, without recursing.
pub fn source_files() -> Result<Vec<String>, Error> {
	source_files_in_dir(".", false)
}

fn collect_source_files(dir: &str, recurse: bool, output: &mut Vec<String>) -> Result<(), Error> {
	let entries = std::fs::read_dir(dir)
		.map_err(|e| Error::Environment(format!("error reading directory \"{}\": {}", dir, e)))?;
	for entry in entries {
		let entry = entry.map_err(|e| Error::Environment(format!("error reading directory \"{}\": {}", dir, e)))?;
		let name = entry.file_name().to_string_lossy().into_owned();
		let path = format!("{}/{}", dir.trim_end_matches('/'), name);
		if entry.path().is_dir() {
			if recurse {
				collect_source_files(&path, recurse, output)?;
			}
		} else if is_source_file(&name) {
			output.push(path);
		}
	}
	Ok(())
}
