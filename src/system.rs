use std::{
	fs, //
	path::Path,
};

use crate::{
	block::{self, Cursor},
	error::Error,
	lines,
};

/// A named group of projects to build together. The projects are referenced
/// by name only; nothing guarantees a referenced project exists.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Build {
	pub name: String,
	pub projects: Vec<String>,
}

/// A named collection of builds, defined in a `.sys`-style file.
///
/// Builds are keyed by name. Insertion order is preserved for serialization;
/// inserting a build under an existing name replaces that entry in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct System {
	pub name: String,
	builds: Vec<Build>,
}

impl System {
	pub fn new(name: impl Into<String>) -> System {
		System { name: name.into(), builds: Vec::new() }
	}

	pub fn builds(&self) -> impl Iterator<Item = &Build> {
		self.builds.iter()
	}

	pub fn get(&self, name: &str) -> Option<&Build> {
		self.builds.iter().find(|b| b.name == name)
	}

	pub fn insert(&mut self, build: Build) {
		match self.builds.iter_mut().find(|b| b.name == build.name) {
			Some(existing) => *existing = build,
			None => self.builds.push(build),
		}
	}

	/// Parse a system definition from configuration text.
	pub fn parse(text: &str) -> Result<System, Error> {
		let lines = lines::normalize(text)?;
		let mut cursor = Cursor::new(&lines);

		let (name, inline_empty) = block::parse_root_decl(&mut cursor, "system")?;
		let mut system = System::new(name);
		if inline_empty {
			if !cursor.is_empty() {
				return Err(Error::malformed("unexpected tokens after system definition"));
			}
			return Ok(system);
		}

		loop {
			let line = match cursor.peek() {
				Some(x) => x,
				None => return Err(Error::malformed("unexpected end of system definition")),
			};
			let property = line.split_whitespace().next().unwrap_or(line);
			if property == "}" {
				if line != "}" {
					return Err(Error::malformed(format!("unexpected tokens after '}}': '{}'", line)));
				}
				cursor.next();
				if !cursor.is_empty() {
					return Err(Error::malformed("unexpected tokens after final '}' in system definition"));
				}
				return Ok(system);
			}

			match property {
				"build" => {
					let (name, projects) =
						block::parse_named_block(&mut cursor, "build").map_err(|e| e.in_property("build"))?;
					system.insert(Build { name, projects });
				}
				other => return Err(Error::UnknownProperty(other.to_owned())),
			}
		}
	}

	/// Render the system in the canonical file format.
	pub fn serialize(&self) -> Result<String, Error> {
		if self.name.is_empty() {
			return Err(Error::MissingField("system name"));
		}
		let mut out = String::new();
		out.push_str("# A system is made up of builds, each naming the projects it contains\n");
		out.push_str(&format!("system {} {{\n", self.name));
		for build in &self.builds {
			out.push_str(&format!("  build {} {{\n", build.name));
			for project in &build.projects {
				out.push_str(&format!("    {}\n", project));
			}
			out.push_str("  }\n");
		}
		out.push_str("}\n");
		Ok(out)
	}

	pub fn from_file(path: &Path) -> Result<System, Error> {
		let text = fs::read_to_string(path)
			.map_err(|e| Error::Environment(format!("error reading {}: {}", path.display(), e)))?;
		System::parse(&text)
	}

	pub fn to_file(&self, path: &Path) -> Result<(), Error> {
		let text = self.serialize()?;
		fs::write(path, text).map_err(|e| Error::Environment(format!("error writing {}: {}", path.display(), e)))
	}
}
