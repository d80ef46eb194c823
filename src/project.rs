use std::{
	fmt, //
	fs,
	path::Path,
};

use crate::{
	block::{self, Cursor},
	error::Error,
	lines,
};

/// What kind of artifact a project produces.
///
/// The DSL keywords are `app`, `lib` and `dll`. An unrecognized keyword is a
/// fatal configuration error, never a silent default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectType {
	Application,
	StaticLibrary,
	SharedLibrary,
}

impl ProjectType {
	pub fn from_keyword(keyword: &str) -> Result<ProjectType, Error> {
		match keyword {
			"app" => Ok(ProjectType::Application),
			"lib" => Ok(ProjectType::StaticLibrary),
			"dll" => Ok(ProjectType::SharedLibrary),
			other => Err(Error::InvalidType(other.to_owned())),
		}
	}

	pub fn keyword(&self) -> &'static str {
		match self {
			ProjectType::Application => "app",
			ProjectType::StaticLibrary => "lib",
			ProjectType::SharedLibrary => "dll",
		}
	}

	/// Default filename suffix for the type: `""`, `".a"` or `".so"`.
	pub fn filename_suffix(&self) -> &'static str {
		match self {
			ProjectType::Application => "",
			ProjectType::StaticLibrary => ".a",
			ProjectType::SharedLibrary => ".so",
		}
	}

	pub fn desc(&self) -> &'static str {
		match self {
			ProjectType::Application => "executable",
			ProjectType::StaticLibrary => "static library",
			ProjectType::SharedLibrary => "shared library",
		}
	}
}

impl fmt::Display for ProjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.keyword())
	}
}

/// One buildable unit: an application or a library, its source files and
/// everything needed to link it.
///
/// All list fields preserve the order they were given in and are owned
/// exclusively by the project. `deps` entries are parsed and stored but not
/// resolved here; consuming them is left to an orchestrator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Project {
	pub name: String,
	pub ty: Option<ProjectType>,
	pub files: Vec<String>,
	pub deps: Vec<String>,
	pub libs: Vec<String>,
	pub inc_paths: Vec<String>,
	pub lib_paths: Vec<String>,
}

const PROJECT_PROPERTIES: [&str; 6] = ["type", "files", "deps", "libs", "inc-paths", "lib-paths"];

impl Project {
	/// Parse a project definition from configuration text.
	pub fn parse(text: &str) -> Result<Project, Error> {
		let lines = lines::normalize(text)?;
		let mut cursor = Cursor::new(&lines);

		let (name, inline_empty) = block::parse_root_decl(&mut cursor, "project")?;
		let mut project = Project { name, ..Project::default() };
		if inline_empty {
			if !cursor.is_empty() {
				return Err(Error::malformed("unexpected tokens after project definition"));
			}
			return Ok(project);
		}

		loop {
			let line = match cursor.peek() {
				Some(x) => x,
				None => return Err(Error::malformed("unexpected end of project definition")),
			};
			let property = line.split_whitespace().next().unwrap_or(line);
			if property == "}" {
				if line != "}" {
					return Err(Error::malformed(format!("unexpected tokens after '}}': '{}'", line)));
				}
				cursor.next();
				if !cursor.is_empty() {
					return Err(Error::malformed("unexpected tokens after final '}' in project definition"));
				}
				return Ok(project);
			}

			if !PROJECT_PROPERTIES.contains(&property) {
				return Err(Error::UnknownProperty(property.to_owned()));
			}
			project
				.parse_property(&mut cursor, property)
				.map_err(|e| e.in_property(property))?;
		}
	}

	fn parse_property(&mut self, cursor: &mut Cursor, property: &str) -> Result<(), Error> {
		if property == "type" {
			return self.parse_type_line(cursor);
		}
		let content = block::parse_unnamed_block(cursor, property)?;
		let list = match property {
			"files" => &mut self.files,
			"deps" => &mut self.deps,
			"libs" => &mut self.libs,
			"inc-paths" => &mut self.inc_paths,
			"lib-paths" => &mut self.lib_paths,
			_ => unreachable!("property keyword checked by caller"),
		};
		list.extend(content);
		Ok(())
	}

	// `type = <app|lib|dll>`, validated immediately
	fn parse_type_line(&mut self, cursor: &mut Cursor) -> Result<(), Error> {
		let line = cursor.next().unwrap_or_default();
		match line.split_whitespace().collect::<Vec<&str>>().as_slice() {
			["type", "=", value] => {
				self.ty = Some(ProjectType::from_keyword(value)?);
				Ok(())
			}
			_ => Err(Error::malformed(format!("expected 'type = <app|lib|dll>', found '{}'", line))),
		}
	}

	/// The filename the build will produce: the bare name for an application,
	/// `lib<name>.a` / `lib<name>.so` for libraries.
	pub fn outfile(&self) -> Result<String, Error> {
		if self.name.is_empty() {
			return Err(Error::MissingField("project name"));
		}
		let ty = self.ty.ok_or(Error::MissingField("project type"))?;
		let prefix = match ty {
			ProjectType::Application => "",
			ProjectType::StaticLibrary | ProjectType::SharedLibrary => "lib",
		};
		Ok(format!("{}{}{}", prefix, self.name, ty.filename_suffix()))
	}

	pub(crate) fn require_type(&self) -> Result<ProjectType, Error> {
		self.ty.ok_or(Error::MissingField("project type"))
	}

	/// Render the project in the canonical file format. Comments present in
	/// parsed input are not round-tripped; the fixed explanatory comments
	/// below are emitted instead.
	pub fn serialize(&self) -> Result<String, Error> {
		if self.name.is_empty() {
			return Err(Error::MissingField("project name"));
		}
		let ty = self.require_type()?;
		if self.files.is_empty() {
			return Err(Error::MissingField("project files"));
		}

		let mut out = String::new();
		out.push_str(&format!("project {} {{\n", self.name));
		out.push_str("  # The project type determines what kind of file is built, as well as its\n");
		out.push_str("  # name. A project named 'foo' produces one of:\n");
		out.push_str("  #   app -> an executable named foo\n");
		out.push_str("  #   lib -> a static library named libfoo.a\n");
		out.push_str("  #   dll -> a shared library named libfoo.so\n");
		out.push_str(&format!("  type = {}\n", ty.keyword()));
		push_list_block(&mut out, "Source files compiled into this project", "files", &self.files);
		push_list_block(&mut out, "Other projects this project depends on", "deps", &self.deps);
		push_list_block(&mut out, "Third-party libraries to link against", "libs", &self.libs);
		push_list_block(&mut out, "Search paths for included headers", "inc-paths", &self.inc_paths);
		push_list_block(&mut out, "Search paths for third-party libraries", "lib-paths", &self.lib_paths);
		out.push_str("}\n");
		Ok(out)
	}

	pub fn from_file(path: &Path) -> Result<Project, Error> {
		let text = fs::read_to_string(path)
			.map_err(|e| Error::Environment(format!("error reading {}: {}", path.display(), e)))?;
		Project::parse(&text)
	}

	pub fn to_file(&self, path: &Path) -> Result<(), Error> {
		let text = self.serialize()?;
		fs::write(path, text).map_err(|e| Error::Environment(format!("error writing {}: {}", path.display(), e)))
	}
}

fn push_list_block(out: &mut String, comment: &str, keyword: &str, entries: &[String]) {
	out.push('\n');
	out.push_str(&format!("  # {}\n", comment));
	out.push_str(&format!("  {} {{\n", keyword));
	for entry in entries {
		out.push_str(&format!("    {}\n", entry));
	}
	out.push_str("  }\n");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn type_keywords() {
		assert_eq!(ProjectType::from_keyword("app").unwrap(), ProjectType::Application);
		assert_eq!(ProjectType::from_keyword("lib").unwrap(), ProjectType::StaticLibrary);
		assert_eq!(ProjectType::from_keyword("dll").unwrap(), ProjectType::SharedLibrary);
		assert!(matches!(ProjectType::from_keyword("exe"), Err(Error::InvalidType(_))));
	}

	#[test]
	fn type_suffixes() {
		assert_eq!(ProjectType::Application.filename_suffix(), "");
		assert_eq!(ProjectType::StaticLibrary.filename_suffix(), ".a");
		assert_eq!(ProjectType::SharedLibrary.filename_suffix(), ".so");
	}

	#[test]
	fn type_descriptions() {
		assert_eq!(ProjectType::Application.desc(), "executable");
		assert_eq!(ProjectType::StaticLibrary.desc(), "static library");
		assert_eq!(ProjectType::SharedLibrary.desc(), "shared library");
	}

	#[test]
	fn outfile_by_type() {
		let mut project = Project { name: "demo".to_owned(), ty: Some(ProjectType::Application), ..Project::default() };
		assert_eq!(project.outfile().unwrap(), "demo");
		project.ty = Some(ProjectType::StaticLibrary);
		assert_eq!(project.outfile().unwrap(), "libdemo.a");
		project.ty = Some(ProjectType::SharedLibrary);
		assert_eq!(project.outfile().unwrap(), "libdemo.so");
	}

	#[test]
	fn outfile_requires_type() {
		let project = Project { name: "demo".to_owned(), ..Project::default() };
		assert!(matches!(project.outfile(), Err(Error::MissingField("project type"))));
	}

	#[test]
	fn serialize_requires_fields() {
		let mut project = Project::default();
		assert!(matches!(project.serialize(), Err(Error::MissingField("project name"))));
		project.name = "demo".to_owned();
		assert!(matches!(project.serialize(), Err(Error::MissingField("project type"))));
		project.ty = Some(ProjectType::Application);
		assert!(matches!(project.serialize(), Err(Error::MissingField("project files"))));
	}

	#[test]
	fn unknown_property_fails() {
		let text = "project demo {\n  type = app\n  sources { a.cpp }\n}\n";
		match Project::parse(text) {
			Err(Error::UnknownProperty(p)) => assert_eq!(p, "sources"),
			other => panic!("expected UnknownProperty, got {:?}", other),
		}
	}

	#[test]
	fn property_errors_carry_property_name() {
		let text = "project demo {\n  type = napp\n}\n";
		match Project::parse(text) {
			Err(e @ Error::Property { .. }) => {
				assert_eq!(e.to_string(), "error parsing property 'type': invalid project type 'napp'");
			}
			other => panic!("expected Property error, got {:?}", other),
		}
	}

	#[test]
	fn missing_root_closer_fails() {
		let text = "project demo {\n  type = app\n";
		assert!(matches!(Project::parse(text), Err(Error::MalformedBlock(_))));
	}

	#[test]
	fn trailing_tokens_after_closer_fail() {
		let text = "project demo {\n  type = app\n}\nextra\n";
		assert!(matches!(Project::parse(text), Err(Error::MalformedBlock(_))));
	}

	#[test]
	fn explicit_empty_blocks_parse_to_empty_lists() {
		let text = "project demo {\n  type = app\n  files { a.cpp }\n  libs {}\n  deps { }\n}\n";
		let project = Project::parse(text).unwrap();
		assert_eq!(project.files, vec!["a.cpp"]);
		assert!(project.libs.is_empty());
		assert!(project.deps.is_empty());
	}
}
