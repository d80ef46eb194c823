use std::{
	fs, //
	path::PathBuf,
	process,
};

use crate::{
	error::Error,
	project::{Project, ProjectType},
	toolchain::Toolchain,
};

const COMPILER_OUTPUT_FILENAME: &str = "compiler-output";

/// What a successful build produced.
#[derive(Debug)]
pub struct Artifact {
	pub path: PathBuf,
	pub ty: ProjectType,
}

/// Drives the toolchain to build one project: compile every source file into
/// the intermediate directory, then link or archive the objects.
///
/// Compilation is deliberately not fail-fast: every source file is attempted
/// and the diagnostics of all failures are reported together. Everything is
/// sequential; each tool invocation blocks until the subprocess exits.
pub struct Compiler {
	toolchain: Toolchain,
	work_dir: PathBuf,
}

impl Compiler {
	pub fn new(toolchain: Toolchain) -> Compiler {
		Compiler { toolchain, work_dir: PathBuf::from(crate::SMELT_DIR) }
	}

	/// Redirect intermediate output away from the default `.smelt/`.
	pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Compiler {
		self.work_dir = dir.into();
		self
	}

	pub fn build(&self, project: &Project) -> Result<Artifact, Error> {
		if project.name.is_empty() {
			return Err(Error::MissingField("project name"));
		}
		let ty = project.require_type()?;
		if project.files.is_empty() {
			return Err(Error::MissingField("project files"));
		}

		log::info!("building project {} ({})", project.name, ty.desc());

		if !self.work_dir.exists() {
			if let Err(e) = fs::create_dir_all(&self.work_dir) {
				return Err(Error::Environment(format!(
					"error creating directory \"{}\": {}",
					self.work_dir.display(),
					e
				)));
			}
		}

		let (objects, failed, diagnostics, captured) = self.compile_all(project, ty);

		let capture_path = self.work_dir.join(COMPILER_OUTPUT_FILENAME);
		if let Err(e) = fs::write(&capture_path, &captured) {
			log::warn!("could not write \"{}\": {}", capture_path.display(), e);
		}

		if failed > 0 {
			return Err(Error::CompilationFailed { failed, diagnostics });
		}

		self.link(project, ty, &objects)
	}

	/// Compile every source file in order. A failing file does not stop the
	/// remaining files; successes, the failure count and the concatenated
	/// failure diagnostics are all accumulated.
	fn compile_all(&self, project: &Project, ty: ProjectType) -> (Vec<PathBuf>, usize, String, String) {
		let mut objects = Vec::new();
		let mut failed = 0;
		let mut diagnostics = String::new();
		let mut captured = String::new();

		for file in &project.files {
			let object = self.object_path(file);
			let mut argv = self.toolchain.compiler.clone();
			argv.push("-c".to_owned());
			if ty == ProjectType::SharedLibrary {
				argv.push("-fPIC".to_owned());
			}
			for inc in &project.inc_paths {
				argv.push(format!("-I{}", inc));
			}
			argv.push(file.clone());
			argv.push("-o".to_owned());
			argv.push(object.to_string_lossy().into_owned());

			match run_tool(&argv) {
				Ok((true, output)) => {
					log::debug!("compiled {}", file);
					captured.push_str(&output);
					objects.push(object);
				}
				Ok((false, output)) => {
					log::debug!("failed to compile {}", file);
					captured.push_str(&output);
					failed += 1;
					diagnostics.push_str(&format!("error compiling {}:\n{}\n", file, output));
				}
				Err(msg) => {
					failed += 1;
					diagnostics.push_str(&format!("error compiling {}:\n{}\n", file, msg));
				}
			}
		}

		(objects, failed, diagnostics, captured)
	}

	fn link(&self, project: &Project, ty: ProjectType, objects: &[PathBuf]) -> Result<Artifact, Error> {
		if objects.is_empty() {
			return Err(Error::NoArtifacts);
		}
		let outfile = project.outfile()?;
		let objects = objects.iter().map(|x| x.to_string_lossy().into_owned());

		let mut argv = match ty {
			ProjectType::StaticLibrary => self.toolchain.archiver.clone(),
			ProjectType::Application | ProjectType::SharedLibrary => self.toolchain.linker.clone(),
		};
		match ty {
			ProjectType::Application => {
				argv.extend(objects);
				argv.push("-o".to_owned());
				argv.push(outfile.clone());
			}
			ProjectType::StaticLibrary => {
				argv.push(outfile.clone());
				argv.extend(objects);
			}
			ProjectType::SharedLibrary => {
				argv.push("-shared".to_owned());
				argv.extend(objects);
				argv.push("-o".to_owned());
				argv.push(outfile.clone());
			}
		}
		if ty != ProjectType::StaticLibrary {
			for path in &project.lib_paths {
				argv.push(format!("-L{}", path));
			}
			for lib in &project.libs {
				argv.push(format!("-l{}", lib));
			}
		}

		match run_tool(&argv) {
			Ok((true, _)) => {
				log::info!("built {}", outfile);
				Ok(Artifact { path: PathBuf::from(outfile), ty })
			}
			Ok((false, output)) => Err(Error::LinkFailed(output)),
			Err(msg) => Err(Error::LinkFailed(msg)),
		}
	}

	// Flatten the source path so sources from different directories, or
	// same-stem sources like a.c and a.cpp, cannot collide in the
	// intermediate directory.
	fn object_path(&self, source: &str) -> PathBuf {
		let flat = source.trim_start_matches("./").replace(['/', '\\', '.'], "_");
		self.work_dir.join(flat + ".o")
	}
}

fn run_tool(argv: &[String]) -> Result<(bool, String), String> {
	let exe = match argv.first() {
		Some(x) => x,
		None => return Err("tool command is empty".to_owned()),
	};
	log::debug!("running: {}", argv.join(" "));
	let output = match process::Command::new(exe).args(&argv[1..]).output() {
		Ok(x) => x,
		Err(e) => return Err(format!("error executing \"{}\": {}", argv.join(" "), e)),
	};
	let text = String::from_utf8_lossy(&output.stdout).into_owned() + &String::from_utf8_lossy(&output.stderr);
	Ok((output.status.success(), text))
}
