use std::{
	fs, //
	path::Path,
};

use anyhow::bail;
use getopts::Options;

use crate::{
	compiler::Compiler,
	error::Error,
	project::{Project, ProjectType},
	sources,
	toolchain,
};

/// One subcommand of the utility.
pub trait Command {
	fn name(&self) -> &'static str;
	fn desc(&self) -> &'static str;
	fn usage(&self) -> String;
	fn run(&self, registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error>;
}

/// Every available command, looked up by name. Constructed once in `main`
/// and passed to whatever needs it; there is no process-global registry.
pub struct CommandRegistry {
	commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
	pub fn new() -> CommandRegistry {
		let mut commands: Vec<Box<dyn Command>> = vec![
			Box::new(BuildCommand),
			Box::new(CleanCommand),
			Box::new(EasyCommand),
			Box::new(InitCommand),
			Box::new(HelpCommand),
		];
		commands.sort_by_key(|c| c.name());
		CommandRegistry { commands }
	}

	pub fn lookup(&self, name: &str) -> Option<&dyn Command> {
		let name = name.to_lowercase();
		self.commands.iter().find(|c| c.name() == name).map(|c| c.as_ref())
	}

	pub fn has(&self, name: &str) -> bool {
		self.lookup(name).is_some()
	}

	pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
		self.commands.iter().map(|c| c.as_ref())
	}

	pub fn usage(&self) -> String {
		let mut s = String::new();
		s.push_str("Usage: smelt <command> [<args>]\n");
		s.push('\n');
		s.push_str("Smelt is a small utility for building C and C++ projects. It scales from a\n");
		s.push_str("single application up to a system of libraries and executables.\n");
		s.push('\n');
		s.push_str("Commands:\n");
		for command in self.commands() {
			s.push_str(&format!("  {:<8}{}\n", command.name(), command.desc()));
		}
		s.push('\n');
		s.push_str("Options:\n");
		s.push_str("  -h, --help    Show this screen, or help for the given command\n");
		s
	}

	pub fn run(&self, name: &str, args: &[String]) -> Result<(), anyhow::Error> {
		match self.lookup(name) {
			Some(command) => command.run(self, args),
			None => bail!("invalid command '{}'", name),
		}
	}
}

impl Default for CommandRegistry {
	fn default() -> Self {
		CommandRegistry::new()
	}
}

// Every command accepts -h/--help. Returns the positional arguments, or None
// if help was requested (and printed).
fn parse_command_args(usage: &str, args: &[String]) -> Result<Option<Vec<String>>, anyhow::Error> {
	let mut opts = Options::new();
	opts.optflag("h", "help", "print this help");
	let matches = opts.parse(args)?;
	if matches.opt_present("h") {
		println!("{}", usage);
		return Ok(None);
	}
	Ok(Some(matches.free))
}

struct BuildCommand;

impl Command for BuildCommand {
	fn name(&self) -> &'static str {
		"build"
	}
	fn desc(&self) -> &'static str {
		"Build the project defined in the smelt.proj file in the current dir"
	}
	fn usage(&self) -> String {
		format!(
			"Usage: smelt build\n\nParses the {} file in the current directory and builds the project\ndefined in it.\n",
			crate::PROJ_FILE
		)
	}
	fn run(&self, _registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error> {
		let Some(_params) = parse_command_args(&self.usage(), args)? else {
			return Ok(());
		};

		let proj_file = Path::new(crate::PROJ_FILE);
		if !proj_file.exists() {
			bail!("no {} file found", crate::PROJ_FILE);
		}
		let project = Project::from_file(proj_file)?;
		let toolchain = toolchain::load(Path::new(crate::TOOLCHAIN_FILE))?;
		let artifact = Compiler::new(toolchain).build(&project)?;
		println!("Built {}", artifact.path.display());
		Ok(())
	}
}

struct CleanCommand;

impl Command for CleanCommand {
	fn name(&self) -> &'static str {
		"clean"
	}
	fn desc(&self) -> &'static str {
		"Delete all compiled files"
	}
	fn usage(&self) -> String {
		format!(
			"Usage: smelt clean\n\nDeletes everything in the {} dir. If a {} file exists, the\noutput file it defines is deleted too.\n",
			crate::SMELT_DIR,
			crate::PROJ_FILE
		)
	}
	fn run(&self, _registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error> {
		let Some(_params) = parse_command_args(&self.usage(), args)? else {
			return Ok(());
		};

		let mut cleaned = false;

		let work_dir = Path::new(crate::SMELT_DIR);
		if work_dir.is_dir() {
			for entry in fs::read_dir(work_dir)? {
				let path = entry?.path();
				if path.is_dir() {
					fs::remove_dir_all(&path)?;
				} else {
					fs::remove_file(&path)?;
				}
			}
			println!("Cleaned {} dir", crate::SMELT_DIR);
			cleaned = true;
		}

		let proj_file = Path::new(crate::PROJ_FILE);
		if proj_file.exists() {
			match Project::from_file(proj_file).and_then(|p| p.outfile()) {
				Ok(outfile) => {
					if Path::new(&outfile).exists() {
						fs::remove_file(&outfile)?;
						println!("Deleted output file {}", outfile);
						cleaned = true;
					}
				}
				Err(e) => println!("Error cleaning output file: {}", e),
			}
		}

		if !cleaned {
			println!("Nothing to clean");
		}
		Ok(())
	}
}

struct EasyCommand;

impl Command for EasyCommand {
	fn name(&self) -> &'static str {
		"easy"
	}
	fn desc(&self) -> &'static str {
		"Build all source files in the current directory"
	}
	fn usage(&self) -> String {
		format!(
			"Usage: smelt easy [app|lib|dll] [name]\n\nBuilds every source file in the current dir, even if no {} file\nexists. An existing project file is ignored.\n",
			crate::PROJ_FILE
		)
	}
	fn run(&self, _registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error> {
		let Some(params) = parse_command_args(&self.usage(), args)? else {
			return Ok(());
		};

		let (ty, name) = easy_params(&params)?;

		let project = Project {
			name,
			ty: Some(ty),
			files: sources::source_files()?,
			..Project::default()
		};

		println!("Output file name: {}", project.outfile()?);
		println!("Output file type: {} ({})", ty.keyword(), ty.desc());

		let toolchain = toolchain::load(Path::new(crate::TOOLCHAIN_FILE))?;
		let artifact = Compiler::new(toolchain).build(&project)?;
		println!("Built {}", artifact.path.display());
		Ok(())
	}
}

// `easy [app|lib|dll] [name]`: the type defaults to `app`, the name to the
// type keyword.
fn easy_params(params: &[String]) -> Result<(ProjectType, String), anyhow::Error> {
	let type_keyword = params.first().map(String::as_str).unwrap_or("app");
	let ty = match ProjectType::from_keyword(type_keyword) {
		Ok(x) => x,
		Err(_) => bail!("invalid [app|lib|dll] value '{}'. See 'smelt help easy'", type_keyword),
	};
	let name = params.get(1).cloned().unwrap_or_else(|| type_keyword.to_owned());
	Ok((ty, name))
}

struct InitCommand;

const DEFAULT_NAME: &str = "my_project";
const DEFAULT_TYPE: &str = "app";

// `init [name] [type]`, both optional. The name must match `^\w+$`.
fn init_params(params: &[String]) -> Result<(ProjectType, String), anyhow::Error> {
	let name = params.first().cloned().unwrap_or_else(|| DEFAULT_NAME.to_owned());
	let type_keyword = params.get(1).map(String::as_str).unwrap_or(DEFAULT_TYPE);
	if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		bail!("invalid name '{}'", name);
	}
	let ty = ProjectType::from_keyword(type_keyword)?;
	Ok((ty, name))
}

// Writes the project file unless one already exists. Returns whether a file
// was created.
fn init_project_file(proj_file: &Path, name: String, ty: ProjectType, files: Vec<String>) -> Result<bool, Error> {
	if proj_file.exists() {
		return Ok(false);
	}
	let project = Project { name, ty: Some(ty), files, ..Project::default() };
	project.to_file(proj_file)?;
	Ok(true)
}

impl Command for InitCommand {
	fn name(&self) -> &'static str {
		"init"
	}
	fn desc(&self) -> &'static str {
		"Write a smelt.proj file initialized with source files"
	}
	fn usage(&self) -> String {
		format!(
			"Usage: smelt init [name] [type]\n\nCreates a {} file listing the source files in the current dir. An\nexisting file is left unchanged.\n\n  name  - Project name. Default: {}\n  type  - Project type. Default: {}\n",
			crate::PROJ_FILE,
			DEFAULT_NAME,
			DEFAULT_TYPE
		)
	}
	fn run(&self, _registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error> {
		let Some(params) = parse_command_args(&self.usage(), args)? else {
			return Ok(());
		};

		let (ty, name) = init_params(&params)?;
		let proj_file = Path::new(crate::PROJ_FILE);
		if init_project_file(proj_file, name, ty, sources::source_files()?)? {
			println!("{} file created", crate::PROJ_FILE);
		} else {
			println!("{} already exists", crate::PROJ_FILE);
		}
		Ok(())
	}
}

struct HelpCommand;

impl Command for HelpCommand {
	fn name(&self) -> &'static str {
		"help"
	}
	fn desc(&self) -> &'static str {
		"Display usage info for any command"
	}
	fn usage(&self) -> String {
		"Usage: smelt help [command]\n\nPrints usage info for the utility overall, or for a given command.\n".to_owned()
	}
	fn run(&self, registry: &CommandRegistry, args: &[String]) -> Result<(), anyhow::Error> {
		match args.first() {
			None => println!("{}", registry.usage()),
			Some(name) => match registry.lookup(name) {
				Some(command) => println!("{}", command.usage()),
				None => {
					println!("{}", registry.usage());
					println!("ERROR: '{}' is not a valid command", name);
				}
			},
		}
		Ok(())
	}
}
