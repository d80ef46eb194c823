use std::{
	env, //
	process::ExitCode,
};

use smelt::commands::CommandRegistry;

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("SMELT_LOG", "off"))
		.format_timestamp(None)
		.init();

	let mut args: Vec<String> = env::args().skip(1).collect();
	let registry = CommandRegistry::new();

	// Options before the command name apply to the utility itself
	let mut help = false;
	while args.first().is_some_and(|x| x.starts_with('-')) {
		let opt = args.remove(0);
		if opt == "-h" || opt == "--help" {
			// Drop the rest so the usage shown is for the utility overall
			help = true;
			args.clear();
		} else {
			println!("{}", registry.usage());
			println!("ERROR: Invalid option '{}'", opt);
			return ExitCode::FAILURE;
		}
	}

	if help || args.is_empty() {
		println!("{}", registry.usage());
		return ExitCode::SUCCESS;
	}

	if !registry.has(&args[0]) {
		println!("{}", registry.usage());
		println!("ERROR: Invalid command '{}'", args[0]);
		return ExitCode::FAILURE;
	}

	match registry.run(&args[0], &args[1..]) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			println!("ERROR: {}", e);
			ExitCode::FAILURE
		}
	}
}
