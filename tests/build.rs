#![cfg(unix)]

use std::{
	fs, //
	os::unix::fs::PermissionsExt,
	path::{Path, PathBuf},
};

use smelt::{
	compiler::Compiler,
	project::{Project, ProjectType},
	toolchain::Toolchain,
	Error,
};

fn write_script(path: &Path, body: &str) -> String {
	fs::write(path, body).unwrap();
	let mut perms = fs::metadata(path).unwrap().permissions();
	perms.set_mode(0o755);
	fs::set_permissions(path, perms).unwrap();
	path.to_str().unwrap().to_owned()
}

fn fake_toolchain(dir: &Path, compiler_body: &str, linker_body: &str) -> Toolchain {
	let compiler = write_script(&dir.join("cc.sh"), compiler_body);
	let linker = write_script(&dir.join("ld.sh"), linker_body);
	Toolchain {
		compiler: vec![compiler],
		archiver: vec![linker.clone()],
		linker: vec![linker],
	}
}

fn app_project(name: &str, files: &[&str]) -> Project {
	Project {
		name: name.to_owned(),
		ty: Some(ProjectType::Application),
		files: files.iter().map(|x| x.to_string()).collect(),
		..Project::default()
	}
}

#[test]
fn successful_application_build() {
	let dir = tempfile::tempdir().unwrap();
	let marker = dir.path().join("linker-ran");

	// The compiler stand-in touches its output file (the last argument)
	let toolchain = fake_toolchain(
		dir.path(),
		"#!/bin/sh\nfor a in \"$@\"; do last=\"$a\"; done\ntouch \"$last\"\n",
		&format!("#!/bin/sh\ntouch {}\n", marker.display()),
	);

	let work_dir = dir.path().join("work");
	let compiler = Compiler::new(toolchain).with_work_dir(&work_dir);
	let project = app_project("demo", &["a.cpp", "b.cpp"]);

	let artifact = compiler.build(&project).expect("build should succeed");
	assert_eq!(artifact.path, PathBuf::from("demo"));
	assert_eq!(artifact.ty, ProjectType::Application);
	assert!(marker.exists(), "linker was not invoked");
	assert!(work_dir.join("a_cpp.o").exists());
	assert!(work_dir.join("b_cpp.o").exists());
	assert!(work_dir.join("compiler-output").exists());
}

#[test]
fn same_stem_sources_produce_one_object_each() {
	let dir = tempfile::tempdir().unwrap();

	let toolchain = fake_toolchain(
		dir.path(),
		"#!/bin/sh\nfor a in \"$@\"; do last=\"$a\"; done\ntouch \"$last\"\n",
		"#!/bin/sh\nexit 0\n",
	);

	let work_dir = dir.path().join("work");
	let compiler = Compiler::new(toolchain).with_work_dir(&work_dir);
	let project = app_project("demo", &["a.c", "a.cpp"]);

	compiler.build(&project).expect("build should succeed");
	let mut objects = fs::read_dir(&work_dir)
		.unwrap()
		.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
		.filter(|name| name.ends_with(".o"))
		.collect::<Vec<String>>();
	objects.sort();
	assert_eq!(objects, vec!["a_c.o", "a_cpp.o"]);
}

#[test]
fn compile_failures_are_aggregated_and_linking_is_skipped() {
	let dir = tempfile::tempdir().unwrap();
	let marker = dir.path().join("linker-ran");

	// Fails for any source whose name contains "bad", echoing a diagnostic.
	// The source file is the second argument: `-c <src> -o <obj>`.
	let toolchain = fake_toolchain(
		dir.path(),
		"#!/bin/sh\ncase \"$2\" in\n*bad*) echo \"syntax error\" >&2; exit 1;;\n*) exit 0;;\nesac\n",
		&format!("#!/bin/sh\ntouch {}\n", marker.display()),
	);

	let compiler = Compiler::new(toolchain).with_work_dir(dir.path().join("work"));
	let project = app_project("demo", &["bad_one.cpp", "fine.cpp", "bad_two.cpp"]);

	match compiler.build(&project) {
		Err(Error::CompilationFailed { failed, diagnostics }) => {
			assert_eq!(failed, 2);
			assert!(diagnostics.contains("bad_one.cpp"));
			assert!(diagnostics.contains("bad_two.cpp"));
			assert!(diagnostics.contains("syntax error"));
			assert!(!diagnostics.contains("error compiling fine.cpp"));
		}
		other => panic!("expected CompilationFailed, got {:?}", other),
	}
	assert!(!marker.exists(), "linker must not run after compile failures");
}

#[test]
fn static_library_uses_the_archiver() {
	let dir = tempfile::tempdir().unwrap();
	let args_log = dir.path().join("archiver-args");

	let compiler_body = "#!/bin/sh\nexit 0\n".to_owned();
	let archiver_body = format!("#!/bin/sh\necho \"$@\" > {}\n", args_log.display());
	let compiler_cmd = write_script(&dir.path().join("cc.sh"), &compiler_body);
	let archiver_cmd = write_script(&dir.path().join("ar.sh"), &archiver_body);
	let toolchain = Toolchain {
		compiler: vec![compiler_cmd],
		archiver: vec![archiver_cmd],
		// A linker that always fails proves the archiver path was taken
		linker: vec!["false".to_owned()],
	};

	let compiler = Compiler::new(toolchain).with_work_dir(dir.path().join("work"));
	let mut project = app_project("demo", &["a.cpp"]);
	project.ty = Some(ProjectType::StaticLibrary);

	let artifact = compiler.build(&project).expect("build should succeed");
	assert_eq!(artifact.path, PathBuf::from("libdemo.a"));
	let args = fs::read_to_string(&args_log).unwrap();
	assert!(args.starts_with("libdemo.a "), "archiver args: {}", args);
	assert!(args.contains("a_cpp.o"));
}

#[test]
fn shared_library_compiles_position_independent() {
	let dir = tempfile::tempdir().unwrap();
	let args_log = dir.path().join("compiler-args");

	let toolchain = fake_toolchain(
		dir.path(),
		&format!("#!/bin/sh\necho \"$@\" >> {}\n", args_log.display()),
		"#!/bin/sh\nexit 0\n",
	);

	let compiler = Compiler::new(toolchain).with_work_dir(dir.path().join("work"));
	let mut project = app_project("demo", &["a.cpp"]);
	project.ty = Some(ProjectType::SharedLibrary);
	project.inc_paths = vec!["include".to_owned()];

	let artifact = compiler.build(&project).expect("build should succeed");
	assert_eq!(artifact.path, PathBuf::from("libdemo.so"));
	let args = fs::read_to_string(&args_log).unwrap();
	assert!(args.contains("-fPIC"));
	assert!(args.contains("-Iinclude"));
}

#[test]
fn link_failure_carries_diagnostics() {
	let dir = tempfile::tempdir().unwrap();

	let toolchain = fake_toolchain(
		dir.path(),
		"#!/bin/sh\nexit 0\n",
		"#!/bin/sh\necho \"undefined reference to main\" >&2\nexit 1\n",
	);

	let compiler = Compiler::new(toolchain).with_work_dir(dir.path().join("work"));
	let project = app_project("demo", &["a.cpp"]);

	match compiler.build(&project) {
		Err(Error::LinkFailed(diagnostics)) => assert!(diagnostics.contains("undefined reference")),
		other => panic!("expected LinkFailed, got {:?}", other),
	}
}

#[test]
fn linker_gets_library_paths_and_names() {
	let dir = tempfile::tempdir().unwrap();
	let args_log = dir.path().join("linker-args");

	let toolchain = fake_toolchain(
		dir.path(),
		"#!/bin/sh\nexit 0\n",
		&format!("#!/bin/sh\necho \"$@\" > {}\n", args_log.display()),
	);

	let compiler = Compiler::new(toolchain).with_work_dir(dir.path().join("work"));
	let mut project = app_project("demo", &["a.cpp"]);
	project.libs = vec!["z".to_owned(), "pthread".to_owned()];
	project.lib_paths = vec!["/opt/lib".to_owned()];

	compiler.build(&project).expect("build should succeed");
	let args = fs::read_to_string(&args_log).unwrap();
	assert!(args.contains("-L/opt/lib"));
	assert!(args.contains("-lz"));
	assert!(args.contains("-lpthread"));
	assert!(args.contains("-o demo"));
}
