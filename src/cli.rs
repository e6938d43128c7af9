use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

pub fn build_cli() -> ArgMatches<'static> {
	build_app().get_matches()
}

pub fn build_app() -> App<'static, 'static> {
	App::new("sr3d")
		.version("v0.2.0")
		.about("Evaluate 3D super-resolution networks on paired HDF5 volume datasets")
		.settings(&[AppSettings::SubcommandRequiredElseHelp, AppSettings::VersionlessSubcommands])
		.subcommand(build_test_subcommand())
		.subcommand(build_inspect_subcommand())
		.subcommand(build_generate_config_subcommand())
}

fn build_test_subcommand() -> App<'static, 'static> {
	SubCommand::with_name("test")
		.about("Run every configured dataset through the model and report MSE/RMSE/PSNR")
		.arg(
			Arg::with_name("OPTIONS_FILE")
				.help("Path to the options file (.toml or .json)")
				.short("o")
				.long("opt")
				.value_name("OPTIONS_FILE")
				.required(true)
				.empty_values(false),
		)
		.arg(
			Arg::with_name("RESULTS_ROOT")
				.short("r")
				.long("results")
				.value_name("DIR")
				.help("Overrides run.results_root")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("SUFFIX")
				.short("s")
				.long("suffix")
				.help("Overrides the suffix appended to rendered file names")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("SCALE")
				.short("f")
				.long("scale")
				.help("Overrides the model upscaling factor")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("INTERPOLATION")
				.short("i")
				.long("interpolation")
				.possible_values(&["nearest", "trilinear"])
				.help("Overrides the built-in model's interpolation")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("LOG_LEVEL")
				.short("l")
				.long("log-level")
				.possible_values(&["error", "warn", "info", "debug", "trace"])
				.help("Log verbosity. Default: info")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("NO_PROGRESS")
				.long("no-progress")
				.help("Hide the progress bar")
				.takes_value(false),
		)
}

fn build_inspect_subcommand() -> App<'static, 'static> {
	SubCommand::with_name("inspect")
		.about("List the datasets of an HDF5 container with shape and value range")
		.arg(
			Arg::with_name("H5_FILE")
				.help("The HDF5 file to inspect")
				.required(true)
				.index(1),
		)
}

fn build_generate_config_subcommand() -> App<'static, 'static> {
	SubCommand::with_name("generate-config")
		.about("Write a default options file")
		.arg(
			Arg::with_name("OUTPUT_FILE")
				.help("Where to write the options. Default: test_options.toml")
				.index(1),
		)
		.arg(
			Arg::with_name("FORMAT")
				.long("format")
				.possible_values(&["toml", "json"])
				.help("Output format. Default: toml")
				.empty_values(false),
		)
		.arg(
			Arg::with_name("EXAMPLE")
				.long("example")
				.help("Write the commented TOML example instead of bare defaults")
				.takes_value(false),
		)
		.arg(
			Arg::with_name("FORCE")
				.long("force")
				.help("Overwrite an existing file")
				.takes_value(false),
		)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_test_subcommand() {
		let matches = build_app()
			.get_matches_from_safe(vec!["sr3d", "test", "--opt", "options.toml", "--scale", "2", "--no-progress"])
			.unwrap();
		let sub = matches.subcommand_matches("test").unwrap();
		assert_eq!(sub.value_of("OPTIONS_FILE"), Some("options.toml"));
		assert_eq!(sub.value_of("SCALE"), Some("2"));
		assert!(sub.is_present("NO_PROGRESS"));
	}

	#[test]
	fn test_options_file_required() {
		assert!(build_app().get_matches_from_safe(vec!["sr3d", "test"]).is_err());
	}
}
