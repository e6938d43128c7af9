use sr3d::{cli, commands, logging};
use tracing::error;

fn main() {
	let app_m = cli::build_cli();

	// `test` installs its own subscriber and logs its own failures
	if let ("test", Some(sub_m)) = app_m.subcommand() {
		if commands::test(sub_m).is_err() {
			std::process::exit(1);
		}
		return;
	}

	logging::init_simple_logger();
	let result = match app_m.subcommand() {
		("inspect", Some(sub_m)) => commands::inspect(sub_m),
		("generate-config", Some(sub_m)) => commands::generate_config(sub_m),
		_ => Ok(()),
	};

	if let Err(err) = result {
		error!("Error: {}", err);
		std::process::exit(1);
	}
}
