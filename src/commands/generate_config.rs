use crate::config_file::TestOptionsFile;
use crate::error::{Result, Sr3dError};
use clap::ArgMatches;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn generate_config(app_m: &ArgMatches) -> Result<()> {
    let output_path = app_m.value_of("OUTPUT_FILE").unwrap_or("test_options.toml");
    let format = app_m.value_of("FORMAT").unwrap_or("toml");
    let example = app_m.is_present("EXAMPLE");

    if Path::new(output_path).exists() && !app_m.is_present("FORCE") {
        return Err(Sr3dError::InvalidParameter(format!(
            "File {} already exists. Use --force to overwrite",
            output_path
        )));
    }

    if example {
        if format != "toml" {
            return Err(Sr3dError::InvalidParameter(
                "Example options with comments are only available in TOML format".to_string(),
            ));
        }
        fs::write(output_path, TestOptionsFile::create_example_toml())?;
        info!("Generated example options file with comments: {}", output_path);
    } else {
        let options = TestOptionsFile::generate_default();
        match format {
            "toml" => options.to_toml_file(output_path)?,
            "json" => options.to_json_file(output_path)?,
            _ => {
                return Err(Sr3dError::InvalidParameter(format!(
                    "Unknown format: {}. Use 'toml' or 'json'",
                    format
                )))
            }
        }
        info!("Generated {} options file: {}", format.to_uppercase(), output_path);
    }

    info!("Edit the data roots, then run:");
    info!("  sr3d test --opt {}", output_path);
    Ok(())
}
