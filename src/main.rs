//! Tcpload CLI

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tcpload::config::Config;
use tcpload::script::template::{self, TestCaseNames};
use tcpload::Recorder;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logs go to stderr so stdout only carries the generated script.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match (&cli.config, &cli.input) {
        (Some(path), _) => Config::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(input)) => Config::new(input),
        (None, None) => bail!("no capture to convert: pass --input <DIR> or --config <FILE>"),
    };
    if let Some(input) = cli.input {
        config.capture_dir = input;
    }
    if let Some(prefix) = cli.prefix {
        config.prefix = prefix;
    }
    if let Some(upload_dir) = cli.upload_dir {
        config.upload_dir = upload_dir;
    }
    config.validate()?;

    let names = cli
        .output
        .as_deref()
        .map(|test_name| TestCaseNames::new(test_name, &config.output_dir))
        .transpose()?;

    let recorder = Recorder::new(config);
    let Some(script) = recorder
        .convert()
        .with_context(|| format!("converting {}", recorder.config().capture_dir.display()))?
    else {
        return Ok(());
    };

    match names {
        Some(names) => {
            template::write_new(
                &names.script_path,
                &template::render_test_case(&script, &names),
            )?;
            template::write_new(
                &names.configuration_path,
                &template::render_configuration(script.server_url(), &names),
            )?;
        }
        None => println!("{}", script.render()),
    }

    Ok(())
}
