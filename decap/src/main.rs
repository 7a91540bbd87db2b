use std::str::FromStr;

use anyhow::Result;
use log::LevelFilter;

mod cli;
mod config;
mod decode;
mod generate;
mod helpers;
mod process;

// Re-export events crate. It's not really an import but a re-export so events
// appear as module inside the crate rather than an external crate. However,
// clippy doesn't like it.
#[allow(clippy::single_component_path_imports)]
use events;

use crate::{cli::get_cli, helpers::logger::Logger};

fn main() -> Result<()> {
    let cli = get_cli()?.build();

    Logger::init(LevelFilter::from_str(&cli.main_config.log_level)?)?;

    let mut runner = cli.get_subcommand()?.runner()?;
    runner.run(cli)
}
