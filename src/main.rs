use anyhow::Result;
use clap::Parser;
use media_tidy::cli::{self, Cli};
use media_tidy::config::Config;
use media_tidy::init;
use media_tidy::menu::run_interactive;

fn main() -> Result<()> {
    let args = Cli::parse();
    init::init(args.verbose);

    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    match args.command {
        Some(command) => cli::execute(command, config),
        None => run_interactive(&mut config),
    }
}
