use clap::Parser;
use form_relay::cli::commands::{cmd_inspect, cmd_submit};
use form_relay::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Submit {
            page,
            control,
            set,
            base_url,
        } => {
            cmd_submit(&page, control, &set, base_url.as_deref(), &config, cli.verbose)?;
        }
        Commands::Inspect { page } => {
            cmd_inspect(&page, &config)?;
        }
    }

    Ok(())
}
