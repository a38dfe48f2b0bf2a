//! Config command handlers. These never need a server connection.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Init { server } => init(server, global),
        ConfigCommand::Path => {
            println!("{}", roundtable_config::config_path().display());
            Ok(())
        }
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = roundtable_config::load_config_or_default();
    let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
        message: e.to_string(),
    })?;
    if !global.quiet {
        println!("# {}", roundtable_config::config_path().display());
        println!("{rendered}");
    }
    Ok(())
}

fn init(server: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let path = roundtable_config::config_path();
    if path.exists() {
        return Err(CliError::Config {
            message: format!("config already exists at {}", path.display()),
        });
    }

    let mut cfg = roundtable_config::Config::default();
    cfg.server.url = server.or_else(|| global.server.clone());
    cfg.auth.user_id = global.user.clone();
    cfg.auth.token_env = Some("GD_TOKEN".to_owned());

    roundtable_config::save_config(&cfg)?;
    if !global.quiet {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
