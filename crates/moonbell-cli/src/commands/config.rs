use clap::Subcommand;
use moonbell_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the active configuration (secrets redacted)
    Show,
    /// Write a default config file if none exists
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Show => {
            let mut config = Config::load()?;
            if !config.calendar.password.is_empty() {
                config.calendar.password = "<redacted>".to_string();
            }
            if !config.telegram.bot_token.is_empty() {
                config.telegram.bot_token = "<redacted>".to_string();
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let path = Config::path()?;
            if path.exists() {
                println!("config already exists at {}", path.display());
            } else {
                Config::default().save()?;
                println!("wrote default config to {}", path.display());
            }
        }
    }
    Ok(())
}
