use std::process::ExitCode;

use clap::Parser;
use user_credentials::AppConfig;
use user_credentials::cli::{self, Cli, Command};
use user_credentials::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let success = match cli.command {
        Command::Hash(args) => cli::hash(&config, args).await.map(|_| true)?,
        Command::Verify(args) => cli::verify(&config, args).await?,
        Command::GenPassword(args) => cli::gen_password(args).map(|_| true)?,
        Command::Migrate => cli::migrate(&config).await.map(|_| true)?,
        Command::CheckSuperUsers(args) => cli::check_super_users(&config, args).await?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
