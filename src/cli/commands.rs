//! Subcommand implementations

use anyhow::Context;
use tracing::info;

use super::{CheckSuperUsersArgs, GenPasswordArgs, HashArgs, VerifyArgs};
use crate::config::AppConfig;
use crate::domain::{HashOptions, UserId};
use crate::infrastructure::password::gen_random_password;
use crate::infrastructure::storage::{create_pool, run_storage_migrations};

/// Print the hash of a password
pub async fn hash(config: &AppConfig, args: HashArgs) -> anyhow::Result<()> {
    let services = crate::create_services(config).await?;
    let algorithm = args
        .algorithm
        .unwrap_or_else(|| services.credentials.default_algorithm().to_string());

    let encoded = services.credentials.hash_password_with_tag(
        &args.password,
        &algorithm,
        &HashOptions::default(),
    )?;

    println!("{}", encoded);
    Ok(())
}

/// Returns whether the password matched
pub async fn verify(config: &AppConfig, args: VerifyArgs) -> anyhow::Result<bool> {
    let services = crate::create_services(config).await?;
    let user_id = args.user_id.and_then(UserId::optional);

    let matched = services
        .credentials
        .verify_password(&args.password, &args.hash, user_id)
        .await;

    println!("{}", if matched { "match" } else { "mismatch" });
    Ok(matched)
}

pub fn gen_password(args: GenPasswordArgs) -> anyhow::Result<()> {
    println!("{}", gen_random_password(args.length));
    Ok(())
}

pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = create_pool(&config.database)
        .await
        .context("migrations need a database")?;

    run_storage_migrations(&pool).await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Returns whether any listed user is a super user
pub async fn check_super_users(
    config: &AppConfig,
    args: CheckSuperUsersArgs,
) -> anyhow::Result<bool> {
    let user_ids = args
        .user_ids
        .into_iter()
        .map(UserId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let services = crate::create_services(config).await?;
    let found = services.access.check_super_user_in_users(&user_ids).await?;

    println!("{}", found);
    Ok(found)
}
