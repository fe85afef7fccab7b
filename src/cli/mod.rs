//! CLI module for the user credentials tool
//!
//! Subcommands:
//! - `hash`: hash a password
//! - `verify`: check a password against an encoded hash
//! - `gen-password`: print a random password
//! - `migrate`: apply the database schema
//! - `check-super-users`: report whether any user is a super user

mod commands;

pub use commands::{check_super_users, gen_password, hash, migrate, verify};

use clap::{Args, Parser, Subcommand};

use crate::infrastructure::password::DEFAULT_PASSWORD_LENGTH;

/// Password hashing, verification and super user checks
#[derive(Parser)]
#[command(name = "user-credentials")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Hash a password
    Hash(HashArgs),

    /// Verify a password against an encoded hash (exit code 1 on mismatch)
    Verify(VerifyArgs),

    /// Generate a random password
    GenPassword(GenPasswordArgs),

    /// Apply pending database migrations
    Migrate,

    /// Check whether any of the given users is a super user (exit code 1 if none)
    CheckSuperUsers(CheckSuperUsersArgs),
}

#[derive(Args, Debug)]
pub struct HashArgs {
    /// Algorithm name or legacy code; defaults to the configured algorithm
    #[arg(short, long)]
    pub algorithm: Option<String>,

    pub password: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    pub password: String,

    pub hash: String,

    /// Upgrade the stored hash of this user on success
    #[arg(long)]
    pub user_id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct GenPasswordArgs {
    #[arg(short, long, default_value_t = DEFAULT_PASSWORD_LENGTH)]
    pub length: usize,
}

#[derive(Args, Debug)]
pub struct CheckSuperUsersArgs {
    /// User ids, checked in order
    #[arg(required = true)]
    pub user_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash() {
        let cli = Cli::try_parse_from(["user-credentials", "hash", "-a", "argon2id", "secret"])
            .unwrap();

        match cli.command {
            Command::Hash(args) => {
                assert_eq!(args.algorithm.as_deref(), Some("argon2id"));
                assert_eq!(args.password, "secret");
            }
            _ => panic!("expected hash command"),
        }
    }

    #[test]
    fn test_parse_gen_password_default_length() {
        let cli = Cli::try_parse_from(["user-credentials", "gen-password"]).unwrap();

        match cli.command {
            Command::GenPassword(args) => assert_eq!(args.length, 8),
            _ => panic!("expected gen-password command"),
        }
    }

    #[test]
    fn test_check_super_users_requires_ids() {
        assert!(Cli::try_parse_from(["user-credentials", "check-super-users"]).is_err());

        let cli = Cli::try_parse_from(["user-credentials", "check-super-users", "42", "7"]).unwrap();
        match cli.command {
            Command::CheckSuperUsers(args) => assert_eq!(args.user_ids, vec![42, 7]),
            _ => panic!("expected check-super-users command"),
        }
    }
}
