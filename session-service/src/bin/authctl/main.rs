use std::io;
use std::io::BufRead;

use anyhow::Context;
use chirpy_auth::PasswordError;
use chirpy_auth::PasswordHasher;
use chirpy_auth::RefreshTokenGenerator;
use chirpy_auth::UserId;
use chrono::Duration;
use clap::Parser;
use clap::Subcommand;
use session_service::config::Config;
use session_service::telemetry;

#[derive(Parser)]
#[command(name = "authctl")]
#[command(version, about = "Operator tool for chirpy credentials and tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password read from stdin
    HashPassword,

    /// Check a password read from stdin against a stored hash
    VerifyPassword {
        /// Encoded argon2 hash
        #[arg(long)]
        hash: String,
    },

    /// Issue an access token for a user
    IssueToken {
        /// User id (UUID)
        #[arg(long)]
        user_id: String,

        /// Lifetime override, defaults to jwt.access_token_ttl_seconds
        #[arg(long)]
        ttl_seconds: Option<i64>,
    },

    /// Validate an access token and print its user id
    ValidateToken {
        token: String,
    },

    /// Print a new refresh token
    GenerateRefreshToken,
}

fn main() -> anyhow::Result<()> {
    telemetry::init("authctl=info,session_service=info");

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::HashPassword => {
            let password = read_password(io::stdin().lock())?;
            if password.is_empty() {
                anyhow::bail!("Password must not be empty");
            }
            let hash = config.password_hasher()?.hash(&password)?;
            println!("{}", hash);
        }
        Commands::VerifyPassword { hash } => {
            let password = read_password(io::stdin().lock())?;
            verify_password(&config.password_hasher()?, &password, &hash)?;
            println!("ok");
        }
        Commands::IssueToken {
            user_id,
            ttl_seconds,
        } => {
            let user_id = UserId::from_string(&user_id)?;
            let mut authenticator = config.authenticator()?;
            if let Some(seconds) = ttl_seconds {
                authenticator = authenticator.with_access_token_ttl(ttl_override(seconds)?);
            }

            let token = authenticator.generate_token(user_id)?;
            tracing::info!(
                user_id = %user_id,
                ttl_seconds = authenticator.access_token_ttl().num_seconds(),
                "Access token issued"
            );
            println!("{}", token);
        }
        Commands::ValidateToken { token } => {
            let user_id = config.authenticator()?.validate_token(&token)?;
            println!("{}", user_id);
        }
        Commands::GenerateRefreshToken => {
            let token = RefreshTokenGenerator::new().generate()?;
            println!("{}", token.as_str());
        }
    }

    Ok(())
}

/// First line of `reader` without its line terminator. May be empty.
fn read_password(mut reader: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn verify_password(hasher: &PasswordHasher, password: &str, hash: &str) -> anyhow::Result<()> {
    match hasher.verify(password, hash) {
        Ok(()) => Ok(()),
        Err(PasswordError::Mismatch) => anyhow::bail!("Password does not match"),
        Err(e) => Err(e.into()),
    }
}

fn ttl_override(seconds: i64) -> anyhow::Result<Duration> {
    Duration::try_seconds(seconds)
        .filter(|ttl| *ttl > Duration::zero())
        .with_context(|| format!("--ttl-seconds must be positive and in range, got {}", seconds))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).expect("Failed to build hasher")
    }

    #[test]
    fn test_read_password() {
        let password = read_password(Cursor::new("pass_word!\r\n")).expect("Failed to read");
        assert_eq!(password, "pass_word!");

        let empty = read_password(Cursor::new("\n")).expect("Failed to read");
        assert_eq!(empty, "");
    }

    #[test]
    fn test_verify_empty_password_is_a_mismatch() {
        let hasher = hasher();
        let hash = hasher.hash("x").expect("Failed to hash password");

        let err = verify_password(&hasher, "", &hash).expect_err("Empty password must not match");
        assert_eq!(err.to_string(), "Password does not match");
        assert!(verify_password(&hasher, "x", &hash).is_ok());
    }

    #[test]
    fn test_ttl_override() {
        assert_eq!(ttl_override(60).expect("Valid ttl"), Duration::seconds(60));
        assert!(ttl_override(0).is_err());
        assert!(ttl_override(-5).is_err());
        assert!(ttl_override(i64::MAX).is_err());
    }
}
