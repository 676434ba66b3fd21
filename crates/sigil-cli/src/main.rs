use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sigil", version, about = "Sigil identity and renewal token CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identity key and renewal secret management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Issue and verify tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Configuration checks
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate an Ed25519 identity key pair and a renewal secret
    Generate {
        /// Directory to write identity.pem, identity.pub.pem and renewal.secret into
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a credential pair and print it as JSON
    Issue {
        /// Path to sigil.yaml
        #[arg(long, short, env = "SIGIL_CONFIG", default_value = "sigil.yaml")]
        config: PathBuf,

        /// User id embedded in both tokens
        #[arg(long)]
        user_id: Uuid,

        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        image_url: String,

        #[arg(long, default_value = "")]
        website: String,
    },

    /// Verify an identity token and print the user it carries
    VerifyIdentity {
        /// Path to sigil.yaml
        #[arg(long, short, env = "SIGIL_CONFIG", default_value = "sigil.yaml")]
        config: PathBuf,

        token: String,
    },

    /// Verify a renewal token and print its owner and credential id
    VerifyRenewal {
        /// Path to sigil.yaml
        #[arg(long, short, env = "SIGIL_CONFIG", default_value = "sigil.yaml")]
        config: PathBuf,

        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load the configuration and its key material and report status
    Check {
        /// Path to sigil.yaml
        #[arg(long, short, env = "SIGIL_CONFIG", default_value = "sigil.yaml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                config,
                user_id,
                email,
                name,
                image_url,
                website,
            } => {
                let user = sigil_token::UserClaims {
                    uid: user_id,
                    email,
                    name,
                    image_url,
                    website,
                };
                commands::token::issue(&config, &user).await?;
            }
            TokenCommand::VerifyIdentity { config, token } => {
                commands::token::verify_identity(&config, &token)?;
            }
            TokenCommand::VerifyRenewal { config, token } => {
                commands::token::verify_renewal(&config, &token)?;
            }
        },

        Command::Config { cmd } => match cmd {
            ConfigCommand::Check { config } => commands::config::check(&config)?,
        },
    }

    Ok(())
}
