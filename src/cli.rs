//! Command line interface for the `authctl` operator tool

use clap::{Parser, Subcommand};

use crate::auth::TokenKind;

#[derive(Debug, Parser)]
#[command(name = "authctl", version, about = "Operate a session authority signing key", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print a random signing key that passes configuration checks
    GenerateKey,

    /// Issue a token for a subject with the configured key
    Issue {
        subject: String,

        /// Token kind: access or refresh
        #[arg(default_value = "access")]
        kind: TokenKind,
    },

    /// Validate a token and print its claims
    Inspect {
        token: String,

        /// Kind the token is expected to be
        #[arg(default_value = "access")]
        kind: TokenKind,
    },
}
