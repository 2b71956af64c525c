use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Parser;
use log::{error, info, warn};
use rand::RngCore;
use std::process;

use session_authority::auth::{TokenKind, TokenProvider};
use session_authority::cli::{Cli, Command};
use session_authority::config::AuthorityConfig;
use session_authority::error::AuthorityError;
use session_authority::security_logger::{SecurityEvent, SecurityLogger};

#[tokio::main]
async fn main() {
    // Load .env before the logger so RUST_LOG from the file applies
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    match dotenv {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    let cli = Cli::parse();
    let security_logger = SecurityLogger::new();

    let outcome = match cli.command {
        Command::GenerateKey => {
            println!("{}", generate_key());
            Ok(())
        }
        Command::Issue { subject, kind } => issue(&security_logger, &subject, kind).await,
        Command::Inspect { token, kind } => inspect(&security_logger, &token, kind).await,
    };

    if let Err(e) = outcome {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Random key that also passes the configuration checks
fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let key = URL_SAFE_NO_PAD.encode(bytes);
        if AuthorityConfig::new(key.clone()).validate().is_ok() {
            return key;
        }
    }
}

async fn provider(security_logger: &SecurityLogger) -> Result<TokenProvider, AuthorityError> {
    let built = AuthorityConfig::from_env().and_then(|config| {
        info!("Configuration: {:?}", config);
        TokenProvider::new(&config)
    });

    if let Err(e) = &built {
        security_logger
            .log_event(SecurityEvent::ConfigurationError {
                component: "authctl".to_string(),
                error: e.to_string(),
            })
            .await;
    }
    built
}

async fn issue(security_logger: &SecurityLogger, subject: &str, kind: TokenKind) -> Result<(), AuthorityError> {
    let issued = provider(security_logger).await?.issue(subject, kind)?;
    security_logger
        .log_event(SecurityEvent::TokenIssued {
            subject: issued.claims.subject.clone(),
            kind,
            token_id: issued.claims.token_id,
        })
        .await;
    println!("{}", issued.token);
    Ok(())
}

async fn inspect(security_logger: &SecurityLogger, token: &str, kind: TokenKind) -> Result<(), AuthorityError> {
    let claims = match provider(security_logger).await?.validate(token.trim(), kind) {
        Ok(claims) => claims,
        Err(e) => {
            security_logger
                .log_event(SecurityEvent::TokenRejected {
                    expected: kind,
                    reason: e.to_string(),
                })
                .await;
            return Err(e.into());
        }
    };
    let rendered = serde_json::to_string_pretty(&claims)
        .map_err(|e| AuthorityError::SystemError(format!("Failed to render claims: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
