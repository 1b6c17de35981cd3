// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-line interface module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! 1. parser::parse_cli()     Parse CLI with clap
//! 2. validator::validate     Security validation
//! 3. ValidatedCli            Safe, validated config
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: every argument has passed security and
/// range validation.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Validated command variants.
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    WorkerPool {
        pipeline: String,
        pool_size: Option<usize>,
        max_retries: Option<u32>,
        poll_timeout_ms: Option<u64>,
    },
    Run {
        pipeline: String,
        max_retries: Option<u32>,
    },
}

/// Parse and validate CLI arguments in one step.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    let command = match cli.command {
        Commands::WorkerPool {
            pipeline,
            pool_size,
            max_retries,
            poll_timeout_ms,
        } => {
            SecureArgParser::validate_argument(&pipeline)?;

            let pool_size = pool_size
                .map(|n| SecureArgParser::validate_number("pool-size", n, Some(1), Some(128)))
                .transpose()?;

            ValidatedCommand::WorkerPool {
                pipeline,
                pool_size,
                max_retries,
                poll_timeout_ms,
            }
        }
        Commands::Run { pipeline, max_retries } => {
            SecureArgParser::validate_argument(&pipeline)?;
            ValidatedCommand::Run { pipeline, max_retries }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn validates_worker_pool_command() {
        let cli = Cli::parse_from(["docflow", "worker-pool", "--pipeline", "invoices", "--pool-size", "4"]);
        let validated = validate_cli(cli).unwrap();
        match validated.command {
            ValidatedCommand::WorkerPool { pipeline, pool_size, .. } => {
                assert_eq!(pipeline, "invoices");
                assert_eq!(pool_size, Some(4));
            }
            other => panic!("expected WorkerPool, got {other:?}"),
        }
    }

    #[test]
    fn rejects_pool_size_above_maximum() {
        let cli = Cli::parse_from(["docflow", "worker-pool", "--pipeline", "invoices", "--pool-size", "200"]);
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn rejects_dangerous_pipeline_name() {
        let cli = Cli::parse_from(["docflow", "run", "--pipeline", "../etc/passwd"]);
        assert!(matches!(validate_cli(cli), Err(ParseError::DangerousPattern { .. })));
    }
}
