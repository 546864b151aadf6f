/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::fmt::Display;
use std::io;
use std::io::Write;

use buck1_core::pattern::BuildTargetParseError;
use buck1_parser::parser::NoSuchBuildTargetError;
use buck1_parser::traversal::CycleError;
use thiserror::Error;

/// An error whose message is the whole story: it is shown to the user as a
/// single line, with no error chain and no backtrace.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HumanReadableError(pub String);

impl HumanReadableError {
    pub fn new(message: impl Into<String>) -> Self {
        HumanReadableError(message.into())
    }
}

/// The outcome of a command, designed to be the last value `main` produces.
///
/// Exit codes:
/// - 0: success
/// - 1: user error (bad target, bad type, unresolvable alias, cycle)
/// - 2: internal failure or I/O error
#[must_use]
pub struct ExitResult {
    variant: ExitResultVariant,
}

enum ExitResultVariant {
    Status(u8),
    /// A mistake in what the user asked for or in the build files; reported
    /// as a single line.
    UserError(anyhow::Error),
    /// Everything else; reported with the full error chain.
    Err(anyhow::Error),
}

impl ExitResult {
    pub fn success() -> Self {
        Self::status(0)
    }

    pub fn status(status: u8) -> Self {
        ExitResult {
            variant: ExitResultVariant::Status(status),
        }
    }

    pub fn user_error(message: impl Display) -> Self {
        ExitResult {
            variant: ExitResultVariant::UserError(anyhow::Error::new(HumanReadableError::new(
                message.to_string(),
            ))),
        }
    }

    pub fn err(err: anyhow::Error) -> Self {
        ExitResult {
            variant: ExitResultVariant::Err(err),
        }
    }

    /// Classifies a command outcome: the error kinds a user can cause by
    /// what they typed or wrote in a build file report as user errors, the
    /// rest as internal failures.
    pub fn from_command_result(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) if is_user_error(&e) => ExitResult {
                variant: ExitResultVariant::UserError(e),
            },
            Err(e) => Self::err(e),
        }
    }

    pub fn report(self) -> ! {
        let mut exit_code = match self.variant {
            ExitResultVariant::Status(status) => status,
            ExitResultVariant::UserError(e) => {
                let _ignored = writeln!(io::stderr().lock(), "{:#}", e);
                1
            }
            ExitResultVariant::Err(e) => {
                let _ignored = writeln!(io::stderr().lock(), "Command failed: {:?}", e);
                2
            }
        };

        if io::stdout().flush().is_err() {
            exit_code = 141;
        }

        std::process::exit(exit_code as i32)
    }
}

fn is_user_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<HumanReadableError>().is_some()
        || e.downcast_ref::<BuildTargetParseError>().is_some()
        || e.downcast_ref::<NoSuchBuildTargetError>().is_some()
        || e.downcast_ref::<CycleError>().is_some()
}

impl From<anyhow::Result<()>> for ExitResult {
    fn from(result: anyhow::Result<()>) -> Self {
        Self::from_command_result(result)
    }
}
