/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

mod commands;
mod config;
mod exit_result;
mod logging;

use clap::Parser;

use crate::commands::targets::TargetsCommand;
use crate::commands::CommandContext;
use crate::exit_result::ExitResult;

#[derive(Debug, clap::Parser)]
#[clap(name = "buck1", about = "A build tool for monorepos.")]
struct Opt {
    #[clap(subcommand)]
    command: CommandKind,
}

#[derive(Debug, clap::Subcommand)]
enum CommandKind {
    /// Prints the list of buildable targets.
    Targets(TargetsCommand),
}

fn exec() -> ExitResult {
    if let Err(e) = logging::init_tracing() {
        return ExitResult::err(e);
    }
    let opt = Opt::parse();
    let ctx = match CommandContext::for_current_dir() {
        Ok(ctx) => ctx,
        Err(e) => return ExitResult::err(e),
    };
    match opt.command {
        CommandKind::Targets(cmd) => cmd.exec(&ctx),
    }
}

fn main() -> ! {
    exec().report()
}
