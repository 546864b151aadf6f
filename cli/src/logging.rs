/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Initializes tracing to stderr. By default only warnings and errors show;
/// `$BUCK_LOG` takes any `tracing_subscriber` filter to turn on more.
pub fn init_tracing() -> anyhow::Result<()> {
    const ENV_VAR: &str = "BUCK_LOG";

    let filter = match std::env::var_os(ENV_VAR) {
        Some(v) => {
            let v = v
                .into_string()
                .ok()
                .with_context(|| format!("Failed to parse ${} as utf-8", ENV_VAR))?;
            EnvFilter::try_new(v)
                .with_context(|| format!("Failed to parse ${} as a filter", ENV_VAR))?
        }
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
