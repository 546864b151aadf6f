/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

pub mod targets;

use buck1_core::buck_paths::BuckPaths;
use buck1_core::buck_paths::BuildFileName;
use buck1_core::fs::project::ProjectFilesystem;
use buck1_core::pattern::BuildTargetParser;
use buck1_parser::loader::JsonRuleLoader;
use gazebo::prelude::*;

use crate::config::BuckConfig;

/// What every command starts from: the project root and its configuration.
pub struct CommandContext {
    pub filesystem: ProjectFilesystem,
    pub config: BuckConfig,
    pub build_file_name: BuildFileName,
    pub buck_paths: BuckPaths,
}

impl CommandContext {
    pub fn for_current_dir() -> anyhow::Result<CommandContext> {
        let filesystem = ProjectFilesystem::new(std::env::current_dir()?);
        let config = BuckConfig::load(&filesystem)?;
        CommandContext::new(filesystem, config, BuckPaths::from_env()?)
    }

    pub fn new(
        filesystem: ProjectFilesystem,
        config: BuckConfig,
        buck_paths: BuckPaths,
    ) -> anyhow::Result<CommandContext> {
        let build_file_name = config.build_file_name();
        Ok(CommandContext {
            filesystem,
            config,
            build_file_name,
            buck_paths,
        })
    }

    pub fn target_parser(&self) -> BuildTargetParser {
        BuildTargetParser::new(self.build_file_name.clone())
    }

    pub fn rule_loader(&self) -> JsonRuleLoader {
        JsonRuleLoader::new(
            self.filesystem.dupe(),
            self.build_file_name.clone(),
            self.buck_paths.clone(),
        )
    }
}
