/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! `.buckconfig` at the project root: sections of `key = value` lines.
//! The parts the core consumes are the `[alias]` map, and the build file
//! name and default includes of the `[buildfile]` section.

use anyhow::Context;
use buck1_core::buck_paths::BuildFileName;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::project::ProjectFilesystem;
use indexmap::IndexMap;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".buckconfig";

#[derive(Error, Debug)]
enum BuckConfigError {
    #[error(
        "entries should be specified as `key = value` on each line, but found line: `{0}`."
    )]
    ParsingError(String),
    #[error("entry `{0}` appears before any `[section]` header.")]
    EntryOutsideOfSection(String),
}

#[derive(Debug, Default)]
pub struct BuckConfig {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl BuckConfig {
    /// Reads `.buckconfig` from the project root; a missing file is an empty
    /// configuration.
    pub fn load(filesystem: &ProjectFilesystem) -> anyhow::Result<BuckConfig> {
        let path = filesystem.resolve(ProjectRelativePath::unchecked_new(CONFIG_FILE_NAME));
        if !path.exists() {
            return Ok(BuckConfig::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading `{}`", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing `{}`", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<BuckConfig> {
        let mut sections: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        let mut current_section: Option<String> = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| BuckConfigError::ParsingError(line.to_owned()))?;
                current_section = Some(name.trim().to_owned());
                sections
                    .entry(name.trim().to_owned())
                    .or_insert_with(IndexMap::new);
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| BuckConfigError::ParsingError(line.to_owned()))?;
            let section = current_section
                .as_ref()
                .ok_or_else(|| BuckConfigError::EntryOutsideOfSection(line.to_owned()))?;
            sections
                .entry(section.clone())
                .or_insert_with(IndexMap::new)
                .insert(key.trim().to_owned(), value.trim().to_owned());
        }

        Ok(BuckConfig { sections })
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    /// The target an alias maps to, if the alias is defined.
    pub fn build_target_for_alias(&self, alias: &str) -> Option<&str> {
        self.get("alias", alias)
    }

    pub fn build_file_name(&self) -> BuildFileName {
        match self.get("buildfile", "name") {
            Some(name) => BuildFileName::new(name.to_owned()),
            None => BuildFileName::default(),
        }
    }

    /// The includes every build file is evaluated with.
    pub fn default_includes(&self) -> Vec<String> {
        match self.get("buildfile", "includes") {
            Some(includes) => includes.split_whitespace().map(str::to_owned).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuckConfig;

    #[test]
    fn test_sections_and_comments() -> anyhow::Result<()> {
        let config = BuckConfig::parse(
            "# project configuration\n\
             [alias]\n\
             app = //java/com/acme:app\n\
             tests = //javatests/com/acme:tests\n\
             ; more\n\
             [buildfile]\n\
             includes = //defs/DEFS //defs/MORE_DEFS\n",
        )?;
        assert_eq!(
            Some("//java/com/acme:app"),
            config.build_target_for_alias("app")
        );
        assert_eq!(None, config.build_target_for_alias("nope"));
        assert_eq!(
            vec!["//defs/DEFS", "//defs/MORE_DEFS"],
            config.default_includes()
        );
        assert_eq!("BUCK", config.build_file_name().as_str());
        Ok(())
    }

    #[test]
    fn test_build_file_name_override() -> anyhow::Result<()> {
        let config = BuckConfig::parse("[buildfile]\nname = BUILD\n")?;
        assert_eq!("BUILD", config.build_file_name().as_str());
        Ok(())
    }

    #[test]
    fn test_bad_lines_are_rejected() {
        assert!(BuckConfig::parse("[alias\napp = //a:a\n").is_err());
        assert!(BuckConfig::parse("[alias]\nthis is not an entry\n").is_err());
        assert!(BuckConfig::parse("orphan = value\n").is_err());
    }
}
