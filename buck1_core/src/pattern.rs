/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Parsing of target strings as they appear on the command line and in the
//! `deps` of build rules.
//!
//! A target string is either fully qualified, `//java/com/acme:util`, or
//! relative to the package it appears in, `:util`. Which forms are legal
//! depends on where the string came from; that is what 'ParseContext'
//! captures.

use thiserror::Error;

use crate::buck_paths::BuildFileName;
use crate::fs::paths::ProjectRelativePath;
use crate::target::BuildTarget;

#[derive(Error, Debug)]
pub enum BuildTargetParseError {
    #[error("Cannot parse build target `{0}`: it must contain a colon.")]
    MissingColon(String),
    #[error("Cannot parse build target `{0}`: targets here must start with `//`.")]
    RelativeTargetNotAllowed(String),
    #[error("Cannot parse build target `{0}`: the part before the colon must start with `//`.")]
    BaseNameMissingSlashes(String),
    #[error("Cannot parse build target `{0}`: `{1}` is not a valid base path.")]
    InvalidBasePath(String, String),
    #[error("Cannot parse build target `{0}`: the target name is empty.")]
    EmptyShortName(String),
    #[error("Cannot parse build target `{0}`: the target name contains `{1}`.")]
    InvalidShortName(String, char),
}

/// Where a target string was written, for the purpose of resolving the
/// relative form. Strings parsed under [`ParseContext::fully_qualified`]
/// (command-line arguments, aliases) must spell out the whole target;
/// strings parsed under [`ParseContext::for_base_name`] (the `deps` of a
/// rule) may use `:name` to refer to a sibling.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseContext {
    base_name: Option<String>,
}

impl ParseContext {
    pub fn fully_qualified() -> Self {
        ParseContext { base_name: None }
    }

    pub fn for_base_name(base_name: &str) -> Self {
        debug_assert!(base_name.starts_with("//"), "bad base name: {}", base_name);
        ParseContext {
            base_name: Some(base_name.to_owned()),
        }
    }
}

/// Parses target strings to 'BuildTarget's.
///
/// No filesystem check happens here; whether the named target exists is only
/// discovered when its build file is loaded.
#[derive(Clone, Debug)]
pub struct BuildTargetParser {
    build_file_name: BuildFileName,
}

impl BuildTargetParser {
    pub fn new(build_file_name: BuildFileName) -> Self {
        BuildTargetParser { build_file_name }
    }

    pub fn build_file_name(&self) -> &BuildFileName {
        &self.build_file_name
    }

    pub fn parse(&self, target: &str, ctx: &ParseContext) -> anyhow::Result<BuildTarget> {
        let fully_qualified = if let Some(relative) = target.strip_prefix(':') {
            match &ctx.base_name {
                Some(base_name) => format!("{}:{}", base_name, relative),
                None => {
                    return Err(
                        BuildTargetParseError::RelativeTargetNotAllowed(target.to_owned()).into(),
                    );
                }
            }
        } else if !target.starts_with("//") {
            let err = if target.contains(':') {
                BuildTargetParseError::BaseNameMissingSlashes(target.to_owned())
            } else {
                BuildTargetParseError::MissingColon(target.to_owned())
            };
            return Err(err.into());
        } else {
            target.to_owned()
        };

        // Split on the last colon so that short names may themselves not
        // introduce one.
        let (base_name, short_name) = match fully_qualified.rsplit_once(':') {
            Some(split) => split,
            None => return Err(BuildTargetParseError::MissingColon(target.to_owned()).into()),
        };
        if !base_name.starts_with("//") {
            return Err(BuildTargetParseError::BaseNameMissingSlashes(target.to_owned()).into());
        }
        if short_name.is_empty() {
            return Err(BuildTargetParseError::EmptyShortName(target.to_owned()).into());
        }
        if let Some(bad) = short_name.chars().find(|c| matches!(c, ':' | '/')) {
            return Err(BuildTargetParseError::InvalidShortName(target.to_owned(), bad).into());
        }

        let base_path = ProjectRelativePath::new(&base_name[2..]).map_err(|_| {
            BuildTargetParseError::InvalidBasePath(target.to_owned(), base_name[2..].to_owned())
        })?;
        let build_file_path =
            base_path.join(ProjectRelativePath::unchecked_new(self.build_file_name.as_str()));

        Ok(BuildTarget::new(
            build_file_path,
            base_name.to_owned(),
            short_name.to_owned(),
        ))
    }
}
