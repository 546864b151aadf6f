/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::str::FromStr;

use gazebo::prelude::*;
use thiserror::Error;

/// The closed set of rule types the tool knows how to build.
///
/// The tag is what appears as the `type` attribute of a raw rule and as the
/// argument of `targets --type`; it matches case-insensitively.
#[derive(Copy, Clone, Dupe, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum BuildRuleType {
    ExportFile,
    Genrule,
    JavaBinary,
    JavaLibrary,
    JavaTest,
    PrebuiltJar,
    ShTest,
}

#[derive(Error, Debug)]
#[error("Unrecognized rule type: {0}")]
pub struct UnknownRuleTypeError(pub String);

impl BuildRuleType {
    pub const ALL: &'static [BuildRuleType] = &[
        BuildRuleType::ExportFile,
        BuildRuleType::Genrule,
        BuildRuleType::JavaBinary,
        BuildRuleType::JavaLibrary,
        BuildRuleType::JavaTest,
        BuildRuleType::PrebuiltJar,
        BuildRuleType::ShTest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildRuleType::ExportFile => "export_file",
            BuildRuleType::Genrule => "genrule",
            BuildRuleType::JavaBinary => "java_binary",
            BuildRuleType::JavaLibrary => "java_library",
            BuildRuleType::JavaTest => "java_test",
            BuildRuleType::PrebuiltJar => "prebuilt_jar",
            BuildRuleType::ShTest => "sh_test",
        }
    }
}

impl std::fmt::Display for BuildRuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildRuleType {
    type Err = UnknownRuleTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
            .copied()
            .ok_or_else(|| UnknownRuleTypeError(tag.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::rule_type::BuildRuleType;

    #[test]
    fn test_tags_round_trip() {
        for rule_type in BuildRuleType::ALL {
            assert_eq!(
                *rule_type,
                BuildRuleType::from_str(rule_type.as_str()).unwrap()
            );
        }
    }

    #[test]
    fn test_tag_matching_is_case_insensitive() {
        assert_eq!(
            BuildRuleType::JavaLibrary,
            BuildRuleType::from_str("JAVA_LIBRARY").unwrap()
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = BuildRuleType::from_str("rust_library").unwrap_err();
        assert_eq!("Unrecognized rule type: rust_library", err.to_string());
    }
}
