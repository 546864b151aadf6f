/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_core::pattern::BuildTargetParser;
use buck1_core::pattern::ParseContext;
use buck1_core::target::BuildTarget;
use gazebo::prelude::*;
use thiserror::Error;

use crate::rules::BuildRule;
use crate::rules::BuildRuleBuilder;
use crate::rules::ExportFileRule;
use crate::rules::Genrule;
use crate::rules::JavaBinaryRule;
use crate::rules::JavaLibraryRule;
use crate::rules::JavaTestRule;
use crate::rules::PrebuiltJarRule;
use crate::rules::RuleBase;
use crate::rules::RuleIndex;
use crate::rules::ShTestRule;

#[derive(Error, Debug)]
enum DescribedRuleError {
    #[error("{0} depends on {1}, which has not been built yet (internal error)")]
    DepNotBuilt(BuildTarget, BuildTarget),
}

/// The attributes that distinguish one rule type from another once the
/// common ones (deps, srcs) are extracted. One variant per entry of the
/// factory table.
#[derive(Debug)]
pub enum RuleDescription {
    ExportFile { src: ProjectRelativePathBuf },
    Genrule { cmd: String, out: String },
    JavaBinary { main_class: Option<String> },
    JavaLibrary,
    JavaTest,
    PrebuiltJar { binary_jar: ProjectRelativePathBuf },
    ShTest { test: ProjectRelativePathBuf },
}

/// The one builder implementation behind every built-in rule type: the
/// factories differ only in how they describe the rule, not in how deps are
/// resolved or the rule is finalized.
#[derive(Debug)]
pub struct DescribedRuleBuilder {
    target: BuildTarget,
    deps: Vec<String>,
    inputs: Vec<ProjectRelativePathBuf>,
    description: RuleDescription,
    target_parser: BuildTargetParser,
}

impl DescribedRuleBuilder {
    pub fn new(
        target: BuildTarget,
        deps: Vec<String>,
        inputs: Vec<ProjectRelativePathBuf>,
        description: RuleDescription,
        target_parser: BuildTargetParser,
    ) -> Self {
        DescribedRuleBuilder {
            target,
            deps,
            inputs,
            description,
            target_parser,
        }
    }
}

impl BuildRuleBuilder for DescribedRuleBuilder {
    fn build_target(&self) -> &BuildTarget {
        &self.target
    }

    fn deps(&self) -> &[String] {
        &self.deps
    }

    fn build(&self, rule_index: &RuleIndex) -> anyhow::Result<BuildRule> {
        let parse_context = ParseContext::for_base_name(self.target.base_name());
        let mut deps = Vec::with_capacity(self.deps.len());
        for dep in &self.deps {
            let dep_target = self.target_parser.parse(dep, &parse_context)?;
            let dep_rule = rule_index
                .get(&dep_target.fully_qualified_name())
                .ok_or_else(|| {
                    DescribedRuleError::DepNotBuilt(self.target.dupe(), dep_target.dupe())
                })?;
            deps.push(dep_rule.dupe());
        }

        let base = RuleBase {
            target: self.target.dupe(),
            deps,
            inputs: self.inputs.clone(),
        };
        Ok(match &self.description {
            RuleDescription::ExportFile { src } => BuildRule::ExportFile(ExportFileRule {
                base,
                src: src.clone(),
            }),
            RuleDescription::Genrule { cmd, out } => BuildRule::Genrule(Genrule {
                base,
                cmd: cmd.clone(),
                out: out.clone(),
            }),
            RuleDescription::JavaBinary { main_class } => BuildRule::JavaBinary(JavaBinaryRule {
                base,
                main_class: main_class.clone(),
            }),
            RuleDescription::JavaLibrary => BuildRule::JavaLibrary(JavaLibraryRule { base }),
            RuleDescription::JavaTest => BuildRule::JavaTest(JavaTestRule { base }),
            RuleDescription::PrebuiltJar { binary_jar } => {
                BuildRule::PrebuiltJar(PrebuiltJarRule {
                    base,
                    binary_jar: binary_jar.clone(),
                })
            }
            RuleDescription::ShTest { test } => BuildRule::ShTest(ShTestRule {
                base,
                test: test.clone(),
            }),
        })
    }
}
