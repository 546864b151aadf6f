/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! The rule registry: a fixed table from rule type to the factory that turns
//! a raw rule of that type into a builder. The table is constructed once at
//! startup and covers exactly the closed set of built-in rule types.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::Context;
use buck1_core::build_file_tree::BuildFileTree;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_core::fs::project::ProjectFilesystem;
use buck1_core::pattern::BuildTargetParser;
use buck1_core::target::BuildTarget;
use thiserror::Error;

use crate::raw_rule::RawRule;
use crate::rule_type::BuildRuleType;
use crate::rules::described::DescribedRuleBuilder;
use crate::rules::described::RuleDescription;
use crate::rules::BuildRuleBuilder;

#[derive(Error, Debug)]
enum FactoryError {
    #[error(
        "In {target}, `{src}` belongs to package `{owner}`; files may only be \
        used by rules of the package that owns them"
    )]
    SrcOutsideOfPackage {
        target: BuildTarget,
        src: ProjectRelativePathBuf,
        owner: String,
    },
}

/// Everything a factory gets to see when materializing one raw rule.
pub struct FactoryParams<'a> {
    pub raw_rule: &'a RawRule,
    pub filesystem: &'a ProjectFilesystem,
    pub build_file_tree: &'a BuildFileTree,
    pub target_parser: &'a BuildTargetParser,
    pub target: BuildTarget,
}

impl<'a> FactoryParams<'a> {
    /// Reads a list-of-paths attribute, resolving each entry against the
    /// rule's base path and checking that it does not reach into another
    /// package.
    fn package_relative_paths(&self, key: &str) -> anyhow::Result<Vec<ProjectRelativePathBuf>> {
        self.raw_rule
            .string_list(key)?
            .into_iter()
            .map(|src| self.package_relative_path(src))
            .collect()
    }

    fn package_relative_path(&self, src: &str) -> anyhow::Result<ProjectRelativePathBuf> {
        let src = ProjectRelativePath::new(src)
            .with_context(|| format!("attribute of {}", self.target))?;
        let resolved = self.target.base_path().join(src);
        if let Some(owner) = self.build_file_tree.base_path_of_ancestor_target(&resolved) {
            if owner != self.target.base_path() {
                return Err(FactoryError::SrcOutsideOfPackage {
                    target: self.target.clone(),
                    src: resolved,
                    owner: format!("//{}", owner),
                }
                .into());
            }
        }
        Ok(resolved)
    }
}

/// Turns one raw rule into a half-constructed rule builder.
pub trait BuildRuleFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>>;
}

/// Maps each rule type to its factory.
pub struct RuleRegistry {
    factories: HashMap<BuildRuleType, Box<dyn BuildRuleFactory>>,
}

impl RuleRegistry {
    // TODO(parser): this will ultimately have to support a plug-in model so
    // users can define their own build rules.
    pub fn with_builtin_rules() -> RuleRegistry {
        let mut factories: HashMap<BuildRuleType, Box<dyn BuildRuleFactory>> = HashMap::new();
        factories.insert(BuildRuleType::ExportFile, Box::new(ExportFileFactory));
        factories.insert(BuildRuleType::Genrule, Box::new(GenruleFactory));
        factories.insert(BuildRuleType::JavaBinary, Box::new(JavaBinaryFactory));
        factories.insert(BuildRuleType::JavaLibrary, Box::new(JavaLibraryFactory));
        factories.insert(BuildRuleType::JavaTest, Box::new(JavaTestFactory));
        factories.insert(BuildRuleType::PrebuiltJar, Box::new(PrebuiltJarFactory));
        factories.insert(BuildRuleType::ShTest, Box::new(ShTestFactory));
        RuleRegistry { factories }
    }

    /// Resolves a raw `type` tag. An unknown tag is a fatal error: it means
    /// the build file declares a rule this binary does not implement.
    pub fn rule_type(&self, tag: &str) -> anyhow::Result<BuildRuleType> {
        Ok(BuildRuleType::from_str(tag)?)
    }

    pub fn factory(&self, rule_type: BuildRuleType) -> anyhow::Result<&dyn BuildRuleFactory> {
        self.factories
            .get(&rule_type)
            .map(|f| f.as_ref())
            .with_context(|| {
                format!(
                    "no factory registered for rule type `{}` (internal error)",
                    rule_type
                )
            })
    }
}

/// Builds the one builder implementation all built-in rules share.
fn described(
    params: FactoryParams<'_>,
    inputs: Vec<ProjectRelativePathBuf>,
    description: RuleDescription,
) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
    let deps = params
        .raw_rule
        .string_list("deps")?
        .into_iter()
        .map(str::to_owned)
        .collect();
    Ok(Box::new(DescribedRuleBuilder::new(
        params.target,
        deps,
        inputs,
        description,
        params.target_parser.clone(),
    )))
}

struct JavaLibraryFactory;

impl BuildRuleFactory for JavaLibraryFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let srcs = params.package_relative_paths("srcs")?;
        described(params, srcs, RuleDescription::JavaLibrary)
    }
}

struct JavaTestFactory;

impl BuildRuleFactory for JavaTestFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let srcs = params.package_relative_paths("srcs")?;
        described(params, srcs, RuleDescription::JavaTest)
    }
}

struct JavaBinaryFactory;

impl BuildRuleFactory for JavaBinaryFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let main_class = params.raw_rule.opt_string("main_class")?.map(str::to_owned);
        described(
            params,
            Vec::new(),
            RuleDescription::JavaBinary { main_class },
        )
    }
}

struct PrebuiltJarFactory;

impl BuildRuleFactory for PrebuiltJarFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let binary_jar = params.package_relative_path(params.raw_rule.string("binary_jar")?)?;
        described(
            params,
            vec![binary_jar.clone()],
            RuleDescription::PrebuiltJar { binary_jar },
        )
    }
}

struct GenruleFactory;

impl BuildRuleFactory for GenruleFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let cmd = params.raw_rule.string("cmd")?.to_owned();
        let out = params.raw_rule.string("out")?.to_owned();
        // `out` lands under the gen directory later, so it has to be a sane
        // relative path now.
        ProjectRelativePath::new(out.as_str())
            .with_context(|| format!("`out` of {}", params.target))?;
        let srcs = params.package_relative_paths("srcs")?;
        described(params, srcs, RuleDescription::Genrule { cmd, out })
    }
}

struct ExportFileFactory;

impl BuildRuleFactory for ExportFileFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        // `src` defaults to the name of the target.
        let src = match params.raw_rule.opt_string("src")? {
            Some(src) => src.to_owned(),
            None => params.target.short_name().to_owned(),
        };
        let src = params.package_relative_path(&src)?;
        described(params, vec![src.clone()], RuleDescription::ExportFile { src })
    }
}

struct ShTestFactory;

impl BuildRuleFactory for ShTestFactory {
    fn new_instance(&self, params: FactoryParams<'_>) -> anyhow::Result<Box<dyn BuildRuleBuilder>> {
        let test = params.package_relative_path(params.raw_rule.string("test")?)?;
        described(params, vec![test.clone()], RuleDescription::ShTest { test })
    }
}
