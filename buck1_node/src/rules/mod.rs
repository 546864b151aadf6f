/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Rule construction is two-phase. Parsing a build file produces a
//! 'BuildRuleBuilder' per rule: a half-constructed rule that still refers to
//! its dependencies by the strings written in the build file. Once every
//! dependency has itself been built, the builder is finalized into a
//! 'BuildRule' whose dep set points at the already-built rules of the index.
//! Post-order traversal of the target graph guarantees the index is complete
//! at the time each builder runs.

pub mod described;

use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use buck1_core::buck_paths::BuckPaths;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_core::target::BuildTarget;
use indexmap::IndexMap;

use crate::rule_type::BuildRuleType;

/// Already-built rules, keyed by fully qualified name.
pub type RuleIndex = IndexMap<String, Arc<BuildRule>>;

/// A half-constructed rule: knows its target and the dep strings written in
/// its build file, and can be finalized once those deps are built.
pub trait BuildRuleBuilder: std::fmt::Debug {
    fn build_target(&self) -> &BuildTarget;

    /// The dep strings exactly as written in the build file, unresolved.
    fn deps(&self) -> &[String];

    /// Finalizes the rule. Every dep of this rule must already be present in
    /// `rule_index`.
    fn build(&self, rule_index: &RuleIndex) -> anyhow::Result<BuildRule>;
}

/// What every built rule carries: its target, its resolved deps, and the
/// source files it reads (paths under the project root).
#[derive(Debug)]
pub struct RuleBase {
    pub target: BuildTarget,
    pub deps: Vec<Arc<BuildRule>>,
    pub inputs: Vec<ProjectRelativePathBuf>,
}

/// A fully materialized build rule, one variant per rule type.
#[derive(Debug)]
pub enum BuildRule {
    ExportFile(ExportFileRule),
    Genrule(Genrule),
    JavaBinary(JavaBinaryRule),
    JavaLibrary(JavaLibraryRule),
    JavaTest(JavaTestRule),
    PrebuiltJar(PrebuiltJarRule),
    ShTest(ShTestRule),
}

#[derive(Debug)]
pub struct ExportFileRule {
    pub base: RuleBase,
    /// The exported file; defaults to the target name.
    pub src: ProjectRelativePathBuf,
}

#[derive(Debug)]
pub struct Genrule {
    pub base: RuleBase,
    pub cmd: String,
    pub out: String,
}

impl Genrule {
    /// Where the generated file is written: under the gen directory,
    /// mirroring the rule's package.
    pub fn output_path(&self, buck_paths: &BuckPaths) -> ProjectRelativePathBuf {
        buck_paths
            .gen_dir()
            .join(self.base.target.base_path())
            .join(ProjectRelativePath::unchecked_new(&self.out))
    }
}

#[derive(Debug)]
pub struct JavaBinaryRule {
    pub base: RuleBase,
    pub main_class: Option<String>,
}

#[derive(Debug)]
pub struct JavaLibraryRule {
    pub base: RuleBase,
}

#[derive(Debug)]
pub struct JavaTestRule {
    pub base: RuleBase,
}

#[derive(Debug)]
pub struct PrebuiltJarRule {
    pub base: RuleBase,
    pub binary_jar: ProjectRelativePathBuf,
}

#[derive(Debug)]
pub struct ShTestRule {
    pub base: RuleBase,
    pub test: ProjectRelativePathBuf,
}

impl BuildRule {
    fn base(&self) -> &RuleBase {
        match self {
            BuildRule::ExportFile(r) => &r.base,
            BuildRule::Genrule(r) => &r.base,
            BuildRule::JavaBinary(r) => &r.base,
            BuildRule::JavaLibrary(r) => &r.base,
            BuildRule::JavaTest(r) => &r.base,
            BuildRule::PrebuiltJar(r) => &r.base,
            BuildRule::ShTest(r) => &r.base,
        }
    }

    pub fn rule_type(&self) -> BuildRuleType {
        match self {
            BuildRule::ExportFile(_) => BuildRuleType::ExportFile,
            BuildRule::Genrule(_) => BuildRuleType::Genrule,
            BuildRule::JavaBinary(_) => BuildRuleType::JavaBinary,
            BuildRule::JavaLibrary(_) => BuildRuleType::JavaLibrary,
            BuildRule::JavaTest(_) => BuildRuleType::JavaTest,
            BuildRule::PrebuiltJar(_) => BuildRuleType::PrebuiltJar,
            BuildRule::ShTest(_) => BuildRuleType::ShTest,
        }
    }

    pub fn build_target(&self) -> &BuildTarget {
        &self.base().target
    }

    pub fn fully_qualified_name(&self) -> String {
        self.build_target().fully_qualified_name()
    }

    /// The rules this rule depends on; every entry is shared with the rule
    /// index the rule was built against.
    pub fn deps(&self) -> &[Arc<BuildRule>] {
        &self.base().deps
    }

    /// The source files this rule reads, as paths under the project root.
    pub fn inputs(&self) -> &[ProjectRelativePathBuf] {
        &self.base().inputs
    }
}

/// Identity of a built rule is its target: at most one rule exists per
/// fully qualified name.
impl PartialEq for BuildRule {
    fn eq(&self, other: &Self) -> bool {
        self.build_target() == other.build_target()
    }
}

impl Eq for BuildRule {}

impl Hash for BuildRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.build_target().hash(state);
    }
}
