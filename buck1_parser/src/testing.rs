/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Helpers for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_node::raw_rule::RawRule;
use thiserror::Error;

use crate::loader::RawRuleLoader;

#[derive(Error, Debug)]
#[error("No build file at {0}")]
pub struct NoSuchBuildFileError(ProjectRelativePathBuf);

/// Which build files an in-memory loader has read, in order. Handles stay
/// valid after the loader itself moves into a parser.
#[derive(Clone, Default)]
pub struct LoadLog(Rc<RefCell<Vec<ProjectRelativePathBuf>>>);

impl LoadLog {
    pub fn paths(&self) -> Vec<ProjectRelativePathBuf> {
        self.0.borrow().clone()
    }

    pub fn loads_of(&self, path: &str) -> usize {
        self.0.borrow().iter().filter(|p| p.as_str() == path).count()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn record(&self, path: ProjectRelativePathBuf) {
        self.0.borrow_mut().push(path);
    }
}

/// An in-memory [`RawRuleLoader`]: build files are registered up front and
/// every load is recorded, so tests can assert on what was read and how
/// often.
#[derive(Default)]
pub struct FakeRuleLoader {
    build_files: HashMap<ProjectRelativePathBuf, Vec<RawRule>>,
    log: LoadLog,
}

impl FakeRuleLoader {
    pub fn new() -> FakeRuleLoader {
        FakeRuleLoader::default()
    }

    pub fn add_build_file(mut self, path: &str, rules: serde_json::Value) -> FakeRuleLoader {
        self.build_files.insert(
            ProjectRelativePathBuf::unchecked_new(path.to_owned()),
            raw_rules(rules),
        );
        self
    }

    pub fn log(&self) -> LoadLog {
        self.log.clone()
    }

    /// The registered build files, for seeding a build-file tree.
    pub fn build_files(&self) -> Vec<ProjectRelativePathBuf> {
        self.build_files.keys().cloned().collect()
    }
}

impl RawRuleLoader for FakeRuleLoader {
    fn get_all_rules(
        &self,
        build_file: Option<&ProjectRelativePath>,
        _default_includes: &[String],
    ) -> anyhow::Result<Vec<RawRule>> {
        match build_file {
            Some(build_file) => {
                self.log.record(build_file.to_buf());
                match self.build_files.get(build_file) {
                    Some(rules) => Ok(rules.clone()),
                    None => Err(NoSuchBuildFileError(build_file.to_buf()).into()),
                }
            }
            None => Ok(self.build_files.values().flatten().cloned().collect()),
        }
    }
}

/// Decodes a JSON array literal into raw rules.
pub fn raw_rules(value: serde_json::Value) -> Vec<RawRule> {
    match value {
        serde_json::Value::Array(values) => values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::Object(map) => RawRule::new(map).unwrap(),
                _ => panic!("raw rules are JSON objects"),
            })
            .collect(),
        _ => panic!("raw rules come as a JSON array"),
    }
}
