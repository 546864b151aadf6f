/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::fs::File;
use std::io::BufReader;

use anyhow::Context;
use buck1_core::buck_paths::BuckPaths;
use buck1_core::buck_paths::BuildFileName;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::project::ProjectFilesystem;
use buck1_node::raw_rule;
use buck1_node::raw_rule::RawRule;
use serde_json::Map;
use serde_json::Value;

/// The interface to the build-file evaluator. Evaluation itself (running the
/// macros and functions a build file may use) is not this crate's concern;
/// the parser only consumes the resulting list of attribute maps.
pub trait RawRuleLoader {
    /// Returns the raw rules of one build file, or of every build file of
    /// the project when `build_file` is `None`. Each returned rule carries at
    /// least `type`, `name` and `buck_base_path`.
    fn get_all_rules(
        &self,
        build_file: Option<&ProjectRelativePath>,
        default_includes: &[String],
    ) -> anyhow::Result<Vec<RawRule>>;
}

/// Reads build files that the evaluator has already rendered to a JSON array
/// of attribute maps. `buck_base_path` is filled in from the build file's
/// directory when the evaluator left it out.
///
/// `default_includes` are an evaluator concern and are ignored here: by the
/// time a file is in this form, its includes have been expanded.
pub struct JsonRuleLoader {
    filesystem: ProjectFilesystem,
    build_file_name: BuildFileName,
    buck_paths: BuckPaths,
}

impl JsonRuleLoader {
    pub fn new(
        filesystem: ProjectFilesystem,
        build_file_name: BuildFileName,
        buck_paths: BuckPaths,
    ) -> Self {
        JsonRuleLoader {
            filesystem,
            build_file_name,
            buck_paths,
        }
    }

    fn rules_of_file(&self, build_file: &ProjectRelativePath) -> anyhow::Result<Vec<RawRule>> {
        let path = self.filesystem.resolve(build_file);
        let file = File::open(&path)
            .with_context(|| format!("opening build file `{}`", build_file))?;
        // The reader is scoped to this call; it is closed when it drops, on
        // the error paths included.
        let attr_maps: Vec<Map<String, Value>> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decoding build file `{}`", build_file))?;

        let base_path = build_file
            .parent()
            .unwrap_or_else(|| ProjectRelativePath::unchecked_new(""));
        attr_maps
            .into_iter()
            .map(|mut attrs| {
                attrs
                    .entry(raw_rule::BASE_PATH.to_owned())
                    .or_insert_with(|| Value::String(base_path.as_str().to_owned()));
                RawRule::new(attrs)
                    .with_context(|| format!("in build file `{}`", build_file))
            })
            .collect()
    }
}

impl RawRuleLoader for JsonRuleLoader {
    fn get_all_rules(
        &self,
        build_file: Option<&ProjectRelativePath>,
        _default_includes: &[String],
    ) -> anyhow::Result<Vec<RawRule>> {
        match build_file {
            Some(build_file) => self.rules_of_file(build_file),
            None => {
                let mut rules = Vec::new();
                for build_file in self
                    .filesystem
                    .find_build_files(&self.build_file_name, &self.buck_paths)?
                {
                    rules.extend(self.rules_of_file(&build_file)?);
                }
                Ok(rules)
            }
        }
    }
}
