/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use derive_more::Display;
use gazebo::prelude::*;

use crate::fs::paths::ProjectRelativePath;
use crate::fs::paths::ProjectRelativePathBuf;

/// A 'BuildTarget' uniquely names one rule of the project.
///
/// It is the triple of the build-definition file that must declare the rule,
/// the base name of the package the file sits in (always starting with `//`),
/// and the short name the rule was given in its `name` attribute. The
/// fully qualified name `//base/path:short_name` is what appears in error
/// messages, on the command line, and as the key of every rule index.
#[derive(Clone, Dupe, Display, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display(fmt = "{}:{}", "self.base_name()", "self.short_name()")]
pub struct BuildTarget(Arc<BuildTargetData>);

#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
struct BuildTargetData {
    base_name: String,
    short_name: String,
    build_file_path: ProjectRelativePathBuf,
}

impl BuildTarget {
    pub fn new(
        build_file_path: ProjectRelativePathBuf,
        base_name: String,
        short_name: String,
    ) -> Self {
        debug_assert!(base_name.starts_with("//"), "bad base name: {}", base_name);
        BuildTarget(Arc::new(BuildTargetData {
            base_name,
            short_name,
            build_file_path,
        }))
    }

    /// The base name of the target, e.g. `//java/com/acme`.
    pub fn base_name(&self) -> &str {
        &self.0.base_name
    }

    /// The base name as a path under the project root, e.g. `java/com/acme`.
    pub fn base_path(&self) -> &ProjectRelativePath {
        ProjectRelativePath::unchecked_new(&self.0.base_name[2..])
    }

    pub fn short_name(&self) -> &str {
        &self.0.short_name
    }

    /// The build-definition file that must declare this target.
    pub fn build_file_path(&self) -> &ProjectRelativePath {
        &self.0.build_file_path
    }

    pub fn fully_qualified_name(&self) -> String {
        self.to_string()
    }
}
