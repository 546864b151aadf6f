/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Names and directories that are conventionally fixed but overridable at
//! process start. These are plain values threaded through construction, not
//! process-wide globals: read the overrides once in `main` and pass the
//! result down.

use derive_more::Display;

use crate::fs::paths::ProjectRelativePath;
use crate::fs::paths::ProjectRelativePathBuf;

/// The name of the build-definition files of the project.
#[derive(Clone, Display, Debug, Eq, PartialEq)]
pub struct BuildFileName(String);

impl BuildFileName {
    pub const DEFAULT: &'static str = "BUCK";

    pub fn new(name: String) -> Self {
        BuildFileName(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BuildFileName {
    fn default() -> Self {
        BuildFileName(Self::DEFAULT.to_owned())
    }
}

/// The directories where generated files are written.
///
/// The `android`, `gen`, `bin` and `annotation` directories default to
/// subdirectories of the output root but can each be relocated via the
/// `buck.buck_android_dir`, `buck.buck_gen_dir`, `buck.buck_bin_dir` and
/// `buck.buck_annotation_dir` properties.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuckPaths {
    output_dir: ProjectRelativePathBuf,
    android_gen_dir: ProjectRelativePathBuf,
    gen_dir: ProjectRelativePathBuf,
    bin_dir: ProjectRelativePathBuf,
    annotation_dir: ProjectRelativePathBuf,
}

const OUTPUT_DIRECTORY: &str = "buck-out";

impl BuckPaths {
    /// Reads the directory overrides from the environment. Call this once at
    /// process start; the result is immutable afterwards.
    pub fn from_env() -> anyhow::Result<BuckPaths> {
        let output_dir = ProjectRelativePath::new(OUTPUT_DIRECTORY)?.to_buf();
        Ok(BuckPaths {
            android_gen_dir: Self::dir_property("buck.buck_android_dir", &output_dir, "android")?,
            gen_dir: Self::dir_property("buck.buck_gen_dir", &output_dir, "gen")?,
            bin_dir: Self::dir_property("buck.buck_bin_dir", &output_dir, "bin")?,
            annotation_dir: Self::dir_property(
                "buck.buck_annotation_dir",
                &output_dir,
                "annotation",
            )?,
            output_dir,
        })
    }

    fn dir_property(
        property: &str,
        output_dir: &ProjectRelativePath,
        subdir: &str,
    ) -> anyhow::Result<ProjectRelativePathBuf> {
        match std::env::var_os(property) {
            Some(value) => {
                let value = value
                    .into_string()
                    .map_err(|_| anyhow::anyhow!("${} is not utf-8", property))?;
                Ok(ProjectRelativePath::new(value.as_str())?.to_buf())
            }
            None => Ok(output_dir.join(ProjectRelativePath::new(subdir)?)),
        }
    }

    pub fn output_dir(&self) -> &ProjectRelativePath {
        &self.output_dir
    }

    pub fn android_gen_dir(&self) -> &ProjectRelativePath {
        &self.android_gen_dir
    }

    pub fn gen_dir(&self) -> &ProjectRelativePath {
        &self.gen_dir
    }

    pub fn bin_dir(&self) -> &ProjectRelativePath {
        &self.bin_dir
    }

    pub fn annotation_dir(&self) -> &ProjectRelativePath {
        &self.annotation_dir
    }
}

impl Default for BuckPaths {
    fn default() -> Self {
        let output_dir = ProjectRelativePathBuf::unchecked_new(OUTPUT_DIRECTORY.to_owned());
        BuckPaths {
            android_gen_dir: output_dir.join(ProjectRelativePath::unchecked_new("android")),
            gen_dir: output_dir.join(ProjectRelativePath::unchecked_new("gen")),
            bin_dir: output_dir.join(ProjectRelativePath::unchecked_new("bin")),
            annotation_dir: output_dir.join(ProjectRelativePath::unchecked_new("annotation")),
            output_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::buck_paths::BuckPaths;

    #[test]
    fn test_default_directories() {
        let paths = BuckPaths::default();
        assert_eq!("buck-out", paths.output_dir().as_str());
        assert_eq!("buck-out/android", paths.android_gen_dir().as_str());
        assert_eq!("buck-out/gen", paths.gen_dir().as_str());
        assert_eq!("buck-out/bin", paths.bin_dir().as_str());
        assert_eq!("buck-out/annotation", paths.annotation_dir().as_str());
    }
}
