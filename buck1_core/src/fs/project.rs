/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! The filesystem as seen from the project root. All paths handed to the
//! parsing layers are project-relative; this is the one place that resolves
//! them against the real root.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use gazebo::prelude::*;

use crate::buck_paths::BuckPaths;
use crate::buck_paths::BuildFileName;
use crate::fs::paths::ProjectRelativePath;
use crate::fs::paths::ProjectRelativePathBuf;

/// A filesystem rooted at the project root.
#[derive(Clone, Dupe, Debug)]
pub struct ProjectFilesystem {
    root: Arc<PathBuf>,
}

impl ProjectFilesystem {
    pub fn new(root: PathBuf) -> Self {
        ProjectFilesystem {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a project-relative path against the project root.
    pub fn resolve<P: AsRef<ProjectRelativePath>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if path.is_empty() {
            self.root.to_path_buf()
        } else {
            self.root.join(path.as_path())
        }
    }

    pub fn exists<P: AsRef<ProjectRelativePath>>(&self, path: P) -> bool {
        self.resolve(path).exists()
    }

    /// Enumerates every build-definition file under the project root, in a
    /// stable order. The output directory and dot-directories are never
    /// descended into.
    pub fn find_build_files(
        &self,
        build_file_name: &BuildFileName,
        buck_paths: &BuckPaths,
    ) -> anyhow::Result<Vec<ProjectRelativePathBuf>> {
        let mut build_files = Vec::new();
        let walk = walkdir::WalkDir::new(self.root.as_path())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') && entry.depth() > 0 {
                    return false;
                }
                match self.relativize(entry.path()) {
                    Ok(relative) => !relative.starts_with(buck_paths.output_dir()),
                    Err(_) => false,
                }
            });
        for entry in walk {
            let entry = entry.context("walking the project root")?;
            if entry.file_type().is_file()
                && entry.file_name().to_str() == Some(build_file_name.as_str())
            {
                build_files.push(self.relativize(entry.path())?);
            }
        }
        Ok(build_files)
    }

    fn relativize(&self, path: &Path) -> anyhow::Result<ProjectRelativePathBuf> {
        let relative = path.strip_prefix(self.root.as_path()).with_context(|| {
            format!(
                "path `{}` is not under the project root `{}`",
                path.display(),
                self.root.display()
            )
        })?;
        ProjectRelativePathBuf::try_from(relative)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::buck_paths::BuckPaths;
    use crate::buck_paths::BuildFileName;
    use crate::fs::project::ProjectFilesystem;

    #[test]
    fn test_find_build_files_skips_output_and_dot_dirs() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        for dir in ["java/com/acme", "lib", "buck-out/gen/lib", ".git"] {
            fs::create_dir_all(root.join(dir))?;
        }
        for file in [
            "BUCK",
            "java/com/acme/BUCK",
            "lib/BUCK",
            "buck-out/gen/lib/BUCK",
            ".git/BUCK",
        ] {
            fs::write(root.join(file), "[]")?;
        }

        let fs = ProjectFilesystem::new(root.to_path_buf());
        let found = fs.find_build_files(&BuildFileName::default(), &BuckPaths::default())?;
        let found = found.iter().map(|p| p.as_str()).collect::<Vec<_>>();
        assert_eq!(vec!["BUCK", "java/com/acme/BUCK", "lib/BUCK"], found);
        Ok(())
    }
}
