/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Which package owns a path. A directory belongs to the package of the
//! nearest ancestor (or itself) that has a build-definition file; everything
//! below that directory, down to the next build file, is part of the same
//! package.

use sequence_trie::SequenceTrie;

use crate::fs::paths::ProjectRelativePath;
use crate::fs::paths::ProjectRelativePathBuf;
use crate::target::BuildTarget;

/// A lookup structure from a path to the base path of the package that owns
/// it, built from the set of base paths known to have build files.
#[derive(Debug, Default)]
pub struct BuildFileTree {
    base_paths: SequenceTrie<String, ProjectRelativePathBuf>,
}

impl BuildFileTree {
    /// Builds the tree from the base paths of already-parsed targets.
    pub fn from_targets<'a>(targets: impl IntoIterator<Item = &'a BuildTarget>) -> Self {
        Self::from_base_paths(targets.into_iter().map(|t| t.base_path().to_buf()))
    }

    /// Builds the tree from the directories of the build files found on disk.
    pub fn from_build_files<'a>(
        build_files: impl IntoIterator<Item = &'a ProjectRelativePath>,
    ) -> Self {
        Self::from_base_paths(
            build_files
                .into_iter()
                .filter_map(|f| f.parent())
                .map(|p| p.to_buf()),
        )
    }

    pub fn from_base_paths(base_paths: impl IntoIterator<Item = ProjectRelativePathBuf>) -> Self {
        let mut trie = SequenceTrie::new();
        for base_path in base_paths {
            let components: Vec<String> = base_path.iter().map(str::to_owned).collect();
            trie.insert(components.iter(), base_path);
        }
        BuildFileTree { base_paths: trie }
    }

    /// Returns the base path of the package that owns `path`: the deepest
    /// known base path that is a prefix of it. `None` when no ancestor of
    /// `path` has a build file.
    pub fn base_path_of_ancestor_target(
        &self,
        path: &ProjectRelativePath,
    ) -> Option<&ProjectRelativePath> {
        let components: Vec<String> = path.iter().map(str::to_owned).collect();
        self.base_paths
            .get_ancestor(components.iter())
            .map(|p| p.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use crate::build_file_tree::BuildFileTree;
    use crate::fs::paths::ProjectRelativePath;
    use crate::fs::paths::ProjectRelativePathBuf;

    fn tree(base_paths: &[&str]) -> BuildFileTree {
        BuildFileTree::from_base_paths(
            base_paths
                .iter()
                .map(|p| ProjectRelativePathBuf::unchecked_new((*p).to_owned())),
        )
    }

    fn lookup<'a>(tree: &'a BuildFileTree, path: &str) -> Option<&'a str> {
        tree.base_path_of_ancestor_target(ProjectRelativePath::unchecked_new(path))
            .map(|p| p.as_str())
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let t = tree(&["", "java", "java/com/acme"]);
        assert_eq!(Some("java/com/acme"), lookup(&t, "java/com/acme/A.java"));
        assert_eq!(Some("java"), lookup(&t, "java/com/B.java"));
        assert_eq!(Some("java"), lookup(&t, "java/com"));
        assert_eq!(Some(""), lookup(&t, "third_party/C.java"));
    }

    #[test]
    fn test_no_owning_package() {
        let t = tree(&["lib"]);
        assert_eq!(None, lookup(&t, "app/Main.java"));
        assert_eq!(Some("lib"), lookup(&t, "lib/Core.java"));
    }
}
