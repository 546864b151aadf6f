/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use buck1_core::build_file_tree::BuildFileTree;
use buck1_core::buck_paths::BuckPaths;
use buck1_core::buck_paths::BuildFileName;
use buck1_core::fs::project::ProjectFilesystem;
use buck1_core::target::BuildTarget;
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::loader::RawRuleLoader;
use crate::parser::Parser;

/// A dependency graph restricted to some targets and everything they
/// transitively depend on, along with the targets themselves.
pub struct PartialGraph {
    graph: DependencyGraph,
    targets: Vec<BuildTarget>,
}

impl PartialGraph {
    /// Builds the graph of the whole project: every build file under the
    /// project root is parsed and every target it declares becomes a seed.
    pub fn create_full_graph(
        filesystem: ProjectFilesystem,
        build_file_name: BuildFileName,
        buck_paths: &BuckPaths,
        raw_rule_loader: Box<dyn RawRuleLoader>,
        default_includes: &[String],
    ) -> anyhow::Result<PartialGraph> {
        let build_files = filesystem.find_build_files(&build_file_name, buck_paths)?;
        debug!("Found {} build files", build_files.len());

        let build_file_tree = BuildFileTree::from_build_files(build_files.iter().map(|f| f.as_ref()));
        let mut parser = Parser::new(filesystem, build_file_tree, build_file_name, raw_rule_loader);
        for build_file in &build_files {
            parser.parse_build_file(build_file, default_includes)?;
        }

        let targets = parser.known_targets();
        let graph = parser.parse_build_files_for_targets(&targets, default_includes)?;
        Ok(PartialGraph { graph, targets })
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Every target of the graph, in declaration order.
    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use buck1_core::buck_paths::BuckPaths;
    use buck1_core::buck_paths::BuildFileName;
    use buck1_core::fs::project::ProjectFilesystem;

    use crate::loader::JsonRuleLoader;
    use crate::partial_graph::PartialGraph;

    fn full_graph(root: &std::path::Path) -> anyhow::Result<PartialGraph> {
        let filesystem = ProjectFilesystem::new(root.to_path_buf());
        let loader = JsonRuleLoader::new(
            filesystem.clone(),
            BuildFileName::default(),
            BuckPaths::default(),
        );
        PartialGraph::create_full_graph(
            filesystem,
            BuildFileName::default(),
            &BuckPaths::default(),
            Box::new(loader),
            &[],
        )
    }

    #[test]
    fn test_full_graph_covers_every_declared_target() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::create_dir_all(temp.path().join("app"))?;
        fs::create_dir_all(temp.path().join("lib"))?;
        fs::write(
            temp.path().join("app/BUCK"),
            r#"[{"type": "java_binary", "name": "bin", "deps": ["//lib:core"]}]"#,
        )?;
        fs::write(
            temp.path().join("lib/BUCK"),
            r#"[
                {"type": "java_library", "name": "core", "srcs": ["Core.java"]},
                {"type": "java_library", "name": "orphan"}
            ]"#,
        )?;

        let graph = full_graph(temp.path())?;
        let mut names: Vec<String> = graph
            .graph()
            .nodes()
            .map(|r| r.fully_qualified_name())
            .collect();
        names.sort();
        assert_eq!(vec!["//app:bin", "//lib:core", "//lib:orphan"], names);
        assert_eq!(3, graph.targets().len());
        assert_eq!(1, graph.graph().edge_count());
        Ok(())
    }

    #[test]
    fn test_empty_project() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let graph = full_graph(temp.path())?;
        assert_eq!(0, graph.graph().node_count());
        assert!(graph.targets().is_empty());
        Ok(())
    }
}
