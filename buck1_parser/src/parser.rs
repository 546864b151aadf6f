/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use buck1_core::build_file_tree::BuildFileTree;
use buck1_core::buck_paths::BuildFileName;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_core::fs::project::ProjectFilesystem;
use buck1_core::pattern::BuildTargetParser;
use buck1_core::pattern::ParseContext;
use buck1_core::target::BuildTarget;
use buck1_node::raw_rule::RawRule;
use buck1_node::registry::FactoryParams;
use buck1_node::registry::RuleRegistry;
use buck1_node::rule_type::BuildRuleType;
use buck1_node::rules::BuildRule;
use buck1_node::rules::BuildRuleBuilder;
use buck1_node::rules::RuleIndex;
use gazebo::prelude::*;
use indexmap::IndexMap;
use indexmap::IndexSet;
use thiserror::Error;
use tracing::info;

use crate::graph::DependencyGraph;
use crate::graph::MutableDirectedGraph;
use crate::loader::RawRuleLoader;
use crate::traversal::traverse;
use crate::traversal::AcyclicDepthFirstPostOrderTraversal;

#[derive(Error, Debug)]
pub enum NoSuchBuildTargetError {
    #[error("No such build target: {0}.")]
    NoSuchBuildTarget(BuildTarget),
    #[error(
        "The build file that should contain {target} has already been parsed ({build_file}), \
        but {target} was not found. Please make sure that {target} is defined in {build_file}."
    )]
    TargetNotFoundInParsedFile {
        target: BuildTarget,
        build_file: ProjectRelativePathBuf,
    },
}

#[derive(Error, Debug)]
#[error("Duplicate definition for {0}")]
pub struct DuplicateTargetError(pub String);

/// Applied to each raw rule by [`Parser::parse_raw_rules`] to select targets.
pub type RawRulePredicate = dyn Fn(&RawRule, BuildRuleType, &BuildTarget) -> bool;

/// Parses build files on demand and resolves the transitive dependencies of
/// the targets it is asked about.
///
/// A build file is parsed the first time one of its targets is referenced;
/// every rule it declares is registered then, keyed by fully qualified name.
/// Registration produces builders; rules are only built during the post-order
/// dependency walk of [`Parser::parse_build_files_for_targets`].
pub struct Parser {
    filesystem: ProjectFilesystem,
    build_files: BuildFileTree,
    build_target_parser: BuildTargetParser,
    registry: RuleRegistry,
    raw_rule_loader: Box<dyn RawRuleLoader>,
    /// Every rule parsed so far, keyed by fully qualified name. Rules from a
    /// build file parsed in search of one target stay known afterwards.
    known_build_targets: IndexMap<String, Box<dyn BuildRuleBuilder>>,
    /// The build files whose rules are in `known_build_targets`.
    parsed_build_files: HashSet<ProjectRelativePathBuf>,
    /// Set once `parse_raw_rules` primes the parser from memory. From then
    /// on no build file is ever loaded: a miss in `known_build_targets` is an
    /// error, not a load trigger.
    populated_via_raw_rules: bool,
}

impl Parser {
    pub fn new(
        filesystem: ProjectFilesystem,
        build_files: BuildFileTree,
        build_file_name: BuildFileName,
        raw_rule_loader: Box<dyn RawRuleLoader>,
    ) -> Parser {
        Parser {
            filesystem,
            build_files,
            build_target_parser: BuildTargetParser::new(build_file_name),
            registry: RuleRegistry::with_builtin_rules(),
            raw_rule_loader,
            known_build_targets: IndexMap::new(),
            parsed_build_files: HashSet::new(),
            populated_via_raw_rules: false,
        }
    }

    pub fn build_target_parser(&self) -> &BuildTargetParser {
        &self.build_target_parser
    }

    /// The targets of every rule registered so far, in registration order.
    pub fn known_targets(&self) -> Vec<BuildTarget> {
        self.known_build_targets
            .values()
            .map(|builder| builder.build_target().dupe())
            .collect()
    }

    /// Resolves `build_targets` and all of their transitive dependencies to
    /// a graph of built rules, parsing build files along the way.
    pub fn parse_build_files_for_targets(
        &mut self,
        build_targets: &[BuildTarget],
        default_includes: &[String],
    ) -> anyhow::Result<DependencyGraph> {
        // Make sure the builders for the seed targets themselves are
        // registered before the traversal starts.
        if !self.populated_via_raw_rules {
            for build_target in build_targets {
                self.parse_build_file(build_target.build_file_path(), default_includes)?;
            }
        }
        self.find_all_transitive_dependencies(build_targets, default_includes)
    }

    fn find_all_transitive_dependencies(
        &mut self,
        to_explore: &[BuildTarget],
        default_includes: &[String],
    ) -> anyhow::Result<DependencyGraph> {
        let mut delegate = TraversalDelegate {
            parser: self,
            default_includes,
            rule_index: RuleIndex::new(),
            graph: MutableDirectedGraph::new(),
        };
        traverse(&mut delegate, to_explore.iter().cloned())?;
        Ok(DependencyGraph::new(delegate.graph))
    }

    /// Registers every rule of `build_file`. A file that was parsed before
    /// is left alone, so callers may re-invoke this conservatively.
    pub fn parse_build_file(
        &mut self,
        build_file: &ProjectRelativePath,
        default_includes: &[String],
    ) -> anyhow::Result<()> {
        if self.parsed_build_files.contains(build_file) {
            return Ok(());
        }
        info!("Parsing build file {}", build_file);
        let rules = self
            .raw_rule_loader
            .get_all_rules(Some(build_file), default_includes)?;
        self.parse_raw_rules_internal(rules, None, Some(build_file))?;
        self.parsed_build_files.insert(build_file.to_buf());
        Ok(())
    }

    /// Loads the build file that should declare `build_target`, enforcing
    /// the missing-target policies: under raw-rule priming nothing is ever
    /// loaded, and a file that was already parsed is not re-read just
    /// because a target was not found in it.
    fn parse_build_file_containing_target(
        &mut self,
        build_target: &BuildTarget,
        default_includes: &[String],
    ) -> anyhow::Result<()> {
        if self.populated_via_raw_rules {
            // All build rules were loaded up front, so a miss cannot be
            // fixed by parsing; the dep simply does not exist. The build
            // file the bad reference was written in is no longer known at
            // this point, which is why it is absent from the message.
            return Err(NoSuchBuildTargetError::NoSuchBuildTarget(build_target.dupe()).into());
        }

        let build_file = build_target.build_file_path();
        if self.parsed_build_files.contains(build_file) {
            return Err(NoSuchBuildTargetError::TargetNotFoundInParsedFile {
                target: build_target.dupe(),
                build_file: build_file.to_buf(),
            }
            .into());
        }

        self.parse_build_file(build_file, default_includes)
    }

    /// Makes sure a builder for `build_target` is registered, loading its
    /// build file if necessary.
    fn ensure_target_is_known(
        &mut self,
        build_target: &BuildTarget,
        default_includes: &[String],
    ) -> anyhow::Result<()> {
        if self
            .known_build_targets
            .contains_key(&build_target.fully_qualified_name())
        {
            return Ok(());
        }
        self.parse_build_file_containing_target(build_target, default_includes)?;
        if self
            .known_build_targets
            .contains_key(&build_target.fully_qualified_name())
        {
            Ok(())
        } else {
            Err(NoSuchBuildTargetError::NoSuchBuildTarget(build_target.dupe()).into())
        }
    }

    /// Primes the parser from an in-memory rule list instead of the
    /// filesystem. Afterwards no file is ever loaded.
    ///
    /// With a `filter`, returns the targets matching it, in input order;
    /// with none, returns nothing.
    pub fn parse_raw_rules(
        &mut self,
        rules: Vec<RawRule>,
        filter: Option<&RawRulePredicate>,
    ) -> anyhow::Result<Option<Vec<BuildTarget>>> {
        self.populated_via_raw_rules = true;
        self.parse_raw_rules_internal(rules, filter, None)
    }

    fn parse_raw_rules_internal(
        &mut self,
        rules: Vec<RawRule>,
        filter: Option<&RawRulePredicate>,
        source: Option<&ProjectRelativePath>,
    ) -> anyhow::Result<Option<Vec<BuildTarget>>> {
        let mut matching_targets = filter.map(|_| Vec::new());

        for raw_rule in rules {
            let rule_type = self.registry.rule_type(raw_rule.type_tag())?;
            let base_path = raw_rule.base_path();
            let build_file = match source {
                Some(source) => source.to_buf(),
                None => {
                    // The rule did not come from a file read; its source is
                    // derived from its base path.
                    let base_path = ProjectRelativePath::new(base_path)
                        .with_context(|| format!("base path of rule `{}`", raw_rule.name()))?;
                    base_path.join(ProjectRelativePath::unchecked_new(
                        self.build_target_parser.build_file_name().as_str(),
                    ))
                }
            };
            let target = BuildTarget::new(
                build_file,
                format!("//{}", base_path),
                raw_rule.name().to_owned(),
            );

            if let (Some(filter), Some(matching)) = (filter, matching_targets.as_mut()) {
                if filter(&raw_rule, rule_type, &target) {
                    matching.push(target.dupe());
                }
            }

            let builder = self.registry.factory(rule_type)?.new_instance(FactoryParams {
                raw_rule: &raw_rule,
                filesystem: &self.filesystem,
                build_file_tree: &self.build_files,
                target_parser: &self.build_target_parser,
                target: target.dupe(),
            })?;

            let fully_qualified_name = target.fully_qualified_name();
            if self
                .known_build_targets
                .insert(fully_qualified_name.clone(), builder)
                .is_some()
            {
                return Err(DuplicateTargetError(fully_qualified_name).into());
            }
        }

        Ok(matching_targets)
    }
}

struct TraversalDelegate<'a> {
    parser: &'a mut Parser,
    default_includes: &'a [String],
    rule_index: RuleIndex,
    graph: MutableDirectedGraph<Arc<BuildRule>>,
}

impl AcyclicDepthFirstPostOrderTraversal<BuildTarget> for TraversalDelegate<'_> {
    fn find_children(&mut self, build_target: &BuildTarget) -> anyhow::Result<Vec<BuildTarget>> {
        self.parser
            .ensure_target_is_known(build_target, self.default_includes)?;
        let builder = &self.parser.known_build_targets[&build_target.fully_qualified_name()];
        let dep_strings: Vec<String> = builder.deps().to_vec();

        let parse_context = ParseContext::for_base_name(build_target.base_name());
        let mut deps: IndexSet<BuildTarget> = IndexSet::new();
        for dep in &dep_strings {
            let dep_target = self
                .parser
                .build_target_parser
                .parse(dep, &parse_context)
                .with_context(|| format!("parsing dep `{}` of {}", dep, build_target))?;
            self.parser
                .ensure_target_is_known(&dep_target, self.default_includes)?;
            deps.insert(dep_target);
        }
        Ok(deps.into_iter().collect())
    }

    fn on_node_explored(&mut self, build_target: &BuildTarget) -> anyhow::Result<()> {
        let fully_qualified_name = build_target.fully_qualified_name();
        let builder = self
            .parser
            .known_build_targets
            .get(&fully_qualified_name)
            .with_context(|| {
                format!("no builder for explored target {} (internal error)", build_target)
            })?;
        let rule = Arc::new(builder.build(&self.rule_index)?);

        // Update the graph. The rule is always inserted as a node, so a
        // dep-less rule is not lost; edges carry the dep endpoints with
        // them.
        self.graph.add_node(rule.dupe());
        for dep in rule.deps() {
            self.graph.add_edge(rule.dupe(), dep.dupe());
        }

        self.rule_index.insert(fully_qualified_name, rule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use buck1_core::build_file_tree::BuildFileTree;
    use buck1_core::buck_paths::BuildFileName;
    use buck1_core::fs::project::ProjectFilesystem;
    use buck1_core::pattern::ParseContext;
    use buck1_core::target::BuildTarget;
    use buck1_node::rule_type::BuildRuleType;
    use buck1_node::rule_type::UnknownRuleTypeError;
    use serde_json::json;

    use crate::parser::DuplicateTargetError;
    use crate::parser::NoSuchBuildTargetError;
    use crate::parser::Parser;
    use crate::testing::raw_rules;
    use crate::testing::FakeRuleLoader;
    use crate::traversal::CycleError;

    fn parser_for(loader: FakeRuleLoader) -> Parser {
        let build_files = loader.build_files();
        Parser::new(
            ProjectFilesystem::new(std::env::temp_dir()),
            BuildFileTree::from_build_files(build_files.iter().map(|f| f.as_ref())),
            BuildFileName::default(),
            Box::new(loader),
        )
    }

    fn targets(parser: &Parser, names: &[&str]) -> Vec<BuildTarget> {
        names
            .iter()
            .map(|name| {
                parser
                    .build_target_parser()
                    .parse(name, &ParseContext::fully_qualified())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_single_target_without_deps() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new().add_build_file(
            "lib/BUCK",
            json!([{"type": "java_library", "name": "a", "buck_base_path": "lib"}]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//lib:a"]);
        let graph = parser.parse_build_files_for_targets(&seeds, &[])?;

        assert_eq!(1, graph.node_count());
        assert_eq!(0, graph.edge_count());
        assert_eq!(
            vec!["//lib:a"],
            graph
                .nodes()
                .map(|r| r.fully_qualified_name())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_empty_seeds_produce_an_empty_graph() -> anyhow::Result<()> {
        let mut parser = parser_for(FakeRuleLoader::new());
        let graph = parser.parse_build_files_for_targets(&[], &[])?;
        assert_eq!(0, graph.node_count());
        Ok(())
    }

    #[test]
    fn test_transitive_chain_loads_and_builds_in_order() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new()
            .add_build_file(
                "a/BUCK",
                json!([{
                    "type": "java_library", "name": "a", "buck_base_path": "a",
                    "deps": ["//b:b"],
                }]),
            )
            .add_build_file(
                "b/BUCK",
                json!([{
                    "type": "java_library", "name": "b", "buck_base_path": "b",
                    "deps": ["//c:c"],
                }]),
            )
            .add_build_file(
                "c/BUCK",
                json!([{"type": "java_library", "name": "c", "buck_base_path": "c"}]),
            );
        let log = loader.log();
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//a:a"]);
        let graph = parser.parse_build_files_for_targets(&seeds, &[])?;

        assert_eq!(3, graph.node_count());
        assert_eq!(2, graph.edge_count());
        // Files load in the order their first-referenced target is reached.
        assert_eq!(
            vec!["a/BUCK", "b/BUCK", "c/BUCK"],
            log.paths().iter().map(|p| p.as_str()).collect::<Vec<_>>()
        );
        // Nodes enter the graph in post-order of the walk.
        assert_eq!(
            vec!["//c:c", "//b:b", "//a:a"],
            graph
                .nodes()
                .map(|r| r.fully_qualified_name())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_diamond_builds_shared_dep_once() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new().add_build_file(
            "p/BUCK",
            json!([
                {"type": "java_library", "name": "a", "buck_base_path": "p",
                 "deps": [":b", ":c"]},
                {"type": "java_library", "name": "b", "buck_base_path": "p",
                 "deps": [":d"]},
                {"type": "java_library", "name": "c", "buck_base_path": "p",
                 "deps": [":d"]},
                {"type": "java_library", "name": "d", "buck_base_path": "p"},
            ]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//p:a"]);
        let graph = parser.parse_build_files_for_targets(&seeds, &[])?;

        assert_eq!(4, graph.node_count());
        assert_eq!(4, graph.edge_count());

        // Both paths to `d` resolve to the same rule, not equal copies.
        let b = graph
            .nodes()
            .find(|r| r.fully_qualified_name() == "//p:b")
            .unwrap();
        let c = graph
            .nodes()
            .find(|r| r.fully_qualified_name() == "//p:c")
            .unwrap();
        assert!(std::sync::Arc::ptr_eq(&b.deps()[0], &c.deps()[0]));
        Ok(())
    }

    #[test]
    fn test_relative_dep_resolves_against_base_name() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new().add_build_file(
            "p/BUCK",
            json!([
                {"type": "java_library", "name": "a", "buck_base_path": "p",
                 "deps": [":x"]},
                {"type": "java_library", "name": "x", "buck_base_path": "p"},
            ]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//p:a"]);
        let graph = parser.parse_build_files_for_targets(&seeds, &[])?;
        assert!(graph
            .nodes()
            .any(|r| r.fully_qualified_name() == "//p:x"));
        Ok(())
    }

    #[test]
    fn test_cycle_is_reported_with_both_targets() {
        let loader = FakeRuleLoader::new().add_build_file(
            "p/BUCK",
            json!([
                {"type": "java_library", "name": "a", "buck_base_path": "p",
                 "deps": [":b"]},
                {"type": "java_library", "name": "b", "buck_base_path": "p",
                 "deps": [":a"]},
            ]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//p:a"]);
        let err = parser.parse_build_files_for_targets(&seeds, &[]).unwrap_err();

        assert!(err.downcast_ref::<CycleError>().is_some());
        let message = err.to_string();
        assert!(message.contains("//p:a"), "{}", message);
        assert!(message.contains("//p:b"), "{}", message);
    }

    #[test]
    fn test_duplicate_target_across_build_files() {
        // The second file claims a target of the first file's package.
        let loader = FakeRuleLoader::new()
            .add_build_file(
                "app/BUCK",
                json!([{"type": "java_library", "name": "x", "buck_base_path": "app"}]),
            )
            .add_build_file(
                "lib/BUCK",
                json!([{"type": "java_library", "name": "x", "buck_base_path": "app"}]),
            );
        let mut parser = parser_for(loader);
        parser
            .parse_build_file(
                buck1_core::fs::paths::ProjectRelativePath::unchecked_new("app/BUCK"),
                &[],
            )
            .unwrap();
        let err = parser
            .parse_build_file(
                buck1_core::fs::paths::ProjectRelativePath::unchecked_new("lib/BUCK"),
                &[],
            )
            .unwrap_err();
        assert_matches!(err.downcast_ref::<DuplicateTargetError>(), Some(dup) => {
            assert_eq!("//app:x", dup.0);
        });
    }

    #[test]
    fn test_unknown_rule_type_is_fatal() {
        let loader = FakeRuleLoader::new().add_build_file(
            "p/BUCK",
            json!([{"type": "haskell_library", "name": "a", "buck_base_path": "p"}]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//p:a"]);
        let err = parser.parse_build_files_for_targets(&seeds, &[]).unwrap_err();
        assert!(err.downcast_ref::<UnknownRuleTypeError>().is_some());
    }

    #[test]
    fn test_target_missing_from_its_build_file() {
        let loader = FakeRuleLoader::new().add_build_file(
            "p/BUCK",
            json!([{"type": "java_library", "name": "a", "buck_base_path": "p"}]),
        );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//p:nope"]);
        let err = parser.parse_build_files_for_targets(&seeds, &[]).unwrap_err();
        assert_matches!(
            err.downcast_ref::<NoSuchBuildTargetError>(),
            Some(NoSuchBuildTargetError::TargetNotFoundInParsedFile { .. })
        );
        assert!(err.to_string().contains("//p:nope"));
    }

    #[test]
    fn test_build_files_load_at_most_once() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new()
            .add_build_file(
                "app/BUCK",
                json!([{
                    "type": "java_library", "name": "bin", "buck_base_path": "app",
                    "deps": ["//lib:a", "//lib:b"],
                }]),
            )
            .add_build_file(
                "lib/BUCK",
                json!([
                    {"type": "java_library", "name": "a", "buck_base_path": "lib"},
                    {"type": "java_library", "name": "b", "buck_base_path": "lib"},
                ]),
            );
        let log = loader.log();
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//app:bin"]);
        parser.parse_build_files_for_targets(&seeds, &[])?;

        assert_eq!(1, log.loads_of("app/BUCK"));
        assert_eq!(1, log.loads_of("lib/BUCK"));

        // Conservative re-invocation is a no-op.
        parser.parse_build_file(
            buck1_core::fs::paths::ProjectRelativePath::unchecked_new("lib/BUCK"),
            &[],
        )?;
        assert_eq!(1, log.loads_of("lib/BUCK"));
        Ok(())
    }

    #[test]
    fn test_raw_rule_priming_disables_loading() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new();
        let log = loader.log();
        let mut parser = parser_for(loader);
        parser.parse_raw_rules(
            raw_rules(json!([
                {"type": "java_library", "name": "a", "buck_base_path": "p",
                 "deps": [":missing"]},
            ])),
            None,
        )?;

        let seeds = targets(&parser, &["//p:a"]);
        let err = parser.parse_build_files_for_targets(&seeds, &[]).unwrap_err();
        assert_matches!(
            err.downcast_ref::<NoSuchBuildTargetError>(),
            Some(NoSuchBuildTargetError::NoSuchBuildTarget(target)) => {
                assert_eq!("//p:missing", target.to_string());
            }
        );
        assert!(log.is_empty());
        Ok(())
    }

    #[test]
    fn test_raw_rules_filter_returns_matches_in_input_order() -> anyhow::Result<()> {
        let mut parser = parser_for(FakeRuleLoader::new());
        let tests_only = |_raw: &buck1_node::raw_rule::RawRule,
                          rule_type: BuildRuleType,
                          _target: &BuildTarget|
         -> bool { rule_type == BuildRuleType::JavaTest };
        let filter: &crate::parser::RawRulePredicate = &tests_only;
        let matched = parser.parse_raw_rules(
            raw_rules(json!([
                {"type": "java_test", "name": "z_test", "buck_base_path": "p"},
                {"type": "java_library", "name": "lib", "buck_base_path": "p"},
                {"type": "java_test", "name": "a_test", "buck_base_path": "p"},
            ])),
            Some(filter),
        )?;

        let matched: Vec<String> = matched
            .expect("a filter was provided")
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(vec!["//p:z_test", "//p:a_test"], matched);
        Ok(())
    }

    #[test]
    fn test_closure_and_uniqueness_invariants() -> anyhow::Result<()> {
        let loader = FakeRuleLoader::new()
            .add_build_file(
                "app/BUCK",
                json!([{
                    "type": "java_binary", "name": "bin", "buck_base_path": "app",
                    "deps": ["//lib:core"],
                }]),
            )
            .add_build_file(
                "lib/BUCK",
                json!([
                    {"type": "java_library", "name": "core", "buck_base_path": "lib",
                     "deps": [":base"]},
                    {"type": "java_library", "name": "base", "buck_base_path": "lib"},
                ]),
            );
        let mut parser = parser_for(loader);
        let seeds = targets(&parser, &["//app:bin"]);
        let graph = parser.parse_build_files_for_targets(&seeds, &[])?;

        // Closure: every dep of every node is itself a node, via an edge.
        for rule in graph.nodes() {
            for dep in rule.deps() {
                assert!(graph.contains(dep));
                assert!(graph.outgoing(rule).any(|d| std::sync::Arc::ptr_eq(d, dep)));
            }
        }

        // Uniqueness: one rule per fully qualified name.
        let mut names: Vec<String> = graph.nodes().map(|r| r.fully_qualified_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(3, names.len());
        Ok(())
    }

    #[test]
    fn test_same_input_gives_same_graph() -> anyhow::Result<()> {
        let build = || -> anyhow::Result<Vec<String>> {
            let loader = FakeRuleLoader::new().add_build_file(
                "p/BUCK",
                json!([
                    {"type": "java_library", "name": "a", "buck_base_path": "p",
                     "deps": [":b", ":c"]},
                    {"type": "java_library", "name": "b", "buck_base_path": "p"},
                    {"type": "java_library", "name": "c", "buck_base_path": "p"},
                ]),
            );
            let mut parser = parser_for(loader);
            let seeds = targets(&parser, &["//p:a"]);
            let graph = parser.parse_build_files_for_targets(&seeds, &[])?;
            Ok(graph.nodes().map(|r| r.fully_qualified_name()).collect())
        };
        assert_eq!(build()?, build()?);
        Ok(())
    }
}
