/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use buck1_core::build_file_tree::BuildFileTree;
use buck1_core::fs::paths::ProjectRelativePath;
use buck1_core::fs::paths::ProjectRelativePathBuf;
use buck1_core::pattern::ParseContext;
use buck1_core::target::BuildTarget;
use buck1_node::rule_type::BuildRuleType;
use buck1_node::rules::BuildRule;
use buck1_parser::graph::DependencyGraph;
use buck1_parser::loader::RawRuleLoader;
use buck1_parser::partial_graph::PartialGraph;
use gazebo::prelude::*;
use serde_json::Value;

use crate::commands::CommandContext;
use crate::exit_result::ExitResult;
use crate::exit_result::HumanReadableError;

/// Prints the list of buildable targets.
#[derive(Debug, clap::Parser)]
pub struct TargetsCommand {
    /// Restrict the output to rules of these types.
    #[clap(long = "type", value_name = "TYPE", multiple_values = true)]
    rule_types: Vec<String>,

    /// Restrict the output to rules affected by these files, directly or
    /// through the rules that depend on them.
    #[clap(long = "referenced_files", value_name = "FILE", multiple_values = true)]
    referenced_files: Vec<String>,

    /// Print a JSON representation of each matching rule.
    #[clap(long)]
    json: bool,

    /// Treat each argument as an alias or a fully qualified target and print
    /// the target it resolves to, one per line.
    #[clap(long = "resolvealias")]
    resolve_alias: bool,

    /// Aliases, or fully qualified targets with --resolvealias.
    #[clap(value_name = "TARGET")]
    arguments: Vec<String>,
}

impl TargetsCommand {
    pub fn exec(self, ctx: &CommandContext) -> ExitResult {
        ExitResult::from_command_result(self.run(ctx))
    }

    fn run(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        // No build graph is needed to resolve aliases; exit early.
        if self.resolve_alias {
            for resolved in resolved_aliases(ctx, &self.arguments)? {
                println!("{}", resolved);
            }
            return Ok(());
        }

        let rule_types = parse_rule_types(&self.rule_types)?;
        let referenced_files = parse_referenced_files(&self.referenced_files)?;

        let graph = PartialGraph::create_full_graph(
            ctx.filesystem.dupe(),
            ctx.build_file_name.clone(),
            &ctx.buck_paths,
            Box::new(ctx.rule_loader()),
            &ctx.config.default_includes(),
        )?;

        let matching = matching_build_targets(&graph, &rule_types, &referenced_files);

        if self.json {
            print!("{}", json_for_targets(ctx, &matching)?);
        } else {
            for fully_qualified_name in matching.keys() {
                println!("{}", fully_qualified_name);
            }
        }
        Ok(())
    }
}

fn parse_rule_types(names: &[String]) -> anyhow::Result<HashSet<BuildRuleType>> {
    names
        .iter()
        .map(|name| {
            BuildRuleType::from_str(name)
                .map_err(|_| HumanReadableError::new(format!("Invalid build rule type: {}", name)).into())
        })
        .collect()
}

fn parse_referenced_files(files: &[String]) -> anyhow::Result<Vec<ProjectRelativePathBuf>> {
    files
        .iter()
        .map(|file| {
            ProjectRelativePath::new(file)
                .map(|p| p.to_buf())
                .map_err(|_| {
                    HumanReadableError::new(format!(
                        "{} is not a normalized path under the project root.",
                        file
                    ))
                    .into()
                })
        })
        .collect()
}

/// The matching rules, keyed (and therefore sorted) by fully qualified name.
///
/// The walk is bottom-up so that, by the time a rule is considered, the
/// referenced-files filter already knows which of the rule's deps are
/// affected.
fn matching_build_targets(
    graph: &PartialGraph,
    rule_types: &HashSet<BuildRuleType>,
    referenced_files: &[ProjectRelativePathBuf],
) -> BTreeMap<String, BuildTarget> {
    let mut predicate = TargetsCommandPredicate::new(graph, rule_types, referenced_files);
    let mut matching = BTreeMap::new();
    for rule in graph.graph().bottom_up_order() {
        if predicate.apply(rule) {
            matching.insert(rule.fully_qualified_name(), rule.build_target().dupe());
        }
    }
    matching
}

struct TargetsCommandPredicate<'a> {
    graph: &'a DependencyGraph,
    rule_types: &'a HashSet<BuildRuleType>,
    referenced: Option<ReferencedFiles>,
}

struct ReferencedFiles {
    files: HashSet<ProjectRelativePathBuf>,
    /// The base paths of the packages owning the referenced files. Only
    /// rules of the owning package can list a file as an input.
    base_paths_of_files: HashSet<ProjectRelativePathBuf>,
    /// Rules found affected so far, by fully qualified name. Grows as the
    /// bottom-up walk proceeds.
    affected: HashSet<String>,
}

impl<'a> TargetsCommandPredicate<'a> {
    fn new(
        graph: &'a PartialGraph,
        rule_types: &'a HashSet<BuildRuleType>,
        referenced_files: &[ProjectRelativePathBuf],
    ) -> Self {
        let referenced = if referenced_files.is_empty() {
            None
        } else {
            let tree = BuildFileTree::from_targets(graph.targets());
            let base_paths_of_files = referenced_files
                .iter()
                .filter_map(|file| tree.base_path_of_ancestor_target(file))
                .map(|base_path| base_path.to_buf())
                .collect();
            Some(ReferencedFiles {
                files: referenced_files.iter().cloned().collect(),
                base_paths_of_files,
                affected: HashSet::new(),
            })
        };
        TargetsCommandPredicate {
            graph: graph.graph(),
            rule_types,
            referenced,
        }
    }

    /// Must be called in bottom-up order over the graph.
    fn apply(&mut self, rule: &Arc<BuildRule>) -> bool {
        let mut is_dependent = true;
        if let Some(referenced) = &mut self.referenced {
            // Affected transitively, through a dep already marked affected.
            is_dependent = self
                .graph
                .outgoing(rule)
                .any(|dep| referenced.affected.contains(&dep.fully_qualified_name()));

            // Or the direct producer: the rule's package owns the file and
            // the rule lists it as an input.
            if !is_dependent
                && referenced
                    .base_paths_of_files
                    .contains(rule.build_target().base_path())
            {
                is_dependent = rule
                    .inputs()
                    .iter()
                    .any(|input| referenced.files.contains(input));
            }

            if is_dependent {
                referenced.affected.insert(rule.fully_qualified_name());
            }
        }

        is_dependent && (self.rule_types.is_empty() || self.rule_types.contains(&rule.rule_type()))
    }
}

/// Resolves each argument per `--resolvealias`: an argument starting with
/// `//` must name a target its build file really declares; anything else
/// must be an alias from `.buckconfig`.
fn resolved_aliases(ctx: &CommandContext, arguments: &[String]) -> anyhow::Result<Vec<String>> {
    let mut resolved = Vec::new();
    for alias in arguments {
        let build_target = if alias.starts_with("//") {
            match validate_build_target(ctx, alias)? {
                Some(fully_qualified_name) => fully_qualified_name,
                None => {
                    return Err(
                        HumanReadableError::new(format!("{} is not a valid target.", alias)).into(),
                    );
                }
            }
        } else {
            match ctx.config.build_target_for_alias(alias) {
                Some(build_target) => build_target.to_owned(),
                None => {
                    return Err(
                        HumanReadableError::new(format!("{} is not an alias.", alias)).into()
                    );
                }
            }
        };
        resolved.push(build_target);
    }
    Ok(resolved)
}

/// Checks that `target` is a fully qualified name its build file declares;
/// `None` when it is unparseable, its build file is missing, or the file
/// does not declare it.
fn validate_build_target(ctx: &CommandContext, target: &str) -> anyhow::Result<Option<String>> {
    let parsed = match ctx
        .target_parser()
        .parse(target, &ParseContext::fully_qualified())
    {
        Ok(parsed) => parsed,
        Err(_) => return Ok(None),
    };
    if !ctx.filesystem.exists(parsed.build_file_path()) {
        return Ok(None);
    }

    let rules = ctx
        .rule_loader()
        .get_all_rules(Some(parsed.build_file_path()), &ctx.config.default_includes())?;
    Ok(rules
        .iter()
        .any(|rule| rule.name() == parsed.short_name())
        .then(|| parsed.fully_qualified_name()))
}

/// Renders the matching targets as a JSON array of their raw attribute maps,
/// keys sorted, pretty-printed, elements comma-separated.
///
/// The raw attributes are not retained after builder construction, so this
/// re-reads each containing build file; it therefore cannot serve a parser
/// that was primed from in-memory rules.
fn json_for_targets(
    ctx: &CommandContext,
    build_targets: &BTreeMap<String, BuildTarget>,
) -> anyhow::Result<String> {
    let loader = ctx.rule_loader();
    let default_includes = ctx.config.default_includes();

    let mut output = String::from("[\n");
    let mut entries = Vec::new();
    for build_target in build_targets.values() {
        let rules = loader.get_all_rules(Some(build_target.build_file_path()), &default_includes)?;
        let rule = match rules
            .iter()
            .find(|rule| rule.name() == build_target.short_name())
        {
            Some(rule) => rule,
            None => {
                // The file changed between the graph walk and now.
                tracing::warn!("unable to find rule for target {}", build_target);
                continue;
            }
        };
        let sorted: BTreeMap<&String, &Value> = rule.attrs().iter().collect();
        entries.push(serde_json::to_string_pretty(&sorted)?);
    }
    output.push_str(&entries.join(",\n"));
    output.push_str("\n]\n");
    Ok(output)
}
