/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Core value types shared by the parsing and dependency-resolution layers:
//! build targets and their parsing rules, project-relative paths, the
//! build-file tree, and the output-directory configuration.

pub mod build_file_tree;
pub mod buck_paths;
pub mod fs;
pub mod pattern;
pub mod target;
