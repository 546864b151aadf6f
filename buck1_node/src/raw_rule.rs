/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// The attribute name every raw rule must carry to identify its rule type.
pub const TYPE: &str = "type";
/// The attribute name every raw rule must carry with its short name.
pub const NAME: &str = "name";
/// The attribute name carrying the path from the project root to the
/// directory of the build file the rule was declared in; empty at the root.
pub const BASE_PATH: &str = "buck_base_path";

#[derive(Error, Debug)]
pub enum RawRuleError {
    #[error("build rule is missing the required `{0}` attribute")]
    MissingAttribute(String),
    #[error("attribute `{0}` of build rule `{1}` should be a string")]
    AttributeNotAString(String, String),
    #[error("attribute `{0}` of build rule `{1}` should be a list of strings")]
    AttributeNotAStringList(String, String),
}

/// One build rule as decoded from a build file, before any typing: the bag
/// of attributes the evaluator produced. Only `type`, `name` and
/// `buck_base_path` have meaning here; everything else is interpreted by the
/// rule factory the `type` dispatches to.
#[derive(Clone, Debug)]
pub struct RawRule {
    attrs: Map<String, Value>,
}

impl RawRule {
    pub fn new(attrs: Map<String, Value>) -> anyhow::Result<RawRule> {
        let rule = RawRule { attrs };
        for key in [TYPE, NAME, BASE_PATH] {
            rule.string(key)?;
        }
        Ok(rule)
    }

    pub fn type_tag(&self) -> &str {
        self.attrs[TYPE].as_str().unwrap()
    }

    pub fn name(&self) -> &str {
        self.attrs[NAME].as_str().unwrap()
    }

    pub fn base_path(&self) -> &str {
        self.attrs[BASE_PATH].as_str().unwrap()
    }

    /// A required string attribute.
    pub fn string(&self, key: &str) -> anyhow::Result<&str> {
        match self.attrs.get(key) {
            None => Err(RawRuleError::MissingAttribute(key.to_owned()).into()),
            Some(value) => value.as_str().ok_or_else(|| {
                RawRuleError::AttributeNotAString(key.to_owned(), self.describe()).into()
            }),
        }
    }

    /// An optional string attribute.
    pub fn opt_string(&self, key: &str) -> anyhow::Result<Option<&str>> {
        match self.attrs.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| {
                    RawRuleError::AttributeNotAString(key.to_owned(), self.describe()).into()
                }),
        }
    }

    /// A list-of-strings attribute; absent means empty.
    pub fn string_list(&self, key: &str) -> anyhow::Result<Vec<&str>> {
        match self.attrs.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| {
                    v.as_str().ok_or_else(|| {
                        RawRuleError::AttributeNotAStringList(key.to_owned(), self.describe())
                            .into()
                    })
                })
                .collect(),
            Some(_) => {
                Err(RawRuleError::AttributeNotAStringList(key.to_owned(), self.describe()).into())
            }
        }
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    fn describe(&self) -> String {
        match self.attrs.get(NAME).and_then(Value::as_str) {
            Some(name) => name.to_owned(),
            None => "<unnamed>".to_owned(),
        }
    }
}
