//! CodeMeta (JSON-LD) import into a metadata tree.
//!
//! Every JSON key becomes a `codemeta:`-prefixed element: strings become
//! text leaves, objects become elements filled recursively, and arrays
//! repeat the key once per item. JSON-LD keywords (`@context`, `@type`,
//! `@id`, ...) are skipped.

use super::MetadataNode;
use crate::errors::DepositError;
use log::debug;
use serde_json::Value;

impl MetadataNode {
    /// Build a document root from a parsed CodeMeta document.
    pub fn from_codemeta_json(json: &Value) -> Result<Self, DepositError> {
        let mut metadata = MetadataNode::root();
        metadata.import_codemeta_json(json)?;
        Ok(metadata)
    }

    /// Build a document root from CodeMeta JSON text.
    pub fn from_codemeta_str(json: &str) -> Result<Self, DepositError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_codemeta_json(&value)
    }

    /// Import the keys of a CodeMeta object as children of this node.
    pub fn import_codemeta_json(&mut self, json: &Value) -> Result<(), DepositError> {
        let Value::Object(map) = json else {
            return Err(DepositError::InvalidInput(
                "CodeMeta metadata must be a JSON object".to_string(),
            ));
        };

        for (key, value) in map {
            if key.starts_with('@') {
                continue;
            }
            self.import_codemeta_item(&format!("codemeta:{}", key), value)?;
        }
        Ok(())
    }

    fn import_codemeta_item(&mut self, key: &str, value: &Value) -> Result<(), DepositError> {
        match value {
            Value::String(text) => {
                self.add_value(key, text.as_str())?;
            }
            Value::Array(items) => {
                for item in items {
                    self.import_codemeta_item(key, item)?;
                }
            }
            Value::Object(_) => {
                self.add_element(key)?.import_codemeta_json(value)?;
            }
            Value::Number(number) => {
                self.add_value(key, number.to_string())?;
            }
            Value::Bool(flag) => {
                self.add_value(key, flag.to_string())?;
            }
            Value::Null => debug!("Skipping null CodeMeta value for {}", key),
        }
        Ok(())
    }

    /// Give every `codemeta:author` without a `codemeta:name` one built
    /// from its given and family names.
    pub fn fill_missing_metadata(&mut self) -> Result<(), DepositError> {
        for index in self.child_indices("codemeta:author") {
            let Some(author) = self.child_mut(index) else {
                continue;
            };
            if author.exists("codemeta:name") {
                continue;
            }

            let given_name = author
                .get_first("codemeta:givenName")
                .and_then(MetadataNode::value)
                .unwrap_or("");
            let family_name = author
                .get_first("codemeta:familyName")
                .and_then(MetadataNode::value)
                .unwrap_or("");
            let name = format!("{} {}", given_name, family_name).trim().to_string();

            if !name.is_empty() {
                debug!("Filling in author name: {}", name);
                author.add_value("codemeta:name", name)?;
            }
        }
        Ok(())
    }
}
