//! Atom entry validation using libxml2
//!
//! Checks a hand-written or generated deposit entry before it is sent:
//!
//! 1. The document is well-formed XML
//! 2. The root element is `entry` in the Atom namespace
//! 3. Every element belongs to a namespace the deposit service knows
//!    (Atom, Dublin Core terms, CodeMeta or the SWH deposit schema)

use crate::metadata::{DEFAULT_NAMESPACE, Namespace};
use crate::response::parse_xml;
use libxml::tree::Node;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlValidationError {
    #[error("Failed to read XML file: {0}")]
    FileError(String),

    #[error("Failed to parse XML document: {0}")]
    XmlParseError(String),
}

/// Result of entry validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the entry passed every check
    pub valid: bool,

    /// Validation messages
    pub messages: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    /// Add a validation message
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);
        self.valid = false;
    }
}

/// Validate an Atom entry held in a string
pub fn validate_entry_string(xml_content: &str) -> Result<ValidationResult, XmlValidationError> {
    let document = parse_xml(xml_content)
        .map_err(|e| XmlValidationError::XmlParseError(format!("{}", e)))?;

    let mut result = ValidationResult::success();

    let Some(root) = document.get_root_element() else {
        result.add_message("Document has no root element".to_string());
        return Ok(result);
    };

    if root.get_name() != "entry" {
        result.add_message(format!(
            "Root element must be 'entry' but found '{}'",
            root.get_name()
        ));
    }
    match root.get_namespace() {
        Some(ns) if ns.get_href() == DEFAULT_NAMESPACE.uri() => {}
        Some(ns) => result.add_message(format!(
            "Invalid namespace URI: expected '{}' but found '{}'",
            DEFAULT_NAMESPACE.uri(),
            ns.get_href()
        )),
        None => result.add_message(format!(
            "Missing namespace declaration. Expected: '{}'",
            DEFAULT_NAMESPACE.uri()
        )),
    }

    for child in root.get_child_elements() {
        check_namespaces(&child, &mut result);
    }

    Ok(result)
}

/// Validate an Atom entry file
pub fn validate_entry_file(xml_path: impl AsRef<Path>) -> Result<ValidationResult, XmlValidationError> {
    let xml_path = xml_path.as_ref();

    let xml_content = std::fs::read_to_string(xml_path).map_err(|e| {
        XmlValidationError::FileError(format!("{}: {}", xml_path.display(), e))
    })?;

    validate_entry_string(&xml_content)
}

fn check_namespaces(node: &Node, result: &mut ValidationResult) {
    match node.get_namespace() {
        Some(ns) if Namespace::from_uri(&ns.get_href()).is_some() => {}
        Some(ns) => result.add_message(format!(
            "Element '{}' uses unsupported namespace '{}'",
            node.get_name(),
            ns.get_href()
        )),
        None => result.add_message(format!(
            "Element '{}' has no namespace",
            node.get_name()
        )),
    }

    for child in node.get_child_elements() {
        check_namespaces(&child, result);
    }
}
