//! In-memory Atom entry builder.
//!
//! A [`MetadataNode`] is a namespaced element with ordered attributes, an
//! optional text value and ordered children. Children are additionally
//! indexed by their qualified key (`namespace:localKey`) so repeated
//! elements such as several authors can be looked up together.
//!
//! - CodeMeta import lives in [`codemeta`]
//! - XML serialization lives in [`xml`]

pub mod codemeta;
pub mod namespace;
pub mod xml;

pub use namespace::{DEFAULT_NAMESPACE, Namespace};

use crate::errors::DepositError;
use std::collections::HashMap;

/// Ordered XML attributes of an element.
pub type Attributes = Vec<(String, String)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataNode {
    namespace: Option<Namespace>,
    local_key: Option<String>,
    attributes: Attributes,
    value: Option<String>,
    children: Vec<MetadataNode>,
    /// Qualified key -> positions in `children`, in insertion order.
    children_by_key: HashMap<String, Vec<usize>>,
}

impl MetadataNode {
    /// Create a node.
    ///
    /// `key` is split on its first colon into namespace prefix and local
    /// key; without a colon the default (`atom`) namespace is used. A
    /// `None` key creates a document root, which is never written as an
    /// element itself. A repeated attribute name keeps its first position
    /// and takes the last value.
    pub fn new(
        key: Option<&str>,
        attributes: Attributes,
        value: Option<String>,
        children: Vec<MetadataNode>,
    ) -> Result<Self, DepositError> {
        let (namespace, local_key) = match key {
            Some(key) => {
                let (namespace, local_key) = match key.split_once(':') {
                    Some((prefix, local)) => (Namespace::from_prefix(prefix)?, local),
                    None => (DEFAULT_NAMESPACE, key),
                };
                (Some(namespace), Some(local_key.to_string()))
            }
            None => (None, None),
        };

        let mut node = Self {
            namespace,
            local_key,
            attributes: Attributes::with_capacity(attributes.len()),
            value,
            children: Vec::new(),
            children_by_key: HashMap::new(),
        };
        for (name, attribute_value) in attributes {
            node.set_attribute(name, attribute_value);
        }
        for child in children {
            node.add_item(child)?;
        }
        Ok(node)
    }

    /// Create an empty document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create an empty element.
    pub fn element(key: &str) -> Result<Self, DepositError> {
        Self::new(Some(key), Vec::new(), None, Vec::new())
    }

    /// Builder-style text value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder-style attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    pub fn local_key(&self) -> Option<&str> {
        self.local_key.as_deref()
    }

    /// `namespace:localKey`, or `None` for a document root.
    pub fn qualified_key(&self) -> Option<String> {
        match (self.namespace, &self.local_key) {
            (Some(namespace), Some(local_key)) => {
                Some(format!("{}:{}", namespace.prefix(), local_key))
            }
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Set an attribute, replacing the value of an existing one in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn children(&self) -> &[MetadataNode] {
        &self.children
    }

    /// Build a child from the given parts, attach it and return it so
    /// further elements can be added beneath it.
    pub fn add(
        &mut self,
        key: &str,
        attributes: Attributes,
        value: Option<String>,
        children: Vec<MetadataNode>,
    ) -> Result<&mut MetadataNode, DepositError> {
        let node = MetadataNode::new(Some(key), attributes, value, children)?;
        self.add_item(node)
    }

    /// Attach a text-only child.
    pub fn add_value(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&mut MetadataNode, DepositError> {
        self.add(key, Vec::new(), Some(value.into()), Vec::new())
    }

    /// Attach an empty child, typically to fill it afterwards.
    pub fn add_element(&mut self, key: &str) -> Result<&mut MetadataNode, DepositError> {
        self.add(key, Vec::new(), None, Vec::new())
    }

    /// Append an existing node and index it under its qualified key.
    pub fn add_item(&mut self, node: MetadataNode) -> Result<&mut MetadataNode, DepositError> {
        let key = node.qualified_key().ok_or_else(|| {
            DepositError::InvalidInput("a document root cannot be added as a child".to_string())
        })?;
        let index = self.children.len();
        self.children.push(node);
        self.children_by_key.entry(key).or_default().push(index);
        Ok(&mut self.children[index])
    }

    pub fn exists(&self, key: &str) -> bool {
        self.children_by_key.contains_key(key)
    }

    pub fn get_first(&self, key: &str) -> Option<&MetadataNode> {
        self.children_by_key
            .get(key)
            .and_then(|indices| indices.first())
            .map(|&index| &self.children[index])
    }

    pub fn get_first_mut(&mut self, key: &str) -> Option<&mut MetadataNode> {
        let index = *self.children_by_key.get(key)?.first()?;
        self.children.get_mut(index)
    }

    /// All children with the given qualified key, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&MetadataNode> {
        self.children_by_key
            .get(key)
            .map(|indices| indices.iter().map(|&index| &self.children[index]).collect())
            .unwrap_or_default()
    }

    pub(crate) fn child_indices(&self, key: &str) -> Vec<usize> {
        self.children_by_key.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn child_mut(&mut self, index: usize) -> Option<&mut MetadataNode> {
        self.children.get_mut(index)
    }
}
