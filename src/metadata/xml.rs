//! Atom entry serialization
//!
//! The tree is written with `quick-xml` as a pretty-printed UTF-8 document
//! whose root is an Atom `entry`. Only namespaces that end up in the
//! output are declared on the root.

use super::{DEFAULT_NAMESPACE, MetadataNode, Namespace};
use crate::errors::DepositError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeSet;
use std::io::Write;

const ROOT_ELEMENT: &str = "entry";

impl MetadataNode {
    /// Serialize the children of this node into an Atom entry document.
    pub fn serialize_to_xml_document(&self) -> Result<String, DepositError> {
        let bytes = self.serialize_to_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            DepositError::Serialization(format!("Atom entry is not valid UTF-8: {}", e))
        })
    }

    /// Same as [`MetadataNode::serialize_to_xml_document`], as raw bytes.
    pub fn serialize_to_bytes(&self) -> Result<Vec<u8>, DepositError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let mut used = BTreeSet::new();
        for child in &self.children {
            child.collect_namespaces(&mut used);
        }

        let mut root = BytesStart::new(ROOT_ELEMENT);
        root.push_attribute(("xmlns", DEFAULT_NAMESPACE.uri()));
        for namespace in Namespace::ALL {
            if namespace != DEFAULT_NAMESPACE && used.contains(&namespace) {
                let name = format!("xmlns:{}", namespace.prefix());
                root.push_attribute((name.as_str(), namespace.uri()));
            }
        }

        if self.children.is_empty() {
            write_event(&mut writer, Event::Empty(root))?;
        } else {
            write_event(&mut writer, Event::Start(root))?;
            for child in &self.children {
                child.write_element(&mut writer)?;
            }
            write_event(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        }

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Element name as written: bare for the default namespace, prefixed
    /// otherwise.
    fn element_name(&self) -> Option<String> {
        let namespace = self.namespace?;
        let local_key = self.local_key.as_deref()?;
        if namespace == DEFAULT_NAMESPACE {
            Some(local_key.to_string())
        } else {
            Some(format!("{}:{}", namespace.prefix(), local_key))
        }
    }

    /// Mirrors `write_element`: children of a valued node are not written,
    /// so they do not contribute declarations.
    fn collect_namespaces(&self, used: &mut BTreeSet<Namespace>) {
        if let Some(namespace) = self.namespace {
            used.insert(namespace);
        }
        if self.value.is_none() {
            for child in &self.children {
                child.collect_namespaces(used);
            }
        }
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), DepositError> {
        let name = self.element_name().ok_or_else(|| {
            DepositError::Serialization("document root found below the entry".to_string())
        })?;

        let mut start = BytesStart::new(name.as_str());
        for (attribute, value) in &self.attributes {
            start.push_attribute((attribute.as_str(), value.as_str()));
        }

        match &self.value {
            Some(value) => {
                write_event(writer, Event::Start(start))?;
                write_event(writer, Event::Text(BytesText::new(value)))?;
                write_event(writer, Event::End(BytesEnd::new(name.as_str())))?;
            }
            None if self.children.is_empty() => {
                write_event(writer, Event::Empty(start))?;
            }
            None => {
                write_event(writer, Event::Start(start))?;
                for child in &self.children {
                    child.write_element(writer)?;
                }
                write_event(writer, Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
        Ok(())
    }
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), DepositError> {
    writer
        .write_event(event)
        .map_err(|e| DepositError::Serialization(format!("Failed to write Atom entry: {}", e)))
}
