//! Registered XML namespaces for deposit metadata elements.

use crate::errors::DepositError;

/// Namespace of elements written without a prefix.
pub const DEFAULT_NAMESPACE: Namespace = Namespace::Atom;

/// XML namespaces a metadata element may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Atom,
    Dcterms,
    Codemeta,
    SwhDeposit,
}

impl Namespace {
    /// Declaration order used on the document root.
    pub const ALL: [Namespace; 4] = [
        Namespace::Atom,
        Namespace::Dcterms,
        Namespace::Codemeta,
        Namespace::SwhDeposit,
    ];

    /// Look up a namespace by its element prefix.
    pub fn from_prefix(prefix: &str) -> Result<Self, DepositError> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.prefix() == prefix)
            .ok_or_else(|| DepositError::InvalidInput(format!("invalid namespace: {}", prefix)))
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Atom => "atom",
            Namespace::Dcterms => "dcterms",
            Namespace::Codemeta => "codemeta",
            Namespace::SwhDeposit => "swhdeposit",
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Namespace::Atom => "http://www.w3.org/2005/Atom",
            Namespace::Dcterms => "http://purl.org/dc/terms/",
            Namespace::Codemeta => "https://doi.org/10.5063/SCHEMA/CODEMETA-2.0",
            Namespace::SwhDeposit => "https://www.softwareheritage.org/schema/2018/deposit",
        }
    }

    /// Check whether a URI belongs to one of the registered namespaces.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Namespace::ALL.into_iter().find(|ns| ns.uri() == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_prefix() {
        assert_eq!(Namespace::from_prefix("atom").unwrap(), Namespace::Atom);
        assert_eq!(
            Namespace::from_prefix("swhdeposit").unwrap(),
            Namespace::SwhDeposit
        );
        let err = Namespace::from_prefix("schema").unwrap_err();
        assert!(err.to_string().contains("schema"));
    }

    #[test]
    fn test_uri_lookup() {
        assert_eq!(
            Namespace::from_uri("http://purl.org/dc/terms/"),
            Some(Namespace::Dcterms)
        );
        assert_eq!(Namespace::from_uri("http://www.w3.org/2007/app"), None);
    }
}
