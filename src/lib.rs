//! Main library for the Software Heritage deposit client.
//!
//! This crate builds Atom deposit entries (optionally from CodeMeta
//! metadata), submits them with or without a source archive to a SWORD
//! deposit service, and reads the service's XML replies into typed
//! deposit fields.
//!
//! ```ignore
//! use swh_deposit::{ClientConfig, DepositClient, MetadataNode};
//!
//! let mut metadata = MetadataNode::from_codemeta_str(&codemeta_json)?;
//! metadata.add_value("title", "My software")?;
//!
//! let client = DepositClient::new(&ClientConfig::new(url, user, password))?;
//! let response = client.create_deposit("my-collection", true, Some((&metadata).into()), None)?;
//! println!("{:?}", response.deposit_status());
//! ```

pub mod archive;
pub mod client;
pub mod errors;
pub mod metadata;
pub mod response;
pub mod status;
pub mod summary;
pub mod transport;
pub mod xml_validator;

pub use archive::{Archive, ArchiveFormat};
pub use client::{AtomEntry, ClientConfig, DepositClient};
pub use errors::DepositError;
pub use metadata::{MetadataNode, Namespace};
pub use response::DepositResponse;
pub use status::DepositStatus;
pub use transport::{DepositRequest, Method, RawResponse, RequestBody, Transport};
