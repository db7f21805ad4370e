//! SWORD deposit client.
//!
//! Builds the requests of the deposit protocol (create a deposit, add or
//! replace its metadata or content, read its status or content) and turns
//! the server replies into [`DepositResponse`]s.

use crate::archive::Archive;
use crate::errors::DepositError;
use crate::metadata::MetadataNode;
use crate::response::DepositResponse;
use crate::transport::{
    DepositRequest, Method, MultipartPart, ReqwestTransport, RequestBody, Transport,
};
use log::{debug, info};
use reqwest::Url;

const ATOM_ENTRY_CONTENT_TYPE: &str = "application/atom+xml; type=entry";
const ATOM_PART_CONTENT_TYPE: &str = "application/atom+xml; charset=UTF-8";

/// Connection settings for a deposit service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// The base URL with a trailing slash, so request paths join below it.
    pub fn base_url(&self) -> Result<Url, DepositError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base)
            .map_err(|e| DepositError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(DepositError::Config(format!(
                "Base URL cannot have paths joined to it: {}",
                self.base_url
            )));
        }
        Ok(url)
    }
}

/// Atom entry to deposit: a metadata tree or an already serialized document.
#[derive(Debug, Clone, Copy)]
pub enum AtomEntry<'a> {
    Metadata(&'a MetadataNode),
    Xml(&'a str),
}

impl AtomEntry<'_> {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DepositError> {
        match self {
            AtomEntry::Metadata(metadata) => metadata.serialize_to_bytes(),
            AtomEntry::Xml(xml) => Ok(xml.as_bytes().to_vec()),
        }
    }
}

impl<'a> From<&'a MetadataNode> for AtomEntry<'a> {
    fn from(metadata: &'a MetadataNode) -> Self {
        AtomEntry::Metadata(metadata)
    }
}

impl<'a> From<&'a str> for AtomEntry<'a> {
    fn from(xml: &'a str) -> Self {
        AtomEntry::Xml(xml)
    }
}

pub struct DepositClient<T: Transport = ReqwestTransport> {
    transport: T,
}

impl DepositClient<ReqwestTransport> {
    /// Client talking HTTP to the configured service.
    pub fn new(config: &ClientConfig) -> Result<Self, DepositError> {
        Ok(Self::with_transport(ReqwestTransport::new(config)?))
    }
}

impl<T: Transport> DepositClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create a deposit in `collection` from an Atom entry, an archive, or
    /// both (sent as a multipart body).
    pub fn create_deposit(
        &self,
        collection: &str,
        is_final: bool,
        atom: Option<AtomEntry<'_>>,
        archive: Option<Archive>,
    ) -> Result<DepositResponse, DepositError> {
        let path = format!("/1/{}/", collection);
        info!("Creating deposit in collection {}", collection);

        let request = match (atom, archive) {
            (None, None) => {
                return Err(DepositError::InvalidInput(
                    "at least one of atom or archive must be provided".to_string(),
                ));
            }
            (Some(atom), Some(archive)) => DepositRequest::new(Method::Post, path)
                .with_header("In-Progress", in_progress(is_final))
                .with_body(RequestBody::Multipart(vec![
                    MultipartPart {
                        name: "atom".to_string(),
                        file_name: "atom.xml".to_string(),
                        content_type: ATOM_PART_CONTENT_TYPE.to_string(),
                        contents: atom.to_bytes()?,
                    },
                    MultipartPart {
                        name: "file".to_string(),
                        file_name: archive.format.file_name(),
                        content_type: archive.format.content_type().to_string(),
                        contents: archive.data,
                    },
                ])),
            (Some(atom), None) => atom_request(Method::Post, path, is_final, atom)?,
            (None, Some(archive)) => archive_request(Method::Post, path, is_final, archive),
        };

        self.request(request)
    }

    /// Add metadata to a deposit, or replace it when `replace` is set.
    pub fn update_deposit_metadata(
        &self,
        collection: &str,
        deposit_id: &str,
        is_final: bool,
        atom: AtomEntry<'_>,
        replace: bool,
    ) -> Result<DepositResponse, DepositError> {
        let path = format!("/1/{}/{}/metadata/", collection, deposit_id);
        self.request(atom_request(update_method(replace), path, is_final, atom)?)
    }

    pub fn replace_deposit_metadata(
        &self,
        collection: &str,
        deposit_id: &str,
        is_final: bool,
        atom: AtomEntry<'_>,
    ) -> Result<DepositResponse, DepositError> {
        self.update_deposit_metadata(collection, deposit_id, is_final, atom, true)
    }

    /// Add an archive to a deposit, or replace its content when `replace`
    /// is set.
    pub fn update_deposit_content(
        &self,
        collection: &str,
        deposit_id: &str,
        is_final: bool,
        archive: Archive,
        replace: bool,
    ) -> Result<DepositResponse, DepositError> {
        let path = format!("/1/{}/{}/media/", collection, deposit_id);
        self.request(archive_request(
            update_method(replace),
            path,
            is_final,
            archive,
        ))
    }

    pub fn replace_deposit_content(
        &self,
        collection: &str,
        deposit_id: &str,
        is_final: bool,
        archive: Archive,
    ) -> Result<DepositResponse, DepositError> {
        self.update_deposit_content(collection, deposit_id, is_final, archive, true)
    }

    pub fn get_status(
        &self,
        collection: &str,
        deposit_id: &str,
    ) -> Result<DepositResponse, DepositError> {
        self.request(DepositRequest::new(
            Method::Get,
            format!("/1/{}/{}/status/", collection, deposit_id),
        ))
    }

    pub fn get_content(
        &self,
        collection: &str,
        deposit_id: &str,
    ) -> Result<DepositResponse, DepositError> {
        self.request(DepositRequest::new(
            Method::Get,
            format!("/1/{}/{}/content/", collection, deposit_id),
        ))
    }

    /// Send a request and parse the reply.
    ///
    /// Non-success statuses become [`DepositError::Rejected`], which still
    /// carries the parsed response.
    pub fn request(&self, request: DepositRequest) -> Result<DepositResponse, DepositError> {
        debug!("{} {}", request.method, request.path);
        let raw = self.transport.send(request)?;
        let response = DepositResponse::from_raw(raw)?;

        if !response.is_success() {
            return Err(DepositError::Rejected {
                status: response.status(),
                response: Box::new(response),
            });
        }
        Ok(response)
    }
}

fn in_progress(is_final: bool) -> &'static str {
    if is_final { "false" } else { "true" }
}

fn update_method(replace: bool) -> Method {
    if replace { Method::Put } else { Method::Post }
}

fn atom_request(
    method: Method,
    path: String,
    is_final: bool,
    atom: AtomEntry<'_>,
) -> Result<DepositRequest, DepositError> {
    Ok(DepositRequest::new(method, path)
        .with_header("Content-Type", ATOM_ENTRY_CONTENT_TYPE)
        .with_header("In-Progress", in_progress(is_final))
        .with_body(RequestBody::Bytes(atom.to_bytes()?)))
}

fn archive_request(method: Method, path: String, is_final: bool, archive: Archive) -> DepositRequest {
    DepositRequest::new(method, path)
        .with_header("Content-Type", archive.format.content_type())
        .with_header(
            "Content-Disposition",
            format!("attachment; filename={}", archive.format.file_name()),
        )
        .with_header("In-Progress", in_progress(is_final))
        .with_body(RequestBody::Bytes(archive.data))
}
