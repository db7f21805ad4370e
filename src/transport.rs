//! HTTP transport for deposit requests.
//!
//! [`DepositClient`](crate::client::DepositClient) only builds
//! [`DepositRequest`]s; a [`Transport`] sends them. [`ReqwestTransport`]
//! is the blocking `reqwest` implementation with basic authentication.

use crate::client::ClientConfig;
use crate::errors::DepositError;
use log::debug;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use std::fmt;

/// HTTP methods used by the deposit protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(Vec<MultipartPart>),
}

/// A request relative to the deposit service base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl DepositRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Value of the first header with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends deposit requests.
pub trait Transport {
    fn send(&self, request: DepositRequest) -> Result<RawResponse, DepositError>;
}

/// Blocking `reqwest` transport with HTTP basic authentication.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, DepositError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DepositError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url()?,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, DepositError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DepositError::Config(format!("Invalid request path {}: {}", path, e)))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: DepositRequest) -> Result<RawResponse, DepositError> {
        let url = self.url_for(&request.path)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        debug!("Sending {} {}", request.method, url);

        let mut builder = self
            .client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(data) => builder.body(data),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let file_part = Part::bytes(part.contents)
                        .file_name(part.file_name)
                        .mime_str(&part.content_type)
                        .map_err(|e| {
                            DepositError::InvalidInput(format!(
                                "Invalid content type {}: {}",
                                part.content_type, e
                            ))
                        })?;
                    form = form.part(part.name, file_part);
                }
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .map_err(|e| DepositError::Transport(format!("Request failed: {}", e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| DepositError::Transport(format!("Failed to read response body: {}", e)))?
            .to_vec();
        debug!("Received HTTP {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}
