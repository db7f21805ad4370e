//! Integration tests for the deposit client.
//!
//! A recording transport stands in for the HTTP layer so the exact
//! requests built for each protocol operation can be checked.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use swh_deposit::errors::DepositError;
use swh_deposit::transport::MultipartPart;
use swh_deposit::{
    Archive, ArchiveFormat, AtomEntry, DepositClient, DepositRequest, DepositStatus,
    MetadataNode, Method, RawResponse, RequestBody, Transport,
};

const RECEIPT: &str = r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:swhdeposit="https://www.softwareheritage.org/schema/2018/deposit">
  <swhdeposit:deposit_id>42</swhdeposit:deposit_id>
  <swhdeposit:deposit_status>deposited</swhdeposit:deposit_status>
</entry>"#;

// --- Helper Types ---

struct RecordingTransport {
    status: u16,
    body: String,
    requests: RefCell<Vec<DepositRequest>>,
}

impl RecordingTransport {
    fn replying(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn last_request(&self) -> DepositRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: DepositRequest) -> Result<RawResponse, DepositError> {
        self.requests.borrow_mut().push(request);
        Ok(RawResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

struct FailingTransport;

impl Transport for FailingTransport {
    fn send(&self, _request: DepositRequest) -> Result<RawResponse, DepositError> {
        Err(DepositError::Transport("connection refused".to_string()))
    }
}

fn sample_metadata() -> MetadataNode {
    let mut metadata = MetadataNode::root();
    metadata.add_value("title", "Example").unwrap();
    metadata.add_value("codemeta:name", "example").unwrap();
    metadata
}

fn zip_archive() -> Archive {
    Archive::new(ArchiveFormat::Zip, b"PK\x03\x04zip-bytes".to_vec())
}

fn client() -> DepositClient<RecordingTransport> {
    DepositClient::with_transport(RecordingTransport::replying(201, RECEIPT))
}

// --- Tests ---

#[test]
fn test_create_requires_atom_or_archive() {
    let client = client();
    let err = client.create_deposit("test", true, None, None).unwrap_err();
    assert!(matches!(err, DepositError::InvalidInput(_)));
    assert!(client.transport().requests.borrow().is_empty());
}

#[test]
fn test_create_with_metadata_only() {
    let client = client();
    let metadata = sample_metadata();

    let response = client
        .create_deposit("test", false, Some((&metadata).into()), None)
        .unwrap();
    assert_eq!(response.deposit_id(), Some("42"));
    assert_eq!(response.deposit_status(), Some(DepositStatus::Deposited));

    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/1/test/");
    assert_eq!(
        request.header("Content-Type"),
        Some("application/atom+xml; type=entry")
    );
    assert_eq!(request.header("In-Progress"), Some("true"));
    assert_eq!(
        request.body,
        RequestBody::Bytes(metadata.serialize_to_bytes().unwrap())
    );
}

#[test]
fn test_create_with_archive_only() {
    let client = client();
    client
        .create_deposit("test", true, None, Some(zip_archive()))
        .unwrap();

    let request = client.transport().last_request();
    assert_eq!(request.path, "/1/test/");
    assert_eq!(request.header("Content-Type"), Some("application/zip"));
    assert_eq!(
        request.header("Content-Disposition"),
        Some("attachment; filename=archive.zip")
    );
    assert_eq!(request.header("In-Progress"), Some("false"));
    assert_eq!(request.body, RequestBody::Bytes(zip_archive().data));
}

#[test]
fn test_create_with_metadata_and_archive_is_multipart() {
    let client = client();
    let xml = "<entry xmlns=\"http://www.w3.org/2005/Atom\"><title>raw</title></entry>";
    let archive = Archive::new(ArchiveFormat::Tar, vec![0u8; 16]);

    client
        .create_deposit("test", true, Some(AtomEntry::Xml(xml)), Some(archive))
        .unwrap();

    let request = client.transport().last_request();
    assert_eq!(request.header("In-Progress"), Some("false"));
    assert_eq!(request.header("Content-Type"), None);
    assert_eq!(
        request.body,
        RequestBody::Multipart(vec![
            MultipartPart {
                name: "atom".to_string(),
                file_name: "atom.xml".to_string(),
                content_type: "application/atom+xml; charset=UTF-8".to_string(),
                contents: xml.as_bytes().to_vec(),
            },
            MultipartPart {
                name: "file".to_string(),
                file_name: "archive.tar".to_string(),
                content_type: "application/x-tar".to_string(),
                contents: vec![0u8; 16],
            },
        ])
    );
}

#[test]
fn test_update_and_replace_metadata() {
    let client = client();
    let metadata = sample_metadata();

    client
        .update_deposit_metadata("test", "42", false, (&metadata).into(), false)
        .unwrap();
    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/1/test/42/metadata/");
    assert_eq!(request.header("In-Progress"), Some("true"));

    client
        .replace_deposit_metadata("test", "42", true, (&metadata).into())
        .unwrap();
    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/1/test/42/metadata/");
    assert_eq!(request.header("In-Progress"), Some("false"));
}

#[test]
fn test_update_and_replace_content() {
    let client = client();

    client
        .update_deposit_content("test", "42", false, zip_archive(), false)
        .unwrap();
    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/1/test/42/media/");
    assert_eq!(
        request.header("Content-Disposition"),
        Some("attachment; filename=archive.zip")
    );

    client
        .replace_deposit_content("test", "42", true, zip_archive())
        .unwrap();
    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path, "/1/test/42/media/");
}

#[test]
fn test_status_and_content_are_plain_gets() {
    let client = client();

    client.get_status("test", "42").unwrap();
    let request = client.transport().last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "/1/test/42/status/");
    assert!(request.headers.is_empty());
    assert_eq!(request.body, RequestBody::Empty);

    client.get_content("test", "42").unwrap();
    assert_eq!(client.transport().last_request().path, "/1/test/42/content/");
}

#[test]
fn test_error_status_keeps_parsed_response() {
    let client = DepositClient::with_transport(RecordingTransport::replying(
        400,
        r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:swhdeposit="https://www.softwareheritage.org/schema/2018/deposit"><swhdeposit:deposit_status>rejected</swhdeposit:deposit_status></entry>"#,
    ));

    let err = client.get_status("test", "42").unwrap_err();
    let response = err.response().expect("rejected error carries the response");
    assert_eq!(response.status(), 400);
    assert_eq!(response.deposit_status(), Some(DepositStatus::Rejected));
    assert!(matches!(err, DepositError::Rejected { status: 400, .. }));
}

#[test]
fn test_error_status_with_plain_text_body() {
    let client = DepositClient::with_transport(RecordingTransport::replying(
        401,
        "Unauthorized",
    ));

    let err = client.get_status("test", "42").unwrap_err();
    let response = err.response().unwrap();
    assert!(!response.has_document());
    assert_eq!(response.body(), "Unauthorized");
}

#[test]
fn test_transport_failures_propagate() {
    let client = DepositClient::with_transport(FailingTransport);
    let err = client.get_content("test", "1").unwrap_err();
    assert!(matches!(err, DepositError::Transport(_)));
    assert!(err.response().is_none());
}
