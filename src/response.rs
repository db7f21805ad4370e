//! Deposit server responses.
//!
//! The body of every response is handed to libxml2. When it is well-formed
//! XML the deposit fields are pulled out with namespace-aware XPath
//! queries; otherwise (plain-text error pages, empty bodies) the response
//! simply carries no document and no derived fields. A malformed body is
//! never an error.

use crate::errors::DepositError;
use crate::status::DepositStatus;
use crate::transport::RawResponse;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use libxml::parser::{Parser, ParserOptions, XmlParseError};
use libxml::tree::Document;
use libxml::xpath::Context;
use log::{debug, warn};
use std::fmt;

/// Prefixes available to XPath queries on a response.
pub const XPATH_NAMESPACES: [(&str, &str); 6] = [
    ("app", "http://www.w3.org/2007/app"),
    ("atom", "http://www.w3.org/2005/Atom"),
    ("sword", "http://purl.org/net/sword/terms/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("codemeta", "https://doi.org/10.5063/SCHEMA/CODEMETA-2.0"),
    (
        "swhdeposit",
        "https://www.softwareheritage.org/schema/2018/deposit",
    ),
];

/// Zone-less date-time layouts, read as UTC.
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A completed exchange with the deposit server.
///
/// Only the body text and the extracted fields are kept, so responses (and
/// the errors carrying them) can be sent across threads. XPath queries
/// parse the body again.
pub struct DepositResponse {
    status: u16,
    body: String,
    has_document: bool,

    deposit_id: Option<String>,
    deposit_date: Option<DateTime<FixedOffset>>,
    deposit_archive: Option<String>,
    deposit_status: Option<DepositStatus>,
    deposit_swh_id: Option<String>,
    deposit_swh_id_context: Option<String>,
}

impl DepositResponse {
    /// Wrap a status code and body.
    ///
    /// Fails only if the body is a deposit entry whose
    /// `swhdeposit:deposit_status` is not a known status.
    pub fn new(status: u16, body: impl Into<String>) -> Result<Self, DepositError> {
        let body = body.into();
        let document = parse_document(&body);

        let mut response = Self {
            status,
            body,
            has_document: document.is_some(),
            deposit_id: None,
            deposit_date: None,
            deposit_archive: None,
            deposit_status: None,
            deposit_swh_id: None,
            deposit_swh_id_context: None,
        };

        if let Some(document) = &document {
            let field = |name: &str| {
                query_document(document, &entry_field(name))
                    .into_iter()
                    .next()
            };

            response.deposit_id = field("deposit_id");
            response.deposit_date =
                field("deposit_date").and_then(|text| parse_deposit_date(&text));
            response.deposit_archive = field("deposit_archive");
            response.deposit_status = field("deposit_status")
                .map(|text| text.parse::<DepositStatus>())
                .transpose()?;
            response.deposit_swh_id = field("deposit_swh_id");
            response.deposit_swh_id_context = field("deposit_swh_id_context");
        }

        Ok(response)
    }

    /// Wrap a transport response; the body is decoded as UTF-8 (lossily).
    pub fn from_raw(raw: RawResponse) -> Result<Self, DepositError> {
        let body = String::from_utf8_lossy(&raw.body).into_owned();
        Self::new(raw.status, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// A fresh parse of the body, when it is well-formed XML.
    pub fn document(&self) -> Option<Document> {
        if self.has_document {
            parse_document(&self.body)
        } else {
            None
        }
    }

    pub fn has_document(&self) -> bool {
        self.has_document
    }

    pub fn deposit_id(&self) -> Option<&str> {
        self.deposit_id.as_deref()
    }

    pub fn deposit_date(&self) -> Option<DateTime<FixedOffset>> {
        self.deposit_date
    }

    pub fn deposit_archive(&self) -> Option<&str> {
        self.deposit_archive.as_deref()
    }

    pub fn deposit_status(&self) -> Option<DepositStatus> {
        self.deposit_status
    }

    pub fn deposit_swh_id(&self) -> Option<&str> {
        self.deposit_swh_id.as_deref()
    }

    pub fn deposit_swh_id_context(&self) -> Option<&str> {
        self.deposit_swh_id_context.as_deref()
    }

    /// Text content of the first node matching `xpath`.
    pub fn get(&self, xpath: &str) -> Option<String> {
        self.get_all(xpath).into_iter().next()
    }

    /// Text content of every node matching `xpath`, in document order.
    pub fn get_all(&self, xpath: &str) -> Vec<String> {
        match self.document() {
            Some(document) => query_document(&document, xpath),
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for DepositResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositResponse")
            .field("status", &self.status)
            .field("has_document", &self.has_document)
            .field("deposit_id", &self.deposit_id)
            .field("deposit_date", &self.deposit_date)
            .field("deposit_archive", &self.deposit_archive)
            .field("deposit_status", &self.deposit_status)
            .field("deposit_swh_id", &self.deposit_swh_id)
            .field("deposit_swh_id_context", &self.deposit_swh_id_context)
            .finish()
    }
}

fn entry_field(field: &str) -> String {
    format!("//atom:entry/swhdeposit:{}", field)
}

fn query_document(document: &Document, xpath: &str) -> Vec<String> {
    let Some(context) = xpath_context(document) else {
        return Vec::new();
    };
    match context.evaluate(xpath) {
        Ok(result) => result
            .get_nodes_as_vec()
            .iter()
            .map(|node| node.get_content())
            .collect(),
        Err(()) => {
            debug!("XPath evaluation failed for {}", xpath);
            Vec::new()
        }
    }
}

fn xpath_context(document: &Document) -> Option<Context> {
    let context = Context::new(document).ok()?;
    for (prefix, uri) in XPATH_NAMESPACES {
        context.register_namespace(prefix, uri).ok()?;
    }
    Some(context)
}

/// Parse XML without libxml2's recovery mode, so documents with fatal
/// syntax errors are rejected. Diagnostics are not printed.
pub(crate) fn parse_xml(content: &str) -> Result<Document, XmlParseError> {
    let options = ParserOptions {
        recover: false,
        no_error: true,
        no_warning: true,
        ..ParserOptions::default()
    };
    Parser::default().parse_string_with_options(content, options)
}

fn parse_document(body: &str) -> Option<Document> {
    if body.trim().is_empty() {
        return None;
    }

    match parse_xml(body) {
        Ok(document) => Some(document),
        Err(e) => {
            debug!("Response body is not XML: {}", e);
            None
        }
    }
}

/// Lenient timestamp parsing for `deposit_date`.
///
/// Accepts RFC 3339, the server's `YYYY-MM-DD HH:MM:SS.ffffff+HH:MM`
/// layout, and zone-less date-times or dates (taken as UTC).
pub fn parse_deposit_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(date);
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(naive.and_utc().fixed_offset());
    }

    warn!("Could not parse deposit date: {}", text);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_server_date_layout() {
        let date = parse_deposit_date("2017-10-07 15:17:08.381403+00:00").unwrap();
        assert_eq!(date.year(), 2017);
        assert_eq!(date.hour(), 15);
        assert_eq!(date.nanosecond(), 381_403_000);
    }

    #[test]
    fn test_parse_rfc3339_date() {
        let date = parse_deposit_date("2023-04-01T08:30:00+02:00").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_parse_naive_dates_as_utc() {
        let date = parse_deposit_date("2021-02-03 04:05:06").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 0);
        assert_eq!(date.minute(), 5);

        let date = parse_deposit_date("2021-02-03").unwrap();
        assert_eq!(date.day(), 3);
        assert_eq!(date.hour(), 0);
    }

    #[test]
    fn test_unparseable_date() {
        assert!(parse_deposit_date("yesterday").is_none());
        assert!(parse_deposit_date("").is_none());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_response_and_error_cross_threads() {
        assert_send_sync::<DepositResponse>();
        assert_send_sync::<DepositError>();

        let response = DepositResponse::new(
            200,
            r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:swhdeposit="https://www.softwareheritage.org/schema/2018/deposit"><swhdeposit:deposit_id>3</swhdeposit:deposit_id></entry>"#,
        )
        .unwrap();
        let id = std::thread::spawn(move || response.get("//swhdeposit:deposit_id"))
            .join()
            .unwrap();
        assert_eq!(id.as_deref(), Some("3"));
    }

    #[test]
    fn test_status_text_must_match_exactly() {
        let body = r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:swhdeposit="https://www.softwareheritage.org/schema/2018/deposit"><swhdeposit:deposit_status> done
</swhdeposit:deposit_status></entry>"#;
        let err = DepositResponse::new(200, body).unwrap_err();
        assert!(matches!(err, DepositError::InvalidInput(_)));
    }

    #[test]
    fn test_document_is_parsed_on_demand() {
        let response =
            DepositResponse::new(200, r#"<entry xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();
        let document = response.document().unwrap();
        assert_eq!(document.get_root_element().unwrap().get_name(), "entry");
        assert!(DepositResponse::new(500, "oops").unwrap().document().is_none());
    }

    #[test]
    fn test_empty_body_has_no_document() {
        let response = DepositResponse::new(204, "").unwrap();
        assert!(!response.has_document());
        assert!(response.is_success());
    }
}
