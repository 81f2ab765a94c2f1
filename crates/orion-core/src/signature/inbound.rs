//! Verification boundary for inbound signed requests.
//!
//! The receiving HTTP framework is not part of this crate; it hands over the
//! request headers and the untouched raw body. Verification always runs on
//! those raw bytes, and only a verified body is decoded.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;

use super::{SignatureCodec, VerificationError};

/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-request-timestamp";

/// Header carrying the `v0=<hex>` request signature.
pub const SIGNATURE_HEADER: &str = "x-request-signature";

impl SignatureCodec {
    /// Verifies an inbound request from its headers and raw body.
    ///
    /// The signed base string uses the timestamp header exactly as received.
    ///
    /// # Errors
    ///
    /// `MissingHeaders` if either header is absent or not valid text,
    /// `MalformedTimestamp` if the timestamp is not an integer, then the
    /// errors of [`SignatureCodec::verify`].
    pub fn verify_request(
        &self,
        headers: &HeaderMap,
        raw_body: &[u8],
        now: i64,
    ) -> Result<(), VerificationError> {
        let timestamp = header_text(headers, TIMESTAMP_HEADER)?;
        let signature = header_text(headers, SIGNATURE_HEADER)?;

        let seconds: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| VerificationError::MalformedTimestamp)?;

        self.check_freshness(seconds, now)?;
        self.verify_base(timestamp, raw_body, signature)
    }

    /// Verifies an inbound request and decodes its body.
    ///
    /// # Errors
    ///
    /// Any verification error, or `MalformedBody` if the verified body
    /// cannot be decoded.
    pub fn accept_request(
        &self,
        headers: &HeaderMap,
        raw_body: &[u8],
        now: i64,
    ) -> Result<InboundPayload, VerificationError> {
        self.verify_request(headers, raw_body, now)?;
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        InboundPayload::parse(content_type, raw_body)
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, VerificationError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(VerificationError::MissingHeaders)
}

/// Decoded body of a verified inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// `application/json` body
    Json(Value),
    /// `application/x-www-form-urlencoded` body (slash commands)
    Form(BTreeMap<String, String>),
}

impl InboundPayload {
    /// Decodes a body according to its content type; anything that is not
    /// JSON is treated as a form.
    ///
    /// # Errors
    ///
    /// `MalformedBody` if a JSON body does not parse.
    pub fn parse(content_type: Option<&str>, raw: &[u8]) -> Result<Self, VerificationError> {
        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if is_json {
            return serde_json::from_slice(raw)
                .map(InboundPayload::Json)
                .map_err(|e| VerificationError::MalformedBody(e.to_string()));
        }

        let fields = url::form_urlencoded::parse(raw)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Ok(InboundPayload::Form(fields))
    }

    /// Looks up a top-level field as text.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            InboundPayload::Json(value) => value.get(name).and_then(Value::as_str),
            InboundPayload::Form(fields) => fields.get(name).map(String::as_str),
        }
    }
}
