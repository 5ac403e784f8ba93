// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical request construction.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};
use http::{HeaderName, HeaderValue, Method};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use s3sign_core::hash::hex_sha256;
use s3sign_core::{Error, Result};
use std::fmt::{Display, Formatter};

/// The normalized text of one request, used as the signing input.
///
/// Rendered with [`Display`]:
///
/// ```text
/// GET
/// /bucketname
/// search=x-amz-meta-color%3Dblue
/// host:localhost:8000
/// x-amz-content-sha256:e3b0c442...
/// x-amz-date:20161123T123456Z
///
/// host;x-amz-content-sha256;x-amz-date
/// e3b0c442...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    /// Sorted by name, names lowercased and values normalized.
    headers: Vec<(String, String)>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Canonicalize the given request parts.
    pub fn new(
        method: &str,
        path: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
        payload_hash: &str,
    ) -> Result<Self> {
        if method.is_empty() {
            return Err(Error::invalid_input("method must not be empty"));
        }
        Method::from_bytes(method.as_bytes()).map_err(|e| {
            Error::invalid_input(format!("method {method:?} is not a valid http method"))
                .with_source(e)
        })?;
        if payload_hash.is_empty() {
            return Err(Error::invalid_input("payload hash must not be empty"));
        }

        Ok(Self {
            method: method.to_string(),
            uri: canonical_uri(path)?,
            query: canonical_query_string(query)?,
            headers: canonical_headers(headers)?,
            payload_hash: payload_hash.to_string(),
        })
    }

    /// The canonical query string, empty if there is no query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Signed headers as `(name, value)`, sorted by name.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Signed header names joined by `;`.
    pub fn signed_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Hex encoded SHA256 of the canonical request text.
    pub fn hashed(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Encode the path with AWS UriEncode, keeping `/`.
///
/// The input is percent-decoded first so that already encoded paths are
/// not encoded twice. A literal `%` in the path must therefore be given
/// as `%25`.
pub fn canonical_uri(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::invalid_input("uri must not be empty"));
    }
    if !path.starts_with('/') {
        return Err(Error::invalid_input(format!(
            "uri {path:?} must start with '/'"
        )));
    }

    let decoded = percent_decode_str(path).decode_utf8()?;
    Ok(utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string())
}

/// Encode, sort and join query parameters.
///
/// Parameters are sorted by encoded name, then by encoded value. Names
/// must be unique once encoded: a verifier that parses the query into a
/// map could not rebuild the same order otherwise.
pub fn canonical_query_string(query: &[(String, String)]) -> Result<String> {
    let mut pairs = query
        .iter()
        .map(|(k, v)| {
            if k.is_empty() {
                return Err(Error::invalid_input("query parameter name must not be empty"));
            }
            Ok((
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    // Sort by param name
    pairs.sort();

    if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(Error::invalid_input(format!(
            "query parameter {} is given more than once",
            w[0].0
        )));
    }

    Ok(pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&"))
}

/// Lowercase names, normalize values and sort by name.
pub fn canonical_headers(headers: &[(String, String)]) -> Result<Vec<(String, String)>> {
    let mut out = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = normalize_header_value(value);
        // Reject values that could not be sent as is.
        HeaderValue::from_str(&value)?;
        out.push((name.as_str().to_string(), value));
    }

    // Sort via header name.
    out.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(w) = out.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(Error::invalid_input(format!(
            "header {} is given more than once",
            w[0].0
        )));
    }

    Ok(out)
}

/// Trim the value and collapse inner runs of whitespace into one space.
pub fn normalize_header_value(v: &str) -> String {
    v.split_whitespace().collect::<Vec<_>>().join(" ")
}
