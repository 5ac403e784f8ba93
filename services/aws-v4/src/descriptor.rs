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

use crate::constants::*;
use http::header;
use s3sign_core::{Error, Result};

/// Description of the one HTTP request to sign.
///
/// Query parameters hold raw text: the signer applies the AWS URI
/// encoding itself. `canonical_uri` may be given raw or already
/// percent-encoded, it's decoded before being encoded again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Host header value, including the port when it's not the default one.
    pub host: String,
    /// Request path without the query, e.g. `/bucketname`.
    ///
    /// Percent escapes are decoded before the path is encoded, so
    /// `/bucket/%41` is signed as `/bucket/A`. A key that really contains
    /// `%` must escape it: `/bucket/%2541` signs the key `%41`.
    pub canonical_uri: String,
    /// Query parameters in the order they were given.
    pub query_params: Vec<(String, String)>,
    /// Extra headers to sign besides the ones the signer manages.
    pub headers: Vec<(String, String)>,
    /// Region part of the credential scope.
    pub region: String,
    /// Service part of the credential scope.
    pub service: String,
}

impl RequestDescriptor {
    /// Create a descriptor for `us-east-1` / `s3` without query or extra headers.
    pub fn new(method: &str, host: &str, canonical_uri: &str) -> Self {
        Self {
            method: method.to_string(),
            host: host.to_string(),
            canonical_uri: canonical_uri.to_string(),
            query_params: Vec::new(),
            headers: Vec::new(),
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a header that must be signed.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Set the service.
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Build a descriptor from `http::request::Parts`.
    ///
    /// The host comes from the uri authority, falling back to the `host`
    /// header. `x-amz-*` and `x-scal-*` headers are carried over as
    /// headers to sign, except those the signer sets itself.
    pub fn from_parts(parts: &http::request::Parts) -> Result<Self> {
        let host = match parts.uri.authority() {
            Some(authority) => authority.as_str().to_string(),
            None => parts
                .headers
                .get(header::HOST)
                .ok_or_else(|| Error::invalid_input("request without host is invalid for signing"))?
                .to_str()?
                .to_string(),
        };

        let path = match parts.uri.path() {
            "" => "/",
            v => v,
        };

        let mut desc = Self::new(parts.method.as_str(), &host, path);
        desc.query_params = parts
            .uri
            .query()
            .map(|v| {
                form_urlencoded::parse(v.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        for (name, value) in parts.headers.iter() {
            let name = name.as_str();
            if !(name.starts_with("x-amz-") || name.starts_with("x-scal-")) {
                continue;
            }
            if is_managed_header(name) {
                continue;
            }
            desc.headers.push((name.to_string(), value.to_str()?.to_string()));
        }

        Ok(desc)
    }

    /// Make sure every field the signature depends on is present.
    pub fn check(&self) -> Result<()> {
        let required = [
            ("method", &self.method),
            ("host", &self.host),
            ("uri", &self.canonical_uri),
            ("region", &self.region),
            ("service", &self.service),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(Error::invalid_input(format!("{field} must not be empty")));
            }
        }

        for (field, value) in [("region", &self.region), ("service", &self.service)] {
            if value.contains('/') {
                return Err(Error::invalid_input(format!(
                    "{field} {value:?} must not contain '/'"
                )));
            }
        }

        for (name, _) in &self.headers {
            if is_managed_header(&name.to_ascii_lowercase()) {
                return Err(Error::invalid_input(format!(
                    "header {name} is set by the signer and must not be given"
                )));
            }
        }

        Ok(())
    }
}

/// Headers whose value is decided by the signer.
pub(crate) fn is_managed_header(name: &str) -> bool {
    matches!(
        name,
        "host" | "authorization" | X_AMZ_DATE | X_AMZ_CONTENT_SHA_256 | X_AMZ_SECURITY_TOKEN
    )
}
