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
use crate::{Credential, Timestamp};
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderMap, HeaderValue};
use s3sign_core::Result;

/// Headers produced by signing one request.
///
/// Attach them verbatim to the request. The `authorization` and
/// `x-amz-security-token` values are marked sensitive so that `http`
/// never prints them.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    headers: HeaderMap,
    timestamp: Timestamp,
    credential_scope: String,
    signed_header_names: String,
    signature: String,
}

impl SignedHeaders {
    pub(crate) fn build(
        cred: &Credential,
        timestamp: Timestamp,
        credential_scope: String,
        signed_header_names: String,
        payload_hash: &str,
        signature: String,
    ) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(X_AMZ_DATE, HeaderValue::try_from(timestamp.iso8601())?);
        headers.insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(payload_hash)?);

        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to valid leaking.
            value.set_sensitive(true);
            headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_header_names}, Signature={signature}",
            cred.access_key_id,
        ))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        Ok(Self {
            headers,
            timestamp,
            credential_scope,
            signed_header_names,
            signature,
        })
    }

    /// Value of one produced header, by lowercase name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// The `authorization` value.
    pub fn authorization(&self) -> Option<&str> {
        self.get(AUTHORIZATION.as_str())
    }

    /// Lowercase hex signature, the seed of a chunked upload.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `date/region/service/aws4_request`
    pub fn credential_scope(&self) -> &str {
        &self.credential_scope
    }

    /// `;` joined names of every signed header.
    pub fn signed_header_names(&self) -> &str {
        &self.signed_header_names
    }

    /// The instant the request was signed at.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Iterate over the produced `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str(), v.to_str().ok()?)))
    }

    /// Number of produced headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Always false: a signed request has at least an `authorization`.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Consume into the underlying header map.
    pub fn into_header_map(self) -> HeaderMap {
        self.headers
    }

    /// Insert the produced headers into the request, replacing any
    /// existing value of the same name.
    pub fn apply(&self, parts: &mut Parts) {
        for (name, value) in self.headers.iter() {
            parts.headers.insert(name.clone(), value.clone());
        }
    }
}
