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

use crate::canonical::CanonicalRequest;
use crate::constants::*;
use crate::presign::{presign, PresignedQuery};
use crate::{Credential, RequestDescriptor, SignedHeaders, Timestamp};
use log::debug;
use s3sign_core::hash::{hex_hmac_sha256, hmac_sha256};
use s3sign_core::time::{Clock, SystemClock};
use s3sign_core::Result;
use std::sync::Arc;
use std::time::Duration;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer only owns a [`Clock`]. It samples the clock once per call and
/// hands the resulting [`Timestamp`] to [`sign`] or [`presign`], so the same
/// input signed at the same instant always yields the same output.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    clock: Arc<dyn Clock>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a signer reading the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }

    /// Specify the clock to take the signing time from.
    ///
    /// # Note
    ///
    /// Requests should always be signed with the current time. Use a
    /// fixed clock for tests and reproducible vectors only.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sign a request with the header based authorization.
    pub fn sign(
        &self,
        cred: &Credential,
        desc: &RequestDescriptor,
        payload_hash: &str,
    ) -> Result<SignedHeaders> {
        sign(cred, desc, Timestamp::from_clock(self.clock.as_ref()), payload_hash)
    }

    /// Sign a request with the query based authorization.
    pub fn presign(
        &self,
        cred: &Credential,
        desc: &RequestDescriptor,
        expires_in: Duration,
    ) -> Result<PresignedQuery> {
        presign(cred, desc, Timestamp::from_clock(self.clock.as_ref()), expires_in)
    }
}

/// Sign a request at the given instant.
///
/// Returns `authorization`, `x-amz-content-sha256`, `x-amz-date` and, when
/// the credential carries a session token, `x-amz-security-token`.
pub fn sign(
    cred: &Credential,
    desc: &RequestDescriptor,
    ts: Timestamp,
    payload_hash: &str,
) -> Result<SignedHeaders> {
    cred.check()?;

    let creq = canonical_request(cred, desc, ts, payload_hash)?;
    debug!("calculated canonical request: {creq}");

    let scope = credential_scope(ts, &desc.region, &desc.service);
    debug!("calculated scope: {scope}");

    let string_to_sign = string_to_sign(ts, &scope, &creq);
    debug!("calculated string to sign: {string_to_sign}");

    let signing_key =
        generate_signing_key(&cred.secret_access_key, ts, &desc.region, &desc.service);
    let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

    SignedHeaders::build(cred, ts, scope, creq.signed_headers(), payload_hash, signature)
}

/// Build the canonical request of a header signed request.
///
/// `host`, `x-amz-content-sha256`, `x-amz-date`, the session token when
/// present and every descriptor header are signed.
pub fn canonical_request(
    cred: &Credential,
    desc: &RequestDescriptor,
    ts: Timestamp,
    payload_hash: &str,
) -> Result<CanonicalRequest> {
    desc.check()?;

    let mut headers = Vec::with_capacity(desc.headers.len() + 4);
    headers.push(("host".to_string(), desc.host.clone()));
    headers.push((X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.to_string()));
    headers.push((X_AMZ_DATE.to_string(), ts.iso8601()));
    if let Some(token) = &cred.session_token {
        headers.push((X_AMZ_SECURITY_TOKEN.to_string(), token.clone()));
    }
    headers.extend(desc.headers.iter().cloned());

    CanonicalRequest::new(
        &desc.method,
        &desc.canonical_uri,
        &desc.query_params,
        &headers,
        payload_hash,
    )
}

/// Scope: "20220313/<region>/<service>/aws4_request"
pub fn credential_scope(ts: Timestamp, region: &str, service: &str) -> String {
    format!("{}/{region}/{service}/{AWS4_REQUEST}", ts.date())
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(ts: Timestamp, scope: &str, creq: &CanonicalRequest) -> String {
    format!("{ALGORITHM}\n{ts}\n{scope}\n{}", creq.hashed())
}

/// Derive the signing key of one day, region and service.
pub fn generate_signing_key(secret: &str, ts: Timestamp, region: &str, service: &str) -> Vec<u8> {
    let seed = format!("{AWS4_SECRET_PREFIX}{secret}").into_bytes();

    [ts.date().as_str(), region, service, AWS4_REQUEST]
        .iter()
        .fold(seed, |key, label| hmac_sha256(&key, label.as_bytes()))
}
