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

use crate::canonical::{canonical_headers, canonical_query_string, CanonicalRequest};
use crate::constants::*;
use crate::sign_request::{credential_scope, generate_signing_key, string_to_sign};
use crate::{Credential, RequestDescriptor, Timestamp};
use log::debug;
use s3sign_core::hash::hex_hmac_sha256;
use s3sign_core::{Error, Result};
use std::time::Duration;

/// Query parameters of a presigned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedQuery {
    params: Vec<(String, String)>,
    query: String,
    signature: String,
}

impl PresignedQuery {
    /// Every query parameter of the presigned request, raw and unencoded,
    /// including the descriptor's own ones and `X-Amz-Signature`.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Lowercase hex signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The encoded query string to put after `?`.
    pub fn to_query_string(&self) -> String {
        self.query.clone()
    }
}

/// Sign a request with the query based authorization.
///
/// The payload is not signed and only `host` plus the descriptor headers
/// are. `expires_in` must be between 1 second and 7 days.
pub fn presign(
    cred: &Credential,
    desc: &RequestDescriptor,
    ts: Timestamp,
    expires_in: Duration,
) -> Result<PresignedQuery> {
    cred.check()?;
    desc.check()?;

    let expires = expires_in.as_secs();
    if expires == 0 || expires > MAX_PRESIGN_EXPIRES_SECS || expires_in.subsec_nanos() != 0 {
        return Err(Error::invalid_input(format!(
            "expires in {expires_in:?} must be whole seconds between 1 and {MAX_PRESIGN_EXPIRES_SECS}"
        )));
    }

    let mut headers = vec![("host".to_string(), desc.host.clone())];
    headers.extend(desc.headers.iter().cloned());
    let signed_headers = canonical_headers(&headers)?
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let scope = credential_scope(ts, &desc.region, &desc.service);
    debug!("calculated scope: {scope}");

    let mut params = desc.query_params.clone();
    params.push((X_AMZ_ALGORITHM_QUERY.into(), ALGORITHM.into()));
    params.push((
        X_AMZ_CREDENTIAL_QUERY.into(),
        format!("{}/{scope}", cred.access_key_id),
    ));
    params.push((X_AMZ_DATE_QUERY.into(), ts.iso8601()));
    params.push((X_AMZ_EXPIRES_QUERY.into(), expires.to_string()));
    params.push((X_AMZ_SIGNED_HEADERS_QUERY.into(), signed_headers));
    if let Some(token) = &cred.session_token {
        params.push((X_AMZ_SECURITY_TOKEN_QUERY.into(), token.clone()));
    }

    let creq = CanonicalRequest::new(
        &desc.method,
        &desc.canonical_uri,
        &params,
        &headers,
        UNSIGNED_PAYLOAD,
    )?;
    debug!("calculated canonical request: {creq}");

    let string_to_sign = string_to_sign(ts, &scope, &creq);
    debug!("calculated string to sign: {string_to_sign}");

    let signing_key =
        generate_signing_key(&cred.secret_access_key, ts, &desc.region, &desc.service);
    let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

    params.push((X_AMZ_SIGNATURE_QUERY.into(), signature.clone()));
    let query = canonical_query_string(&params)?;

    Ok(PresignedQuery {
        params,
        query,
        signature,
    })
}
