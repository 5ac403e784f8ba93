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
use s3sign_core::{Error, Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Parsed `authorization` header value.
///
/// ```text
/// AWS4-HMAC-SHA256 Credential=<ak>/<date>/<region>/<service>/aws4_request, SignedHeaders=<names>, Signature=<hex>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// Access key id the request was signed with.
    pub access_key_id: String,
    /// `YYYYMMDD` date of the scope.
    pub date: String,
    /// Region of the scope.
    pub region: String,
    /// Service of the scope.
    pub service: String,
    /// Signed header names, in the order given.
    pub signed_headers: Vec<String>,
    /// Lowercase hex signature.
    pub signature: String,
}

impl AuthorizationHeader {
    /// `date/region/service/aws4_request`
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{AWS4_REQUEST}",
            self.date, self.region, self.service
        )
    }
}

impl Display for AuthorizationHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key_id,
            self.credential_scope(),
            self.signed_headers.join(";"),
            self.signature
        )
    }
}

impl FromStr for AuthorizationHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(ALGORITHM)
            .and_then(|v| v.strip_prefix(' '))
            .ok_or_else(|| Error::invalid_input(format!("algorithm must be {ALGORITHM}")))?;

        let mut credential = None;
        let mut signed_headers = None;
        let mut signature = None;
        for component in rest.split(',') {
            let (key, value) = component
                .trim()
                .split_once('=')
                .ok_or_else(|| Error::invalid_input(format!("malformed component {component:?}")))?;
            let slot = match key {
                "Credential" => &mut credential,
                "SignedHeaders" => &mut signed_headers,
                "Signature" => &mut signature,
                _ => return Err(Error::invalid_input(format!("unknown component {key}"))),
            };
            if slot.replace(value).is_some() {
                return Err(Error::invalid_input(format!("component {key} given twice")));
            }
        }

        let credential =
            credential.ok_or_else(|| Error::invalid_input("missing Credential"))?;
        let signed_headers =
            signed_headers.ok_or_else(|| Error::invalid_input("missing SignedHeaders"))?;
        let signature = signature.ok_or_else(|| Error::invalid_input("missing Signature"))?;

        let scope: Vec<&str> = credential.split('/').collect();
        let [access_key_id, date, region, service, terminator] = scope[..] else {
            return Err(Error::invalid_input(format!(
                "credential {credential:?} must have 5 parts"
            )));
        };
        if access_key_id.is_empty() || region.is_empty() || service.is_empty() {
            return Err(Error::invalid_input("credential has an empty part"));
        }
        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_input(format!(
                "credential date {date:?} must be YYYYMMDD"
            )));
        }
        if terminator != AWS4_REQUEST {
            return Err(Error::invalid_input(format!(
                "credential must end with {AWS4_REQUEST}"
            )));
        }

        let signed_headers: Vec<String> = signed_headers.split(';').map(String::from).collect();
        if signed_headers.iter().any(|v| v.is_empty()) {
            return Err(Error::invalid_input("signed headers has an empty name"));
        }

        if signature.len() != 64
            || !signature
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(Error::invalid_input(
                "signature must be 64 lowercase hex characters",
            ));
        }

        Ok(Self {
            access_key_id: access_key_id.to_string(),
            date: date.to_string(),
            region: region.to_string(),
            service: service.to_string(),
            signed_headers,
            signature: signature.to_string(),
        })
    }
}
