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

//! Signing of `aws-chunked` uploads.
//!
//! - [Signature Calculations for the Authorization Header: Transferring Payload in Multiple Chunks](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-streaming.html)

use crate::constants::*;
use crate::sign_request::{credential_scope, generate_signing_key};
use crate::{Credential, RequestDescriptor, SignedHeaders, Timestamp};
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use s3sign_core::hash::{hex_hmac_sha256, hex_sha256};
use s3sign_core::{Error, Result};
use std::fmt::{Debug, Formatter};

const CHUNK_SIGNATURE: &str = ";chunk-signature=";
const CRLF: &[u8] = b"\r\n";
/// Length of a hex encoded signature.
const SIGNATURE_LEN: u64 = 64;

/// Signs the chunks of one upload, each one chained to the previous.
///
/// Owned by a single upload stream: the chain state lives in `&mut self`.
pub struct ChunkSigner {
    signing_key: Vec<u8>,
    timestamp: Timestamp,
    credential_scope: String,
    previous_signature: String,
}

impl Debug for ChunkSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSigner")
            .field("timestamp", &self.timestamp)
            .field("credential_scope", &self.credential_scope)
            .field("previous_signature", &self.previous_signature)
            .finish_non_exhaustive()
    }
}

impl ChunkSigner {
    /// Start the chain from the headers of the seed request.
    ///
    /// The seed must have been signed with [`STREAMING_PAYLOAD`] as payload
    /// hash, using the same credential and descriptor. A descriptor whose
    /// region or service differ from the seed scope is rejected.
    pub fn new(cred: &Credential, desc: &RequestDescriptor, seed: &SignedHeaders) -> Result<Self> {
        cred.check()?;
        desc.check()?;
        if seed.get(X_AMZ_CONTENT_SHA_256) != Some(STREAMING_PAYLOAD) {
            return Err(Error::invalid_input(format!(
                "seed request must be signed with payload {STREAMING_PAYLOAD}"
            )));
        }

        let timestamp = seed.timestamp();
        let scope = credential_scope(timestamp, &desc.region, &desc.service);
        if scope != seed.credential_scope() {
            return Err(Error::invalid_input(format!(
                "descriptor scope {scope} doesn't match seed scope {}",
                seed.credential_scope()
            )));
        }

        Ok(Self {
            signing_key: generate_signing_key(
                &cred.secret_access_key,
                timestamp,
                &desc.region,
                &desc.service,
            ),
            timestamp,
            credential_scope: scope,
            previous_signature: seed.signature().to_string(),
        })
    }

    /// The signature the next chunk will be chained to.
    pub fn previous_signature(&self) -> &str {
        &self.previous_signature
    }

    /// Sign one chunk and advance the chain.
    ///
    /// ```text
    /// AWS4-HMAC-SHA256-PAYLOAD
    /// <timestamp>
    /// <scope>
    /// <previous_signature>
    /// <sha256("")>
    /// <sha256(chunk)>
    /// ```
    pub fn sign_chunk(&mut self, chunk: &[u8]) -> String {
        let string_to_sign = format!(
            "{ALGORITHM_PAYLOAD}\n{}\n{}\n{}\n{EMPTY_STRING_SHA256}\n{}",
            self.timestamp,
            self.credential_scope,
            self.previous_signature,
            hex_sha256(chunk)
        );
        debug!("calculated chunk string to sign: {string_to_sign}");

        let signature = hex_hmac_sha256(&self.signing_key, string_to_sign.as_bytes());
        self.previous_signature.clone_from(&signature);
        signature
    }

    /// Sign a chunk and frame it:
    /// `hex(len);chunk-signature=<signature>\r\n<data>\r\n`
    pub fn encode_chunk(&mut self, chunk: &[u8]) -> Bytes {
        let signature = self.sign_chunk(chunk);
        let head = format!("{:x}{CHUNK_SIGNATURE}{signature}", chunk.len());

        let mut buf = BytesMut::with_capacity(head.len() + chunk.len() + 2 * CRLF.len());
        buf.put_slice(head.as_bytes());
        buf.put_slice(CRLF);
        buf.put_slice(chunk);
        buf.put_slice(CRLF);
        buf.freeze()
    }

    /// The zero-length chunk that terminates the stream.
    pub fn finish(&mut self) -> Bytes {
        self.encode_chunk(&[])
    }
}

/// Length of the framed body of a payload of `decoded_len` bytes cut into
/// `chunk_size` chunks, final empty chunk included.
///
/// This is the `content-length` of the seed request, while
/// `x-amz-decoded-content-length` carries `decoded_len`.
pub fn encoded_content_length(decoded_len: u64, chunk_size: u64) -> Result<u64> {
    if chunk_size == 0 {
        return Err(Error::invalid_input("chunk size must not be zero"));
    }

    // Frame overhead is small, only the payload part can overflow.
    let frame = |len: u64| {
        let hex_len = format!("{len:x}").len() as u64;
        len.checked_add(hex_len + CHUNK_SIGNATURE.len() as u64 + SIGNATURE_LEN + 2 * CRLF.len() as u64)
    };

    let full = decoded_len / chunk_size;
    let rest = decoded_len % chunk_size;
    let rest_frame = if rest > 0 { frame(rest) } else { Some(0) };

    frame(chunk_size)
        .and_then(|v| v.checked_mul(full))
        .zip(frame(0))
        .and_then(|(v, last)| v.checked_add(last))
        .zip(rest_frame)
        .and_then(|(v, rest)| v.checked_add(rest))
        .ok_or_else(|| Error::invalid_input("encoded length overflows u64"))
}
