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

//! AWS SigV4 signer for S3 compatible services
//!
//! ## Example
//!
//! ```no_run
//! use s3sign_v4::{Credential, RequestDescriptor, RequestSigner, EMPTY_STRING_SHA256};
//!
//! # fn main() -> s3sign_core::Result<()> {
//! let cred = Credential::new("accessKey1", "verySecretKey1");
//! let desc = RequestDescriptor::new("GET", "localhost:8000", "/bucketname")
//!     .with_query("search", "x-amz-meta-color=blue");
//!
//! let signed = RequestSigner::new().sign(&cred, &desc, EMPTY_STRING_SHA256)?;
//! for (name, value) in signed.iter() {
//!     println!("{name}: {value}");
//! }
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod authorization;
pub use authorization::AuthorizationHeader;

pub mod canonical;

mod chunk;
pub use chunk::encoded_content_length;
pub use chunk::ChunkSigner;

mod config;
pub use config::Config;

mod constants;
pub use constants::EMPTY_STRING_SHA256;
pub use constants::MAX_PRESIGN_EXPIRES_SECS;
pub use constants::STREAMING_PAYLOAD;
pub use constants::UNSIGNED_PAYLOAD;

mod credential;
pub use credential::Credential;

mod descriptor;
pub use descriptor::RequestDescriptor;

mod presign;
pub use presign::presign;
pub use presign::PresignedQuery;

mod sign_request;
pub use sign_request::canonical_request;
pub use sign_request::credential_scope;
pub use sign_request::generate_signing_key;
pub use sign_request::sign;
pub use sign_request::string_to_sign;
pub use sign_request::RequestSigner;

mod signed_headers;
pub use signed_headers::SignedHeaders;

mod timestamp;
pub use timestamp::Timestamp;
