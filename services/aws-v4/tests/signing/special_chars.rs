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

use super::{local_credential, timestamp};
use anyhow::Result;
use s3sign_v4::{canonical_request, sign, RequestDescriptor, EMPTY_STRING_SHA256};
use test_case::test_case;

#[test_case("/bucket/file with spaces.txt", "/bucket/file%20with%20spaces.txt"; "spaces")]
#[test_case("/bucket/file+plus&and=eq.txt", "/bucket/file%2Bplus%26and%3Deq.txt"; "reserved")]
#[test_case("/bucket/文件.txt", "/bucket/%E6%96%87%E4%BB%B6.txt"; "unicode")]
#[test_case("/bucket/a~b-c_d.e", "/bucket/a~b-c_d.e"; "unreserved")]
#[test_case("/bucket/%41", "/bucket/A"; "escape is decoded")]
fn test_raw_and_encoded_paths_sign_alike(raw: &str, encoded: &str) -> Result<()> {
    let ts = timestamp("20161123T123456Z");
    let raw_desc = RequestDescriptor::new("GET", "localhost:8000", raw);
    let encoded_desc = RequestDescriptor::new("GET", "localhost:8000", encoded);

    let creq = canonical_request(&local_credential(), &raw_desc, ts, EMPTY_STRING_SHA256)?;
    assert_eq!(creq.to_string().lines().nth(1), Some(encoded));

    let a = sign(&local_credential(), &raw_desc, ts, EMPTY_STRING_SHA256)?;
    let b = sign(&local_credential(), &encoded_desc, ts, EMPTY_STRING_SHA256)?;
    assert_eq!(a.signature(), b.signature());
    Ok(())
}

#[test]
fn test_escaped_percent_signs_literal_key() -> Result<()> {
    let desc = RequestDescriptor::new("GET", "localhost:8000", "/bucket/%2541");
    let creq = canonical_request(
        &local_credential(),
        &desc,
        timestamp("20161123T123456Z"),
        EMPTY_STRING_SHA256,
    )?;
    assert_eq!(creq.to_string().lines().nth(1), Some("/bucket/%2541"));
    Ok(())
}

#[test]
fn test_query_values_are_encoded_once() -> Result<()> {
    let desc = RequestDescriptor::new("GET", "localhost:8000", "/bucketname")
        .with_query("search", "`x-amz-meta-color`=\"blue\" AND size > 10")
        .with_query("prefix", "a/b c");
    let creq = canonical_request(
        &local_credential(),
        &desc,
        timestamp("20161123T123456Z"),
        EMPTY_STRING_SHA256,
    )?;

    assert_eq!(
        creq.query(),
        "prefix=a%2Fb%20c&search=%60x-amz-meta-color%60%3D%22blue%22%20AND%20size%20%3E%2010"
    );
    Ok(())
}

#[test]
fn test_from_parts_decodes_query_before_signing() -> Result<()> {
    let (parts, _) = http::Request::get("http://localhost:8000/bucketname?prefix=a%2Fb%20c")
        .body(())?
        .into_parts();
    let desc = RequestDescriptor::from_parts(&parts)?;
    assert_eq!(desc.query_params, vec![("prefix".to_string(), "a/b c".to_string())]);

    let creq = canonical_request(
        &local_credential(),
        &desc,
        timestamp("20161123T123456Z"),
        EMPTY_STRING_SHA256,
    )?;
    assert_eq!(creq.query(), "prefix=a%2Fb%20c");
    Ok(())
}
