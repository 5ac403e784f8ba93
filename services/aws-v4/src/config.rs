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
use crate::Credential;
use log::debug;
use s3sign_core::utils::Redact;
use s3sign_core::{Env, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config for signing requests against an S3 compatible service.
#[derive(Clone)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
    /// `region` will be loaded from:
    ///
    /// - this field if it's not the default
    /// - env value: `AWS_REGION`
    /// - default to: `us-east-1`
    pub region: String,
    /// Service name used in the credential scope, default to `s3`.
    pub service: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on this config win over the env.
    pub fn from_env(mut self, env: &impl Env) -> Self {
        if self.access_key_id.is_none() {
            self.access_key_id = env.var(AWS_ACCESS_KEY_ID);
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = env.var(AWS_SECRET_ACCESS_KEY);
        }
        if self.session_token.is_none() {
            self.session_token = env.var(AWS_SESSION_TOKEN);
        }
        if self.region == DEFAULT_REGION {
            if let Some(v) = env.var(AWS_REGION) {
                self.region = v;
            }
        }

        debug!("config loaded from env: {self:?}");
        self
    }

    /// Build the credential described by this config.
    pub fn credential(&self) -> Result<Credential> {
        let access_key_id = self
            .access_key_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("access key id is not configured"))?;
        let secret_access_key = self
            .secret_access_key
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("secret access key is not configured"))?;

        let mut cred = Credential::new(access_key_id, secret_access_key);
        if let Some(token) = self.session_token.as_deref().filter(|v| !v.is_empty()) {
            cred = cred.with_session_token(token);
        }
        Ok(cred)
    }
}
