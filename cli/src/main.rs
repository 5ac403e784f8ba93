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

//! Search the objects of a bucket by metadata.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info};
use reqwest::header::CONTENT_LENGTH;
use s3sign_core::{Env, OsEnv};
use s3sign_v4::canonical::canonical_query_string;
use s3sign_v4::{Config, RequestDescriptor, RequestSigner, EMPTY_STRING_SHA256};

#[derive(Parser, Debug)]
#[command(name = "search-bucket", version, about = "Search the objects of a bucket by metadata")]
struct Args {
    /// Access key id, default to env AWS_ACCESS_KEY_ID
    #[arg(short = 'a', long)]
    access_key: Option<String>,
    /// Secret access key, default to env AWS_SECRET_ACCESS_KEY
    #[arg(short = 'k', long)]
    secret_key: Option<String>,
    /// Session token, default to env AWS_SESSION_TOKEN
    #[arg(short = 't', long)]
    session_token: Option<String>,
    /// Name of the bucket
    #[arg(short, long)]
    bucket: String,
    /// Search query, e.g. `x-amz-meta-color=blue`
    #[arg(short, long)]
    query: String,
    /// Host of the server
    #[arg(short = 'H', long)]
    host: String,
    /// Port of the server
    #[arg(short, long)]
    port: u16,
    /// Region of the server, default to env AWS_REGION or us-east-1
    #[arg(short, long)]
    region: Option<String>,
    /// Enable ssl
    #[arg(short, long)]
    ssl: bool,
    /// List all versions of the objects that meet the search query,
    /// otherwise only list the latest version
    #[arg(short, long)]
    list_versions: bool,
    /// Log the request and response
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Flags win over the env, the region included even when it's the default one.
    fn config(&self, env: &impl Env) -> Config {
        let mut config = Config {
            access_key_id: self.access_key.clone(),
            secret_access_key: self.secret_key.clone(),
            session_token: self.session_token.clone(),
            ..Default::default()
        }
        .from_env(env);
        if let Some(region) = &self.region {
            config.region.clone_from(region);
        }
        config
    }

    /// Value of the host header: the port is omitted when it's the scheme default,
    /// the same way the http client writes it.
    fn authority(&self) -> String {
        match (self.ssl, self.port) {
            (false, 80) | (true, 443) => self.host.clone(),
            (_, port) => format!("{}:{port}", self.host),
        }
    }

    fn descriptor(&self, config: &Config) -> RequestDescriptor {
        let mut desc = RequestDescriptor::new("GET", &self.authority(), &format!("/{}", self.bucket))
            .with_query("search", &self.query)
            .with_region(&config.region)
            .with_service(&config.service);
        if self.list_versions {
            desc = desc.with_query("versions", "");
        }
        desc
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    let args = Args::parse();

    let filter = if args.verbose {
        "search_bucket=debug,s3sign_v4=debug"
    } else {
        "search_bucket=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match search(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("search failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Send the signed search request, returns whether the server accepted it.
async fn search(args: &Args) -> Result<bool> {
    let config = args.config(&OsEnv);
    let cred = config.credential().context("missing parameter")?;
    let desc = args.descriptor(&config);

    let signed = RequestSigner::new().sign(&cred, &desc, EMPTY_STRING_SHA256)?;
    debug!("signed headers: {signed:?}");

    let scheme = if args.ssl { "https" } else { "http" };
    let url = format!(
        "{scheme}://{}{}?{}",
        desc.host,
        desc.canonical_uri,
        canonical_query_string(&desc.query_params)?
    );
    debug!("sending request to {url}");

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()?;
    let resp = client
        .get(&url)
        .headers(signed.into_header_map())
        .header(CONTENT_LENGTH, 0)
        .send()
        .await
        .with_context(|| format!("failed to send request to {url}"))?;

    let status = resp.status();
    debug!("response status code: {status}");
    debug!("response headers: {:?}", resp.headers());
    let body = resp.text().await?;

    if status.is_success() {
        info!("Success");
        std::io::stdout().write_all(body.as_bytes())?;
        Ok(true)
    } else {
        error!("request failed with HTTP status {status}: {body}");
        Ok(false)
    }
}
