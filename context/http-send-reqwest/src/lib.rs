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

//! Reqwest-based HTTP transport for alicloud.
//!
//! ## Example
//!
//! ```no_run
//! use alicloud_core::Context;
//! use alicloud_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(60))
//!     .build()
//!     .expect("client must build");
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```
//!
//! Timeouts belong to the client: alicloud never cancels an in-flight request.

use alicloud_core::{Error, HttpSend, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Request};

/// `HttpSend` backed by a [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::validation("request is not supported by reqwest").with_source(e))?;
        let url = req.url().clone();

        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport(format!("failed to send request to {url}")).with_source(e))?;

        let mut builder = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(resp.headers().clone());
        }

        let body = resp.bytes().await.map_err(|e| {
            Error::transport(format!("failed to read response body from {url}")).with_source(e)
        })?;
        Ok(builder.body(body)?)
    }
}
