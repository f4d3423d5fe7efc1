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

use crate::constants::REGION_ID;
use crate::{ApiCall, Category, RequestSigner, RpcErrorDecoder};
use alicloud_core::request::set_query;
use alicloud_core::{Context, Json, ProvideCredential, RequestExecutor, Result, Signer};
use alicloud_credential::{Config, ConfigCredentialProvider, Credential, DefaultCredentialProvider};
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::Method;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

/// RpcClient issues query signed calls to the control plane.
///
/// Each call is signed right before it is sent, so a call made again gets a
/// new timestamp and nonce.
#[derive(Debug, Clone)]
pub struct RpcClient {
    signer: Signer<Credential>,
    executor: RequestExecutor,
    region: Option<String>,
    endpoints: BTreeMap<Category, String>,
}

impl RpcClient {
    /// Create a client around a signer built with [`RequestSigner`].
    ///
    /// Requests go through the transport of the signer's context.
    pub fn new(signer: Signer<Credential>) -> Self {
        let executor = RequestExecutor::new(signer.context().clone(), RpcErrorDecoder);
        Self {
            signer,
            executor,
            region: None,
            endpoints: BTreeMap::new(),
        }
    }

    /// Create a client from config.
    ///
    /// The access key of the config is preferred, then the default provider chain.
    pub fn from_config(ctx: Context, config: Config) -> Self {
        let config = config.from_env(&ctx);
        let region = config.region_id.clone();
        let provider = DefaultCredentialProvider::new()
            .push_front(ConfigCredentialProvider::new(Arc::new(config)));

        let client = Self::new(Signer::new(ctx, provider, RequestSigner::new()));
        match region {
            Some(region) => client.with_region(region),
            None => client,
        }
    }

    /// Create a client loading credentials from `provider`.
    pub fn with_provider(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        Self::new(Signer::new(ctx, provider, RequestSigner::new()))
    }

    /// Default region sent as `RegionId` when a call does not set one.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the endpoint of an API family, for example a regional or VPC endpoint.
    pub fn with_endpoint(mut self, category: Category, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(category, endpoint.into());
        self
    }

    /// Endpoint used for the API family.
    pub fn endpoint(&self, category: Category) -> &str {
        self.endpoints
            .get(&category)
            .map(|v| v.as_str())
            .unwrap_or_else(|| category.endpoint())
    }

    /// Default region of this client.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Build and sign the request for `call` without sending it.
    ///
    /// POST calls without an explicit body move the signed parameters into an
    /// `application/x-www-form-urlencoded` body.
    pub async fn prepare(&self, call: &ApiCall) -> Result<http::Request<Bytes>> {
        let call = match (&self.region, call.param(REGION_ID)) {
            (Some(region), None) => call.clone().with_param(REGION_ID, region),
            _ => call.clone(),
        };

        let (mut parts, body) = call.build(self.endpoint(call.category()))?.into_parts();
        self.signer.sign(&mut parts, None).await?;

        if parts.method != Method::POST || !body.is_empty() {
            return Ok(http::Request::from_parts(parts, body));
        }

        let form = parts.uri.query().unwrap_or_default().to_string();
        set_query(&mut parts, "")?;
        parts.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        Ok(http::Request::from_parts(parts, Bytes::from(form)))
    }

    /// Perform `call` and return the JSON document.
    pub async fn call(&self, call: &ApiCall) -> Result<serde_json::Value> {
        self.call_as(call).await
    }

    /// Perform `call` and deserialize the JSON document into `T`.
    pub async fn call_as<T: DeserializeOwned + Send>(&self, call: &ApiCall) -> Result<T> {
        let req = self.prepare(call).await?;
        self.executor.execute(req, &Json::<T>::new()).await
    }
}
