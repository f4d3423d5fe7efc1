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
use alicloud_core::request::canonical_query;
use alicloud_core::{Error, Result};
use bytes::Bytes;
use http::Method;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// API family of a control plane call.
///
/// Every family has its own endpoint and API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Elastic Compute Service.
    Ecs,
    /// Server Load Balancer.
    Slb,
    /// Relational Database Service.
    Rds,
}

impl Category {
    /// API version sent as the `Version` parameter.
    pub fn version(&self) -> &'static str {
        match self {
            Category::Ecs => "2014-05-26",
            Category::Slb => "2014-05-15",
            Category::Rds => "2014-08-15",
        }
    }

    /// Default public endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Ecs => "https://ecs.aliyuncs.com",
            Category::Slb => "https://slb.aliyuncs.com",
            Category::Rds => "https://rds.aliyuncs.com",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Ecs => f.write_str("ecs"),
            Category::Slb => f.write_str("slb"),
            Category::Rds => f.write_str("rds"),
        }
    }
}

/// ApiCall is one logical control plane call: family, action and parameters.
///
/// Parameter keys are unique and unordered; the wire form is always sorted.
/// Builder methods consume the call so a built call is never mutated.
///
/// ```
/// use alicloud_rpc::{ApiCall, Category};
///
/// let call = ApiCall::new(Category::Ecs, "DescribeRegions").with_param("RegionId", "cn-hangzhou");
/// assert_eq!(call.param("RegionId"), Some("cn-hangzhou"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    category: Category,
    action: String,
    method: Method,
    params: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl ApiCall {
    /// Create a GET call without parameters.
    pub fn new(category: Category, action: impl Into<String>) -> Self {
        Self {
            category,
            action: action.into(),
            method: Method::GET,
            params: BTreeMap::new(),
            body: None,
        }
    }

    /// Send the call as POST: signed parameters travel in a form body.
    pub fn post(mut self) -> Self {
        self.method = Method::POST;
        self
    }

    /// Set a parameter, replacing the previous value of the same key.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Set a parameter only if `value` is `Some`.
    pub fn with_optional_param(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with_param(key, v),
            None => self,
        }
    }

    /// Attach a raw body. Only valid for POST calls.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// API family.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Action name, for example `DescribeInstances`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Value of a caller parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|v| v.as_str())
    }

    /// All caller parameters.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Build the unsigned request against `endpoint`.
    ///
    /// `Action`, `Version` and the caller parameters are placed in the query;
    /// the signer adds the remaining framework parameters.
    pub fn build(&self, endpoint: &str) -> Result<http::Request<Bytes>> {
        if self.action.is_empty() {
            return Err(Error::validation("api call must have an action"));
        }
        if self.body.is_some() && self.method != Method::POST {
            return Err(Error::validation(format!(
                "{} {} can not carry a body",
                self.method, self.action
            )));
        }

        let query = canonical_query(
            self.params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .chain([
                    (ACTION, self.action.as_str()),
                    (VERSION, self.category.version()),
                ]),
        );
        let uri = format!("{}/?{query}", endpoint.trim_end_matches('/'));

        Ok(http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(self.body.clone().unwrap_or_default())?)
    }
}
