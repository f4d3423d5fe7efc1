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

//! Query signed calls to the Aliyun control plane.
//!
//! ECS, SLB and RDS share one RPC style protocol: every call is a set of
//! query parameters signed with HMAC-SHA1 under `secret + "&"`.
//!
//! ## Example
//!
//! ```no_run
//! use alicloud_core::{Context, OsEnv};
//! use alicloud_credential::Config;
//! use alicloud_http_send_reqwest::ReqwestHttpSend;
//! use alicloud_rpc::{ApiCall, Category, RpcClient};
//!
//! # async fn example() -> alicloud_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//! let client = RpcClient::from_config(ctx, Config::default()).with_region("cn-hangzhou");
//!
//! let regions = client
//!     .call(&ApiCall::new(Category::Ecs, "DescribeRegions"))
//!     .await?;
//! println!("{regions}");
//! # Ok(())
//! # }
//! ```

mod constants;

mod call;
pub use call::{ApiCall, Category};

mod sign_request;
pub use sign_request::RequestSigner;

mod error;
pub use error::RpcErrorDecoder;

mod client;
pub use client::RpcClient;

pub mod slb;
