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

//! Signed calls to Aliyun services.
//!
//! This crate bundles the service crates behind features and wires them to
//! a ready to use [`Context`]:
//!
//! - `oss`: object storage, see [`oss::OssClient`].
//! - `rpc`: ECS, SLB and RDS control plane calls, see [`rpc::RpcClient`].
//! - `default-context`: tokio file reading, reqwest transport, OS
//!   environment and tokio sleeping, see [`default_context`].
//!
//! ## Example
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> alicloud::Result<()> {
//! // Credentials and region come from `ALIBABA_CLOUD_*` variables or the CLI profile.
//! let client = alicloud::oss::default_client()?;
//!
//! for bucket in client.list_buckets().await? {
//!     println!("{} in {}", bucket.name, bucket.location);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use alicloud_core::*;

/// Credentials, config and the credential providers.
pub mod credential {
    pub use alicloud_credential::*;
}

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

#[cfg(feature = "oss")]
pub mod oss;

#[cfg(feature = "rpc")]
pub mod rpc;
