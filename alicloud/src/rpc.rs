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

//! Aliyun control plane calls with convenience constructors.

pub use alicloud_rpc::*;

#[cfg(feature = "default-context")]
use crate::{credential::Config, default_context};

/// Create an RPC client on the [`default_context`].
///
/// Credentials and the optional region are resolved like
/// [`crate::oss::default_client`] does.
///
/// ```no_run
/// # async fn example() -> alicloud::Result<()> {
/// use alicloud::rpc::{slb, default_client};
///
/// let client = default_client();
/// let created = client
///     .call(&slb::create_load_balancer("cn-hangzhou", "web"))
///     .await?;
/// println!("{created}");
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client() -> RpcClient {
    RpcClient::from_config(default_context(), Config::default())
}
