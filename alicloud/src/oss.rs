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

//! Aliyun OSS with convenience constructors.

pub use alicloud_oss::*;

#[cfg(feature = "default-context")]
use crate::{credential::Config, default_context, Result};

/// Create an OSS client on the [`default_context`].
///
/// Credentials are resolved from `ALIBABA_CLOUD_ACCESS_KEY_ID` and friends,
/// then the Aliyun CLI profile. The region is read from
/// `ALIBABA_CLOUD_REGION_ID` and must be set.
///
/// ```no_run
/// # async fn example() -> alicloud::Result<()> {
/// let client = alicloud::oss::default_client()?;
/// client.rename_object("photos", "2023/a.jpg", "archive/a.jpg").await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client() -> Result<OssClient> {
    OssClient::from_config(default_context(), Config::default())
}
