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

//! Aliyun credentials for alicloud.
//!
//! Both signing schemes use the same access key pair. This crate defines the
//! [`Credential`], the [`Config`] it can be built from, and the providers that
//! load it.
//!
//! ## Credential Sources
//!
//! ### Environment Variables
//!
//! ```bash
//! export ALIBABA_CLOUD_ACCESS_KEY_ID=your-access-key-id
//! export ALIBABA_CLOUD_ACCESS_KEY_SECRET=your-access-key-secret
//! export ALIBABA_CLOUD_SECURITY_TOKEN=your-sts-token  # Optional, for STS
//! ```
//!
//! ### Configuration File
//!
//! Profiles of the Aliyun CLI configuration file (`~/.aliyun/config.json`) in
//! `AK` or `StsToken` mode.
//!
//! ## Example
//!
//! ```no_run
//! use alicloud_core::{Context, OsEnv};
//! use alicloud_credential::DefaultCredentialProvider;
//! use alicloud_core::ProvideCredential;
//!
//! # async fn example() -> alicloud_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let cred = DefaultCredentialProvider::new().provide_credential(&ctx).await?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    ALIBABA_CLOUD_ACCESS_KEY_ID, ALIBABA_CLOUD_ACCESS_KEY_SECRET, ALIBABA_CLOUD_CONFIG_FILE,
    ALIBABA_CLOUD_PROFILE, ALIBABA_CLOUD_REGION_ID, ALIBABA_CLOUD_SECURITY_TOKEN,
};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;
