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
use alicloud_core::{Context, Error, ProvideCredential, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

/// ProfileCredentialProvider loads credentials from the Aliyun CLI configuration.
///
/// The file is read from:
/// 1. The path specified via `with_config_file()`
/// 2. The `ALIBABA_CLOUD_CONFIG_FILE` environment variable
/// 3. Default to `~/.aliyun/config.json`
///
/// The profile to use is determined by:
/// 1. The profile specified via `with_profile()`
/// 2. The `ALIBABA_CLOUD_PROFILE` environment variable
/// 3. The `current` field of the file
/// 4. Default to "default"
///
/// Profiles in `AK` and `StsToken` mode are supported, other modes are skipped.
#[derive(Debug, Default)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    config_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileFile {
    current: String,
    profiles: Vec<Profile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Profile {
    name: String,
    mode: String,
    access_key_id: String,
    access_key_secret: String,
    sts_token: String,
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let path = self
            .config_file
            .clone()
            .or_else(|| ctx.env_var(ALIBABA_CLOUD_CONFIG_FILE))
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let Some(expanded_path) = ctx.expand_home_dir(&path) else {
            debug!("failed to expand homedir for path: {path}");
            return Ok(None);
        };

        let content = match ctx.file_read(&expanded_path).await {
            Ok(content) => content,
            Err(err) => {
                debug!("failed to read config file {expanded_path}: {err:?}");
                return Ok(None);
            }
        };

        let file: ProfileFile = serde_json::from_slice(&content).map_err(|e| {
            Error::config_invalid(format!("failed to parse config file {expanded_path}"))
                .with_source(e)
        })?;

        let explicit = self
            .profile
            .clone()
            .or_else(|| ctx.env_var(ALIBABA_CLOUD_PROFILE));
        let name = match (&explicit, file.current.is_empty()) {
            (Some(name), _) => name.clone(),
            (None, false) => file.current.clone(),
            (None, true) => DEFAULT_PROFILE.to_string(),
        };

        let Some(profile) = file.profiles.into_iter().find(|p| p.name == name) else {
            if explicit.is_some() {
                return Err(Error::config_invalid(format!(
                    "profile {name} not found in {expanded_path}"
                )));
            }
            debug!("profile {name} not found in config file {expanded_path}");
            return Ok(None);
        };

        let security_token = match profile.mode.as_str() {
            "AK" => None,
            "StsToken" => Some(profile.sts_token).filter(|v| !v.is_empty()),
            mode => {
                debug!("profile {name} uses unsupported mode {mode}, skipping");
                return Ok(None);
            }
        };

        if profile.access_key_id.is_empty() || profile.access_key_secret.is_empty() {
            debug!("profile {name} has no access key");
            return Ok(None);
        }

        Ok(Some(Credential {
            access_key_id: profile.access_key_id,
            access_key_secret: profile.access_key_secret,
            security_token,
        }))
    }
}
