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

use super::constants::*;
use alicloud_core::Context;

/// Config carries all the configuration for Aliyun services.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `access_key_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_SECRET`]
    pub access_key_secret: Option<String>,
    /// `security_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_SECURITY_TOKEN`]
    pub security_token: Option<String>,
    /// `region_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_REGION_ID`]
    pub region_id: Option<String>,
    /// `profile` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_PROFILE`]
    pub profile: Option<String>,
    /// `config_file` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_CONFIG_FILE`]
    /// - default to `~/.aliyun/config.json` when used
    pub config_file: Option<String>,
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ACCESS_KEY_SECRET) {
            self.access_key_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_SECURITY_TOKEN) {
            self.security_token.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_REGION_ID) {
            self.region_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_PROFILE) {
            self.profile.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_CONFIG_FILE) {
            self.config_file.get_or_insert(v);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use alicloud_core::StaticEnv;
    use std::collections::HashMap;

    #[test]
    fn test_from_env_keeps_explicit_values() {
        let ctx = Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from([
                (ALIBABA_CLOUD_ACCESS_KEY_ID.to_string(), "env_ak".to_string()),
                (ALIBABA_CLOUD_REGION_ID.to_string(), "cn-shanghai".to_string()),
                (ALIBABA_CLOUD_PROFILE.to_string(), "prod".to_string()),
            ]),
        });

        let config = Config {
            access_key_id: Some("explicit_ak".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);

        assert_eq!(config.access_key_id.as_deref(), Some("explicit_ak"));
        assert_eq!(config.region_id.as_deref(), Some("cn-shanghai"));
        assert_eq!(config.profile.as_deref(), Some("prod"));
        assert!(config.access_key_secret.is_none());
        assert!(config.config_file.is_none());
    }
}
