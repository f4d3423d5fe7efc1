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
use alicloud_core::hash::base64_hmac_sha1;
use alicloud_core::request::{parse_query, percent_encode, set_query};
use alicloud_core::time::{format_http_date, now, DateTime};
use alicloud_core::{Context, Error, Result, SignRequest};
use alicloud_credential::Credential;
use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

/// Bucket addressed by a request.
///
/// Insert it into the request extensions so the signer can build the
/// canonicalized resource. Requests without it fall back to the default
/// bucket of the signer, then to the service root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket(pub String);

/// RequestSigner for Aliyun OSS signature.
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    bucket: Option<String>,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for Aliyun OSS signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket used when the request carries no [`Bucket`] extension.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn bucket<'a>(&'a self, req: &'a Parts) -> Option<&'a str> {
        req.extensions
            .get::<Bucket>()
            .map(|b| b.0.as_str())
            .or(self.bucket.as_deref())
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        cred: &Self::Credential,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let signing_time = self.time.unwrap_or_else(now);

        match expires_in {
            Some(expires) => self.sign_query(req, cred, signing_time, expires),
            None => self.sign_header(req, cred, signing_time),
        }
    }
}

impl RequestSigner {
    fn sign_header(&self, req: &mut Parts, cred: &Credential, signing_time: DateTime) -> Result<()> {
        let date = format_http_date(signing_time);
        req.headers.insert(DATE, date.parse()?);
        match &cred.security_token {
            Some(token) => {
                let mut value: HeaderValue = token.parse()?;
                value.set_sensitive(true);
                req.headers.insert(X_OSS_SECURITY_TOKEN, value);
            }
            None => {
                req.headers.remove(X_OSS_SECURITY_TOKEN);
            }
        }

        let string_to_sign = self.build_string_to_sign(req, &date, None)?;
        debug!("calculated string to sign: {string_to_sign}");
        let signature =
            base64_hmac_sha1(cred.access_key_secret.as_bytes(), string_to_sign.as_bytes());

        let mut value: HeaderValue =
            format!("OSS {}:{}", cred.access_key_id, signature).parse()?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);

        Ok(())
    }

    fn sign_query(
        &self,
        req: &mut Parts,
        cred: &Credential,
        signing_time: DateTime,
        expires: Duration,
    ) -> Result<()> {
        let expires_in = chrono::TimeDelta::from_std(expires).map_err(|e| {
            Error::validation(format!("invalid expiration {expires:?}")).with_source(e)
        })?;
        let expires_at = (signing_time + expires_in).timestamp().to_string();

        let token = cred.security_token.as_deref();
        let string_to_sign = self.build_string_to_sign(req, &expires_at, token)?;
        debug!("calculated string to sign: {string_to_sign}");
        let signature =
            base64_hmac_sha1(cred.access_key_secret.as_bytes(), string_to_sign.as_bytes());

        let mut query = req.uri.query().unwrap_or_default().to_string();
        let mut append = |k: &str, v: &str| {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(k);
            query.push('=');
            query.push_str(&percent_encode(v));
        };
        append(OSS_ACCESS_KEY_ID, &cred.access_key_id);
        append(EXPIRES, &expires_at);
        append(SIGNATURE, &signature);
        if let Some(token) = token {
            append(SECURITY_TOKEN, token);
        }

        set_query(req, &query)
    }

    /// `METHOD\nContent-MD5\nContent-Type\nDate\n[x-oss-headers\n]resource`
    ///
    /// `date` is the `Date` header for header signing and the expiry
    /// timestamp for query signing. `query_token` is the security token
    /// carried in the query of a presigned request.
    fn build_string_to_sign(
        &self,
        req: &Parts,
        date: &str,
        query_token: Option<&str>,
    ) -> Result<String> {
        let header = |name: &str| {
            req.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        let mut s = String::new();
        writeln!(&mut s, "{}", req.method.as_str())?;
        writeln!(&mut s, "{}", header(CONTENT_MD5))?;
        writeln!(&mut s, "{}", header(CONTENT_TYPE.as_str()))?;
        writeln!(&mut s, "{date}")?;

        for (name, value) in canonicalize_headers(req) {
            writeln!(&mut s, "{name}:{value}")?;
        }

        s.write_str(&self.canonicalize_resource(req, query_token))?;
        Ok(s)
    }

    fn canonicalize_resource(&self, req: &Parts, query_token: Option<&str>) -> String {
        let mut sub_resources: Vec<(String, String)> =
            parse_query(req.uri.query().unwrap_or_default())
                .into_iter()
                .filter(|(k, _)| is_sub_resource(k))
                .collect();
        if let Some(token) = query_token {
            sub_resources.push((SECURITY_TOKEN.to_string(), token.to_string()));
        }
        sub_resources.sort();

        let path = percent_decode_str(req.uri.path()).decode_utf8_lossy();
        let mut resource = match self.bucket(req) {
            Some(bucket) => format!("/{bucket}{path}"),
            None => path.to_string(),
        };

        for (idx, (k, v)) in sub_resources.iter().enumerate() {
            resource.push(if idx == 0 { '?' } else { '&' });
            resource.push_str(k);
            if !v.is_empty() {
                resource.push('=');
                resource.push_str(v);
            }
        }
        resource
    }
}

/// Lowercased `x-oss-*` headers sorted by name.
fn canonicalize_headers(req: &Parts) -> Vec<(String, &str)> {
    let mut headers: Vec<(String, &str)> = req
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str().to_lowercase();
            if !name.starts_with("x-oss-") {
                return None;
            }
            value.to_str().ok().map(|v| (name, v.trim()))
        })
        .collect();
    headers.sort();
    headers
}

fn is_sub_resource(key: &str) -> bool {
    SUB_RESOURCES.contains(key)
}

/// This list is copied from <https://github.com/aliyun/aliyun-oss-go-sdk/blob/master/oss/conn.go>
static SUB_RESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "uploads",
        "location",
        "cors",
        "logging",
        "website",
        "referer",
        "lifecycle",
        "delete",
        "append",
        "tagging",
        "objectMeta",
        "uploadId",
        "partNumber",
        "security-token",
        "position",
        "img",
        "style",
        "styleName",
        "replication",
        "replicationProgress",
        "replicationLocation",
        "cname",
        "bucketInfo",
        "comp",
        "qos",
        "live",
        "status",
        "vod",
        "startTime",
        "endTime",
        "symlink",
        "x-oss-process",
        "response-content-type",
        "response-content-language",
        "response-expires",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "restore",
        "callback",
        "callback-var",
        "policy",
        "stat",
        "encryption",
        "versions",
        "versioning",
        "versionId",
    ])
});
