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
use alicloud_core::request::{canonical_query, parse_query, percent_encode, set_query};
use alicloud_core::time::{format_iso8601, now, DateTime};
use alicloud_core::{Context, Error, Result, SignRequest};
use alicloud_credential::Credential;
use async_trait::async_trait;
use http::request::Parts;
use http::Method;
use log::debug;
use std::collections::BTreeMap;
use std::time::Duration;

/// RequestSigner signs control plane calls in the query.
///
/// The request must already carry `Action`, `Version` and the caller
/// parameters in its query (see [`crate::ApiCall::build`]). Signing adds the
/// framework parameters and the `Signature`, then rewrites the query in
/// canonical order.
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a new signer using the current time and a fresh nonce per request.
    pub fn new() -> Self {
        Self::default()
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

    /// Specify the signature nonce.
    ///
    /// # Note
    ///
    /// The service rejects a reused nonce. Only use this function for testing.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
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
        if expires_in.is_some() {
            return Err(Error::validation(
                "query signed calls can not be presigned",
            ));
        }

        let mut params: BTreeMap<String, String> =
            parse_query(req.uri.query().unwrap_or_default())
                .into_iter()
                .collect();
        for required in [ACTION, VERSION] {
            if !params.contains_key(required) {
                return Err(Error::validation(format!(
                    "request to {} has no {required} parameter",
                    req.uri
                )));
            }
        }

        let time = self.time.unwrap_or_else(now);
        let nonce = self.nonce.clone().unwrap_or_else(new_nonce);
        params.insert(ACCESS_KEY_ID.to_string(), cred.access_key_id.clone());
        params.insert(TIMESTAMP.to_string(), format_iso8601(time));
        params.insert(SIGNATURE_METHOD.to_string(), HMAC_SHA1.to_string());
        params.insert(SIGNATURE_VERSION.to_string(), SIGNATURE_VERSION_1_0.to_string());
        params.insert(SIGNATURE_NONCE.to_string(), nonce);
        params.insert(FORMAT.to_string(), FORMAT_JSON.to_string());
        match &cred.security_token {
            Some(token) => params.insert(SECURITY_TOKEN.to_string(), token.clone()),
            None => params.remove(SECURITY_TOKEN),
        };

        let canonical = canonical_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let string_to_sign = string_to_sign(&req.method, &canonical);
        debug!("calculated string to sign: {string_to_sign}");
        let signature = signature(&cred.access_key_secret, &string_to_sign);

        set_query(
            req,
            &format!("{canonical}&{SIGNATURE}={}", percent_encode(&signature)),
        )
    }
}

/// `METHOD&%2F&pct(canonical)`
fn string_to_sign(method: &Method, canonical: &str) -> String {
    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode("/"),
        percent_encode(canonical)
    )
}

fn signature(secret: &str, string_to_sign: &str) -> String {
    let key = format!("{secret}&");
    base64_hmac_sha1(key.as_bytes(), string_to_sign.as_bytes())
}

fn new_nonce() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiCall, Category};
    use alicloud_core::time::parse_rfc3339;
    use alicloud_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const NONCE: &str = "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf";

    fn signer() -> RequestSigner {
        RequestSigner::new()
            .with_time(parse_rfc3339("2016-02-23T12:46:24Z").expect("time must be valid"))
            .with_nonce(NONCE)
    }

    fn cred() -> Credential {
        Credential::new("testid", "testsecret")
    }

    async fn sign(signer: &RequestSigner, call: ApiCall, cred: &Credential) -> Result<Parts> {
        let (mut parts, _) = call.build(call.category().endpoint())?.into_parts();
        signer
            .sign_request(&Context::new(), &mut parts, cred, None)
            .await?;
        Ok(parts)
    }

    fn signature_of(parts: &Parts) -> String {
        parse_query(parts.uri.query().unwrap_or_default())
            .into_iter()
            .find(|(k, _)| k == SIGNATURE)
            .map(|(_, v)| v)
            .expect("request must be signed")
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let canonical = canonical_query([
            ("Timestamp", "2016-02-23T12:46:24Z"),
            ("Format", "XML"),
            ("AccessKeyId", "testid"),
            ("Action", "DescribeRegions"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", NONCE),
            ("Version", "2014-05-26"),
            ("SignatureVersion", "1.0"),
        ]);
        let sts = string_to_sign(&Method::GET, &canonical);
        assert_eq!(
            sts,
            "GET&%2F&AccessKeyId%3Dtestid%26Action%3DDescribeRegions%26Format%3DXML%26SignatureMethod%3DHMAC-SHA1%26SignatureNonce%3D3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf%26SignatureVersion%3D1.0%26Timestamp%3D2016-02-23T12%253A46%253A24Z%26Version%3D2014-05-26"
        );
        assert_eq!(signature("testsecret", &sts), "OLeaidS1JvxuMvnyHOwuJ+uX5qY=");
    }

    #[tokio::test]
    async fn test_sign_request() -> anyhow::Result<()> {
        let parts = sign(
            &signer(),
            ApiCall::new(Category::Ecs, "DescribeRegions"),
            &cred(),
        )
        .await?;

        assert_eq!(
            parts.uri.to_string(),
            "https://ecs.aliyuncs.com/?AccessKeyId=testid&Action=DescribeRegions&Format=JSON&SignatureMethod=HMAC-SHA1&SignatureNonce=3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf&SignatureVersion=1.0&Timestamp=2016-02-23T12%3A46%3A24Z&Version=2014-05-26&Signature=3jelCdBwsBF1FhNF5D%2FtsWfZFsY%3D"
        );
        Ok(())
    }

    #[test_case(Method::GET, None, "D9z0U4Fwtn7ZliOaEbd4+ZvOZcA="; "get")]
    #[test_case(Method::POST, None, "0Tv+SjGCTHwTZ3qTQNg3k7Zl8FI="; "post")]
    #[test_case(Method::GET, Some("sts-token"), "8/XdvwmQ/C4WsHcrRQAAs6ayAwY="; "security token")]
    #[tokio::test]
    async fn test_sign_with_params(
        method: Method,
        token: Option<&str>,
        expected: &str,
    ) -> anyhow::Result<()> {
        let mut call = ApiCall::new(Category::Ecs, "DescribeRegions")
            .with_param("RegionId", "cn-hangzhou")
            .with_param("Empty", "");
        if method == Method::POST {
            call = call.post();
        }
        let cred = match token {
            Some(token) => cred().with_security_token(token),
            None => cred(),
        };

        let parts = sign(&signer(), call, &cred).await?;
        assert_eq!(signature_of(&parts), expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_is_order_independent() -> anyhow::Result<()> {
        let a = ApiCall::new(Category::Slb, "DescribeLoadBalancers")
            .with_param("RegionId", "cn-hangzhou")
            .with_param("AddressType", "internet")
            .with_param("NetworkType", "classic");
        let b = ApiCall::new(Category::Slb, "DescribeLoadBalancers")
            .with_param("NetworkType", "classic")
            .with_param("RegionId", "cn-hangzhou")
            .with_param("AddressType", "internet");

        let a = sign(&signer(), a, &cred()).await?;
        let b = sign(&signer(), b, &cred()).await?;
        assert_eq!(a.uri, b.uri);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_changes_with_any_value() -> anyhow::Result<()> {
        let call = || ApiCall::new(Category::Ecs, "DescribeInstances").with_param("PageSize", 10);
        let base = signature_of(&sign(&signer(), call(), &cred()).await?);

        let other_value = signature_of(
            &sign(&signer(), call().with_param("PageSize", 11), &cred()).await?,
        );
        let other_nonce = signature_of(
            &sign(&signer().with_nonce("another-nonce"), call(), &cred()).await?,
        );
        let other_secret = signature_of(
            &sign(&signer(), call(), &Credential::new("testid", "othersecret")).await?,
        );

        assert_ne!(base, other_value);
        assert_ne!(base, other_nonce);
        assert_ne!(base, other_secret);
        Ok(())
    }

    #[tokio::test]
    async fn test_fresh_nonce_per_request() -> anyhow::Result<()> {
        let signer = RequestSigner::new();
        let call = ApiCall::new(Category::Ecs, "DescribeRegions");

        let nonce_of = |parts: &Parts| {
            parse_query(parts.uri.query().unwrap_or_default())
                .into_iter()
                .find(|(k, _)| k == SIGNATURE_NONCE)
                .map(|(_, v)| v)
        };
        let a = nonce_of(&sign(&signer, call.clone(), &cred()).await?);
        let b = nonce_of(&sign(&signer, call, &cred()).await?);

        assert!(a.is_some());
        assert_ne!(a, b);
        Ok(())
    }

    #[tokio::test]
    async fn test_framework_params_win() -> anyhow::Result<()> {
        let call = ApiCall::new(Category::Ecs, "DescribeRegions")
            .with_param("AccessKeyId", "spoofed")
            .with_param("Format", "XML");

        let parts = sign(&signer(), call, &cred()).await?;
        let query = parts.uri.query().unwrap_or_default();
        assert!(query.contains("AccessKeyId=testid"));
        assert!(query.contains("Format=JSON"));
        assert!(!query.contains("spoofed"));
        Ok(())
    }

    #[tokio::test]
    async fn test_presign_is_rejected() -> anyhow::Result<()> {
        let (mut parts, _) = ApiCall::new(Category::Ecs, "DescribeRegions")
            .build(Category::Ecs.endpoint())?
            .into_parts();

        let err = signer()
            .sign_request(
                &Context::new(),
                &mut parts,
                &cred(),
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_action_is_rejected() {
        let (mut parts, _) = http::Request::get("https://ecs.aliyuncs.com/?Version=2014-05-26")
            .body(())
            .expect("request must be valid")
            .into_parts();

        let err = signer()
            .sign_request(&Context::new(), &mut parts, &cred(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
