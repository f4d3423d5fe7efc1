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
use crate::copy::CopyOptions;
use crate::model::*;
use crate::{Bucket, OssErrorDecoder, RequestSigner};
use alicloud_core::request::{percent_encode, percent_encode_path};
use alicloud_core::{
    Backoff, Context, Cursor, Discard, Error, Lister, Page, PageSource, ProvideCredential,
    RawBody, RequestExecutor, ResponseDecoder, Result, Signer,
};
use alicloud_credential::{Config, ConfigCredentialProvider, Credential, DefaultCredentialProvider};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, ETAG};
use http::{Method, StatusCode};
use log::debug;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// OssClient issues header signed calls to OSS.
///
/// Buckets are addressed virtual hosted style:
/// `https://<bucket>.oss-<region>.aliyuncs.com/<key>`.
#[derive(Debug, Clone)]
pub struct OssClient {
    signer: Signer<Credential>,
    executor: RequestExecutor,
    region: String,
    page_size: usize,
    copy: CopyOptions,
    backoff: Backoff,
}

impl OssClient {
    /// Create a client around a signer built with [`RequestSigner`].
    pub fn new(signer: Signer<Credential>, region: impl Into<String>) -> Self {
        let executor = RequestExecutor::new(signer.context().clone(), OssErrorDecoder);
        Self {
            signer,
            executor,
            region: region.into(),
            page_size: DEFAULT_PAGE_SIZE,
            copy: CopyOptions::default(),
            backoff: Backoff::default(),
        }
    }

    /// Create a client from config.
    ///
    /// The access key of the config is preferred, then the default provider
    /// chain. OSS endpoints are regional, so the config must name a region.
    pub fn from_config(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);
        let Some(region) = config.region_id.clone() else {
            return Err(Error::config_invalid(
                "oss client requires a region, set region_id or ALIBABA_CLOUD_REGION_ID",
            ));
        };
        let provider = DefaultCredentialProvider::new()
            .push_front(ConfigCredentialProvider::new(Arc::new(config)));

        Ok(Self::new(
            Signer::new(ctx, provider, RequestSigner::new()),
            region,
        ))
    }

    /// Create a client loading credentials from `provider`.
    pub fn with_provider(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
        region: impl Into<String>,
    ) -> Self {
        Self::new(Signer::new(ctx, provider, RequestSigner::new()), region)
    }

    /// Number of keys asked for per list request, sent as `max-keys`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Thresholds of the chunked copy.
    pub fn with_copy_options(mut self, copy: CopyOptions) -> Self {
        self.copy = copy;
        self
    }

    /// Retry policy applied to each object moved by [`OssClient::rename_bucket`].
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Region of this client, for example `cn-hangzhou`.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Endpoint for bucket-less calls.
    pub fn service_endpoint(&self) -> String {
        format!("https://oss-{}.aliyuncs.com", self.region)
    }

    /// Endpoint of `bucket`.
    pub fn bucket_endpoint(&self, bucket: &str) -> String {
        format!("https://{bucket}.oss-{}.aliyuncs.com", self.region)
    }

    pub(crate) fn context(&self) -> &Context {
        self.signer.context()
    }

    pub(crate) fn copy_options(&self) -> CopyOptions {
        self.copy
    }

    pub(crate) fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Start a request on `key` of `bucket`, or on the service when `bucket` is `None`.
    ///
    /// Query pairs with an empty value are sent as bare sub-resources (`?acl`).
    pub(crate) fn request(
        &self,
        method: Method,
        bucket: Option<&str>,
        key: &str,
        query: &[(&str, &str)],
    ) -> http::request::Builder {
        let endpoint = match bucket {
            Some(bucket) => self.bucket_endpoint(bucket),
            None => self.service_endpoint(),
        };
        let mut uri = format!("{endpoint}/{}", percent_encode_path(key));
        for (idx, (k, v)) in query.iter().enumerate() {
            uri.push(if idx == 0 { '?' } else { '&' });
            uri.push_str(&percent_encode(k));
            if !v.is_empty() {
                uri.push('=');
                uri.push_str(&percent_encode(v));
            }
        }

        let req = http::Request::builder().method(method).uri(uri);
        match bucket {
            Some(bucket) => req.extension(Bucket(bucket.to_string())),
            None => req,
        }
    }

    /// Sign `req` and run it through the executor.
    pub(crate) async fn send<D: ResponseDecoder>(
        &self,
        req: http::Request<Bytes>,
        decoder: &D,
    ) -> Result<D::Output> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts, None).await?;
        self.executor
            .execute(http::Request::from_parts(parts, body), decoder)
            .await
    }

    /// Create `bucket` in the client region with a private ACL.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let body = to_xml(&CreateBucketConfiguration {
            location_constraint: format!("oss-{}", self.region),
        })?;
        let req = self
            .request(Method::PUT, Some(bucket), "", &[])
            .header(X_OSS_ACL, ACL_PRIVATE)
            .body(Bytes::from(body))?;

        self.send(req, &Discard).await?;
        debug!("created bucket {bucket} in {}", self.region);
        Ok(())
    }

    /// Check whether `bucket` exists.
    ///
    /// A bucket owned by someone else answers `403` and counts as existing.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let req = self
            .request(Method::GET, Some(bucket), "", &[("location", "")])
            .body(Bytes::new())?;

        match self.send(req, &Discard).await {
            Ok(()) => Ok(true),
            Err(err) => match err.service_error() {
                Some(e) if e.status == StatusCode::FORBIDDEN => Ok(true),
                Some(e) => {
                    debug!("bucket {bucket} treated as absent: {e}");
                    Ok(false)
                }
                None => Err(err),
            },
        }
    }

    /// All buckets of the caller, across every page.
    pub async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        Lister::new(BucketPages(self.clone()), self.page_size)
            .collect_all()
            .await
    }

    /// Delete `bucket`, which must be empty.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let req = self
            .request(Method::DELETE, Some(bucket), "", &[])
            .body(Bytes::new())?;
        self.send(req, &Discard).await
    }

    /// Grant public read on `bucket`.
    pub async fn make_bucket_public(&self, bucket: &str) -> Result<()> {
        let req = self
            .request(Method::PUT, Some(bucket), "", &[("acl", "")])
            .header(X_OSS_ACL, ACL_PUBLIC_READ)
            .body(Bytes::new())?;
        self.send(req, &Discard).await
    }

    /// Check whether `bucket` is readable by anyone.
    pub async fn is_bucket_public(&self, bucket: &str) -> Result<bool> {
        let req = self
            .request(Method::GET, Some(bucket), "", &[("acl", "")])
            .body(Bytes::new())?;
        let policy: AccessControlPolicy = self.send(req, &Xml::new()).await?;

        let grant = policy.access_control_list.grant;
        Ok(grant == ACL_PUBLIC_READ || grant == ACL_PUBLIC_READ_WRITE)
    }

    /// Upload `body` as `key`.
    pub async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let req = self
            .request(Method::PUT, Some(bucket), key, &[])
            .body(body)?;
        self.send(req, &Discard).await
    }

    /// Download `key`.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let req = self
            .request(Method::GET, Some(bucket), key, &[])
            .body(Bytes::new())?;
        let resp = self.send(req, &RawBody).await?;
        Ok(resp.into_body())
    }

    /// Metadata of `key`.
    pub async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMeta> {
        let req = self
            .request(Method::HEAD, Some(bucket), key, &[])
            .body(Bytes::new())?;
        self.send(req, &HeadDecoder).await
    }

    /// Size of `key` in bytes.
    pub async fn object_size(&self, bucket: &str, key: &str) -> Result<u64> {
        Ok(self.head_object(bucket, key).await?.content_length)
    }

    /// Delete `key`. Deleting a missing key succeeds.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let req = self
            .request(Method::DELETE, Some(bucket), key, &[])
            .body(Bytes::new())?;
        self.send(req, &Discard).await
    }

    /// Lazily list every object of `bucket` in key order.
    pub fn list_objects(&self, bucket: &str) -> Lister<ObjectPages> {
        self.list_objects_from(bucket, Cursor::start())
    }

    /// Continue a listing of `bucket` from a cursor taken with [`Lister::cursor`].
    pub fn list_objects_from(&self, bucket: &str, cursor: Cursor) -> Lister<ObjectPages> {
        let source = ObjectPages {
            client: self.clone(),
            bucket: bucket.to_string(),
        };
        Lister::resume(source, self.page_size, cursor)
    }

    /// A URL granting `GET` on `key` to anyone holding it until `expires` has passed.
    pub async fn presign_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires: Duration,
    ) -> Result<String> {
        let (mut parts, _) = self
            .request(Method::GET, Some(bucket), key, &[])
            .body(())?
            .into_parts();
        self.signer.sign(&mut parts, Some(expires)).await?;
        Ok(parts.uri.to_string())
    }
}

/// Deserialize an XML body into `T`.
pub(crate) struct Xml<T>(PhantomData<fn() -> T>);

impl<T> Xml<T> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: DeserializeOwned + Send> ResponseDecoder for Xml<T> {
    type Output = T;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<T> {
        Ok(quick_xml::de::from_reader(resp.body().as_ref())?)
    }
}

/// Metadata returned by `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Size in bytes.
    pub content_length: u64,
    /// Entity tag, quoted as returned.
    pub etag: Option<String>,
}

struct HeadDecoder;

impl ResponseDecoder for HeadDecoder {
    type Output = ObjectMeta;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<ObjectMeta> {
        let header = |name| resp.headers().get(name).and_then(|v| v.to_str().ok());

        let content_length = header(CONTENT_LENGTH)
            .ok_or_else(|| Error::transport("response has no content-length"))?
            .parse::<u64>()
            .map_err(|e| Error::transport("content-length is not a number").with_source(e))?;

        Ok(ObjectMeta {
            content_length,
            etag: header(ETAG).map(|v| v.to_string()),
        })
    }
}

/// Pages of `GET /` on a bucket.
#[derive(Debug, Clone)]
pub struct ObjectPages {
    client: OssClient,
    bucket: String,
}

#[async_trait]
impl PageSource for ObjectPages {
    type Item = ObjectSummary;

    async fn fetch_page(&self, marker: Option<&str>, page_size: usize) -> Result<Page<ObjectSummary>> {
        let max_keys = page_size.to_string();
        let mut query = vec![("max-keys", max_keys.as_str())];
        if let Some(marker) = marker {
            query.push(("marker", marker));
        }

        let req = self
            .client
            .request(Method::GET, Some(self.bucket.as_str()), "", &query)
            .body(Bytes::new())?;
        let result: ListBucketResult = self.client.send(req, &Xml::new()).await?;
        Ok(Page {
            items: result.contents,
            truncated: result.is_truncated,
        })
    }
}

/// Pages of `GET /` on the service endpoint.
#[derive(Debug, Clone)]
struct BucketPages(OssClient);

#[async_trait]
impl PageSource for BucketPages {
    type Item = BucketSummary;

    async fn fetch_page(&self, marker: Option<&str>, page_size: usize) -> Result<Page<BucketSummary>> {
        let max_keys = page_size.to_string();
        let mut query = vec![("max-keys", max_keys.as_str())];
        if let Some(marker) = marker {
            query.push(("marker", marker));
        }

        let req = self
            .0
            .request(Method::GET, None, "", &query)
            .body(Bytes::new())?;
        let result: ListAllMyBucketsResult = self.0.send(req, &Xml::new()).await?;
        Ok(Page {
            items: result.buckets.bucket,
            truncated: result.is_truncated,
        })
    }
}
