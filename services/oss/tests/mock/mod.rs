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

//! In-memory OSS used by the integration tests.

use alicloud_core::hash::base64_hmac_sha1;
use alicloud_core::request::parse_query;
use alicloud_core::{HttpSend, Result, Sleep};
use alicloud_oss::model::CompleteMultipartUpload;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH};
use http::{HeaderMap, Method, StatusCode};
use percent_encoding::percent_decode_str;
use quick_xml::escape::escape;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request seen by the mock and the status it answered.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    /// `/bucket/key?query` as sent, the bucket is empty for service calls.
    pub target: String,
    pub copy_range: Option<String>,
    pub status: StatusCode,
}

#[derive(Debug)]
struct Fault {
    method: Method,
    needle: String,
    remaining: usize,
    status: StatusCode,
    apply: bool,
}

#[derive(Debug)]
struct Upload {
    bucket: String,
    key: String,
    parts: BTreeMap<u32, (String, Bytes)>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, Bytes>>,
    acls: HashMap<String, String>,
    uploads: HashMap<String, Upload>,
    next_id: usize,
    faults: Vec<Fault>,
    calls: Vec<Call>,
}

/// Buckets, objects and multipart uploads kept in memory.
///
/// Every request must carry a valid header signature made with
/// [`ACCESS_KEY_ID`] and [`ACCESS_KEY_SECRET`]. Faults can be injected per
/// method and target substring.
#[derive(Debug, Clone, Default)]
pub struct MockOss(Arc<Mutex<State>>);

type Response = http::Response<Bytes>;

impl MockOss {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().expect("lock must not be poisoned")
    }

    pub fn create_bucket(&self, bucket: &str) -> &Self {
        self.state()
            .buckets
            .insert(bucket.to_string(), BTreeMap::new());
        self
    }

    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) -> &Self {
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
        self
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.state().buckets.get(bucket)?.get(key).cloned()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.state().buckets.contains_key(bucket)
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn open_uploads(&self) -> usize {
        self.state().uploads.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls with `method` whose target contains `needle`.
    pub fn calls_to(&self, method: Method, needle: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.target.contains(needle))
            .collect()
    }

    fn fault(&self, method: Method, needle: &str, times: usize, status: StatusCode, apply: bool) {
        self.state().faults.push(Fault {
            method,
            needle: needle.to_string(),
            remaining: times,
            status,
            apply,
        });
    }

    /// Answer `status` without touching the state.
    pub fn fail_with(&self, method: Method, needle: &str, times: usize, status: StatusCode) {
        self.fault(method, needle, times, status, false);
    }

    /// Answer `500` without touching the state.
    pub fn fail(&self, method: Method, needle: &str, times: usize) {
        self.fail_with(method, needle, times, StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Apply the request, then answer `503` as if the response was lost.
    pub fn fail_after_apply(&self, method: Method, needle: &str, times: usize) {
        self.fault(method, needle, times, StatusCode::SERVICE_UNAVAILABLE, true);
    }

    /// Answer `204` without applying the request.
    pub fn ignore(&self, method: Method, needle: &str, times: usize) {
        self.fault(method, needle, times, StatusCode::NO_CONTENT, false);
    }
}

#[async_trait]
impl HttpSend for MockOss {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<Response> {
        let (parts, body) = req.into_parts();
        let host = parts.uri.host().unwrap_or_default().to_string();
        let bucket = if host.starts_with("oss-") {
            None
        } else {
            host.split('.').next().map(|v| v.to_string())
        };
        let key = percent_decode_str(parts.uri.path().trim_start_matches('/'))
            .decode_utf8_lossy()
            .to_string();
        let raw_query = parts.uri.query().unwrap_or_default();
        let query: HashMap<String, String> = parse_query(raw_query).into_iter().collect();
        let target = format!(
            "/{}/{key}?{raw_query}",
            bucket.as_deref().unwrap_or_default()
        );

        let mut state = self.state();
        let denied = verify(&parts, bucket.as_deref(), &key, raw_query).err();

        let fault = state
            .faults
            .iter_mut()
            .find(|f| f.remaining > 0 && f.method == parts.method && target.contains(&f.needle))
            .map(|f| {
                f.remaining -= 1;
                (f.status, f.apply)
            });

        let resp = match (denied, fault) {
            (Some(code), _) => error(&host, StatusCode::FORBIDDEN, code),
            (None, Some((status, false))) if status.is_success() => empty(status),
            (None, Some((status, false))) => error(&host, status, "InjectedFault"),
            (None, Some((status, true))) => {
                let _ = state.handle(&parts.method, bucket, &key, &query, &parts.headers, body);
                error(&host, status, "ServiceUnavailable")
            }
            (None, None) => state
                .handle(&parts.method, bucket, &key, &query, &parts.headers, body)
                .unwrap_or_else(|(status, code)| error(&host, status, code)),
        };

        state.calls.push(Call {
            method: parts.method.clone(),
            target,
            copy_range: parts
                .headers
                .get("x-oss-copy-source-range")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
            status: resp.status(),
        });
        Ok(resp)
    }
}

pub const ACCESS_KEY_ID: &str = "testid";
pub const ACCESS_KEY_SECRET: &str = "secret";

/// Sub-resources the client sends, the rest of the query is not signed.
const SUB_RESOURCES: &[&str] = &["acl", "location", "partNumber", "uploadId", "uploads"];

/// Recompute the header signature of a request and compare it with the
/// one in `Authorization`.
fn verify(
    parts: &http::request::Parts,
    bucket: Option<&str>,
    key: &str,
    raw_query: &str,
) -> std::result::Result<(), &'static str> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    let (id, signature) = header(AUTHORIZATION.as_str())
        .strip_prefix("OSS ")
        .and_then(|v| v.split_once(':'))
        .ok_or("AccessDenied")?;
    if id != ACCESS_KEY_ID {
        return Err("InvalidAccessKeyId");
    }

    let mut string_to_sign = format!(
        "{}\n{}\n{}\n{}\n",
        parts.method,
        header("content-md5"),
        header("content-type"),
        header("date")
    );

    let mut oss_headers: Vec<(String, &str)> = parts
        .headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-oss-"))
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.trim())))
        .collect();
    oss_headers.sort();
    for (name, value) in oss_headers {
        string_to_sign.push_str(&format!("{name}:{value}\n"));
    }

    match bucket {
        Some(bucket) => string_to_sign.push_str(&format!("/{bucket}/{key}")),
        None => string_to_sign.push_str(&format!("/{key}")),
    }
    let mut sub_resources: Vec<_> = parse_query(raw_query)
        .into_iter()
        .filter(|(k, _)| SUB_RESOURCES.contains(&k.as_str()))
        .collect();
    sub_resources.sort();
    for (idx, (k, v)) in sub_resources.iter().enumerate() {
        string_to_sign.push(if idx == 0 { '?' } else { '&' });
        string_to_sign.push_str(k);
        if !v.is_empty() {
            string_to_sign.push('=');
            string_to_sign.push_str(v);
        }
    }

    let expected = base64_hmac_sha1(ACCESS_KEY_SECRET.as_bytes(), string_to_sign.as_bytes());
    if expected != signature {
        return Err("SignatureDoesNotMatch");
    }
    Ok(())
}

type Handled = std::result::Result<Response, (StatusCode, &'static str)>;

const NO_SUCH_BUCKET: (StatusCode, &str) = (StatusCode::NOT_FOUND, "NoSuchBucket");
const NO_SUCH_KEY: (StatusCode, &str) = (StatusCode::NOT_FOUND, "NoSuchKey");
const NO_SUCH_UPLOAD: (StatusCode, &str) = (StatusCode::NOT_FOUND, "NoSuchUpload");
const INVALID_ARGUMENT: (StatusCode, &str) = (StatusCode::BAD_REQUEST, "InvalidArgument");

impl State {
    fn handle(
        &mut self,
        method: &Method,
        bucket: Option<String>,
        key: &str,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Handled {
        let Some(bucket) = bucket else {
            return match *method {
                Method::GET => Ok(self.list_buckets(query)),
                _ => Err(INVALID_ARGUMENT),
            };
        };

        if key.is_empty() {
            return self.handle_bucket(method, &bucket, query, headers);
        }
        if !self.buckets.contains_key(&bucket) {
            return Err(NO_SUCH_BUCKET);
        }

        let copy_source = headers
            .get("x-oss-copy-source")
            .and_then(|v| v.to_str().ok())
            .map(parse_copy_source);

        match (method.clone(), copy_source) {
            (Method::PUT, Some(source)) if query.contains_key("uploadId") => {
                let range = headers
                    .get("x-oss-copy-source-range")
                    .and_then(|v| v.to_str().ok())
                    .ok_or(INVALID_ARGUMENT)?;
                self.upload_part_copy(query, source, range)
            }
            (Method::PUT, Some((src_bucket, src_key))) => {
                let data = self.get(&src_bucket, &src_key)?;
                self.objects(&bucket)?.insert(key.to_string(), data);
                Ok(xml(
                    "<CopyObjectResult><ETag>\"copied\"</ETag><LastModified>2024-01-01T00:00:00.000Z</LastModified></CopyObjectResult>"
                        .to_string(),
                ))
            }
            (Method::PUT, None) => {
                self.objects(&bucket)?.insert(key.to_string(), body);
                Ok(empty(StatusCode::OK))
            }
            (Method::POST, _) if query.contains_key("uploads") => {
                self.next_id += 1;
                let upload_id = format!("upload-{}", self.next_id);
                self.uploads.insert(
                    upload_id.clone(),
                    Upload {
                        bucket: bucket.clone(),
                        key: key.to_string(),
                        parts: BTreeMap::new(),
                    },
                );
                Ok(xml(format!(
                    "<InitiateMultipartUploadResult><Bucket>{bucket}</Bucket><Key>{}</Key><UploadId>{upload_id}</UploadId></InitiateMultipartUploadResult>",
                    escape(key)
                )))
            }
            (Method::POST, _) if query.contains_key("uploadId") => {
                self.complete(&query["uploadId"], body)
            }
            (Method::GET, _) => Ok(http::Response::builder()
                .status(StatusCode::OK)
                .body(self.get(&bucket, key)?)
                .expect("response must be valid")),
            (Method::HEAD, _) => {
                let size = self.get(&bucket, key)?.len();
                Ok(http::Response::builder()
                    .status(StatusCode::OK)
                    .header(CONTENT_LENGTH, size)
                    .header("etag", "\"mock\"")
                    .body(Bytes::new())
                    .expect("response must be valid"))
            }
            (Method::DELETE, _) => {
                self.objects(&bucket)?.remove(key);
                Ok(empty(StatusCode::NO_CONTENT))
            }
            _ => Err(INVALID_ARGUMENT),
        }
    }

    fn handle_bucket(
        &mut self,
        method: &Method,
        bucket: &str,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
    ) -> Handled {
        let acl = headers
            .get("x-oss-acl")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        match method.clone() {
            Method::PUT if query.contains_key("acl") => {
                self.objects(bucket)?;
                self.acls
                    .insert(bucket.to_string(), acl.ok_or(INVALID_ARGUMENT)?);
                Ok(empty(StatusCode::OK))
            }
            Method::PUT => {
                if self.buckets.contains_key(bucket) {
                    return Err((StatusCode::CONFLICT, "BucketAlreadyExists"));
                }
                self.buckets.insert(bucket.to_string(), BTreeMap::new());
                self.acls
                    .insert(bucket.to_string(), acl.unwrap_or_else(|| "private".to_string()));
                Ok(empty(StatusCode::OK))
            }
            Method::GET if query.contains_key("acl") => {
                self.objects(bucket)?;
                let grant = self.acls.get(bucket).cloned().unwrap_or_else(|| "private".to_string());
                Ok(xml(format!(
                    "<AccessControlPolicy><Owner><ID>1</ID></Owner><AccessControlList><Grant>{grant}</Grant></AccessControlList></AccessControlPolicy>"
                )))
            }
            Method::GET if query.contains_key("location") => {
                self.objects(bucket)?;
                Ok(xml(
                    "<LocationConstraint>oss-cn-hangzhou</LocationConstraint>".to_string(),
                ))
            }
            Method::GET => {
                let page = page(self.objects(bucket)?.keys(), query);
                let mut body = format!(
                    "<ListBucketResult><Name>{bucket}</Name><IsTruncated>{}</IsTruncated>",
                    page.1
                );
                for key in page.0 {
                    let size = self.buckets[bucket][&key].len();
                    body.push_str(&format!(
                        "<Contents><Key>{}</Key><Size>{size}</Size><ETag>\"mock\"</ETag></Contents>",
                        escape(&key)
                    ));
                }
                body.push_str("</ListBucketResult>");
                Ok(xml(body))
            }
            Method::DELETE => {
                if !self.objects(bucket)?.is_empty() {
                    return Err((StatusCode::CONFLICT, "BucketNotEmpty"));
                }
                self.buckets.remove(bucket);
                Ok(empty(StatusCode::NO_CONTENT))
            }
            _ => Err(INVALID_ARGUMENT),
        }
    }

    fn list_buckets(&self, query: &HashMap<String, String>) -> Response {
        let (names, truncated) = page(self.buckets.keys(), query);
        let mut body = format!(
            "<ListAllMyBucketsResult><IsTruncated>{truncated}</IsTruncated><Buckets>"
        );
        for name in names {
            body.push_str(&format!(
                "<Bucket><Name>{name}</Name><Location>oss-cn-hangzhou</Location><CreationDate>2024-01-01T00:00:00.000Z</CreationDate></Bucket>"
            ));
        }
        body.push_str("</Buckets></ListAllMyBucketsResult>");
        xml(body)
    }

    fn objects(&mut self, bucket: &str) -> std::result::Result<&mut BTreeMap<String, Bytes>, (StatusCode, &'static str)> {
        self.buckets.get_mut(bucket).ok_or(NO_SUCH_BUCKET)
    }

    fn get(&self, bucket: &str, key: &str) -> std::result::Result<Bytes, (StatusCode, &'static str)> {
        self.buckets
            .get(bucket)
            .ok_or(NO_SUCH_BUCKET)?
            .get(key)
            .cloned()
            .ok_or(NO_SUCH_KEY)
    }

    fn upload_part_copy(
        &mut self,
        query: &HashMap<String, String>,
        (src_bucket, src_key): (String, String),
        range: &str,
    ) -> Handled {
        let number: u32 = query
            .get("partNumber")
            .and_then(|v| v.parse().ok())
            .ok_or(INVALID_ARGUMENT)?;
        let (first, last) = range
            .strip_prefix("bytes=")
            .and_then(|v| v.split_once('-'))
            .and_then(|(a, b)| Some((a.parse::<usize>().ok()?, b.parse::<usize>().ok()?)))
            .ok_or(INVALID_ARGUMENT)?;

        let data = self.get(&src_bucket, &src_key)?;
        if first > last || last >= data.len() {
            return Err((StatusCode::RANGE_NOT_SATISFIABLE, "InvalidRange"));
        }
        let upload = self
            .uploads
            .get_mut(&query["uploadId"])
            .ok_or(NO_SUCH_UPLOAD)?;

        let etag = format!("\"etag-{number}\"");
        upload
            .parts
            .insert(number, (etag.clone(), data.slice(first..=last)));
        Ok(xml(format!(
            "<CopyPartResult><LastModified>2024-01-01T00:00:00.000Z</LastModified><ETag>{}</ETag></CopyPartResult>",
            escape(&etag)
        )))
    }

    fn complete(&mut self, upload_id: &str, body: Bytes) -> Handled {
        let request: CompleteMultipartUpload =
            quick_xml::de::from_reader(body.as_ref()).map_err(|_| (StatusCode::BAD_REQUEST, "MalformedXML"))?;
        let upload = self.uploads.get(upload_id).ok_or(NO_SUCH_UPLOAD)?;

        let mut data = Vec::new();
        let mut previous = 0;
        for part in &request.parts {
            let (etag, bytes) = upload
                .parts
                .get(&part.part_number)
                .ok_or((StatusCode::BAD_REQUEST, "InvalidPart"))?;
            if part.part_number <= previous || *etag != part.etag {
                return Err((StatusCode::BAD_REQUEST, "InvalidPartOrder"));
            }
            previous = part.part_number;
            data.extend_from_slice(bytes);
        }

        let Some(upload) = self.uploads.remove(upload_id) else {
            return Err(NO_SUCH_UPLOAD);
        };
        self.objects(&upload.bucket)?
            .insert(upload.key.clone(), Bytes::from(data));
        Ok(xml(format!(
            "<CompleteMultipartUploadResult><Bucket>{}</Bucket><Key>{}</Key><ETag>\"assembled\"</ETag></CompleteMultipartUploadResult>",
            upload.bucket,
            escape(&upload.key)
        )))
    }
}

/// Keys strictly after `marker`, at most `max-keys` of them.
fn page<'a>(
    keys: impl Iterator<Item = &'a String>,
    query: &HashMap<String, String>,
) -> (Vec<String>, bool) {
    let max_keys = query
        .get("max-keys")
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let marker = query.get("marker").map(|v| v.as_str()).unwrap_or_default();

    let mut rest = keys.filter(|k| k.as_str() > marker).peekable();
    let mut items = Vec::new();
    while items.len() < max_keys {
        match rest.next() {
            Some(k) => items.push(k.clone()),
            None => break,
        }
    }
    (items, rest.peek().is_some())
}

fn parse_copy_source(value: &str) -> (String, String) {
    let value = value.trim_start_matches('/');
    let (bucket, key) = value.split_once('/').unwrap_or((value, ""));
    (
        bucket.to_string(),
        percent_decode_str(key).decode_utf8_lossy().to_string(),
    )
}

fn xml(body: String) -> Response {
    http::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/xml")
        .body(Bytes::from(body))
        .expect("response must be valid")
}

fn empty(status: StatusCode) -> Response {
    http::Response::builder()
        .status(status)
        .body(Bytes::new())
        .expect("response must be valid")
}

fn error(host: &str, status: StatusCode, code: &str) -> Response {
    http::Response::builder()
        .status(status)
        .header("x-oss-request-id", "mock-request")
        .body(Bytes::from(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Error><Code>{code}</Code><Message>{code} from mock</Message><RequestId>mock-request</RequestId><HostId>{host}</HostId></Error>"
        )))
        .expect("response must be valid")
}

/// Sleep that returns at once and remembers each requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleep(Arc<Mutex<Vec<Duration>>>);

impl RecordingSleep {
    pub fn slept(&self) -> Vec<Duration> {
        self.0.lock().expect("lock must not be poisoned").clone()
    }
}

#[async_trait]
impl Sleep for RecordingSleep {
    async fn sleep(&self, dur: Duration) {
        self.0.lock().expect("lock must not be poisoned").push(dur);
    }
}
