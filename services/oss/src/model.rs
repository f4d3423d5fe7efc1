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

//! XML documents exchanged with OSS.

use alicloud_core::{Error, ListItem, Result};
use serde::{Deserialize, Serialize};

/// Serialize `value` into an XML document named after its type.
pub(crate) fn to_xml<T: Serialize>(value: &T) -> Result<String> {
    quick_xml::se::to_string(value)
        .map_err(|e| Error::unexpected("failed to encode xml").with_source(e))
}

/// Body of `GET /` on the service endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListAllMyBucketsResult {
    /// Whether more buckets follow.
    pub is_truncated: bool,
    /// Marker of the next page.
    pub next_marker: Option<String>,
    /// Buckets of this page.
    pub buckets: Buckets,
}

/// Wrapper of the `<Bucket>` list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Buckets {
    /// Buckets in name order.
    #[serde(rename = "Bucket")]
    pub bucket: Vec<BucketSummary>,
}

/// One bucket owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BucketSummary {
    /// Bucket name.
    pub name: String,
    /// Data center, for example `oss-cn-hangzhou`.
    pub location: String,
    /// Creation time as returned by the service.
    pub creation_date: String,
}

impl ListItem for BucketSummary {
    fn marker(&self) -> &str {
        &self.name
    }
}

/// Body of `GET /` on a bucket.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListBucketResult {
    /// Bucket name.
    pub name: String,
    /// Whether more objects follow.
    pub is_truncated: bool,
    /// Objects of this page.
    pub contents: Vec<ObjectSummary>,
}

/// One object of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag, quoted as returned.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Last modification time as returned by the service.
    pub last_modified: String,
}

impl ListItem for ObjectSummary {
    fn marker(&self) -> &str {
        &self.key
    }
}

/// Body of `PUT /` creating a bucket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketConfiguration {
    /// Data center of the new bucket, for example `oss-cn-hangzhou`.
    pub location_constraint: String,
}

/// Body of `GET /?acl`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AccessControlPolicy {
    /// Granted permissions.
    pub access_control_list: AccessControlList,
}

/// Canned ACL of a bucket.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AccessControlList {
    /// `private`, `public-read` or `public-read-write`.
    pub grant: String,
}

/// Body of `POST /key?uploads`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InitiateMultipartUploadResult {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// Session id used by every part and by the completion.
    pub upload_id: String,
}

/// Body of an upload-part-copy response.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CopyPartResult {
    /// Entity tag of the part.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Last modification time as returned by the service.
    pub last_modified: String,
}

/// Body of a single shot copy response.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CopyObjectResult {
    /// Entity tag of the new object.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Last modification time as returned by the service.
    pub last_modified: String,
}

/// Body of `POST /key?uploadId=ID`.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteMultipartUpload {
    /// Parts in ascending part number.
    #[serde(rename = "Part", default)]
    pub parts: Vec<CompletedPart>,
}

/// A part listed in [`CompleteMultipartUpload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    /// 1-based part number.
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
    /// Entity tag returned when the part was copied.
    #[serde(rename = "ETag")]
    pub etag: String,
}

/// Body of a completed multipart upload.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CompleteMultipartUploadResult {
    /// Bucket of the assembled object.
    pub bucket: String,
    /// Key of the assembled object.
    pub key: String,
    /// Entity tag of the assembled object.
    #[serde(rename = "ETag")]
    pub etag: String,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename = "Error", rename_all = "PascalCase")]
pub struct ErrorResponse {
    /// Provider error code, for example `NoSuchKey`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id assigned by the service.
    pub request_id: String,
    /// Host that served the request.
    pub host_id: String,
}
