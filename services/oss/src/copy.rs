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

//! Server side copy of objects.
//!
//! Objects below [`CopyOptions::threshold`] are copied with one request.
//! Larger objects are copied part by part through a multipart upload: the
//! source is split into contiguous byte ranges, each range is copied with
//! upload-part-copy and the parts are assembled by completing the upload.
//!
//! A failed part abandons the upload. No completion is sent, the upload is
//! not aborted and the source is left untouched; the caller gets the error.

use crate::client::Xml;
use crate::constants::*;
use crate::model::*;
use crate::OssClient;
use alicloud_core::request::percent_encode_path;
use alicloud_core::{Error, ErrorKind, Result};
use bytes::Bytes;
use http::{Method, StatusCode};
use log::{debug, warn};

/// Inclusive byte range `[first, last]` copied as part `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based part number.
    pub number: u32,
    /// First byte of the range.
    pub first: u64,
    /// Last byte of the range, inclusive.
    pub last: u64,
}

impl PartRange {
    /// Number of bytes in the range.
    pub fn size(&self) -> u64 {
        self.last - self.first + 1
    }

    /// Value of the `x-oss-copy-source-range` header.
    pub fn to_header(&self) -> String {
        format!("bytes={}-{}", self.first, self.last)
    }
}

/// Split `size` bytes into ranges of `part_size` bytes numbered from 1.
///
/// The ranges are contiguous, do not overlap and cover `[0, size - 1]`
/// exactly; only the last one may be shorter. `size == 0` yields no range.
///
/// ```
/// use alicloud_oss::partition;
///
/// let parts = partition(1_200_000_000, 524_288_000);
/// assert_eq!(parts.len(), 3);
/// assert_eq!(parts[2].first, 1_048_576_000);
/// assert_eq!(parts[2].last, 1_199_999_999);
/// ```
pub fn partition(size: u64, part_size: u64) -> Vec<PartRange> {
    let part_size = part_size.max(1);
    let count = size.div_ceil(part_size).min(MAX_MULTIPART_PARTS);
    let mut parts = Vec::with_capacity(count as usize);

    let mut first = 0;
    let mut number = 1;
    while first < size {
        let last = size.min(first.saturating_add(part_size)) - 1;
        parts.push(PartRange {
            number,
            first,
            last,
        });
        first = last + 1;
        number += 1;
    }
    parts
}

/// Size limits of the chunked copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Objects of at least this many bytes are copied part by part.
    pub threshold: u64,
    /// Bytes per copied part.
    pub part_size: u64,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            threshold: MULTIPART_COPY_THRESHOLD,
            part_size: MULTIPART_COPY_PART_SIZE,
        }
    }
}

impl CopyOptions {
    /// Whether an object of `size` bytes takes the multipart path.
    pub fn is_multipart(&self, size: u64) -> bool {
        size >= self.threshold
    }

    /// Number of parts an object of `size` bytes is split into.
    pub fn part_count(&self, size: u64) -> u64 {
        size.div_ceil(self.part_size.max(1))
    }

    /// Check that an object of `size` bytes fits in [`MAX_MULTIPART_PARTS`] parts.
    pub fn check(&self, size: u64) -> Result<()> {
        let count = self.part_count(size);
        if count > MAX_MULTIPART_PARTS {
            return Err(Error::validation(format!(
                "copying {size} bytes in parts of {} bytes needs {count} parts, at most {MAX_MULTIPART_PARTS} are allowed",
                self.part_size
            )));
        }
        Ok(())
    }
}

/// A part copied into a [`MultipartUploadSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Copied range, its number is the part number.
    pub range: PartRange,
    /// Entity tag returned by upload-part-copy.
    pub etag: String,
}

/// An initiated multipart upload and the parts copied into it so far.
///
/// Parts can only be appended in order; completing the upload consumes the
/// session.
#[derive(Debug)]
pub struct MultipartUploadSession {
    bucket: String,
    key: String,
    upload_id: String,
    parts: Vec<Part>,
}

impl MultipartUploadSession {
    /// Session for an upload initiated on `bucket`/`key`.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            parts: Vec::new(),
        }
    }

    /// Destination bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Destination key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upload id assigned by the service.
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Parts appended so far, in part number order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Append the next part.
    ///
    /// `range` must carry the next part number and start right after the
    /// previous part.
    pub fn push_part(&mut self, range: PartRange, etag: impl Into<String>) -> Result<()> {
        let number = self.parts.len() as u32 + 1;
        let first = self.parts.last().map(|p| p.range.last + 1).unwrap_or(0);
        if range.number != number || range.first != first || range.last < range.first {
            return Err(Error::validation(format!(
                "part {} covering bytes {}-{} can not follow {} parts ending before byte {first}",
                range.number,
                range.first,
                range.last,
                self.parts.len(),
            )));
        }

        self.parts.push(Part {
            range,
            etag: etag.into(),
        });
        Ok(())
    }
}

fn is_not_found(err: &Error) -> bool {
    err.kind() == ErrorKind::Protocol
        && err
            .service_error()
            .map(|e| e.status == StatusCode::NOT_FOUND)
            .unwrap_or(false)
}

fn copy_source(bucket: &str, key: &str) -> String {
    format!("/{bucket}/{}", percent_encode_path(key))
}

impl OssClient {
    /// Copy `src_key` of `src_bucket` to `dst_key` of `dst_bucket`.
    ///
    /// The source size decides between one copy request and a multipart
    /// copy, see [`CopyOptions`].
    pub async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        let size = self.object_size(src_bucket, src_key).await?;
        let options = self.copy_options();

        if !options.is_multipart(size) {
            debug!("copying {src_bucket}/{src_key} ({size} bytes) to {dst_bucket}/{dst_key}");
            self.copy_object_single(src_bucket, src_key, dst_bucket, dst_key)
                .await?;
            return Ok(());
        }

        options.check(size)?;
        let mut session = self.initiate_multipart_upload(dst_bucket, dst_key).await?;
        let parts = partition(size, options.part_size);
        debug!(
            "copying {src_bucket}/{src_key} ({size} bytes) to {dst_bucket}/{dst_key} in {} parts, upload {}",
            parts.len(),
            session.upload_id()
        );

        for range in parts {
            let etag = match self
                .upload_part_copy(&session, src_bucket, src_key, range)
                .await
            {
                Ok(etag) => etag,
                Err(err) => {
                    warn!(
                        "part {} of upload {} failed, abandoning the upload: {err}",
                        range.number,
                        session.upload_id()
                    );
                    return Err(err);
                }
            };
            session.push_part(range, etag)?;
        }

        self.complete_multipart_upload(session).await?;
        Ok(())
    }

    /// Copy with a single `PUT` carrying `x-oss-copy-source`.
    pub async fn copy_object_single(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<CopyObjectResult> {
        let req = self
            .request(Method::PUT, Some(dst_bucket), dst_key, &[])
            .header(X_OSS_COPY_SOURCE, copy_source(src_bucket, src_key))
            .body(Bytes::new())?;
        self.send(req, &Xml::new()).await
    }

    /// Start a multipart upload of `key`.
    pub async fn initiate_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<MultipartUploadSession> {
        let req = self
            .request(Method::POST, Some(bucket), key, &[("uploads", "")])
            .body(Bytes::new())?;
        let result: InitiateMultipartUploadResult = self.send(req, &Xml::new()).await?;

        if result.upload_id.is_empty() {
            return Err(Error::transport(format!(
                "initiating multipart upload of {bucket}/{key} returned no upload id"
            )));
        }
        Ok(MultipartUploadSession::new(bucket, key, result.upload_id))
    }

    /// Copy `range` of the source into the upload, returning the part ETag.
    pub async fn upload_part_copy(
        &self,
        session: &MultipartUploadSession,
        src_bucket: &str,
        src_key: &str,
        range: PartRange,
    ) -> Result<String> {
        let number = range.number.to_string();
        let req = self
            .request(
                Method::PUT,
                Some(session.bucket()),
                session.key(),
                &[
                    ("partNumber", number.as_str()),
                    ("uploadId", session.upload_id()),
                ],
            )
            .header(X_OSS_COPY_SOURCE, copy_source(src_bucket, src_key))
            .header(X_OSS_COPY_SOURCE_RANGE, range.to_header())
            .body(Bytes::new())?;
        let result: CopyPartResult = self.send(req, &Xml::new()).await?;

        if result.etag.is_empty() {
            return Err(Error::transport(format!(
                "copying part {} of upload {} returned no etag",
                range.number,
                session.upload_id()
            )));
        }
        Ok(result.etag)
    }

    /// Assemble the parts of `session` into the destination object.
    pub async fn complete_multipart_upload(
        &self,
        session: MultipartUploadSession,
    ) -> Result<CompleteMultipartUploadResult> {
        if session.parts.is_empty() {
            return Err(Error::validation(format!(
                "multipart upload {} has no part to complete",
                session.upload_id
            )));
        }

        let body = to_xml(&CompleteMultipartUpload {
            parts: session
                .parts
                .into_iter()
                .map(|p| CompletedPart {
                    part_number: p.range.number,
                    etag: p.etag,
                })
                .collect(),
        })?;
        let req = self
            .request(
                Method::POST,
                Some(session.bucket.as_str()),
                &session.key,
                &[("uploadId", session.upload_id.as_str())],
            )
            .body(Bytes::from(body))?;
        self.send(req, &Xml::new()).await
    }

    /// Rename `from` to `to` inside `bucket`.
    ///
    /// The source is deleted only after the copy succeeded.
    pub async fn rename_object(&self, bucket: &str, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Err(Error::validation(format!(
                "can not rename {bucket}/{from} onto itself"
            )));
        }
        self.copy_object(bucket, from, bucket, to).await?;
        self.delete_object(bucket, from).await
    }

    /// Move `key` from `from_bucket` to `to_bucket`, keeping its name.
    ///
    /// The source is deleted only after the copy succeeded.
    pub async fn move_object(&self, from_bucket: &str, key: &str, to_bucket: &str) -> Result<()> {
        if from_bucket == to_bucket {
            return Err(Error::validation(format!(
                "can not move {from_bucket}/{key} onto itself"
            )));
        }
        self.copy_object(from_bucket, key, to_bucket, key).await?;
        self.delete_object(from_bucket, key).await
    }

    /// Rename bucket `from` to `to`.
    ///
    /// Creates `to`, moves every object of `from` under the retry policy of
    /// the client and deletes `from` once a new listing finds it empty. When
    /// an object can not be moved within the policy the error is returned
    /// and the objects moved so far stay in `to`.
    pub async fn rename_bucket(&self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Err(Error::validation(format!(
                "can not rename bucket {from} onto itself"
            )));
        }

        self.create_bucket(to).await?;

        let mut objects = self.list_objects(from);
        let mut moved = 0usize;
        while let Some(object) = objects.next().await? {
            let key = object.key;
            self.backoff()
                .retry(self.context(), |attempt| {
                    self.move_for_rename(from, &key, to, attempt)
                })
                .await?;
            moved += 1;
        }
        debug!("moved {moved} objects from bucket {from} to {to}");

        if let Some(left) = self.list_objects(from).next().await? {
            warn!(
                "bucket {from} still holds {} after rename, not deleting it",
                left.key
            );
            return Ok(());
        }
        self.delete_bucket(from).await
    }

    async fn move_for_rename(&self, from: &str, key: &str, to: &str, attempt: usize) -> Result<()> {
        if let Err(err) = self.copy_object(from, key, to, key).await {
            // An earlier attempt may have deleted the source after copying it.
            if attempt == 1 || !is_not_found(&err) {
                return Err(err);
            }
            return match self.head_object(to, key).await {
                Ok(_) => {
                    debug!("{from}/{key} already moved to {to} by attempt {}", attempt - 1);
                    Ok(())
                }
                Err(head) if is_not_found(&head) => Err(err),
                Err(head) => Err(head),
            };
        }
        self.delete_object(from, key).await
    }
}
