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

use crate::OssClient;
use alicloud_core::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::time::Duration;

/// BlobStore is the storage capability offered to provider neutral callers.
///
/// Buckets hold objects addressed by key. Copies are performed server side.
#[async_trait]
pub trait BlobStore: Debug + Send + Sync {
    /// Create an empty bucket.
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Check whether a bucket exists.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Rename a bucket by moving every object into a new one.
    async fn rename_bucket(&self, from: &str, to: &str) -> Result<()>;

    /// Grant public read on a bucket.
    async fn make_public(&self, bucket: &str) -> Result<()>;

    /// Check whether a bucket is readable by anyone.
    async fn is_public(&self, bucket: &str) -> Result<bool>;

    /// Store `body` under `key`.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;

    /// Fetch the content of `key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Size of `key` in bytes.
    async fn size(&self, bucket: &str, key: &str) -> Result<u64>;

    /// Delete `key`.
    async fn remove(&self, bucket: &str, key: &str) -> Result<()>;

    /// Keys of a bucket in order.
    async fn list(&self, bucket: &str) -> Result<Vec<String>>;

    /// Copy an object, possibly across buckets.
    async fn copy(&self, src_bucket: &str, src_key: &str, dst_bucket: &str, dst_key: &str)
        -> Result<()>;

    /// Move `key` into another bucket.
    async fn move_to(&self, from_bucket: &str, key: &str, to_bucket: &str) -> Result<()>;

    /// Rename `key` inside its bucket.
    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<()>;

    /// URL granting read access to `key` for `expires`.
    async fn signed_url(&self, bucket: &str, key: &str, expires: Duration) -> Result<String>;
}

#[async_trait]
impl BlobStore for OssClient {
    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        OssClient::create_bucket(self, bucket).await
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        OssClient::bucket_exists(self, bucket).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        OssClient::delete_bucket(self, bucket).await
    }

    async fn rename_bucket(&self, from: &str, to: &str) -> Result<()> {
        OssClient::rename_bucket(self, from, to).await
    }

    async fn make_public(&self, bucket: &str) -> Result<()> {
        self.make_bucket_public(bucket).await
    }

    async fn is_public(&self, bucket: &str) -> Result<bool> {
        self.is_bucket_public(bucket).await
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        self.put_object(bucket, key, body).await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.get_object(bucket, key).await
    }

    async fn size(&self, bucket: &str, key: &str) -> Result<u64> {
        self.object_size(bucket, key).await
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_object(bucket, key).await
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        let objects = self.list_objects(bucket).collect_all().await?;
        Ok(objects.into_iter().map(|o| o.key).collect())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        self.copy_object(src_bucket, src_key, dst_bucket, dst_key)
            .await
    }

    async fn move_to(&self, from_bucket: &str, key: &str, to_bucket: &str) -> Result<()> {
        self.move_object(from_bucket, key, to_bucket).await
    }

    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<()> {
        self.rename_object(bucket, from, to).await
    }

    async fn signed_url(&self, bucket: &str, key: &str, expires: Duration) -> Result<String> {
        self.presign_get_url(bucket, key, expires).await
    }
}
