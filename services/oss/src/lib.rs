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

//! Header signed calls to Aliyun OSS.
//!
//! [`OssClient`] covers buckets, objects, listing and server side copy.
//! Objects of 1 GiB and more are copied part by part, see [`CopyOptions`].
//!
//! ## Example
//!
//! ```no_run
//! use alicloud_core::{Context, OsEnv};
//! use alicloud_credential::Config;
//! use alicloud_http_send_reqwest::ReqwestHttpSend;
//! use alicloud_oss::OssClient;
//! use alicloud_sleep_tokio::TokioSleep;
//!
//! # async fn example() -> alicloud_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_sleep(TokioSleep)
//!     .with_env(OsEnv);
//! let client = OssClient::from_config(ctx, Config::default())?;
//!
//! let mut objects = client.list_objects("examplebucket");
//! while let Some(object) = objects.next().await? {
//!     println!("{} {}", object.key, object.size);
//! }
//! client
//!     .rename_object("examplebucket", "logs/old.tar", "logs/new.tar")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    DEFAULT_PAGE_SIZE, MAX_MULTIPART_PARTS, MULTIPART_COPY_PART_SIZE, MULTIPART_COPY_THRESHOLD,
};

pub mod model;

mod sign_request;
pub use sign_request::{Bucket, RequestSigner};

mod error;
pub use error::OssErrorDecoder;

mod client;
pub use client::{ObjectMeta, ObjectPages, OssClient};

mod copy;
pub use copy::{partition, CopyOptions, MultipartUploadSession, Part, PartRange};

mod blob_store;
pub use blob_store::BlobStore;
