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

//! Tokio-based sleeping for alicloud.
//!
//! Retry policies such as the bucket rename backoff wait through the
//! context's `Sleep`. This crate backs it with `tokio::time::sleep`.
//!
//! ## Example
//!
//! ```
//! use alicloud_core::Context;
//! use alicloud_sleep_tokio::TokioSleep;
//!
//! let ctx = Context::new().with_sleep(TokioSleep);
//! ```

use alicloud_core::Sleep;
use async_trait::async_trait;
use std::time::Duration;

/// Tokio-based implementation of the `Sleep` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, dur: Duration) {
        tokio::time::sleep(dur).await
    }
}
