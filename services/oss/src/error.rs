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

use crate::constants::X_OSS_REQUEST_ID;
use crate::model::ErrorResponse;
use alicloud_core::{ErrorDecoder, ServiceError};
use bytes::Bytes;

/// Decode XML error bodies of OSS calls.
///
/// `HEAD` responses carry no body, their request id is taken from the
/// `x-oss-request-id` header and the host from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct OssErrorDecoder;

impl ErrorDecoder for OssErrorDecoder {
    fn decode_error(&self, host: &str, resp: &http::Response<Bytes>) -> ServiceError {
        let body: ErrorResponse = quick_xml::de::from_reader(resp.body().as_ref())
            .unwrap_or_else(|_| ErrorResponse {
                message: String::from_utf8_lossy(resp.body()).trim().to_string(),
                ..Default::default()
            });

        let request_id = if body.request_id.is_empty() {
            resp.headers()
                .get(X_OSS_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        } else {
            body.request_id
        };
        let host_id = if body.host_id.is_empty() {
            host.to_string()
        } else {
            body.host_id
        };

        ServiceError {
            status: resp.status(),
            code: body.code,
            message: body.message,
            request_id,
            host_id,
        }
    }
}
