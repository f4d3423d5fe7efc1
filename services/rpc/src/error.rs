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

use crate::constants::X_ACS_REQUEST_ID;
use alicloud_core::{ErrorDecoder, ServiceError};
use bytes::Bytes;
use serde::Deserialize;

/// Error body returned by control plane endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    request_id: String,
    host_id: String,
    code: String,
    message: String,
}

/// Decode JSON error bodies of control plane calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcErrorDecoder;

impl ErrorDecoder for RpcErrorDecoder {
    fn decode_error(&self, host: &str, resp: &http::Response<Bytes>) -> ServiceError {
        let body: ErrorBody = serde_json::from_slice(resp.body()).unwrap_or_else(|_| ErrorBody {
            message: String::from_utf8_lossy(resp.body()).trim().to_string(),
            ..Default::default()
        });

        let request_id = if body.request_id.is_empty() {
            resp.headers()
                .get(X_ACS_REQUEST_ID)
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

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_decode_json_error() {
        let resp = http::Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .body(Bytes::from_static(
                br#"{"RequestId":"C6B4A2F3-0F6D-4F8E-9D1C-2A3B4C5D6E7F","HostId":"ecs.aliyuncs.com","Code":"InvalidParameter","Message":"The specified parameter is not valid."}"#,
            ))
            .expect("response must be valid");

        let err = RpcErrorDecoder.decode_error("ecs-cn-hangzhou.aliyuncs.com", &resp);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "InvalidParameter");
        assert_eq!(err.message, "The specified parameter is not valid.");
        assert_eq!(err.request_id, "C6B4A2F3-0F6D-4F8E-9D1C-2A3B4C5D6E7F");
        assert_eq!(err.host_id, "ecs.aliyuncs.com");
    }

    #[test]
    fn test_decode_non_json_error() {
        let resp = http::Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .header(X_ACS_REQUEST_ID, "req-42")
            .body(Bytes::from_static(b"Bad Gateway\n"))
            .expect("response must be valid");

        let err = RpcErrorDecoder.decode_error("slb.aliyuncs.com", &resp);
        assert_eq!(err.code, "");
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.request_id, "req-42");
        assert_eq!(err.host_id, "slb.aliyuncs.com");
    }
}
