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

use crate::{Context, Error, ErrorKind, Result, ServiceError};
use bytes::Bytes;
use log::debug;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// ResponseDecoder turns a successful response into a typed value.
pub trait ResponseDecoder: Send + Sync {
    /// Decoded value.
    type Output: Send;

    /// Decode the response.
    ///
    /// Failures are reported as [`ErrorKind::Transport`] by the executor.
    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output>;
}

/// ErrorDecoder extracts the provider fields from a failed response.
///
/// Every service family formats its error body differently: JSON for RPC
/// calls, XML for OSS.
pub trait ErrorDecoder: Debug + Send + Sync + 'static {
    /// Build the service error; `host` is the authority the request was sent to.
    fn decode_error(&self, host: &str, resp: &http::Response<Bytes>) -> ServiceError;
}

/// Drop the body, keep nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl ResponseDecoder for Discard {
    type Output = ();

    fn decode(&self, _: http::Response<Bytes>) -> Result<()> {
        Ok(())
    }
}

/// Return the response as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBody;

impl ResponseDecoder for RawBody {
    type Output = http::Response<Bytes>;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        Ok(resp)
    }
}

/// Deserialize a JSON body into `T`.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    /// Create a new JSON decoder.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned + Send> ResponseDecoder for Json<T> {
    type Output = T;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<T> {
        Ok(serde_json::from_slice(resp.body())?)
    }
}

/// RequestExecutor sends signed requests and classifies the responses.
///
/// It never retries: retry policy belongs to the caller.
#[derive(Clone, Debug)]
pub struct RequestExecutor {
    ctx: Context,
    errors: Arc<dyn ErrorDecoder>,
}

impl RequestExecutor {
    /// Create a new executor using the context transport.
    pub fn new(ctx: Context, errors: impl ErrorDecoder) -> Self {
        Self {
            ctx,
            errors: Arc::new(errors),
        }
    }

    /// Send `req` and decode the response with `decoder`.
    ///
    /// - transport failures and decode failures fail with [`ErrorKind::Transport`]
    /// - non-2xx responses fail with [`ErrorKind::Protocol`]
    pub async fn execute<D: ResponseDecoder>(
        &self,
        req: http::Request<Bytes>,
        decoder: &D,
    ) -> Result<D::Output> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let host = uri.host().unwrap_or_default().to_string();

        debug!("sending request: {method} {uri}");
        let resp = self.ctx.http_send(req).await.map_err(|err| {
            if err.kind() == ErrorKind::Transport {
                err
            } else {
                Error::transport(format!("failed to send {method} {uri}")).with_source(err)
            }
        })?;
        let status = resp.status();
        debug!("got response: {method} {uri} {status}");

        if !status.is_success() {
            let service = self.errors.decode_error(&host, &resp);
            debug!("service error for {method} {uri}: {service}");
            return Err(Error::protocol(service));
        }

        decoder.decode(resp).map_err(|err| match err.kind() {
            ErrorKind::Transport => err,
            _ => Error::transport(format!("failed to decode response of {method} {uri}"))
                .with_source(err),
        })
    }
}
