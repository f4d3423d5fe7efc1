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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded on first use and then kept for the lifetime of the
/// signer. Clones share the same credential.
#[derive(Clone)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<OnceCell<K>>,
}

impl<K: SigningCredential> Debug for Signer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("provider", &self.provider)
            .field("builder", &self.builder)
            .field("credential", &self.credential.get())
            .finish()
    }
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            builder: Arc::new(builder),
            credential: Arc::new(OnceCell::new()),
        }
    }

    /// Get the context this signer loads credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Load the credential, or return the one loaded before.
    pub async fn credential(&self) -> Result<&K> {
        self.credential
            .get_or_try_init(|| async {
                match self.provider.provide_credential(&self.ctx).await? {
                    Some(cred) if cred.is_valid() => Ok(cred),
                    Some(_) => Err(Error::credential_invalid(
                        "loaded credential is not valid for signing",
                    )),
                    None => Err(Error::credential_invalid(
                        "no credential found in any configured provider",
                    )),
                }
            })
            .await
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = self.credential().await?;
        self.builder
            .sign_request(&self.ctx, req, cred, expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Key(String);

    impl SigningCredential for Key {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        value: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProvideCredential for CountingProvider {
        type Credential = Key;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Key>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Key(self.value.to_string())))
        }
    }

    #[derive(Debug)]
    struct HeaderBuilder;

    #[async_trait]
    impl SignRequest for HeaderBuilder {
        type Credential = Key;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            cred: &Key,
            _: Option<Duration>,
        ) -> Result<()> {
            req.headers.insert("x-key", cred.0.parse()?);
            Ok(())
        }
    }

    fn parts() -> http::request::Parts {
        http::Request::get("https://example.com/")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_credential_loaded_once() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Signer::new(
            Context::new(),
            CountingProvider {
                value: "ak",
                calls: calls.clone(),
            },
            HeaderBuilder,
        );

        for _ in 0..3 {
            let mut req = parts();
            signer.sign(&mut req, None).await?;
            assert_eq!(req.headers["x-key"], "ak");
        }
        signer.clone().sign(&mut parts(), None).await?;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_credential() {
        let signer = Signer::new(
            Context::new(),
            CountingProvider::default(),
            HeaderBuilder,
        );

        let err = signer.sign(&mut parts(), None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }
}
