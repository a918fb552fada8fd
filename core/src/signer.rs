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

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::Mutex;

use crate::request::Request;
use crate::Context;
use crate::ProvideCredential;
use crate::Result;
use crate::SignRequest;
use crate::SigningCredential;

/// Sign is the object safe signing seam attached to a [`Request`].
#[async_trait::async_trait]
pub trait Sign: Debug + Send + Sync + 'static {
    /// Sign the request in place.
    async fn sign(&self, req: &mut Request) -> Result<()>;
}

/// Signer is the main struct used to sign the request.
///
/// The credential is loaded on first use and cached until it becomes invalid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut Request) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let ctx = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = ctx.clone();
            ctx
        };

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref())
            .await
    }
}

#[async_trait::async_trait]
impl<K: SigningCredential> Sign for Signer<K> {
    async fn sign(&self, req: &mut Request) -> Result<()> {
        Signer::sign(self, req).await
    }
}
