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

use async_trait::async_trait;
use owlery_core::{Context, ProvideCredential, Result};

use crate::constants::*;
use crate::Credential;

/// Loads the credential from `OWLERY_OAUTH_*` environment variables.
///
/// [`OWLERY_OAUTH_CONSUMER_KEY`] and [`OWLERY_OAUTH_CONSUMER_SECRET`] are
/// required. [`OWLERY_OAUTH_TOKEN`], [`OWLERY_OAUTH_TOKEN_SECRET`] and
/// [`OWLERY_OAUTH_VERIFIER`] are picked up when present.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(consumer_key), Some(consumer_secret)) = (
            ctx.env_var(OWLERY_OAUTH_CONSUMER_KEY),
            ctx.env_var(OWLERY_OAUTH_CONSUMER_SECRET),
        ) else {
            return Ok(None);
        };

        Ok(Some(Credential {
            consumer_key,
            consumer_secret,
            token: ctx.env_var(OWLERY_OAUTH_TOKEN),
            token_secret: ctx.env_var(OWLERY_OAUTH_TOKEN_SECRET),
            verifier: ctx.env_var(OWLERY_OAUTH_VERIFIER),
        }))
    }
}
