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

use crate::Credential;

/// Hands out the same credential every time.
///
/// Use it when the consumer pair (and maybe an access token) is known up
/// front, for example from an app registration.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Provider for a bare consumer key and secret.
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            credential: Credential::new(consumer_key, consumer_secret),
        }
    }

    /// Add an access or request token.
    pub fn with_token(self, token: &str, token_secret: &str) -> Self {
        Self {
            credential: self.credential.with_token(token, token_secret),
        }
    }

    /// Add the verifier returned by the authorization step.
    pub fn with_verifier(self, verifier: &str) -> Self {
        Self {
            credential: self.credential.with_verifier(verifier),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
