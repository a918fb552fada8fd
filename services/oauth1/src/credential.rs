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

use std::fmt::{Debug, Formatter};

use owlery_core::{utils::Redact, SigningCredential};

/// Credential for OAuth 1.0a.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    /// Consumer key issued to the client.
    pub consumer_key: String,
    /// Consumer secret issued to the client.
    pub consumer_secret: String,
    /// Token of the resource owner, absent while requesting a request token.
    pub token: Option<String>,
    /// Secret of the token.
    pub token_secret: Option<String>,
    /// Verifier received from the resource owner authorization step.
    pub verifier: Option<String>,
}

impl Credential {
    /// Create a new credential without token.
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            ..Default::default()
        }
    }

    /// Set token and token secret.
    pub fn with_token(mut self, token: &str, token_secret: &str) -> Self {
        self.token = Some(token.to_string());
        self.token_secret = Some(token_secret.to_string());
        self
    }

    /// Set verifier.
    pub fn with_verifier(mut self, verifier: &str) -> Self {
        self.verifier = Some(verifier.to_string());
        self
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .field("token", &Redact::from(&self.token))
            .field("token_secret", &Redact::from(&self.token_secret))
            .field("verifier", &Redact::from(&self.verifier))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.consumer_key.is_empty() && !self.consumer_secret.is_empty()
    }
}
