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

use super::constants::*;
use owlery_core::{utils::Redact, Context};

/// Config carries all the configuration for OAuth 1.0a signing.
#[derive(Clone, Default)]
pub struct Config {
    /// `consumer_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OWLERY_OAUTH_CONSUMER_KEY`]
    pub consumer_key: Option<String>,
    /// `consumer_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OWLERY_OAUTH_CONSUMER_SECRET`]
    pub consumer_secret: Option<String>,
    /// `token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OWLERY_OAUTH_TOKEN`]
    pub token: Option<String>,
    /// `token_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OWLERY_OAUTH_TOKEN_SECRET`]
    pub token_secret: Option<String>,
    /// `verifier` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OWLERY_OAUTH_VERIFIER`]
    pub verifier: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set consumer key and consumer secret
    pub fn with_consumer(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.consumer_key = Some(key.into());
        self.consumer_secret = Some(secret.into());
        self
    }

    /// Set token and token secret
    pub fn with_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(secret.into());
        self
    }

    /// Set verifier
    pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.verifier = Some(verifier.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(OWLERY_OAUTH_CONSUMER_KEY) {
            self.consumer_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(OWLERY_OAUTH_CONSUMER_SECRET) {
            self.consumer_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(OWLERY_OAUTH_TOKEN) {
            self.token.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(OWLERY_OAUTH_TOKEN_SECRET) {
            self.token_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(OWLERY_OAUTH_VERIFIER) {
            self.verifier.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .field("token", &Redact::from(&self.token))
            .field("token_secret", &Redact::from(&self.token_secret))
            .field("verifier", &Redact::from(&self.verifier))
            .finish()
    }
}
