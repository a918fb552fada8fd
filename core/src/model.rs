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

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Deserialize;
use serde::Serialize;

/// Model is a value produced by parsing a response body.
///
/// Any `Debug + Send + Sync + 'static` type is a model, use
/// [`Response::model_as`](crate::Response::model_as) to get the concrete type back.
pub trait Model: Debug + Send + Sync + 'static {
    /// Access the model as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Debug + Send + Sync + 'static> Model for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Token and secret returned by an OAuth 1.0a token endpoint.
///
/// Request token and access token responses are both form encoded, for example
/// `oauth_token=T&oauth_token_secret=S&oauth_callback_confirmed=true`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthKey {
    /// `oauth_token`
    #[serde(rename = "oauth_token")]
    pub token: Option<String>,
    /// `oauth_token_secret`
    #[serde(rename = "oauth_token_secret")]
    pub secret: Option<String>,
    /// `oauth_verifier`
    #[serde(rename = "oauth_verifier")]
    pub verifier: Option<String>,
    /// `oauth_callback_confirmed`
    #[serde(rename = "oauth_callback_confirmed", default)]
    pub callback_confirmed: bool,
    /// Provider specific fields, for example `user_id` or `screen_name`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl OAuthKey {
    /// Build the key from decoded form pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut key = OAuthKey::default();
        for (name, value) in pairs {
            let (name, value) = (name.into(), value.into());
            match name.as_str() {
                "oauth_token" => key.token = Some(value),
                "oauth_token_secret" => key.secret = Some(value),
                "oauth_verifier" => key.verifier = Some(value),
                "oauth_callback_confirmed" => {
                    key.callback_confirmed = value.eq_ignore_ascii_case("true")
                }
                _ => {
                    key.extra.insert(name, value);
                }
            }
        }
        key
    }
}
