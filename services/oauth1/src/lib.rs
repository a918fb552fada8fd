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

//! OAuth Core 1.0a signing for owlery.
//!
//! ## Example
//!
//! ```no_run
//! use owlery_core::{Context, Method, OAuthKey, Request, ResponseType, Mode, Signer};
//! use owlery_oauth1::{RequestSigner, StaticCredentialProvider};
//!
//! # async fn example(ctx: Context) -> owlery_core::Result<()> {
//! let signer = Signer::new(
//!     ctx.clone(),
//!     StaticCredentialProvider::new("consumer_key", "consumer_secret"),
//!     RequestSigner::new(),
//! );
//!
//! let req = Request::with_type(
//!     "https://api.example.com/oauth/request_token",
//!     Method::Post,
//!     ResponseType::OAuth,
//!     Mode::Single,
//! )
//! .sign_with(signer);
//!
//! let (_, resp) = req.send(&ctx).await;
//! let key = resp.model_as::<OAuthKey>();
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{
    authorization_header, base_string_uri, signature, signature_base_string, signing_key,
    NonceKind, ProtocolParams, RequestSigner,
};

mod provide_credential;
pub use provide_credential::*;

mod constants;
pub use constants::{
    OWLERY_OAUTH_CONSUMER_KEY, OWLERY_OAUTH_CONSUMER_SECRET, OWLERY_OAUTH_TOKEN,
    OWLERY_OAUTH_TOKEN_SECRET, OWLERY_OAUTH_VERIFIER,
};
