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

//! OAuth Core 1.0a HMAC-SHA1 request signer.
use http::header::AUTHORIZATION;
use http::HeaderValue;
use http::Uri;
use log::debug;
use log::warn;
use owlery_core::encode::percent_encode;
use owlery_core::hash::base64_encode;
use owlery_core::hash::base64_hmac_sha1;
use owlery_core::hash::hmac_sha1;
use owlery_core::time::now;
use owlery_core::time::unix_timestamp;
use owlery_core::time::DateTime;
use owlery_core::{Context, Error, Method, ParamStore, Request, Result, SignRequest};
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::constants::*;
use super::credential::Credential;

const NONCE_LENGTH: usize = 32;

/// How `oauth_nonce` is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceKind {
    /// 32 random alphanumeric characters.
    #[default]
    Random,
    /// base64 of HMAC-SHA1 over the timestamp, keyed by the consumer key.
    ///
    /// Two requests signed within the same second share a nonce, servers
    /// enforcing nonce uniqueness will reject the second one.
    Derived,
}

/// RequestSigner that implements OAuth Core 1.0a with `HMAC-SHA1`.
///
/// - [OAuth Core 1.0a](https://oauth.net/core/1.0a/)
///
/// The signature covers the query params, the post params of requests that
/// carry a body and the protocol params. The result is set as the
/// `Authorization` header.
#[derive(Debug, Default)]
pub struct RequestSigner {
    nonce_kind: NonceKind,
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a signer generating random nonces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how nonces are generated.
    pub fn with_nonce_kind(mut self, kind: NonceKind) -> Self {
        self.nonce_kind = kind;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// Only use this function for testing.
    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.nonce = Some(nonce.to_string());
        self
    }

    fn nonce(&self, consumer_key: &str, timestamp: &str) -> String {
        if let Some(nonce) = &self.nonce {
            return nonce.clone();
        }

        match self.nonce_kind {
            NonceKind::Random => random_nonce(),
            NonceKind::Derived => match hmac_sha1(consumer_key.as_bytes(), timestamp.as_bytes()) {
                Ok(mac) => base64_encode(&mac),
                Err(err) => {
                    warn!("derive oauth nonce failed, using a random one: {err}");
                    random_nonce()
                }
            },
        }
    }

    /// Build the protocol params for the request.
    ///
    /// Token and verifier set on the request win over the credential's.
    pub fn protocol_params(&self, req: &Request, cred: &Credential) -> ProtocolParams {
        let timestamp = unix_timestamp(self.time.unwrap_or_else(now)).to_string();
        let nonce = self.nonce(&cred.consumer_key, &timestamp);

        ProtocolParams {
            consumer_key: cred.consumer_key.clone(),
            token: non_empty(req.token().or(cred.token.as_deref())),
            timestamp,
            nonce,
            verifier: non_empty(req.verifier().or(cred.verifier.as_deref())),
        }
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Request,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let params = self.protocol_params(req, cred);

        let mut all = req.query_params().clone();
        if req.method().has_body() {
            all.extend(req.post_params());
        }
        params.append_to(&mut all);

        let base = signature_base_string(req.method(), req.url(), &all)?;
        debug!("oauth signature base string: {base}");

        let token_secret = req.token_secret().or(cred.token_secret.as_deref());
        let key = signing_key(&cred.consumer_secret, token_secret);
        let sig = signature(&base, &key);

        let mut value = HeaderValue::from_str(&authorization_header(&params, &sig))?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);

        Ok(())
    }
}

/// Protocol params of one signing pass, `oauth_signature` excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParams {
    /// `oauth_consumer_key`
    pub consumer_key: String,
    /// `oauth_token`, omitted when absent.
    pub token: Option<String>,
    /// `oauth_timestamp`, seconds since the unix epoch.
    pub timestamp: String,
    /// `oauth_nonce`
    pub nonce: String,
    /// `oauth_verifier`, omitted when absent.
    pub verifier: Option<String>,
}

impl ProtocolParams {
    /// Add every protocol param to the store.
    pub fn append_to(&self, store: &mut ParamStore) {
        store.add(OAUTH_CONSUMER_KEY, self.consumer_key.as_str());
        if let Some(token) = &self.token {
            store.add(OAUTH_TOKEN, token.as_str());
        }
        store.add(OAUTH_SIGNATURE_METHOD, HMAC_SHA1);
        store.add(OAUTH_TIMESTAMP, self.timestamp.as_str());
        store.add(OAUTH_NONCE, self.nonce.as_str());
        store.add(OAUTH_VERSION, VERSION_1_0);
        if let Some(verifier) = &self.verifier {
            store.add(OAUTH_VERIFIER, verifier.as_str());
        }
    }
}

/// Construct the signature base string.
///
/// ## Format
///
/// ```text
/// METHOD + "&" + percent_encode(base string URI) + "&" + percent_encode(normalized params)
/// ```
///
/// Normalized params are the `key=value` pairs of every param, encoded, sorted
/// byte-wise and joined by `&`.
pub fn signature_base_string(method: Method, url: &str, params: &ParamStore) -> Result<String> {
    Ok(format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(&base_string_uri(url)?),
        percent_encode(&params.to_param_string())
    ))
}

/// Normalize the url for the base string.
///
/// Scheme and host are lower cased and the default port of the scheme is
/// dropped. Query and fragment never take part.
pub fn base_string_uri(url: &str) -> Result<String> {
    let uri: Uri = url.parse()?;
    let (Some(scheme), Some(host)) = (uri.scheme_str(), uri.host()) else {
        return Err(Error::request_invalid(format!(
            "url without scheme or host can't be signed: {url}"
        )));
    };
    let scheme = scheme.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    let mut s = format!("{scheme}://{host}");
    match (scheme.as_str(), uri.port_u16()) {
        (_, None) | ("http", Some(80)) | ("https", Some(443)) => {}
        (_, Some(port)) => s.push_str(&format!(":{port}")),
    }
    match uri.path() {
        "" => s.push('/'),
        path => s.push_str(path),
    }
    Ok(s)
}

/// Signing key: `percent_encode(consumer_secret) & percent_encode(token_secret)`.
///
/// A missing token secret leaves the part after `&` empty.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or_default())
    )
}

/// base64 of HMAC-SHA1 over the base string.
///
/// Returns an empty signature if the MAC can't be computed.
pub fn signature(base_string: &str, signing_key: &str) -> String {
    match base64_hmac_sha1(signing_key.as_bytes(), base_string.as_bytes()) {
        Ok(signature) => signature,
        Err(err) => {
            warn!("compute oauth signature failed, sending an empty signature: {err}");
            String::new()
        }
    }
}

/// Build the `Authorization` header value.
///
/// ```text
/// OAuth oauth_consumer_key="..", oauth_token="..", oauth_signature_method="HMAC-SHA1",
///       oauth_signature="..", oauth_timestamp="..", oauth_nonce="..", oauth_version="1.0",
///       oauth_verifier=".."
/// ```
///
/// Every value is percent encoded, token and verifier are omitted when absent.
pub fn authorization_header(params: &ProtocolParams, signature: &str) -> String {
    let mut pairs = vec![(OAUTH_CONSUMER_KEY, params.consumer_key.as_str())];
    if let Some(token) = &params.token {
        pairs.push((OAUTH_TOKEN, token.as_str()));
    }
    pairs.push((OAUTH_SIGNATURE_METHOD, HMAC_SHA1));
    pairs.push((OAUTH_SIGNATURE, signature));
    pairs.push((OAUTH_TIMESTAMP, params.timestamp.as_str()));
    pairs.push((OAUTH_NONCE, params.nonce.as_str()));
    pairs.push((OAUTH_VERSION, VERSION_1_0));
    if let Some(verifier) = &params.verifier {
        pairs.push((OAUTH_VERIFIER, verifier.as_str()));
    }

    let pairs: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("{k}=\"{}\"", percent_encode(v)))
        .collect();
    format!("OAuth {}", pairs.join(", "))
}

fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.filter(|v| !v.is_empty()).map(|v| v.to_string())
}
