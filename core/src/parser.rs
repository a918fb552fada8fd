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

use log::debug;
use serde::de::DeserializeOwned;

use crate::model::Model;
use crate::model::OAuthKey;
use crate::response::ResponseType;

/// ParseResponse turns a response body into models.
///
/// Parsing never fails loudly: a body that can't be turned into a model
/// yields `None`.
pub trait ParseResponse: Debug + Send + Sync + 'static {
    /// Parse the body into exactly one model.
    fn parse_single(&self, body: &str) -> Option<Arc<dyn Model>>;

    /// Parse the body into a sequence of models.
    ///
    /// Returns `None` if the parser has no notion of multiple models.
    fn parse_multiple(&self, body: &str) -> Option<Vec<Arc<dyn Model>>>;
}

/// Parser is resolved once per response and decides how its body is decoded.
#[derive(Debug, Clone)]
pub enum Parser {
    /// Leave the body alone, no models are produced.
    Idle,
    /// Decode the body as JSON into a model type.
    Json(JsonParser),
    /// Decode an OAuth token endpoint body (`k=v&k=v`) into an [`OAuthKey`].
    OAuthForm,
    /// User supplied parser.
    Custom(Arc<dyn ParseResponse>),
}

impl Parser {
    /// JSON parser decoding into `T`.
    pub fn json<T: DeserializeOwned + Model>() -> Self {
        Parser::Json(JsonParser::new::<T>())
    }

    /// Wrap a user supplied parser.
    pub fn custom(parser: impl ParseResponse) -> Self {
        Parser::Custom(Arc::new(parser))
    }

    /// The built-in parser for a declared response type.
    ///
    /// JSON bodies decode into [`serde_json::Value`] unless a typed parser is
    /// supplied with [`Parser::json`].
    pub fn for_type(typ: ResponseType) -> Self {
        match typ {
            ResponseType::Text => Parser::Idle,
            ResponseType::Json => Parser::json::<serde_json::Value>(),
            ResponseType::OAuth => Parser::OAuthForm,
        }
    }

    /// Pick the explicit parser if present, the built-in one otherwise.
    pub fn resolve(explicit: Option<&Parser>, typ: ResponseType) -> Self {
        match explicit {
            Some(p) => p.clone(),
            None => Parser::for_type(typ),
        }
    }

    /// Parse the body into exactly one model.
    pub fn parse_single(&self, body: &str) -> Option<Arc<dyn Model>> {
        match self {
            Parser::Idle => None,
            Parser::Json(p) => p.parse_single(body),
            Parser::OAuthForm => Some(Arc::new(parse_oauth_form(body))),
            Parser::Custom(p) => p.parse_single(body),
        }
    }

    /// Parse the body into a sequence of models.
    pub fn parse_multiple(&self, body: &str) -> Option<Vec<Arc<dyn Model>>> {
        match self {
            Parser::Idle => None,
            Parser::Json(p) => p.parse_multiple(body),
            // There is only ever one token/secret pair in a token response.
            Parser::OAuthForm => None,
            Parser::Custom(p) => p.parse_multiple(body),
        }
    }
}

/// JsonParser decodes a body into a serde model type.
///
/// A single model is decoded from a JSON object, multiple models from a JSON
/// array of them.
#[derive(Clone, Copy)]
pub struct JsonParser {
    model: &'static str,
    single: fn(&str) -> Option<Arc<dyn Model>>,
    multiple: fn(&str) -> Option<Vec<Arc<dyn Model>>>,
}

impl Debug for JsonParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonParser")
            .field("model", &self.model)
            .finish()
    }
}

impl JsonParser {
    /// Create a parser for model type `T`.
    pub fn new<T: DeserializeOwned + Model>() -> Self {
        Self {
            model: std::any::type_name::<T>(),
            single: decode_single::<T>,
            multiple: decode_multiple::<T>,
        }
    }

    /// Name of the model type.
    pub fn model_name(&self) -> &'static str {
        self.model
    }
}

impl ParseResponse for JsonParser {
    fn parse_single(&self, body: &str) -> Option<Arc<dyn Model>> {
        (self.single)(body)
    }

    fn parse_multiple(&self, body: &str) -> Option<Vec<Arc<dyn Model>>> {
        (self.multiple)(body)
    }
}

fn decode_single<T: DeserializeOwned + Model>(body: &str) -> Option<Arc<dyn Model>> {
    match serde_json::from_str::<T>(body) {
        Ok(v) => Some(Arc::new(v)),
        Err(err) => {
            debug!("decode {} failed: {err}", std::any::type_name::<T>());
            None
        }
    }
}

fn decode_multiple<T: DeserializeOwned + Model>(body: &str) -> Option<Vec<Arc<dyn Model>>> {
    match serde_json::from_str::<Vec<T>>(body) {
        Ok(vs) => Some(
            vs.into_iter()
                .map(|v| Arc::new(v) as Arc<dyn Model>)
                .collect(),
        ),
        Err(err) => {
            debug!("decode list of {} failed: {err}", std::any::type_name::<T>());
            None
        }
    }
}

/// Decode `k=v&k=v` token endpoint bodies.
///
/// Decoded like the query string of a url: `+` is a space, a pair
/// without `=` gets an empty value.
pub fn parse_oauth_form(body: &str) -> OAuthKey {
    OAuthKey::from_pairs(form_urlencoded::parse(body.trim().as_bytes()).into_owned())
}
