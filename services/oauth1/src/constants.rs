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

// Protocol parameters
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const OAUTH_VERIFIER: &str = "oauth_verifier";

pub const HMAC_SHA1: &str = "HMAC-SHA1";
pub const VERSION_1_0: &str = "1.0";

// Env values used in oauth1 signer.
/// Env name of the consumer key.
pub const OWLERY_OAUTH_CONSUMER_KEY: &str = "OWLERY_OAUTH_CONSUMER_KEY";
/// Env name of the consumer secret.
pub const OWLERY_OAUTH_CONSUMER_SECRET: &str = "OWLERY_OAUTH_CONSUMER_SECRET";
/// Env name of the token.
pub const OWLERY_OAUTH_TOKEN: &str = "OWLERY_OAUTH_TOKEN";
/// Env name of the token secret.
pub const OWLERY_OAUTH_TOKEN_SECRET: &str = "OWLERY_OAUTH_TOKEN_SECRET";
/// Env name of the verifier.
pub const OWLERY_OAUTH_VERIFIER: &str = "OWLERY_OAUTH_VERIFIER";
