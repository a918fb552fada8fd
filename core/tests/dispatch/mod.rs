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

mod cancel;
mod session;

use std::io::Write;

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::header;
use owlery_core::BodyStream;
use owlery_core::Context;
use owlery_core::ErrorKind;
use owlery_core::Method;
use owlery_core::Mode;
use owlery_core::OAuthKey;
use owlery_core::Parser;
use owlery_core::Request;
use owlery_core::ResponseType;
use pretty_assertions::assert_eq;
use serde::Deserialize;

use crate::init;
use crate::mock::Recorder;
use crate::mock::Script;

#[derive(Debug, Deserialize, PartialEq)]
struct Point {
    x: i64,
    y: i64,
    z: i64,
}

#[tokio::test]
async fn test_get_extracts_query_and_parses_json() -> Result<()> {
    let (ctx, transport) = init([Script::ok(r#"{"x":1,"y":2,"z":3}"#)]);
    let recorder = Recorder::default();

    let req = Request::new(
        "http://test.server.com:8000/user?name=John%20Doe&age=30",
        Method::Get,
    )
    .with_parser(Parser::json::<Point>());
    let (req, resp) = req.execute(&ctx, recorder.clone()).join().await?;

    assert_eq!(req.url(), "http://test.server.com:8000/user");
    assert_eq!(req.query_params().get("name"), Some("John Doe"));
    assert_eq!(req.query_params().get("age"), Some("30"));

    let recorded = transport.recorded();
    assert_eq!(
        recorded.connects[0].url,
        "http://test.server.com:8000/user?age=30&name=John%20Doe"
    );
    assert_eq!(recorded.connects[0].method, http::Method::GET);
    assert_eq!(recorded.connects[0].content_length, None);
    assert_eq!(recorded.writes, 0);
    assert_eq!(recorded.streams, vec![BodyStream::Input]);
    assert_eq!(recorded.disconnects, 1);

    assert_eq!(resp.status_code(), Some(200));
    assert!(resp.is_success());
    assert_eq!(resp.model_as::<Point>(), Some(&Point { x: 1, y: 2, z: 3 }));
    assert_eq!(recorder.events(), vec!["success", "complete"]);
    Ok(())
}

#[tokio::test]
async fn test_post_writes_form_body() -> Result<()> {
    let (ctx, transport) = init([Script::ok("{}")]);

    let mut req = Request::new("http://test.server.com:8000/user", Method::Post);
    req.add_post_param("name", "John Doe")
        .add_post_param("age", "30");
    let (req, _) = req.send(&ctx).await;

    let recorded = transport.recorded();
    assert_eq!(recorded.body, b"age=30&name=John%20Doe");
    assert_eq!(recorded.connects[0].content_length, Some(22));
    assert_eq!(
        recorded.connects[0].headers[header::CONTENT_TYPE],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(recorded.connects[0].url, "http://test.server.com:8000/user");
    assert!(req.query_params().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_body_is_written_in_chunks() -> Result<()> {
    let (ctx, transport) = init([Script::ok("")]);

    let mut req = Request::with_type("http://h/upload", Method::Put, ResponseType::Text, Mode::Single);
    req.add_post_param("blob", &"a".repeat(3000));
    let expected = req.payload_length();
    let _ = req.send(&ctx).await;

    let recorded = transport.recorded();
    assert_eq!(recorded.body.len(), expected);
    assert_eq!(recorded.writes, expected.div_ceil(1024));
    Ok(())
}

#[tokio::test]
async fn test_gzip_body_is_decoded() -> Result<()> {
    let text = "hoot ".repeat(600);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;

    let (ctx, _) = init([Script::ok(compressed).header("content-encoding", "gzip")]);
    let req = Request::with_type("http://h/", Method::Get, ResponseType::Text, Mode::Single);
    let (_, resp) = req.send(&ctx).await;

    assert_eq!(resp.body(), text);
    assert!(resp.model().is_none());
    Ok(())
}

#[tokio::test]
async fn test_redirect_updates_url() -> Result<()> {
    let (ctx, _) = init([Script::ok("{}").redirected_to("http://h/final?page=2")]);

    let req = Request::new("http://h/start?page=1", Method::Get);
    let (req, resp) = req.send(&ctx).await;

    assert_eq!(req.url(), "http://h/final");
    assert_eq!(req.query_param_string(), "page=2");
    assert!(resp.is_success());
    Ok(())
}

#[tokio::test]
async fn test_connect_failure() -> Result<()> {
    let (ctx, transport) = init([Script::connect_failure()]);
    let recorder = Recorder::default();

    let req = Request::new("http://unreachable/", Method::Get);
    let (_, resp) = req.execute(&ctx, recorder.clone()).join().await?;

    assert_eq!(resp.status_code(), Some(400));
    assert_eq!(
        resp.status_message(),
        "Internal Lib Error: Unable to bridge connection"
    );
    assert!(resp.body_bytes().is_none());
    assert_eq!(recorder.events(), vec!["error", "complete"]);
    assert_eq!(transport.recorded().disconnects, 0);
    Ok(())
}

#[tokio::test]
async fn test_without_transport() -> Result<()> {
    let recorder = Recorder::default();
    let req = Request::new("http://h/", Method::Get);
    let (_, resp) = req.send_with(&Context::new(), recorder.clone()).await;

    assert_eq!(resp.status_code(), Some(400));
    assert_eq!(recorder.events(), vec!["error", "complete"]);
    Ok(())
}

#[tokio::test]
async fn test_head_failure() -> Result<()> {
    let (ctx, transport) = init([Script::head_failure()]);
    let recorder = Recorder::default();

    let req = Request::new("http://h/", Method::Get);
    let (_, resp) = req.send_with(&ctx, recorder.clone()).await;

    assert_eq!(resp.status_code(), Some(400));
    assert_eq!(resp.status_message(), "Bad Request");
    assert_eq!(recorder.events(), vec!["error", "complete"]);
    assert_eq!(transport.recorded().disconnects, 1);
    Ok(())
}

#[tokio::test]
async fn test_lazy_connect_failure() -> Result<()> {
    let (ctx, transport) = init([Script::refused_on_head()]);
    let recorder = Recorder::default();

    let mut req = Request::new("http://h/user", Method::Post);
    req.add_post_param("name", "John Doe");
    let (_, resp) = req.send_with(&ctx, recorder.clone()).await;

    assert_eq!(resp.status_code(), Some(400));
    assert_eq!(
        resp.status_message(),
        "Internal Lib Error: Unable to bridge connection"
    );
    assert_eq!(recorder.events(), vec!["error", "complete"]);

    let recorded = transport.recorded();
    assert_eq!(recorded.writes, 1);
    assert!(recorded.streams.is_empty());
    assert_eq!(recorded.disconnects, 1);
    Ok(())
}

#[tokio::test]
async fn test_error_status_reads_error_stream() -> Result<()> {
    let (ctx, transport) = init([
        Script::ok(r#"{"x":1,"y":2,"z":3}"#).status(404, "Not Found")
    ]);
    let recorder = Recorder::default();

    let req = Request::new("http://h/missing", Method::Get).with_parser(Parser::json::<Point>());
    let (_, resp) = req.send_with(&ctx, recorder.clone()).await;

    assert_eq!(resp.status_code(), Some(404));
    assert_eq!(resp.body(), r#"{"x":1,"y":2,"z":3}"#);
    assert!(resp.model().is_none());
    assert!(resp.models().is_empty());
    assert_eq!(transport.recorded().streams, vec![BodyStream::Error]);
    assert_eq!(recorder.events(), vec!["error", "complete"]);
    Ok(())
}

#[tokio::test]
async fn test_oauth_token_response() -> Result<()> {
    let (ctx, _) = init([Script::ok(
        "oauth_token=T&oauth_token_secret=S&oauth_callback_confirmed=true",
    )]);

    let req = Request::with_type(
        "http://h/oauth/request_token",
        Method::Post,
        ResponseType::OAuth,
        Mode::Single,
    );
    let (_, resp) = req.send(&ctx).await;

    let key = resp.model_as::<OAuthKey>().expect("model must be an OAuthKey");
    assert_eq!(key.token.as_deref(), Some("T"));
    assert_eq!(key.secret.as_deref(), Some("S"));
    assert!(key.callback_confirmed);
    Ok(())
}

#[tokio::test]
async fn test_multiple_mode() -> Result<()> {
    let (ctx, _) = init([
        Script::ok(r#"[{"x":1,"y":2,"z":3},{"x":4,"y":5,"z":6}]"#),
        Script::ok("[]"),
    ]);

    let req = Request::with_type("http://h/points", Method::Get, ResponseType::Json, Mode::Multiple)
        .with_parser(Parser::json::<Point>());
    let (req, resp) = req.send(&ctx).await;

    assert_eq!(resp.models_as::<Point>().len(), 2);
    assert_eq!(resp.model_as::<Point>(), Some(&Point { x: 1, y: 2, z: 3 }));
    assert!(resp.parse_error().is_none());

    let recorder = Recorder::default();
    let (_, resp) = req.send_with(&ctx, recorder.clone()).await;

    assert_eq!(resp.parse_error().map(|e| e.kind()), Some(ErrorKind::EmptyResult));
    assert!(resp.model().is_none());
    assert!(resp.models().is_empty());
    assert_eq!(recorder.events(), vec!["success", "complete"]);
    Ok(())
}

#[tokio::test]
async fn test_default_json_model() -> Result<()> {
    let (ctx, _) = init([Script::ok(r#"{"data":"redirect-view"}"#)]);

    let (_, resp) = Request::new("http://h/", Method::Get).send(&ctx).await;

    let value = resp
        .model_as::<serde_json::Value>()
        .expect("model must be a json value");
    assert_eq!(value["data"], "redirect-view");
    Ok(())
}

#[tokio::test]
async fn test_response_headers() -> Result<()> {
    let (ctx, _) = init([Script::ok("")
        .header("x-owl", "barn")
        .header("x-owl", "snowy")]);

    let (_, resp) = Request::new("http://h/", Method::Get).send(&ctx).await;

    assert_eq!(resp.header_value("X-Owl"), Some("snowy"));
    assert_eq!(resp.header_values("x-owl"), vec!["barn", "snowy"]);
    assert!(resp.header_names().contains(&"x-owl"));
    Ok(())
}
