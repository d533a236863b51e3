//! End-to-end tests for the HTML completion server.
//!
//! These tests exercise the full LSP protocol stack using tower-lsp's
//! in-process service, sending JSON-RPC requests and verifying responses.

use futures::StreamExt;
use serde_json::{json, Value};
use tower::{Service, ServiceExt};
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::LspService;

use html_lsp_server::HtmlLspBackend;

fn initialize_request(id: i64, options: Value) -> Request {
    Request::build("initialize")
        .params(json!({
            "capabilities": {},
            "rootUri": null,
            "initializationOptions": options
        }))
        .id(id)
        .finish()
}

fn initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

fn shutdown_request(id: i64) -> Request {
    Request::build("shutdown").id(id).finish()
}

fn did_open_notification(uri: &str, text: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "html",
                "version": 1,
                "text": text
            }
        }))
        .finish()
}

fn did_change_notification(uri: &str, line: u32, character: u32, text: &str) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": { "uri": uri, "version": 2 },
            "contentChanges": [{
                "range": {
                    "start": { "line": line, "character": character },
                    "end": { "line": line, "character": character }
                },
                "text": text
            }]
        }))
        .finish()
}

fn completion_request(id: i64, uri: &str, line: u32, character: u32) -> Request {
    Request::build("textDocument/completion")
        .params(json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        }))
        .id(id)
        .finish()
}

fn resolve_request(id: i64, item: Value) -> Request {
    Request::build("completionItem/resolve")
        .params(item)
        .id(id)
        .finish()
}

/// Helper to extract the "result" field from a JSON-RPC response.
fn extract_result(response: Option<Response>) -> Value {
    let resp = response.expect("expected a response");
    let serialized = serde_json::to_value(&resp).unwrap();
    serialized.get("result").cloned().unwrap_or(json!(null))
}

async fn send(service: &mut LspService<HtmlLspBackend>, request: Request) -> Option<Response> {
    service.ready().await.unwrap().call(request).await.unwrap()
}

/// Start a server and run the initialize handshake.
async fn start(options: Value) -> LspService<HtmlLspBackend> {
    let (mut service, socket) = LspService::new(HtmlLspBackend::new);

    // Drain server→client messages so client.log_message() doesn't block.
    tokio::spawn(async move {
        socket.collect::<Vec<_>>().await;
    });

    send(&mut service, initialize_request(1, options)).await;
    send(&mut service, initialized_notification()).await;
    service
}

/// Open `text` and request completion at the given position.
async fn complete(
    service: &mut LspService<HtmlLspBackend>,
    uri: &str,
    text: &str,
    line: u32,
    character: u32,
) -> Value {
    send(service, did_open_notification(uri, text)).await;
    extract_result(send(service, completion_request(2, uri, line, character)).await)
}

fn labels(result: &Value) -> Vec<String> {
    result
        .as_array()
        .expect("expected an array of completion items")
        .iter()
        .map(|item| item["label"].as_str().unwrap().to_string())
        .collect()
}

fn find<'a>(result: &'a Value, label: &str) -> &'a Value {
    result
        .as_array()
        .and_then(|items| items.iter().find(|item| item["label"] == label))
        .unwrap_or_else(|| panic!("no completion item labelled {}", label))
}

#[tokio::test(flavor = "current_thread")]
async fn test_initialize_and_shutdown() {
    let (mut service, socket) = LspService::new(HtmlLspBackend::new);
    tokio::spawn(async move {
        socket.collect::<Vec<_>>().await;
    });

    let result = extract_result(send(&mut service, initialize_request(1, json!(null))).await);
    assert_eq!(result["serverInfo"]["name"], "html-lsp");

    let completion = &result["capabilities"]["completionProvider"];
    assert_eq!(completion["resolveProvider"], true);
    let triggers = completion["triggerCharacters"].as_array().unwrap();
    assert!(triggers.contains(&json!("<")));
    assert!(triggers.contains(&json!("\"")));

    let resp = send(&mut service, initialized_notification()).await;
    assert!(
        resp.is_none(),
        "initialized is a notification, no response expected"
    );

    let resp = send(&mut service, shutdown_request(2)).await;
    assert!(resp.is_some(), "shutdown should return a response");
}

#[tokio::test(flavor = "current_thread")]
async fn test_attribute_name_completion() {
    let mut service = start(json!(null)).await;

    let result = complete(&mut service, "file:///test/attr.html", "<div clas", 0, 9).await;
    assert_eq!(labels(&result), vec!["class"]);

    let class = find(&result, "class");
    assert_eq!(class["insertText"], "class=\"$1\"$0");
    // InsertTextFormat::SNIPPET
    assert_eq!(class["insertTextFormat"], 2);
    assert_eq!(class["detail"], "<div>");
    assert_eq!(class["documentation"], "Space-separated list of classes.");
    assert_eq!(class["command"]["command"], "editor.action.triggerSuggest");

    send(&mut service, shutdown_request(99)).await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_tag_completion_after_open_angle() {
    let mut service = start(json!(null)).await;

    let result = complete(&mut service, "file:///test/tag.html", "<p>x</p>\n<", 1, 1).await;
    let names = labels(&result);
    assert!(names.contains(&"div".to_string()));
    assert!(names.contains(&"ul".to_string()));

    let ul = find(&result, "ul");
    assert_eq!(ul["insertText"], "ul><li></li></ul>");
    assert!(ul.get("command").is_none());
    assert_eq!(ul["data"]["tag"], "ul");

    let select = find(&result, "select");
    assert_eq!(
        select["insertText"],
        "select name=\"$1\"><option value=\"$2\"></option></select>"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_attribute_value_completion() {
    let mut service = start(json!(null)).await;

    let result = complete(
        &mut service,
        "file:///test/value.html",
        "<button type=\"\">",
        0,
        14,
    )
    .await;
    assert_eq!(labels(&result), vec!["button", "submit", "reset"]);

    let submit = find(&result, "submit");
    // InsertTextFormat::PLAIN_TEXT
    assert_eq!(submit["insertTextFormat"], 1);
    assert_eq!(submit["detail"], "<button>");
    assert_eq!(submit["command"]["command"], "editor.action.triggerSuggest");
}

#[tokio::test(flavor = "current_thread")]
async fn test_completion_after_incremental_change() {
    let mut service = start(json!(null)).await;
    let uri = "file:///test/change.html";

    send(&mut service, did_open_notification(uri, "<input >")).await;
    send(&mut service, did_change_notification(uri, 0, 7, "type=\"\"")).await;

    let result = extract_result(send(&mut service, completion_request(3, uri, 0, 13)).await);
    let names = labels(&result);
    assert!(names.contains(&"text".to_string()));
    assert!(names.contains(&"checkbox".to_string()));
}

#[tokio::test(flavor = "current_thread")]
async fn test_columns_after_astral_characters() {
    let mut service = start(json!(null)).await;
    let uri = "file:///test/emoji.html";

    // The emoji is two UTF-16 code units wide
    send(&mut service, did_open_notification(uri, "<p title=\"\u{1F600}\">")).await;
    send(&mut service, did_change_notification(uri, 0, 13, " clas")).await;

    let result = extract_result(send(&mut service, completion_request(3, uri, 0, 18)).await);
    assert_eq!(labels(&result), vec!["class"]);
    assert_eq!(find(&result, "class")["detail"], "<p>");
}

#[tokio::test(flavor = "current_thread")]
async fn test_no_completion_outside_markup() {
    let mut service = start(json!(null)).await;

    let result = complete(&mut service, "file:///test/text.html", "hello", 0, 5).await;
    assert!(result.is_null(), "plain text should not complete");

    let result = complete(
        &mut service,
        "file:///test/comment.html",
        "<!-- <div clas -->",
        0,
        14,
    )
    .await;
    assert!(result.is_null(), "comments should not complete");

    let result = extract_result(
        send(
            &mut service,
            completion_request(4, "file:///test/unopened.html", 0, 0),
        )
        .await,
    );
    assert!(result.is_null(), "unknown documents should not complete");
}

#[tokio::test(flavor = "current_thread")]
async fn test_retrigger_disabled_by_options() {
    let mut service = start(json!({ "retriggerAfterInsert": false })).await;

    let result = complete(&mut service, "file:///test/opts.html", "<div clas", 0, 9).await;
    let class = find(&result, "class");
    assert!(class.get("command").is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn test_completion_resolve_fills_documentation() {
    let mut service = start(json!(null)).await;

    let item = json!({ "label": "div", "data": { "tag": "div" } });
    let result = extract_result(send(&mut service, resolve_request(5, item)).await);
    assert_eq!(result["documentation"], "Generic block-level container.");

    let item = json!({ "label": "type", "data": { "tag": "button", "attribute": "type" } });
    let result = extract_result(send(&mut service, resolve_request(6, item)).await);
    assert_eq!(result["documentation"], "Behavior of the button.");

    let item = json!({ "label": "plain" });
    let result = extract_result(send(&mut service, resolve_request(7, item)).await);
    assert!(result.get("documentation").is_none());
}
