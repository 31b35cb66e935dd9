//! JSON-lines stdio server
//!
//! One request object per line in, one response object per line out.
//! Requests: `{"id", "method", "params"}` with methods `tools/list`,
//! `tools/call` and `metrics`.

use crate::router::ToolRouter;
use crate::tools::tool_definitions;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Line could not be parsed as a request
pub const PARSE_ERROR: i64 = -32700;
/// Method not supported
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Params missing or of the wrong shape
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Handle one input line; blank lines produce no response
pub async fn handle_line(router: &ToolRouter, line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let correlation_id = Uuid::new_v4();
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            debug!("[{}] {} request", correlation_id, request.method);
            handle_request(router, request).await
        }
        Err(e) => {
            warn!("[{}] Unparseable request: {}", correlation_id, e);
            Response::err(Value::Null, PARSE_ERROR, format!("Parse error: {}", e))
        }
    };

    match serde_json::to_value(&response) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[{}] Failed to encode response: {}", correlation_id, e);
            None
        }
    }
}

async fn handle_request(router: &ToolRouter, request: Request) -> Response {
    match request.method.as_str() {
        "tools/list" => Response::ok(request.id, json!({ "tools": tool_definitions() })),
        "tools/call" => match serde_json::from_value::<CallParams>(request.params) {
            Ok(params) => {
                let response = router.handle_tool_call(&params.name, params.arguments).await;
                match serde_json::to_value(response) {
                    Ok(result) => Response::ok(request.id, result),
                    Err(e) => Response::err(request.id, INVALID_PARAMS, e.to_string()),
                }
            }
            Err(e) => Response::err(
                request.id,
                INVALID_PARAMS,
                format!("Invalid params: {}", e),
            ),
        },
        "metrics" => Response::ok(
            request.id,
            json!({ "text": risk_client::metrics::render() }),
        ),
        other => Response::err(
            request.id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    }
}

/// Serve requests from `reader` until EOF
pub async fn serve<R, W>(router: &ToolRouter, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handle_line(router, &line).await {
            let mut encoded = response.to_string();
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
            handled += 1;
        }
    }

    info!("Input closed after {} requests", handled);
    Ok(())
}

/// Serve over the process stdin/stdout
pub async fn run_stdio(router: &ToolRouter) -> Result<()> {
    serve(router, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_client::{ClientConfig, RiskClient};
    use std::sync::Arc;

    fn router() -> ToolRouter {
        let client = RiskClient::new(ClientConfig::demo()).unwrap();
        ToolRouter::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = handle_line(&router(), r#"{"id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["tools"].as_array().map(Vec::len), Some(7));
    }

    #[tokio::test]
    async fn test_tools_call_wraps_tool_response() {
        let line = r#"{"id":"a","method":"tools/call","params":{"name":"analyze_vamp","arguments":{"merchant_id":"M1"}}}"#;
        let response = handle_line(&router(), line).await.unwrap();

        assert_eq!(response["id"], "a");
        assert_eq!(response["result"]["is_error"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let analysis: Value = serde_json::from_str(text).unwrap();
        assert_eq!(analysis["vamp_status"], "standard");
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let router = router();

        let response = handle_line(&router, "not json").await.unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["id"], Value::Null);

        let response = handle_line(&router, r#"{"id":2,"method":"tools/delete"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = handle_line(&router, r#"{"id":3,"method":"tools/call","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], INVALID_PARAMS);

        assert!(handle_line(&router, "   ").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_answers_each_line_until_eof() {
        let input = concat!(
            r#"{"id":1,"method":"tools/list"}"#,
            "\n\n",
            r#"{"id":2,"method":"metrics"}"#,
            "\n"
        );
        let mut output = Vec::new();
        serve(&router(), input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
        assert!(lines[1]["result"]["text"].is_string());
    }
}
