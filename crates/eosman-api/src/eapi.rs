// eAPI HTTP client
//
// Wraps `reqwest::Client` with the EOS JSON-RPC envelope: every call is a
// `runCmds` request against `/command-api`, authenticated with HTTP basic
// auth. The envelope is stripped before the caller sees the outputs.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const COMMAND_API_PATH: &str = "command-api";

/// Output format requested from the switch.
///
/// `Text` returns the same CLI text an operator would see; `Json` returns
/// the structured model EOS exposes for most `show` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunCmdsRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RunCmdsParams<'a>,
    id: String,
}

#[derive(Serialize)]
struct RunCmdsParams<'a> {
    version: u32,
    cmds: &'a [&'a str],
    format: OutputFormat,
}

#[derive(Deserialize)]
struct RunCmdsResponse {
    #[serde(default)]
    result: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Raw HTTP client for a single switch's eAPI endpoint.
///
/// One client per switch. Commands sent in one [`run_cmds`](Self::run_cmds)
/// call share a CLI session on the switch, so mode-entering commands
/// (`enable`, `configure`, `interface ...`) only affect that call.
pub struct EapiClient {
    http: reqwest::Client,
    endpoint: Url,
    username: String,
    password: SecretString,
}

impl EapiClient {
    /// Create a client for the switch at `base_url` (e.g. `https://10.0.0.1`).
    pub fn new(
        base_url: &Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, username, password)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, Error> {
        let endpoint = base_url.join(COMMAND_API_PATH)?;
        Ok(Self {
            http,
            endpoint,
            username: username.into(),
            password,
        })
    }

    /// The JSON-RPC endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run a batch of commands and return one text output per command.
    pub async fn run_cmds(&self, cmds: &[&str]) -> Result<Vec<String>, Error> {
        let values = self.run_cmds_with_format(cmds, OutputFormat::Text).await?;
        Ok(values.iter().map(text_output).collect())
    }

    /// Run a batch of commands, returning the raw `result` array.
    pub async fn run_cmds_with_format(
        &self,
        cmds: &[&str],
        format: OutputFormat,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let request = RunCmdsRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RunCmdsParams {
                version: 1,
                cmds,
                format,
            },
            id: uuid::Uuid::new_v4().to_string(),
        };

        debug!(endpoint = %self.endpoint, count = cmds.len(), "eAPI runCmds");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("switch rejected credentials for '{}'", self.username),
            });
        }

        let body = resp.text().await?;
        trace!(%status, body_len = body.len(), "eAPI response");

        let parsed: RunCmdsResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::Http {
                    status: status.as_u16(),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: e.to_string(),
                    body,
                });
            }
        };

        if let Some(err) = parsed.error {
            return Err(command_error(err));
        }

        parsed.result.ok_or_else(|| Error::Deserialization {
            message: "response carried neither result nor error".into(),
            body,
        })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Pull the `output` string out of a text-format result entry.
fn text_output(value: &serde_json::Value) -> String {
    value
        .get("output")
        .and_then(serde_json::Value::as_str)
        .map_or_else(String::new, str::to_owned)
}

/// Flatten a JSON-RPC error's `data` array into output text and error strings.
fn command_error(err: RpcError) -> Error {
    let mut errors = Vec::new();
    let mut output = String::new();
    for entry in &err.data {
        if let Some(list) = entry.get("errors").and_then(serde_json::Value::as_array) {
            errors.extend(list.iter().filter_map(|e| e.as_str().map(str::to_owned)));
        }
        if let Some(text) = entry.get("output").and_then(serde_json::Value::as_str) {
            output.push_str(text);
        }
    }
    Error::Command {
        code: err.code,
        message: err.message,
        errors,
        output: (!output.is_empty()).then_some(output),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_as_json_rpc() {
        let cmds = ["enable", "show version"];
        let req = RunCmdsRequest {
            jsonrpc: "2.0",
            method: "runCmds",
            params: RunCmdsParams {
                version: 1,
                cmds: &cmds,
                format: OutputFormat::Text,
            },
            id: "1".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["method"], "runCmds");
        assert_eq!(value["params"]["format"], "text");
        assert_eq!(value["params"]["cmds"][1], "show version");
    }

    #[test]
    fn command_error_collects_errors_and_output() {
        let err = RpcError {
            code: 1002,
            message: "CLI command 2 of 2 'show bogus' failed: invalid command".into(),
            data: vec![
                json!({ "output": "" }),
                json!({ "errors": ["Invalid input (at token 1: 'bogus')"] }),
            ],
        };
        match command_error(err) {
            Error::Command {
                code,
                errors,
                output,
                ..
            } => {
                assert_eq!(code, 1002);
                assert_eq!(errors, vec!["Invalid input (at token 1: 'bogus')"]);
                assert!(output.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn endpoint_is_joined_onto_base() {
        let base = Url::parse("https://10.0.0.1/").unwrap();
        let client = EapiClient::with_client(
            reqwest::Client::new(),
            &base,
            "admin",
            SecretString::from("pw".to_string()),
        )
        .unwrap();
        assert_eq!(client.endpoint().as_str(), "https://10.0.0.1/command-api");
    }
}
