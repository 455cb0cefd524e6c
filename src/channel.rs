//! Method-call channel adapter
//!
//! Exposes the resolver as a named method channel so a host application on
//! the other side of a process or language boundary can call it with a typed
//! request and get a typed response back. The adapter owns no resolution
//! logic: it decodes a call, delegates to [`Resolver`], and encodes the reply.
//!
//! # Wire Format
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"id": 7, "method": "resolve", "args": {"fileName": "model.bin"}}
//! <- {"id": 7, "status": "success", "result": {"found": true, "path": "/data/local/tmp/model.bin"}}
//! ```
//!
//! A valid name that is not found is still a `success` with `found: false`.
//! `error` is reserved for calls that could not be served at all.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufRead, Write};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::error::{ResolverError, Result};
use crate::logic::resolver::{FileProbe, Resolver};
use crate::types::ResolveResult;

/// Channel identifier the host registers against
pub const CHANNEL: &str = "asset_resolver/file_access";

/// Primary method name
pub const METHOD_RESOLVE: &str = "resolve";

/// Method name used by existing mobile hosts
pub const METHOD_GET_MODEL_FILE: &str = "getModelFile";

/// Argument key carrying the requested name
pub const ARG_FILE_NAME: &str = "fileName";

/// An incoming method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl MethodCall {
    /// Build a `resolve` call for `file_name`
    pub fn resolve(file_name: &str) -> Self {
        let mut args = Map::new();
        args.insert(ARG_FILE_NAME.to_string(), Value::String(file_name.to_string()));
        Self {
            id: None,
            method: METHOD_RESOLVE.to_string(),
            args,
        }
    }
}

/// Payload of a successful `resolve` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub found: bool,
    pub path: Option<String>,
}

impl TryFrom<&ResolveResult> for ResolveResponse {
    type Error = ResolverError;

    /// Fails with `NonUtf8Path` rather than reporting a lossily converted
    /// path that would not exist on disk.
    fn try_from(result: &ResolveResult) -> Result<Self> {
        let path = match result.path() {
            Some(path) => match path.to_str() {
                Some(text) => Some(text.to_string()),
                None => return Err(ResolverError::NonUtf8Path(path.to_path_buf())),
            },
            None => None,
        };
        Ok(Self {
            found: result.is_found(),
            path,
        })
    }
}

/// Error codes carried by `error` replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// `fileName` missing, not a string, or rejected by validation
    InvalidArgument,
    /// The line was not a JSON method call
    MalformedRequest,
    /// A match was found but its path is not valid UTF-8
    PathNotUtf8,
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodOutcome {
    Success { result: ResolveResponse },
    Error { code: ErrorCode, message: String },
    NotImplemented { method: String },
}

/// A reply, echoing the caller's `id` when one was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub outcome: MethodOutcome,
}

impl MethodReply {
    fn error(id: Option<Value>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: MethodOutcome::Error {
                code,
                message: message.into(),
            },
        }
    }
}

/// Dispatch one decoded call to the resolver
pub fn handle_call<P: FileProbe>(resolver: &Resolver<P>, call: MethodCall) -> MethodReply {
    let MethodCall { id, method, args } = call;

    if method != METHOD_RESOLVE && method != METHOD_GET_MODEL_FILE {
        debug!("No handler for method {:?}", method);
        return MethodReply {
            id,
            outcome: MethodOutcome::NotImplemented { method },
        };
    }

    let file_name = match args.get(ARG_FILE_NAME) {
        Some(Value::String(name)) => name,
        Some(Value::Null) | None => {
            return MethodReply::error(id, ErrorCode::InvalidArgument, "File name is null");
        }
        Some(_) => {
            return MethodReply::error(
                id,
                ErrorCode::InvalidArgument,
                "File name must be a string",
            );
        }
    };

    let result = match resolver.resolve_name(file_name) {
        Ok(result) => result,
        Err(e) => return MethodReply::error(id, ErrorCode::InvalidArgument, e.to_string()),
    };

    match ResolveResponse::try_from(&result) {
        Ok(response) => MethodReply {
            id,
            outcome: MethodOutcome::Success { result: response },
        },
        Err(e) => {
            warn!("{}", e);
            MethodReply::error(id, ErrorCode::PathNotUtf8, e.to_string())
        }
    }
}

/// Decode one raw request line and dispatch it.
///
/// Malformed input (invalid UTF-8, invalid JSON, or JSON that is not a method
/// call) produces a `MALFORMED_REQUEST` reply rather than an error. The `id`
/// is echoed whenever the line parsed as a JSON object carrying one.
pub fn handle_line<P: FileProbe>(resolver: &Resolver<P>, line: &[u8]) -> MethodReply {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Malformed request: {}", e);
            return MethodReply::error(None, ErrorCode::MalformedRequest, e.to_string());
        }
    };

    let id = value.get("id").filter(|id| !id.is_null()).cloned();
    match MethodCall::deserialize(value) {
        Ok(call) => handle_call(resolver, call),
        Err(e) => {
            warn!("Malformed request: {}", e);
            MethodReply::error(id, ErrorCode::MalformedRequest, e.to_string())
        }
    }
}

/// Counters reported when the serve loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub requests: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl ServeStats {
    fn record(&mut self, reply: &MethodReply) {
        self.requests += 1;
        match &reply.outcome {
            MethodOutcome::Success { result } if result.found => self.found += 1,
            MethodOutcome::Success { .. } => self.not_found += 1,
            MethodOutcome::Error { .. } | MethodOutcome::NotImplemented { .. } => {
                self.errors += 1
            }
        }
    }
}

/// Serve line-delimited JSON calls from `reader` until EOF.
///
/// Each reply is written as one line and flushed before the next request is
/// read. Blank lines are skipped. Lines are read as raw bytes, so a line that
/// is not UTF-8 gets a `MALFORMED_REQUEST` reply like any other bad line.
/// Only I/O errors on the streams end the loop early.
pub fn serve<P, R, W>(resolver: &Resolver<P>, mut reader: R, mut writer: W) -> Result<ServeStats>
where
    P: FileProbe,
    R: BufRead,
    W: Write,
{
    info!("Serving channel {} ({} root(s))", CHANNEL, resolver.config().roots().len());
    let mut stats = ServeStats::default();

    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let reply = handle_line(resolver, line);
        stats.record(&reply);

        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    info!(
        "Channel closed after {} request(s): {} found, {} not found, {} error(s)",
        stats.requests, stats.found, stats.not_found, stats.errors
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn resolver_with(files: &[&str]) -> (TempDir, Resolver) {
        let dir = TempDir::new().unwrap();
        for name in files {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let resolver = Resolver::new(ResolverConfig::new([dir.path()]).unwrap());
        (dir, resolver)
    }

    fn call(value: Value) -> MethodCall {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_resolve_found() {
        let (dir, resolver) = resolver_with(&["model.bin"]);
        let reply = handle_call(&resolver, MethodCall::resolve("model.bin"));
        let expected = dir.path().join("model.bin").to_string_lossy().into_owned();
        assert_eq!(
            reply.outcome,
            MethodOutcome::Success {
                result: ResolveResponse {
                    found: true,
                    path: Some(expected),
                },
            }
        );
    }

    #[test]
    fn test_resolve_not_found_is_success() {
        let (_dir, resolver) = resolver_with(&[]);
        let reply = handle_call(&resolver, MethodCall::resolve("missing.bin"));
        assert_eq!(
            reply.outcome,
            MethodOutcome::Success {
                result: ResolveResponse {
                    found: false,
                    path: None,
                },
            }
        );
    }

    #[test]
    fn test_get_model_file_alias() {
        let (_dir, resolver) = resolver_with(&["model.bin"]);
        let reply = handle_call(
            &resolver,
            call(json!({"method": "getModelFile", "args": {"fileName": "model.bin"}})),
        );
        assert!(matches!(
            reply.outcome,
            MethodOutcome::Success { result: ResolveResponse { found: true, .. } }
        ));
    }

    #[test]
    fn test_unknown_method() {
        let (_dir, resolver) = resolver_with(&[]);
        let reply = handle_call(&resolver, call(json!({"method": "deleteModelFile"})));
        assert_eq!(
            reply.outcome,
            MethodOutcome::NotImplemented {
                method: "deleteModelFile".to_string()
            }
        );
    }

    #[test]
    fn test_missing_and_null_file_name() {
        let (_dir, resolver) = resolver_with(&[]);
        for value in [
            json!({"method": "resolve"}),
            json!({"method": "resolve", "args": {"fileName": null}}),
            json!({"method": "resolve", "args": {"fileName": 42}}),
        ] {
            let reply = handle_call(&resolver, call(value));
            assert!(matches!(
                reply.outcome,
                MethodOutcome::Error { code: ErrorCode::InvalidArgument, .. }
            ));
        }
    }

    #[test]
    fn test_traversal_is_invalid_argument() {
        let (_dir, resolver) = resolver_with(&[]);
        let reply = handle_call(&resolver, MethodCall::resolve("../etc/passwd"));
        match reply.outcome {
            MethodOutcome::Error { code, message } => {
                assert_eq!(code, ErrorCode::InvalidArgument);
                assert!(message.contains("path separator"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_wire_format() {
        let reply = MethodReply {
            id: Some(json!(7)),
            outcome: MethodOutcome::Success {
                result: ResolveResponse {
                    found: false,
                    path: None,
                },
            },
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"id": 7, "status": "success", "result": {"found": false, "path": null}})
        );

        let reply = MethodReply::error(None, ErrorCode::MalformedRequest, "bad");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"status": "error", "code": "MALFORMED_REQUEST", "message": "bad"})
        );
    }

    #[test]
    fn test_serve_loop() {
        let (_dir, resolver) = resolver_with(&["model.bin"]);
        let input = concat!(
            r#"{"id": 1, "method": "resolve", "args": {"fileName": "model.bin"}}"#,
            "\n\n",
            "not json\n",
            r#"{"id": "b", "method": "resolve", "args": {"fileName": "other.bin"}}"#,
            "\n",
            r#"{"method": "ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        let stats = serve(&resolver, input.as_bytes(), &mut output).unwrap();
        assert_eq!(
            stats,
            ServeStats {
                requests: 4,
                found: 1,
                not_found: 1,
                errors: 2,
            }
        );

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0]["id"], json!(1));
        assert_eq!(replies[0]["result"]["found"], json!(true));
        assert_eq!(replies[1]["code"], json!("MALFORMED_REQUEST"));
        assert_eq!(replies[2]["id"], json!("b"));
        assert_eq!(replies[2]["result"]["path"], Value::Null);
        assert_eq!(replies[3]["status"], json!("not_implemented"));
    }

    #[test]
    fn test_serve_survives_invalid_utf8_line() {
        let (_dir, resolver) = resolver_with(&["model.bin"]);
        let mut input = b"{\"method\":\"resolve\",\"args\":{\"fileName\":\"a\xff\"}}\n".to_vec();
        input.extend_from_slice(br#"{"id":2,"method":"resolve","args":{"fileName":"model.bin"}}"#);
        input.push(b'\n');
        let mut output = Vec::new();

        let stats = serve(&resolver, input.as_slice(), &mut output).unwrap();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.found, 1);

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["code"], json!("MALFORMED_REQUEST"));
        assert_eq!(replies[1]["id"], json!(2));
        assert_eq!(replies[1]["result"]["found"], json!(true));
    }

    #[test]
    fn test_malformed_call_echoes_id() {
        let (_dir, resolver) = resolver_with(&[]);

        let reply = handle_line(&resolver, br#"{"id": 9, "args": {}}"#);
        assert_eq!(reply.id, Some(json!(9)));
        assert!(matches!(
            reply.outcome,
            MethodOutcome::Error { code: ErrorCode::MalformedRequest, .. }
        ));

        let reply = handle_line(&resolver, br#"{"id": "x", "method": "resolve", "args": [1]}"#);
        assert_eq!(reply.id, Some(json!("x")));
        assert!(matches!(
            reply.outcome,
            MethodOutcome::Error { code: ErrorCode::MalformedRequest, .. }
        ));
    }

    #[test]
    fn test_unparseable_line_has_no_id() {
        let (_dir, resolver) = resolver_with(&[]);
        let reply = handle_line(&resolver, b"[1, 2");
        assert_eq!(reply.id, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_match_is_an_error_not_a_lossy_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::path::PathBuf;

        let result = ResolveResult::Found {
            path: PathBuf::from(OsStr::from_bytes(b"/data/\xffmodels/model.bin")),
            root: PathBuf::from(OsStr::from_bytes(b"/data/\xffmodels")),
        };
        let err = ResolveResponse::try_from(&result).unwrap_err();
        assert!(matches!(err, ResolverError::NonUtf8Path(_)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_root_reply() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join(OsStr::from_bytes(b"\xffmodels"));
        fs::create_dir(&root).unwrap();
        fs::write(root.join("model.bin"), b"").unwrap();
        let resolver = Resolver::new(ResolverConfig::new([root]).unwrap());

        let reply = handle_call(&resolver, MethodCall::resolve("model.bin"));
        assert!(matches!(
            reply.outcome,
            MethodOutcome::Error { code: ErrorCode::PathNotUtf8, .. }
        ));
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::InvalidArgument.to_string(), "INVALID_ARGUMENT");
        assert_eq!(
            "MALFORMED_REQUEST".parse::<ErrorCode>().unwrap(),
            ErrorCode::MalformedRequest
        );
    }
}
