//! Tool commands: the free-text tool surface parsed into a closed enum.
//!
//! Dispatch is by lower-cased substring, checked in a fixed order:
//! code execution, batch delete, web search, list files, delete file.
//! Parameters keep the caller's original casing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::ToolError;

/// Which lookup service a web search goes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    #[default]
    DuckDuckGo,
    Google,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Google => "google",
        }
    }
}

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCommand {
    /// Run a payload in the sandboxed interpreter.
    ExecuteCode { code: String },

    /// Delete every `*.<extension>` file directly under a directory.
    BatchDelete {
        extension: String,
        directory: Option<String>,
    },

    WebSearch { engine: SearchEngine, query: String },

    ListFiles { path: String },

    DeleteFile { path: String },
}

static BATCH_DELETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)delete\s+all\s+(?:\*?\.)?([a-z0-9_]+)\s+files?(?:\s+(?:in|from)\s+(.+))?")
        .expect("batch delete pattern is valid")
});

/// Text after the first colon, trimmed.
fn payload(text: &str) -> Option<&str> {
    text.split_once(':').map(|(_, rest)| rest.trim())
}

/// Text after the first colon, or after `phrase` when there is no colon.
fn payload_or_remainder<'a>(text: &'a str, lower: &str, phrase: &str) -> &'a str {
    if let Some(p) = payload(text) {
        return p;
    }
    match lower.find(phrase) {
        // Lower-casing can shift byte offsets for non-ASCII input.
        Some(idx) if text.is_char_boundary(idx + phrase.len()) => text[idx + phrase.len()..].trim(),
        _ => "",
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
}

impl ToolCommand {
    /// Parse a free-text command.
    ///
    /// Returns [`ToolError::UnknownCommand`] when no trigger phrase is
    /// present and [`ToolError::MissingParameter`] when a trigger is found
    /// but its required parameter is empty.
    pub fn parse(text: &str) -> Result<Self, ToolError> {
        let lower = text.to_lowercase();

        if lower.contains("run python") || lower.contains("execute code") {
            let code = payload(text).unwrap_or("");
            if code.is_empty() {
                return Err(ToolError::MissingParameter {
                    tool: "code execution",
                    parameter: "code",
                });
            }
            return Ok(ToolCommand::ExecuteCode {
                code: code.to_string(),
            });
        }

        if lower.contains("delete all") {
            let caps = BATCH_DELETE
                .captures(text)
                .ok_or(ToolError::MissingParameter {
                    tool: "batch delete",
                    parameter: "file extension",
                })?;
            let extension = caps[1].to_lowercase();
            let directory = caps
                .get(2)
                .map(|m| strip_quotes(m.as_str()).to_string())
                .filter(|d| !d.is_empty());
            return Ok(ToolCommand::BatchDelete {
                extension,
                directory,
            });
        }

        if lower.contains("web search") {
            let head = lower.split(':').next().unwrap_or("");
            let engine = if head.contains("google") {
                SearchEngine::Google
            } else {
                SearchEngine::DuckDuckGo
            };
            let query = payload_or_remainder(text, &lower, "web search");
            if query.is_empty() {
                return Err(ToolError::MissingParameter {
                    tool: "web search",
                    parameter: "query",
                });
            }
            return Ok(ToolCommand::WebSearch {
                engine,
                query: query.to_string(),
            });
        }

        if lower.contains("list files") {
            let path = strip_quotes(payload_or_remainder(text, &lower, "list files"));
            let path = if path.is_empty() { "." } else { path };
            return Ok(ToolCommand::ListFiles {
                path: path.to_string(),
            });
        }

        if lower.contains("delete file") {
            let path = strip_quotes(payload(text).unwrap_or(""));
            if path.is_empty() {
                return Err(ToolError::MissingParameter {
                    tool: "delete file",
                    parameter: "file path",
                });
            }
            return Ok(ToolCommand::DeleteFile {
                path: path.to_string(),
            });
        }

        Err(ToolError::UnknownCommand)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCommand::ExecuteCode { .. } => "execute_code",
            ToolCommand::BatchDelete { .. } => "batch_delete",
            ToolCommand::WebSearch { .. } => "web_search",
            ToolCommand::ListFiles { .. } => "list_files",
            ToolCommand::DeleteFile { .. } => "delete_file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_payload_after_colon() {
        let cmd = ToolCommand::parse("run python: result = 2 + 3").unwrap();
        assert_eq!(
            cmd,
            ToolCommand::ExecuteCode {
                code: "result = 2 + 3".into()
            }
        );
        assert!(matches!(
            ToolCommand::parse("Execute code: x = 1").unwrap(),
            ToolCommand::ExecuteCode { .. }
        ));
    }

    #[test]
    fn code_without_payload_is_missing_parameter() {
        let err = ToolCommand::parse("run python").unwrap_err();
        assert!(matches!(err, ToolError::MissingParameter { parameter: "code", .. }));
    }

    #[test]
    fn parses_batch_delete_with_directory() {
        let cmd = ToolCommand::parse("delete all PNG files in /tmp/renders").unwrap();
        assert_eq!(
            cmd,
            ToolCommand::BatchDelete {
                extension: "png".into(),
                directory: Some("/tmp/renders".into()),
            }
        );
    }

    #[test]
    fn parses_batch_delete_without_directory() {
        let cmd = ToolCommand::parse("delete all .blend1 files").unwrap();
        assert_eq!(
            cmd,
            ToolCommand::BatchDelete {
                extension: "blend1".into(),
                directory: None,
            }
        );
    }

    #[test]
    fn batch_delete_without_extension_is_missing_parameter() {
        assert!(matches!(
            ToolCommand::parse("delete all").unwrap_err(),
            ToolError::MissingParameter { tool: "batch delete", .. }
        ));
    }

    #[test]
    fn web_search_engine_hint() {
        assert_eq!(
            ToolCommand::parse("web search: blender geometry nodes").unwrap(),
            ToolCommand::WebSearch {
                engine: SearchEngine::DuckDuckGo,
                query: "blender geometry nodes".into(),
            }
        );
        assert_eq!(
            ToolCommand::parse("google web search: Blender").unwrap(),
            ToolCommand::WebSearch {
                engine: SearchEngine::Google,
                query: "Blender".into(),
            }
        );
    }

    #[test]
    fn google_in_query_is_not_an_engine_hint() {
        let cmd = ToolCommand::parse("web search: google sheets").unwrap();
        assert!(matches!(
            cmd,
            ToolCommand::WebSearch {
                engine: SearchEngine::DuckDuckGo,
                ..
            }
        ));
    }

    #[test]
    fn web_search_without_query() {
        assert!(ToolCommand::parse("web search:").is_err());
    }

    #[test]
    fn list_files_defaults_to_current_dir() {
        assert_eq!(
            ToolCommand::parse("list files").unwrap(),
            ToolCommand::ListFiles { path: ".".into() }
        );
        assert_eq!(
            ToolCommand::parse("list files: /Projects/Scenes").unwrap(),
            ToolCommand::ListFiles {
                path: "/Projects/Scenes".into()
            }
        );
    }

    #[test]
    fn delete_file_requires_path() {
        assert!(ToolCommand::parse("delete file:").is_err());
        assert_eq!(
            ToolCommand::parse("delete file: \"old.blend\"").unwrap(),
            ToolCommand::DeleteFile {
                path: "old.blend".into()
            }
        );
    }

    #[test]
    fn code_execution_checked_before_delete() {
        let cmd = ToolCommand::parse("run python: delete all the things").unwrap();
        assert_eq!(cmd.name(), "execute_code");
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            ToolCommand::parse("make coffee").unwrap_err(),
            ToolError::UnknownCommand
        ));
        assert!(matches!(ToolCommand::parse("").unwrap_err(), ToolError::UnknownCommand));
    }
}
