//! File read tool — reads text files under the session's working directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use ferroact_core::error::ToolError;
use ferroact_core::tool::{Tool, ToolContext, parse_arguments};

/// Reads at most this many bytes unless configured otherwise.
pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

pub struct FileReadTool {
    max_bytes: usize,
}

impl FileReadTool {
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Truncate file contents beyond `max_bytes`.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    fn denied(reason: impl Into<String>) -> ToolError {
        ToolError::PermissionDenied {
            tool_name: "file_read".into(),
            reason: reason.into(),
        }
    }

    fn failed(reason: String) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: "file_read".into(),
            reason,
        }
    }

    /// Resolve `requested` against the context's working directory.
    ///
    /// `..` components are always rejected. With a working directory set,
    /// the canonical target (symlinks followed) must lie inside the
    /// canonical root.
    async fn resolve(&self, ctx: &ToolContext, requested: &str) -> Result<PathBuf, ToolError> {
        let path = Path::new(requested);
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(Self::denied(format!("'{requested}' escapes the working directory")));
        }

        let Some(root) = &ctx.working_dir else {
            return Ok(path.to_path_buf());
        };

        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|e| Self::failed(format!("working directory {}: {e}", root.display())))?;
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        let target = tokio::fs::canonicalize(&joined)
            .await
            .map_err(|e| Self::failed(format!("failed to read {}: {e}", joined.display())))?;

        if target.starts_with(&root) {
            Ok(target)
        } else {
            Err(Self::denied(format!(
                "'{requested}' is outside {}",
                root.display()
            )))
        }
    }

    /// Read at most `max_bytes + 1` bytes so truncation can be detected
    /// without loading the whole file.
    async fn read_prefix(&self, path: &Path) -> Result<(Vec<u8>, u64), ToolError> {
        let reason = |e: std::io::Error| Self::failed(format!("failed to read {}: {e}", path.display()));

        let file = tokio::fs::File::open(path).await.map_err(reason)?;
        let size = file.metadata().await.map_err(reason)?.len();
        let limit = u64::try_from(self.max_bytes).unwrap_or(u64::MAX).saturating_add(1);

        let mut buf = Vec::new();
        file.take(limit).read_to_end(&mut buf).await.map_err(reason)?;
        Ok((buf, size))
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read a UTF-8 text file. Relative paths resolve against the working directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, arguments: &str) -> Result<String, ToolError> {
        let args = parse_arguments(arguments)?;
        let requested = args["path"]
            .as_str()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'path' argument".into()))?;

        let path = self.resolve(ctx, requested).await?;
        tracing::debug!(path = %path.display(), "Reading file");

        let (bytes, size) = self.read_prefix(&path).await?;
        let truncated = bytes.len() > self.max_bytes;
        let shown = &bytes[..bytes.len().min(self.max_bytes)];
        let content = String::from_utf8_lossy(shown);

        Ok(serde_json::json!({
            "path": requested,
            "content": content,
            "bytes": size,
            "truncated": truncated,
        })
        .to_string())
    }
}
