use rmcp::model::{CallToolResult, Content};
use searxcrawl_core::Error;

/// Non-error result with a single text block.
pub(crate) fn tool_text(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// Error-flagged result whose only text block is `Error: <message>`.
pub(crate) fn tool_error(e: &Error) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {e}"))])
}

/// Text of the first content block (empty if there is none).
pub fn result_text(r: &CallToolResult) -> String {
    r.content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

pub fn is_error(r: &CallToolResult) -> bool {
    r.is_error.unwrap_or(false)
}
