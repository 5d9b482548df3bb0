//! Tool call results.
//!
//! Every tool invocation resolves to a [`ToolOutcome`]. A failed outcome is
//! still a *successful* JSON-RPC response: the failure is reported as data,
//! flagged with `isError: true`.

use serde::{Deserialize, Serialize, Serializer};

/// A single block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text content.
    Text { text: String },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text of this block, if it is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

/// The normalized result of invoking a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool completed and produced content.
    Success(Vec<ContentBlock>),

    /// The tool ran but reports a business-level failure.
    Error(Vec<ContentBlock>),
}

impl ToolOutcome {
    /// A successful outcome with a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(vec![ContentBlock::text(text)])
    }

    /// A failed outcome with a single text block explaining the failure.
    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(vec![ContentBlock::text(text)])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn content(&self) -> &[ContentBlock] {
        match self {
            Self::Success(content) | Self::Error(content) => content,
        }
    }

    /// All text blocks joined with newlines.
    pub fn joined_text(&self) -> String {
        self.content()
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Wire shape of a tool result: `{ "content": [...], "isError": true }`.
#[derive(Serialize)]
struct CallToolResult<'a> {
    content: &'a [ContentBlock],
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl Serialize for ToolOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CallToolResult {
            content: self.content(),
            is_error: self.is_error(),
        }
        .serialize(serializer)
    }
}
