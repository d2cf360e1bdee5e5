use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    /// Wire string for this role. Adapters forward it verbatim.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation turn. Immutable once constructed and owned by the
/// prompt that contains it.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Extra data associated with the content. Not encoded onto the wire by
    /// the current adapters.
    pub metadata: Map<String, Value>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// A message with the `user` role.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// A message with the `assistant` role.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// A message with the `system` role.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// A message with the `tool` role.
    pub fn tool(text: impl Into<String>) -> Self {
        Self::new(Role::Tool, text)
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Options applying to a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Supersedes the adapter's configured model for this call only.
    pub model: Option<String>,
    /// Provider-specific settings, forwarded where the backend has a place
    /// for them.
    pub extra: Map<String, Value>,
}

/// An ordered conversation plus per-call options. Message order is
/// conversation order and is preserved verbatim into the wire payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub messages: Vec<Message>,
    pub options: CallOptions,
}

impl Prompt {
    /// Store the messages as given. Validation is left to adapters.
    pub fn new(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            options: CallOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }
}
