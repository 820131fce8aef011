// Provider-agnostic prompt shapes.
// Each feature module that needs LLM calls defines its own prompt text in a
// prompts.rs alongside it and hands a `Prompt` to the client.

/// Role of a single message in a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// One message of a prompt, borrowed from the owning `Prompt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

/// The ordered pair of instructions sent per request: a fixed system
/// instruction followed by the user instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Messages in send order: system first, then user.
    pub fn messages(&self) -> [ChatMessage<'_>; 2] {
        [
            ChatMessage {
                role: Role::System,
                content: &self.system,
            },
            ChatMessage {
                role: Role::User,
                content: &self.user,
            },
        ]
    }
}
