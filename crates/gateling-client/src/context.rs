use gateling_core::Message;

/// Manages the conversation history sent with each gateway request.
/// Handles the system prompt, message ordering, and truncation.
pub struct ContextWindow {
    messages: Vec<Message>,
    system_prompt: Option<String>,
    max_messages: usize,
}

impl ContextWindow {
    /// Creates a window that keeps at most `max_messages` messages.
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_messages,
        }
    }

    /// Sets the system prompt sent ahead of the history.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    /// The current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Appends a message, dropping the oldest ones past the cap.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.truncate();
    }

    /// The retained history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn truncate(&mut self) {
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }

    /// Rough token estimation (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        let sys_tokens = self
            .system_prompt
            .as_ref()
            .map(|s| s.len() / 4)
            .unwrap_or(0);
        let msg_tokens: usize = self.messages.iter().map(|m| m.content.len() / 4).sum();
        sys_tokens + msg_tokens
    }

    /// Clears the history, keeping the system prompt.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
