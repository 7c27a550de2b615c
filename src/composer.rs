/// Rules for the message input box.
pub const MAX_INPUT_CHARS: usize = 1000;
pub const NEAR_LIMIT_CHARS: usize = 900;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterCount {
    pub count: usize,
    pub limit: usize,
}

impl CharacterCount {
    pub fn of(input: &str) -> Self {
        Self {
            count: input.chars().count(),
            limit: MAX_INPUT_CHARS,
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.count, self.limit)
    }

    pub fn is_near_limit(&self) -> bool {
        self.count > NEAR_LIMIT_CHARS
    }

    pub fn is_over_limit(&self) -> bool {
        self.count > self.limit
    }
}

/// Send is enabled only for non-blank input while no reply is pending.
pub fn can_send(input: &str, pending: bool) -> bool {
    !input.trim().is_empty() && !pending
}
