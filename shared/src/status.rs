/// Status lines cycled under the busy indicator while a search is in flight.
pub const DEFAULT_STATUS_MESSAGES: &[&str] = &[
    "검색어를 분석하고 있어요...",
    "주변 맛집을 찾고 있어요...",
    "블로그 후기를 모으고 있어요...",
    "추천 결과를 정리하고 있어요...",
];

pub const DEFAULT_STATUS_INTERVAL_MS: u32 = 2_500;

/// Round-robin over human-readable progress messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRotation {
    messages: Vec<String>,
    position: usize,
}

impl Default for StatusRotation {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_MESSAGES.iter().map(|m| m.to_string()).collect())
    }
}

impl StatusRotation {
    /// An empty list falls back to the built-in messages.
    pub fn new(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            return Self::default();
        }
        Self {
            messages,
            position: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.messages[self.position]
    }

    /// Step to the next message, wrapping at the end.
    pub fn advance(&mut self) -> &str {
        self.position = (self.position + 1) % self.messages.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        let mut r = StatusRotation::new(vec!["a".into(), "b".into()]);
        assert_eq!(r.current(), "a");
        assert_eq!(r.advance(), "b");
        assert_eq!(r.advance(), "a");
    }

    #[test]
    fn empty_list_uses_defaults() {
        let r = StatusRotation::new(Vec::new());
        assert_eq!(r.current(), DEFAULT_STATUS_MESSAGES[0]);
    }
}
