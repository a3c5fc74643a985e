use crate::chat::models::ConversationState;

/// Decides whether a completion request may proceed. Free usage is
/// allowed below the configured limit; past it a personal API key is
/// required. Pure function, evaluated before every completion attempt on
/// both the text and voice paths.
pub fn may_proceed(state: &ConversationState, free_limit: u32) -> bool {
    state.usage_count < free_limit || state.api_key.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_below_limit_without_key() {
        let mut state = ConversationState::new();
        state.usage_count = 4;
        assert!(may_proceed(&state, 5));
    }

    #[test]
    fn test_blocks_at_limit_without_key() {
        let mut state = ConversationState::new();
        state.usage_count = 5;
        assert!(!may_proceed(&state, 5));
    }

    #[test]
    fn test_allows_at_limit_with_key() {
        let mut state = ConversationState::new();
        state.usage_count = 5;
        state.api_key = Some("abc12".to_string());
        assert!(may_proceed(&state, 5));
    }

    #[test]
    fn test_allows_past_limit_with_key() {
        let mut state = ConversationState::new();
        state.usage_count = 100;
        state.api_key = Some("abc12".to_string());
        assert!(may_proceed(&state, 5));
    }

    #[test]
    fn test_zero_limit_blocks_immediately() {
        let state = ConversationState::new();
        assert!(!may_proceed(&state, 0));
    }
}
