use thiserror::Error;

/// Failures of a query sequence, as the user sees them.
/// `Display` is exactly the text appended to the transcript.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No recipes found 😅")]
    NoResults,

    #[error("Error: Could not reach API ❌")]
    Transport(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(ChatError::NoResults.to_string(), "No recipes found 😅");
        let err = ChatError::Transport(anyhow::anyhow!("status 401"));
        assert_eq!(err.to_string(), "Error: Could not reach API ❌");
    }
}
