//! Input cleaning for text that reaches the generation services or the
//! comment store.

/// Longest query/title/artist forwarded to the services, in characters
pub const MAX_INPUT_LENGTH: usize = 500;

/// Longest comment body accepted from a user, in characters
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Characters that could break out of a prompt string literal or tag
const STRIPPED_CHARS: [char; 4] = ['"', '`', '<', '>'];

/// Clean user text before it is embedded in a service request
///
/// Trims surrounding whitespace, keeps at most [`MAX_INPUT_LENGTH`]
/// characters, then removes `"`, `` ` ``, `<` and `>`.
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .take(MAX_INPUT_LENGTH)
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect()
}

/// Bound a comment body to [`MAX_COMMENT_LENGTH`] characters
///
/// Returns `None` for blank input; the comment store itself never
/// re-validates length.
pub fn bound_comment(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_COMMENT_LENGTH).collect())
}
