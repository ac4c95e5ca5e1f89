//! Prompt assembly for title suggestions.

use std::borrow::Cow;

/// Truncate `text` to `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

/// Build the title suggestion prompt.
///
/// `messages` is chronological (oldest first) and ends with the message that
/// triggered the evaluation. Only the last `max_messages` are included; blank
/// messages are skipped and each one is cut to `max_message_chars`.
pub fn build_title_prompt<S: AsRef<str>>(
    topic_name: &str,
    messages: &[S],
    max_messages: usize,
    max_message_chars: usize,
) -> String {
    let start = messages.len().saturating_sub(max_messages);

    let messages_text = messages[start..]
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .enumerate()
        .map(|(i, m)| format!("{}. {}", i + 1, truncate_chars(m, max_message_chars)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are reviewing a chat topic whose conversation may have moved away from its title.

CURRENT TITLE: "{topic_name}"

RECENT MESSAGES (oldest first):
{messages_text}

Propose ONE concise topic title that describes what the conversation above is actually about.

Requirements:
- Reply with the title text only
- 3-8 words
- No markdown, no quotes
- No explanations or commentary

Topic title:"#
    )
}
