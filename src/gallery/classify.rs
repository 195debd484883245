use super::types::ChatMessage;

/// Trailing characters that mark a filename as an image.
/// Plain suffix match: "ajpg" counts as well as "a.jpg".
const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg"];

/// Case-insensitive suffix check against [`IMAGE_SUFFIXES`].
pub fn is_image_filename(name: &str) -> bool {
    let name = name.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Whether a message should be treated as an image post.
///
/// Only the first attachment is inspected. A message without attachments
/// falls back to classifying its text content as if it were a filename.
pub fn is_image_message(message: &ChatMessage) -> bool {
    match message.attachments.first() {
        Some(first) => is_image_filename(&first.filename),
        None => is_image_filename(&message.content),
    }
}

/// URLs of every image attachment on the message, in attachment order.
pub fn image_urls(message: &ChatMessage) -> Vec<String> {
    message
        .attachments
        .iter()
        .filter(|a| is_image_filename(&a.filename))
        .map(|a| a.url.clone())
        .collect()
}

/// Image URLs across all messages, message order then attachment order.
pub fn image_urls_from(messages: &[ChatMessage]) -> Vec<String> {
    messages.iter().flat_map(image_urls).collect()
}

/// Like [`image_urls_from`] but returns at most `amount` URLs.
///
/// The message that overshoots has its tail trimmed; no later message is read.
pub fn image_urls_capped(messages: &[ChatMessage], amount: usize) -> Vec<String> {
    let mut result = Vec::new();
    if amount == 0 {
        return result;
    }

    let mut remaining = amount;
    for message in messages {
        let (taken, left) = take_up_to(image_urls(message), remaining);
        result.extend(taken);
        remaining = left;
        if remaining == 0 {
            break;
        }
    }
    result
}

/// Keep at most `remaining` items from the front of `items`.
/// Returns the kept items and how many may still be taken afterwards.
pub fn take_up_to<T>(mut items: Vec<T>, remaining: usize) -> (Vec<T>, usize) {
    items.truncate(remaining);
    let left = remaining - items.len();
    (items, left)
}
