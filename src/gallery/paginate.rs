use tracing::debug;

use super::classify::{image_urls_capped, image_urls_from, is_image_message};
use super::source::MessageSource;
use super::types::{ChatMessage, MessageId};

/// Walks a channel's history backward one batch at a time.
///
/// Each fetch starts just before the oldest message of the previous batch
/// (or before the initial anchor). A batch shorter than `cache_size`,
/// including an empty one, means the history is exhausted.
pub struct HistoryCursor<'s, S> {
    source: &'s S,
    anchor: Option<MessageId>,
    cache_size: usize,
    exhausted: bool,
    fetched: usize,
}

impl<'s, S: MessageSource> HistoryCursor<'s, S> {
    pub fn new(source: &'s S, anchor: Option<MessageId>, cache_size: usize) -> Self {
        Self {
            source,
            anchor,
            cache_size,
            exhausted: false,
            fetched: 0,
        }
    }

    /// Next batch, newest first. `Ok(None)` once the history is exhausted.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<ChatMessage>>, S::Error> {
        if self.exhausted {
            return Ok(None);
        }

        let batch = self.source.fetch_before(self.anchor, self.cache_size).await?;
        self.fetched += 1;
        debug!(
            batch = self.fetched,
            anchor = ?self.anchor,
            size = batch.len(),
            cache_size = self.cache_size,
            "history batch"
        );

        if batch.len() < self.cache_size {
            self.exhausted = true;
        }
        match batch.last() {
            Some(oldest) => self.anchor = Some(oldest.id),
            None => {
                self.exhausted = true;
                return Ok(None);
            }
        }

        Ok(Some(batch))
    }

    /// Number of fetches issued so far.
    pub fn batches_fetched(&self) -> usize {
        self.fetched
    }
}

/// Every image URL older than `anchor`, newest first.
pub async fn collect_image_urls<S: MessageSource>(
    source: &S,
    anchor: Option<MessageId>,
    cache_size: usize,
) -> Result<Vec<String>, S::Error> {
    let mut cursor = HistoryCursor::new(source, anchor, cache_size);
    let mut urls = Vec::new();

    while let Some(batch) = cursor.next_batch().await? {
        urls.extend(image_urls_from(&batch));
    }

    debug!(batches = cursor.batches_fetched(), found = urls.len(), "image urls collected");
    Ok(urls)
}

/// The newest `amount` image URLs older than `anchor`.
///
/// Stops fetching as soon as `amount` is reached; the batch that overshoots
/// contributes only what is still missing.
pub async fn collect_image_urls_capped<S: MessageSource>(
    source: &S,
    anchor: Option<MessageId>,
    amount: usize,
    cache_size: usize,
) -> Result<Vec<String>, S::Error> {
    let mut urls = Vec::new();
    if amount == 0 {
        return Ok(urls);
    }

    let mut cursor = HistoryCursor::new(source, anchor, cache_size);
    while let Some(batch) = cursor.next_batch().await? {
        urls.extend(image_urls_capped(&batch, amount - urls.len()));
        if urls.len() >= amount {
            break;
        }
    }

    debug!(
        batches = cursor.batches_fetched(),
        found = urls.len(),
        amount,
        "capped image urls collected"
    );
    Ok(urls)
}

/// Ids of every image message older than `anchor`, newest first.
pub async fn collect_image_message_ids<S: MessageSource>(
    source: &S,
    anchor: Option<MessageId>,
    cache_size: usize,
) -> Result<Vec<MessageId>, S::Error> {
    let mut cursor = HistoryCursor::new(source, anchor, cache_size);
    let mut ids = Vec::new();

    while let Some(batch) = cursor.next_batch().await? {
        ids.extend(batch.iter().filter(|m| is_image_message(m)).map(|m| m.id));
    }

    debug!(batches = cursor.batches_fetched(), found = ids.len(), "image message ids collected");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::gallery::types::Attachment;

    #[derive(Debug, PartialEq)]
    struct FetchError(&'static str);

    /// In-memory channel, newest message first. Records every fetch.
    struct MemorySource {
        messages: Vec<ChatMessage>,
        fail_on_call: Option<usize>,
        calls: Mutex<Vec<(Option<MessageId>, usize, usize)>>,
    }

    impl MemorySource {
        fn new(messages: Vec<ChatMessage>) -> Self {
            Self {
                messages,
                fail_on_call: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }

        fn anchors(&self) -> Vec<Option<MessageId>> {
            self.calls.lock().unwrap().iter().map(|c| c.0).collect()
        }

        fn batch_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().iter().map(|c| c.2).collect()
        }
    }

    #[async_trait]
    impl MessageSource for MemorySource {
        type Error = FetchError;

        async fn fetch_before(
            &self,
            anchor: Option<MessageId>,
            limit: usize,
        ) -> Result<Vec<ChatMessage>, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            if self.fail_on_call == Some(calls.len() + 1) {
                calls.push((anchor, limit, 0));
                return Err(FetchError("gateway timeout"));
            }

            let start = match anchor {
                Some(id) => self
                    .messages
                    .iter()
                    .position(|m| m.id == id)
                    .map(|i| i + 1)
                    .unwrap_or(self.messages.len()),
                None => 0,
            };
            let batch: Vec<ChatMessage> =
                self.messages.iter().skip(start).take(limit).cloned().collect();
            calls.push((anchor, limit, batch.len()));
            Ok(batch)
        }
    }

    fn message(id: u64, content: &str, files: &[&str]) -> ChatMessage {
        ChatMessage {
            id,
            content: content.to_string(),
            attachments: files
                .iter()
                .map(|f| Attachment {
                    filename: f.to_string(),
                    url: format!("https://cdn.example/{}/{}", id, f),
                })
                .collect(),
        }
    }

    /// Seven messages, ids 107 (newest) down to 101. The 1st, 3rd and 5th
    /// carry one png each.
    fn seven_messages() -> Vec<ChatMessage> {
        (1..=7u64)
            .map(|pos| {
                let id = 108 - pos;
                if pos % 2 == 1 && pos <= 5 {
                    message(id, "", &["a.png"])
                } else {
                    message(id, "just text", &[])
                }
            })
            .collect()
    }

    fn url(id: u64) -> String {
        format!("https://cdn.example/{}/a.png", id)
    }

    #[tokio::test]
    async fn test_collect_walks_until_short_batch() {
        let source = MemorySource::new(seven_messages());
        let urls = collect_image_urls(&source, None, 3).await.unwrap();

        assert_eq!(urls, vec![url(107), url(105), url(103)]);
        assert_eq!(source.batch_sizes(), vec![3, 3, 1]);
        assert_eq!(source.anchors(), vec![None, Some(105), Some(102)]);
    }

    #[tokio::test]
    async fn test_collect_stops_on_empty_batch_after_exact_fill() {
        let mut messages = seven_messages();
        messages.truncate(6);
        let source = MemorySource::new(messages);
        let urls = collect_image_urls(&source, None, 3).await.unwrap();

        assert_eq!(urls.len(), 3);
        assert_eq!(source.batch_sizes(), vec![3, 3, 0]);
    }

    #[tokio::test]
    async fn test_collect_starts_before_anchor() {
        let source = MemorySource::new(seven_messages());
        let urls = collect_image_urls(&source, Some(106), 10).await.unwrap();

        assert_eq!(urls, vec![url(105), url(103)]);
        assert_eq!(source.anchors(), vec![Some(106)]);
    }

    #[tokio::test]
    async fn test_capped_stops_before_next_batch() {
        let source = MemorySource::new(seven_messages());
        let urls = collect_image_urls_capped(&source, None, 2, 3).await.unwrap();

        assert_eq!(urls, vec![url(107), url(105)]);
        assert_eq!(source.batch_sizes(), vec![3]);
    }

    #[tokio::test]
    async fn test_capped_trims_overshoot_in_later_batch() {
        let source = MemorySource::new(vec![
            message(10, "", &["a.png"]),
            message(9, "", &[]),
            message(8, "", &["b.png", "c.jpg", "d.jpeg", "e.png"]),
            message(7, "", &["f.png"]),
        ]);
        let urls = collect_image_urls_capped(&source, None, 3, 2).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://cdn.example/10/a.png".to_string(),
                "https://cdn.example/8/b.png".to_string(),
                "https://cdn.example/8/c.jpg".to_string(),
            ]
        );
        assert_eq!(source.batch_sizes(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_capped_returns_everything_when_history_runs_out() {
        let source = MemorySource::new(seven_messages());
        let urls = collect_image_urls_capped(&source, None, 50, 3).await.unwrap();

        assert_eq!(urls, vec![url(107), url(105), url(103)]);
        assert_eq!(source.batch_sizes(), vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_capped_zero_amount_fetches_nothing() {
        let source = MemorySource::new(seven_messages());
        let urls = collect_image_urls_capped(&source, None, 0, 3).await.unwrap();

        assert!(urls.is_empty());
        assert!(source.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_capped_length_matches_min_of_amount_and_total() {
        for amount in 0..=5 {
            let source = MemorySource::new(seven_messages());
            let urls = collect_image_urls_capped(&source, None, amount, 2)
                .await
                .unwrap();
            assert_eq!(urls.len(), amount.min(3), "amount={}", amount);
        }
    }

    #[tokio::test]
    async fn test_message_ids_include_content_fallback() {
        let mut messages = seven_messages();
        messages[1] = message(106, "holiday.JPG", &[]);
        let source = MemorySource::new(messages);
        let ids = collect_image_message_ids(&source, None, 3).await.unwrap();

        assert_eq!(ids, vec![107, 106, 105, 103]);
        assert_eq!(source.anchors(), vec![None, Some(105), Some(102)]);
    }

    #[tokio::test]
    async fn test_message_ids_stop_on_empty_batch() {
        let source = MemorySource::new(Vec::new());
        let ids = collect_image_message_ids(&source, Some(42), 3).await.unwrap();

        assert!(ids.is_empty());
        assert_eq!(source.batch_sizes(), vec![0]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_unchanged() {
        let source = MemorySource::new(seven_messages()).failing_on(2);
        let err = collect_image_urls(&source, None, 3).await.unwrap_err();

        assert_eq!(err, FetchError("gateway timeout"));
        assert_eq!(source.anchors(), vec![None, Some(105)]);

        let source = MemorySource::new(seven_messages()).failing_on(1);
        let err = collect_image_message_ids(&source, None, 3).await.unwrap_err();
        assert_eq!(err, FetchError("gateway timeout"));
    }

    #[tokio::test]
    async fn test_cursor_is_done_after_short_batch() {
        let source = MemorySource::new(seven_messages());
        let mut cursor = HistoryCursor::new(&source, None, 5);

        assert_eq!(cursor.next_batch().await.unwrap().map(|b| b.len()), Some(5));
        assert_eq!(cursor.next_batch().await.unwrap().map(|b| b.len()), Some(2));
        assert!(cursor.next_batch().await.unwrap().is_none());
        assert_eq!(cursor.batches_fetched(), 2);
    }
}
