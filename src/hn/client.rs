use super::{HnError, Item, ReqwestTransport, StoryFeed, Transport};
use crate::config::HnConfig;
use futures::stream::{self, StreamExt};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Loads stories and comments, remembering which stories this session has
/// already returned.
pub struct HnClient<T = ReqwestTransport> {
    transport: T,
    config: HnConfig,
    loaded_ids: HashSet<u64>,
}

impl HnClient<ReqwestTransport> {
    pub fn new(config: HnConfig) -> Self {
        Self::with_transport(ReqwestTransport::default(), config)
    }
}

impl<T: Transport> HnClient<T> {
    pub fn with_transport(transport: T, config: HnConfig) -> Self {
        Self {
            transport,
            config,
            loaded_ids: HashSet::new(),
        }
    }

    pub fn config(&self) -> &HnConfig {
        &self.config
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_ids.len()
    }

    /// Load up to `limit` (default from config) stories of `feed` not yet loaded this session.
    ///
    /// `New` stories come back newest first, every other feed by score.
    pub async fn load_stories(
        &mut self,
        feed: StoryFeed,
        limit: Option<usize>,
    ) -> Result<Vec<Item>, HnError> {
        let limit = limit.unwrap_or(self.config.default_limit);
        let url = format!("{}/{}", self.base_url(), feed.endpoint());
        let ids: Vec<u64> = self.transport.get_json(&url).await?;

        let wanted: Vec<u64> = ids
            .into_iter()
            .filter(|id| !self.loaded_ids.contains(id))
            .take(limit)
            .collect();
        debug!(?feed, requested = wanted.len(), "Loading stories");

        let mut stories = self.fetch_items(&wanted).await;
        self.loaded_ids.extend(stories.iter().map(|s| s.id));

        match feed {
            StoryFeed::New => stories.sort_by_key(|s| Reverse(s.time)),
            _ => stories.sort_by_key(|s| Reverse(s.score)),
        }

        debug!(?feed, loaded = stories.len(), "Stories loaded");
        Ok(stories)
    }

    /// Forget what this session has loaded, then load `feed` afresh.
    pub async fn refresh(
        &mut self,
        feed: StoryFeed,
        limit: Option<usize>,
    ) -> Result<Vec<Item>, HnError> {
        self.loaded_ids.clear();
        self.load_stories(feed, limit).await
    }

    /// Load up to `limit` top-level comments of `story`, in thread order.
    pub async fn load_comments(&self, story: &Item, limit: usize) -> Vec<Item> {
        let ids: Vec<u64> = story.kids.iter().copied().take(limit).collect();
        let mut comments = self.fetch_items(&ids).await;
        comments.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
        comments
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Fetch `ids` batch by batch. Results keep batch order; order within a
    /// batch follows completion. Missing, deleted, dead and failed items are
    /// left out.
    async fn fetch_items(&self, ids: &[u64]) -> Vec<Item> {
        let mut items = Vec::with_capacity(ids.len());

        for batch in ids.chunks(self.config.batch_size.max(1)) {
            let results: Vec<(u64, Result<Option<Item>, HnError>)> = stream::iter(batch.iter().copied())
                .map(|id| async move {
                    let url = format!("{}/item/{}.json", self.base_url(), id);
                    (id, self.transport.get_json(&url).await)
                })
                .buffer_unordered(batch.len())
                .collect()
                .await;

            for (id, result) in results {
                match result {
                    Ok(Some(item)) if item.is_visible() => items.push(item),
                    Ok(_) => debug!(id, "Skipping missing or removed item"),
                    Err(e) => warn!(id, error = %e, "Failed to fetch item"),
                }
            }
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "http://hn.test/v0";

    #[derive(Default)]
    struct FakeTransport {
        responses: HashMap<String, Value>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn with(mut self, path: &str, value: Value) -> Self {
            self.responses.insert(format!("{BASE}/{path}"), value);
            self
        }

        fn with_story(self, id: u64, score: i64, time: i64) -> Self {
            self.with(
                &format!("item/{id}.json"),
                json!({"id": id, "type": "story", "title": format!("Story {id}"), "score": score, "time": time}),
            )
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl Transport for FakeTransport {
        fn get_json<T: DeserializeOwned + Send>(
            &self,
            url: &str,
        ) -> impl Future<Output = Result<T, HnError>> + Send {
            self.requests.lock().push(url.to_string());
            let result = match self.responses.get(url) {
                Some(value) => serde_json::from_value(value.clone()).map_err(HnError::from),
                None => Err(HnError::Status {
                    url: url.to_string(),
                    status: 500,
                }),
            };
            std::future::ready(result)
        }
    }

    /// Suspends every request once, tracking how many item fetches overlap.
    #[derive(Default)]
    struct YieldingTransport {
        inner: FakeTransport,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        completed: AtomicUsize,
        // (item id, items completed when it started)
        starts: Mutex<Vec<(u64, usize)>>,
    }

    impl Transport for YieldingTransport {
        fn get_json<T: DeserializeOwned + Send>(
            &self,
            url: &str,
        ) -> impl Future<Output = Result<T, HnError>> + Send {
            let url = url.to_string();
            async move {
                let item_id = url
                    .rsplit_once("/item/")
                    .and_then(|(_, rest)| rest.trim_end_matches(".json").parse::<u64>().ok());

                if let Some(id) = item_id {
                    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                    let done = self.completed.load(Ordering::SeqCst);
                    self.starts.lock().push((id, done));
                }

                tokio::task::yield_now().await;
                let result = self.inner.get_json(&url).await;

                if item_id.is_some() {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    self.completed.fetch_add(1, Ordering::SeqCst);
                }
                result
            }
        }
    }

    fn config(batch_size: usize) -> HnConfig {
        HnConfig {
            base_url: format!("{BASE}/"),
            batch_size,
            default_limit: 30,
        }
    }

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    #[tokio::test]
    async fn top_stories_sorted_by_score() {
        let transport = FakeTransport::default()
            .with("topstories.json", json!([1, 2, 3]))
            .with_story(1, 10, 300)
            .with_story(2, 50, 100)
            .with_story(3, 30, 200);
        let mut client = HnClient::with_transport(transport, config(10));

        let stories = client.load_stories(StoryFeed::Top, None).await.unwrap();

        assert_eq!(ids(&stories), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn new_stories_sorted_by_time() {
        let transport = FakeTransport::default()
            .with("newstories.json", json!([1, 2, 3]))
            .with_story(1, 10, 300)
            .with_story(2, 50, 100)
            .with_story(3, 30, 200);
        let mut client = HnClient::with_transport(transport, config(10));

        let stories = client.load_stories(StoryFeed::New, None).await.unwrap();

        assert_eq!(ids(&stories), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn failed_and_removed_items_are_omitted() {
        let transport = FakeTransport::default()
            .with("beststories.json", json!([1, 2, 3, 4, 5]))
            .with_story(1, 10, 0)
            // 2 has no response and fails
            .with("item/3.json", Value::Null)
            .with("item/4.json", json!({"id": 4, "deleted": true}))
            .with_story(5, 20, 0);
        let mut client = HnClient::with_transport(transport, config(2));

        let stories = client.load_stories(StoryFeed::Best, None).await.unwrap();

        assert_eq!(ids(&stories), vec![5, 1]);
    }

    #[tokio::test]
    async fn id_list_failure_aborts() {
        let mut client = HnClient::with_transport(FakeTransport::default(), config(10));

        let result = client.load_stories(StoryFeed::Ask, None).await;

        assert!(matches!(result, Err(HnError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn undecodable_id_list_aborts() {
        let transport = FakeTransport::default().with("showstories.json", json!({"not": "a list"}));
        let mut client = HnClient::with_transport(transport, config(10));

        let result = client.load_stories(StoryFeed::Show, None).await;

        assert!(matches!(result, Err(HnError::Decode(_))));
    }

    #[tokio::test]
    async fn limit_and_batching() {
        let mut transport = FakeTransport::default().with("topstories.json", json!((1..=25).collect::<Vec<u64>>()));
        for id in 1..=25 {
            transport = transport.with_story(id, id as i64, 0);
        }
        let mut client = HnClient::with_transport(transport, config(10));

        let stories = client.load_stories(StoryFeed::Top, Some(12)).await.unwrap();

        assert_eq!(stories.len(), 12);
        assert_eq!(stories[0].id, 12);
        // One list request plus one per story
        assert_eq!(client.transport.request_count(), 13);
    }

    #[tokio::test]
    async fn batches_run_concurrently_and_in_sequence() {
        let mut inner = FakeTransport::default().with("topstories.json", json!((1..=30).collect::<Vec<u64>>()));
        for id in 1..=30 {
            inner = inner.with_story(id, id as i64, 0);
        }
        let transport = YieldingTransport {
            inner,
            ..Default::default()
        };
        let mut client = HnClient::with_transport(transport, config(10));

        let stories = client.load_stories(StoryFeed::Top, None).await.unwrap();

        assert_eq!(stories.len(), 30);
        assert_eq!(client.transport.max_in_flight.load(Ordering::SeqCst), 10);

        let starts = client.transport.starts.lock();
        assert_eq!(starts.len(), 30);
        for (id, done) in starts.iter() {
            let batch = (*id as usize - 1) / 10;
            assert_eq!(*done, batch * 10, "item {id} started early");
        }
    }

    #[tokio::test]
    async fn session_dedup_and_refresh() {
        let transport = FakeTransport::default()
            .with("topstories.json", json!([1, 2, 3, 4]))
            .with_story(1, 4, 0)
            .with_story(2, 3, 0)
            .with_story(3, 2, 0)
            .with_story(4, 1, 0);
        let mut client = HnClient::with_transport(transport, config(10));

        let first = client.load_stories(StoryFeed::Top, Some(2)).await.unwrap();
        let second = client.load_stories(StoryFeed::Top, Some(2)).await.unwrap();
        let third = client.load_stories(StoryFeed::Top, Some(2)).await.unwrap();

        assert_eq!(ids(&first), vec![1, 2]);
        assert_eq!(ids(&second), vec![3, 4]);
        assert!(third.is_empty());
        assert_eq!(client.loaded_count(), 4);

        let refreshed = client.refresh(StoryFeed::Top, Some(2)).await.unwrap();
        assert_eq!(ids(&refreshed), vec![1, 2]);
    }

    #[tokio::test]
    async fn comments_keep_thread_order() {
        let transport = FakeTransport::default()
            .with("item/11.json", json!({"id": 11, "type": "comment", "text": "first"}))
            .with("item/12.json", json!({"id": 12, "type": "comment", "dead": true}))
            .with("item/13.json", json!({"id": 13, "type": "comment", "text": "third"}))
            .with("item/14.json", json!({"id": 14, "type": "comment", "text": "fourth"}));
        let client = HnClient::with_transport(transport, config(2));
        let story: Item = serde_json::from_value(json!({"id": 1, "kids": [13, 11, 12, 14]})).unwrap();

        let comments = client.load_comments(&story, 3).await;

        assert_eq!(ids(&comments), vec![13, 11]);
    }
}
