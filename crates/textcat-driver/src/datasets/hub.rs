//! Hub datasets read page by page from the datasets-server REST API

use super::{DatasetSpec, Record, RecordStream};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::VecDeque;
use textcat_core::{Error, Result};
use tracing::debug;

/// Public datasets-server endpoint
pub const DEFAULT_HUB_URL: &str = "https://datasets-server.huggingface.co";

/// Rows requested per `/rows` call (the server's maximum)
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct SplitsResponse {
    splits: Vec<SplitEntry>,
}

#[derive(Debug, Deserialize)]
struct SplitEntry {
    config: String,
    split: String,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Record,
}

/// A dataset split the server knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSplit {
    pub dataset: String,
    pub config: String,
    pub split: String,
}

async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    what: &str,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::dataset(format!("{what}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::dataset(format!("{what}: {status}: {body}")));
    }

    response
        .json()
        .await
        .map_err(|e| Error::dataset(format!("{what}: {e}")))
}

/// Check `/splits` for the configured (name, split) pair
///
/// Without a `name` the first configuration offering the split is used.
pub async fn resolve(
    http: &reqwest::Client,
    hub_url: &str,
    spec: &DatasetSpec,
) -> Result<ResolvedSplit> {
    let request = http
        .get(format!("{hub_url}/splits"))
        .query(&[("dataset", spec.source.as_str())]);
    let splits: SplitsResponse = get_json(request, &spec.source).await?;

    let found = splits.splits.into_iter().find(|entry| {
        entry.split == spec.split
            && spec.name.as_deref().map_or(true, |name| entry.config == name)
    });

    match found {
        Some(entry) => Ok(ResolvedSplit {
            dataset: spec.source.clone(),
            config: entry.config,
            split: entry.split,
        }),
        None => Err(Error::dataset(format!(
            "{}: no split '{}' for config '{}'",
            spec.source,
            spec.split,
            spec.name.as_deref().unwrap_or("<any>")
        ))),
    }
}

struct Pager {
    http: reqwest::Client,
    url: String,
    split: ResolvedSplit,
    offset: u64,
    buffered: VecDeque<Record>,
    exhausted: bool,
}

impl Pager {
    async fn fetch_page(&mut self) -> Result<()> {
        let offset = self.offset.to_string();
        let length = PAGE_SIZE.to_string();
        let request = self.http.get(&self.url).query(&[
            ("dataset", self.split.dataset.as_str()),
            ("config", self.split.config.as_str()),
            ("split", self.split.split.as_str()),
            ("offset", offset.as_str()),
            ("length", length.as_str()),
        ]);
        let page: RowsResponse = get_json(request, &self.split.dataset).await?;

        let fetched = page.rows.len();
        self.offset += fetched as u64;
        self.buffered.extend(page.rows.into_iter().map(|entry| entry.row));
        self.exhausted = fetched < PAGE_SIZE
            || page.num_rows_total.is_some_and(|total| self.offset >= total);

        debug!(
            "Fetched {} rows of {} (offset {})",
            fetched, self.split.dataset, self.offset
        );
        Ok(())
    }
}

/// Stream the rows of a resolved split, one page at a time
pub fn rows(http: reqwest::Client, hub_url: &str, split: ResolvedSplit) -> RecordStream {
    let pager = Pager {
        http,
        url: format!("{hub_url}/rows"),
        split,
        offset: 0,
        buffered: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(pager, |mut pager| async move {
        loop {
            if let Some(record) = pager.buffered.pop_front() {
                return Some((Ok(record), pager));
            }
            if pager.exhausted {
                return None;
            }
            if let Err(e) = pager.fetch_page().await {
                pager.exhausted = true;
                return Some((Err(e), pager));
            }
        }
    })
    .boxed()
}
