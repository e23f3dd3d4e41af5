//! Pull normalized documents out of dataset records

use crate::datasets::{Record, RecordStream};
use futures::StreamExt;
use textcat_core::{normalize_text, Result};
use tracing::{debug, warn};

/// Which records to keep and where their text lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextExtractor {
    text_field: String,
    language: Option<String>,
}

impl TextExtractor {
    pub fn new(text_field: impl Into<String>) -> Self {
        Self {
            text_field: text_field.into(),
            language: None,
        }
    }

    /// Keep only records whose `language` field equals `language`
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// English news articles
    pub fn ccnews() -> Self {
        Self::new("plain_text").with_language("en")
    }

    /// Encyclopedia articles
    pub fn wikipedia() -> Self {
        Self::new("text")
    }

    /// Normalized text of a record, or `None` if it is filtered out
    pub fn extract(&self, record: &Record) -> Option<String> {
        if let Some(language) = &self.language {
            let matches = record
                .get("language")
                .and_then(|v| v.as_str())
                .is_some_and(|lang| lang == language);
            if !matches {
                return None;
            }
        }
        let text = record.get(&self.text_field)?.as_str()?;
        Some(normalize_text(text))
    }
}

/// Take up to `count` documents from the stream, stopping as soon as enough
/// are collected
pub async fn collect_documents(
    records: &mut RecordStream,
    extractor: &TextExtractor,
    count: usize,
) -> Result<Vec<String>> {
    let mut documents = Vec::with_capacity(count.min(100_000));
    let mut seen = 0usize;

    while documents.len() < count {
        let Some(record) = records.next().await else {
            warn!(
                "Dataset ended after {} of {} documents",
                documents.len(),
                count
            );
            break;
        };
        seen += 1;
        if let Some(text) = extractor.extract(&record?) {
            documents.push(text);
        }
    }

    debug!("Kept {} documents out of {} records", documents.len(), seen);
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;
    use textcat_core::Error;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn records(values: Vec<serde_json::Value>) -> RecordStream {
        stream::iter(values.into_iter().map(|v| Ok(record(v)))).boxed()
    }

    #[test]
    fn test_ccnews_keeps_english_only() {
        let extractor = TextExtractor::ccnews();
        let en = record(json!({"language": "en", "plain_text": "Markets\u{a0}rose  today "}));
        let de = record(json!({"language": "de", "plain_text": "Die Börse"}));
        let missing = record(json!({"plain_text": "no language"}));

        assert_eq!(extractor.extract(&en).as_deref(), Some("Markets rose today"));
        assert_eq!(extractor.extract(&de), None);
        assert_eq!(extractor.extract(&missing), None);
    }

    #[test]
    fn test_wikipedia_reads_text_field() {
        let extractor = TextExtractor::wikipedia();
        let article = record(json!({"title": "Rhine", "text": "The Rhine\nis a river."}));
        assert_eq!(extractor.extract(&article).as_deref(), Some("The Rhine is a river."));
        assert_eq!(extractor.extract(&record(json!({"text": 3}))), None);
    }

    #[tokio::test]
    async fn test_collect_stops_at_count() {
        let mut stream = records(
            (0..10)
                .map(|i| {
                    let language = if i % 2 == 0 { "en" } else { "fr" };
                    json!({"language": language, "plain_text": format!("doc {i}")})
                })
                .collect(),
        );

        let docs = collect_documents(&mut stream, &TextExtractor::ccnews(), 3).await.unwrap();
        assert_eq!(docs, vec!["doc 0", "doc 2", "doc 4"]);

        // the rest of the stream is left unread
        let rest: Vec<_> = stream.collect().await;
        assert_eq!(rest.len(), 5);
    }

    #[tokio::test]
    async fn test_collect_returns_what_a_short_dataset_has() {
        let mut stream = records(vec![json!({"text": "only one"})]);
        let docs = collect_documents(&mut stream, &TextExtractor::wikipedia(), 5).await.unwrap();
        assert_eq!(docs, vec!["only one"]);
    }

    #[tokio::test]
    async fn test_collect_zero_reads_nothing() {
        let mut stream = records(vec![json!({"text": "untouched"})]);
        let docs = collect_documents(&mut stream, &TextExtractor::wikipedia(), 0).await.unwrap();
        assert!(docs.is_empty());
        assert_eq!(stream.collect::<Vec<_>>().await.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_propagates_stream_errors() {
        let mut stream: RecordStream =
            stream::iter(vec![Err(Error::dataset("connection reset"))]).boxed();
        let err = collect_documents(&mut stream, &TextExtractor::wikipedia(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }
}
