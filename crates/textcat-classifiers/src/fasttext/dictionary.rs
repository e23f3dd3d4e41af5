//! Vocabulary, label set and feature hashing

use crate::config::TrainingConfig;
use std::collections::HashMap;
use std::io::BufRead;
use textcat_core::{Error, Result};

/// Tokens starting with this prefix are labels, not words
pub const LABEL_PREFIX: &str = "__label__";

const NGRAM_MULTIPLIER: u64 = 116_049_371;

/// A vocabulary or label entry with its corpus frequency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub token: String,
    pub count: u64,
}

/// Features and labels extracted from one line of text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoded {
    /// Input-matrix rows: word ids followed by hashed n-gram ids
    pub features: Vec<usize>,

    /// Label ids found on the line
    pub labels: Vec<usize>,

    /// Number of raw tokens on the line, labels included
    pub ntokens: u64,
}

/// Split a line into tokens the same way the corpus is read
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r' | '\0'))
        .filter(|token| !token.is_empty())
}

/// 32-bit FNV-1a; bytes are sign-extended before mixing
pub fn hash(token: &str) -> u32 {
    let mut h: u32 = 2_166_136_261;
    for &byte in token.as_bytes() {
        h ^= byte as i8 as i32 as u32;
        h = h.wrapping_mul(16_777_619);
    }
    h
}

#[derive(Debug, Clone)]
pub struct Dictionary {
    words: Vec<Entry>,
    labels: Vec<Entry>,
    word_ids: HashMap<String, usize>,
    label_ids: HashMap<String, usize>,
    ntokens: u64,
    word_ngrams: usize,
    buckets: usize,
}

impl Dictionary {
    /// Count words and labels over a labeled corpus
    pub fn from_reader(reader: impl BufRead, config: &TrainingConfig) -> Result<Self> {
        let mut counter = TokenCounter::default();
        for line in reader.lines() {
            let line = line?;
            for token in tokenize(&line) {
                counter.add(token);
            }
        }

        let ntokens = counter.ntokens;
        let (mut words, mut labels): (Vec<_>, Vec<_>) = counter
            .entries
            .into_iter()
            .partition(|entry| !entry.token.starts_with(LABEL_PREFIX));

        words.retain(|entry| entry.count >= u64::from(config.min_count));

        // stable sort keeps first-appearance order among equal counts
        words.sort_by(|a, b| b.count.cmp(&a.count));
        labels.sort_by(|a, b| b.count.cmp(&a.count));

        Self::from_parts(
            words,
            labels,
            ntokens,
            config.word_ngrams as usize,
            config.buckets as usize,
        )
    }

    /// Rebuild a dictionary from its serialized parts
    pub fn from_parts(
        words: Vec<Entry>,
        labels: Vec<Entry>,
        ntokens: u64,
        word_ngrams: usize,
        buckets: usize,
    ) -> Result<Self> {
        let word_ids = index_entries(&words, "word")?;
        let label_ids = index_entries(&labels, "label")?;

        Ok(Self {
            words,
            labels,
            word_ids,
            label_ids,
            ntokens,
            word_ngrams,
            buckets,
        })
    }

    pub fn nwords(&self) -> usize {
        self.words.len()
    }

    pub fn nlabels(&self) -> usize {
        self.labels.len()
    }

    /// Total tokens seen while counting, labels included
    pub fn ntokens(&self) -> u64 {
        self.ntokens
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    pub fn word_ngrams(&self) -> usize {
        self.word_ngrams
    }

    pub fn words(&self) -> &[Entry] {
        &self.words
    }

    pub fn labels(&self) -> &[Entry] {
        &self.labels
    }

    pub fn word_id(&self, word: &str) -> Option<usize> {
        self.word_ids.get(word).copied()
    }

    pub fn label_id(&self, label: &str) -> Option<usize> {
        self.label_ids.get(label).copied()
    }

    /// Label text for an id
    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(|entry| entry.token.as_str())
    }

    /// Rows the input matrix needs: one per word plus one per bucket
    pub fn input_rows(&self) -> usize {
        self.words.len() + self.buckets
    }

    /// Extract features and labels from a line.
    ///
    /// Unknown words contribute no word id but still take part in n-gram
    /// hashing; unknown labels are ignored.
    pub fn encode(&self, line: &str) -> Encoded {
        let mut encoded = Encoded::default();
        let mut hashes = Vec::new();

        for token in tokenize(line) {
            encoded.ntokens += 1;
            if token.starts_with(LABEL_PREFIX) {
                if let Some(id) = self.label_id(token) {
                    encoded.labels.push(id);
                }
                continue;
            }
            if let Some(id) = self.word_id(token) {
                encoded.features.push(id);
            }
            hashes.push(hash(token));
        }

        self.push_ngrams(&hashes, &mut encoded.features);
        encoded
    }

    fn push_ngrams(&self, hashes: &[u32], features: &mut Vec<usize>) {
        if self.buckets == 0 || self.word_ngrams < 2 {
            return;
        }
        let nwords = self.words.len();
        let buckets = self.buckets as u64;

        for i in 0..hashes.len() {
            let mut h = u64::from(hashes[i]);
            let end = hashes.len().min(i + self.word_ngrams);
            for &next in &hashes[i + 1..end] {
                h = h.wrapping_mul(NGRAM_MULTIPLIER).wrapping_add(u64::from(next));
                features.push(nwords + (h % buckets) as usize);
            }
        }
    }
}

fn index_entries(entries: &[Entry], kind: &str) -> Result<HashMap<String, usize>> {
    let mut ids = HashMap::with_capacity(entries.len());
    for (id, entry) in entries.iter().enumerate() {
        if ids.insert(entry.token.clone(), id).is_some() {
            return Err(Error::model(format!("duplicate {kind} '{}'", entry.token)));
        }
    }
    Ok(ids)
}

#[derive(Default)]
struct TokenCounter {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    ntokens: u64,
}

impl TokenCounter {
    fn add(&mut self, token: &str) {
        self.ntokens += 1;
        match self.index.get(token) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push(Entry {
                    token: token.to_string(),
                    count: 1,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(word_ngrams: u32, buckets: u32, min_count: u32) -> TrainingConfig {
        TrainingConfig {
            word_ngrams,
            buckets,
            min_count,
            ..Default::default()
        }
    }

    fn build(corpus: &str, config: &TrainingConfig) -> Dictionary {
        Dictionary::from_reader(corpus.as_bytes(), config).unwrap()
    }

    #[test]
    fn test_tokenize_on_ascii_whitespace() {
        let tokens: Vec<_> = tokenize(" a\tb\r\nc\x0Bd  e ").collect();
        assert_eq!(tokens, vec!["a", "b", "c", "d", "e"]);
        // non-breaking space is not a separator
        assert_eq!(tokenize("a\u{00A0}b").count(), 1);
    }

    #[test]
    fn test_hash_reference_values() {
        assert_eq!(hash(""), 2_166_136_261);
        assert_eq!(hash("a"), 0xe40c292c);

        // sign extension makes non-ascii bytes differ from plain FNV-1a
        let plain = "\u{00E9}".bytes().fold(2_166_136_261u32, |h, b| {
            (h ^ u32::from(b)).wrapping_mul(16_777_619)
        });
        assert_ne!(hash("\u{00E9}"), plain);
    }

    #[test]
    fn test_counts_and_ordering() {
        let dict = build(
            "__label__positive b a a\n__label__negative c a b\n__label__negative a\n",
            &config(1, 0, 1),
        );

        let words: Vec<_> = dict.words().iter().map(|e| (e.token.as_str(), e.count)).collect();
        assert_eq!(words, vec![("a", 4), ("b", 2), ("c", 1)]);

        let labels: Vec<_> = dict.labels().iter().map(|e| e.token.as_str()).collect();
        assert_eq!(labels, vec!["__label__negative", "__label__positive"]);
        assert_eq!(dict.ntokens(), 10);
    }

    #[test]
    fn test_min_count_drops_rare_words() {
        let dict = build("__label__x a a b\n", &config(1, 0, 2));
        assert_eq!(dict.nwords(), 1);
        assert_eq!(dict.word_id("b"), None);
        // labels are never thresholded
        assert_eq!(dict.nlabels(), 1);
    }

    #[test]
    fn test_encode_words_and_labels() {
        let dict = build("__label__positive good movie\n__label__negative bad\n", &config(1, 0, 1));
        let encoded = dict.encode("__label__negative good unseen bad");

        assert_eq!(encoded.labels, vec![dict.label_id("__label__negative").unwrap()]);
        assert_eq!(
            encoded.features,
            vec![dict.word_id("good").unwrap(), dict.word_id("bad").unwrap()]
        );
        assert_eq!(encoded.ntokens, 4);
    }

    #[test]
    fn test_bigram_buckets() {
        let dict = build("__label__x a b c\n", &config(2, 100, 1));
        let encoded = dict.encode("a b c");

        // three words, then one bucket per adjacent pair
        assert_eq!(encoded.features.len(), 5);
        for &id in &encoded.features[3..] {
            assert!(id >= dict.nwords() && id < dict.input_rows());
        }

        let expected = {
            let h = u64::from(hash("a"))
                .wrapping_mul(NGRAM_MULTIPLIER)
                .wrapping_add(u64::from(hash("b")));
            dict.nwords() + (h % 100) as usize
        };
        assert_eq!(encoded.features[3], expected);
    }

    #[test]
    fn test_unknown_words_still_hash_into_ngrams() {
        let dict = build("__label__x known\n", &config(2, 10, 1));
        let encoded = dict.encode("foo bar");
        assert_eq!(encoded.features.len(), 1);
        assert!(dict.encode("").features.is_empty());
        assert!(dict.encode("foo").features.is_empty());
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let words = vec![
            Entry { token: "a".into(), count: 1 },
            Entry { token: "a".into(), count: 2 },
        ];
        assert!(Dictionary::from_parts(words, vec![], 0, 1, 0).is_err());
    }
}
