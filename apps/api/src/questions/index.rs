//! Similarity index over the question bank.
//!
//! `QuestionIndex` is the seam the interview pipeline depends on. The default
//! backend, `LexicalIndex`, embeds each record as a TF-IDF weighted sparse
//! vector and ranks by cosine similarity. It is built once at startup and is
//! read-only afterwards, so it is shared across requests behind an `Arc`.

use std::collections::BTreeMap;

use crate::questions::QuestionRecord;

/// Ranked retrieval over a fixed set of questions.
pub trait QuestionIndex: Send + Sync {
    /// Returns at most `top_k` records by descending relevance to `query`.
    /// When `category` is set, only records of that category (case-insensitive) are ranked.
    fn search(&self, query: &str, top_k: usize, category: Option<&str>) -> Vec<QuestionRecord>;

    /// Number of indexed records.
    fn len(&self) -> usize;
}

/// Common English words that carry no retrieval signal.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "for", "from", "have", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "we", "what", "with",
    "you", "your",
];

struct IndexedQuestion {
    record: QuestionRecord,
    weights: BTreeMap<String, f32>,
    norm: f32,
}

pub struct LexicalIndex {
    entries: Vec<IndexedQuestion>,
    idf: BTreeMap<String, f32>,
}

impl LexicalIndex {
    pub fn build(records: Vec<QuestionRecord>) -> Self {
        let term_counts: Vec<BTreeMap<String, f32>> = records
            .iter()
            .map(|r| term_frequencies(&r.document_text()))
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Smoothed IDF: ln((N + 1) / (df + 1)) + 1
        let total = records.len() as f32;
        let idf: BTreeMap<String, f32> = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let weight = ((total + 1.0) / (df as f32 + 1.0)).ln() + 1.0;
                (term.to_string(), weight)
            })
            .collect();

        let entries = records
            .into_iter()
            .zip(term_counts)
            .map(|(record, counts)| {
                let weights = weigh(counts, &idf);
                let norm = l2_norm(&weights);
                IndexedQuestion {
                    record,
                    weights,
                    norm,
                }
            })
            .collect();

        Self { entries, idf }
    }
}

impl QuestionIndex for LexicalIndex {
    fn search(&self, query: &str, top_k: usize, category: Option<&str>) -> Vec<QuestionRecord> {
        let query_weights = weigh(term_frequencies(query), &self.idf);
        let query_norm = l2_norm(&query_weights);

        let mut scored: Vec<(f32, &IndexedQuestion)> = self
            .entries
            .iter()
            .filter(|e| {
                category
                    .map(|c| e.record.category.trim().eq_ignore_ascii_case(c.trim()))
                    .unwrap_or(true)
            })
            .map(|e| (cosine_similarity(&query_weights, query_norm, e), e))
            .collect();

        // Stable sort keeps corpus order among equally relevant records
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored.into_iter().map(|(_, e)| e.record.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
}

fn term_frequencies(text: &str) -> BTreeMap<String, f32> {
    let mut counts = BTreeMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

/// Applies IDF weights. Terms absent from the corpus vocabulary are dropped.
fn weigh(counts: BTreeMap<String, f32>, idf: &BTreeMap<String, f32>) -> BTreeMap<String, f32> {
    counts
        .into_iter()
        .filter_map(|(term, tf)| idf.get(&term).map(|w| (term, tf * w)))
        .collect()
}

fn l2_norm(weights: &BTreeMap<String, f32>) -> f32 {
    weights.values().map(|w| w * w).sum::<f32>().sqrt()
}

fn cosine_similarity(query: &BTreeMap<String, f32>, query_norm: f32, doc: &IndexedQuestion) -> f32 {
    let denom = query_norm * doc.norm;
    if denom == 0.0 {
        return 0.0;
    }

    let dot: f32 = query
        .iter()
        .filter_map(|(term, w)| doc.weights.get(term).map(|d| w * d))
        .sum();
    dot / denom
}
