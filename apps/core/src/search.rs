use crate::model::{normalize_for_search, Record};

// Any primary-field match outweighs the best secondary-field match.
const PRIMARY_WEIGHT: u32 = 5;
const SECONDARY_WEIGHT: u32 = 1;

/// How well one query term matches one field, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchKind {
    Contains = 1,
    WordStart = 2,
    FieldStart = 3,
    Exact = 4,
}

/// A field value prepared for matching: the whole value compacted, plus its
/// individual words.
struct FieldText {
    compact: String,
    words: Vec<String>,
}

impl FieldText {
    fn new(raw: &str) -> Self {
        Self {
            compact: normalize_for_search(raw),
            words: split_terms(raw),
        }
    }

    fn match_term(&self, term: &str) -> Option<MatchKind> {
        if self.compact == term {
            Some(MatchKind::Exact)
        } else if self.compact.starts_with(term) {
            Some(MatchKind::FieldStart)
        } else if self.words.iter().any(|word| word.starts_with(term)) {
            Some(MatchKind::WordStart)
        } else if self.compact.contains(term) {
            Some(MatchKind::Contains)
        } else {
            None
        }
    }
}

fn split_terms(raw: &str) -> Vec<String> {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(normalize_for_search)
        .collect()
}

/// Ranks `records` against `query` and keeps the best `limit` matches.
///
/// Every query word must match the primary field (title) or the secondary
/// field (subtitle). Each word scores by match strength times the field
/// weight; ties prefer the shorter title, then the input order.
pub fn rank(records: Vec<Record>, query: &str, limit: usize) -> Vec<Record> {
    if limit == 0 || records.is_empty() {
        return Vec::new();
    }

    let terms = split_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, usize, usize, Record)> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let title = FieldText::new(&record.title);
            let score = score_record(&title, record.subtitle.as_deref(), &terms)?;
            Some((score, title.compact.len(), index, record))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, _, _, record)| record)
        .collect()
}

fn score_record(title: &FieldText, subtitle: Option<&str>, terms: &[String]) -> Option<u32> {
    let subtitle = subtitle.map(FieldText::new);

    terms.iter().try_fold(0, |total, term| {
        let primary = title
            .match_term(term)
            .map(|kind| kind as u32 * PRIMARY_WEIGHT);
        let secondary = subtitle
            .as_ref()
            .and_then(|field| field.match_term(term))
            .map(|kind| kind as u32 * SECONDARY_WEIGHT);
        primary.max(secondary).map(|best| total + best)
    })
}
