//! Label-by-label similarity lookup
//!
//! The table is stored as a dense row-major matrix over a label alphabet.
//! Sequences are encoded against that alphabet once per request so the
//! matrix fill only does index arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{TswError, TswResult};
use crate::types::{Sequence, TimeEncoding};

/// Conventional self-similarity of generated tables
pub const DEFAULT_MATCH: f64 = 1.0;
/// Conventional cross-label similarity of generated tables
pub const DEFAULT_MISMATCH: f64 = -1.1;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimilarityTable")]
pub struct SimilarityTable {
    labels: Vec<String>,
    values: Vec<f64>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Serialized form, checked by `from_matrix` before it becomes a table
#[derive(Debug, Deserialize)]
struct RawSimilarityTable {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl TryFrom<RawSimilarityTable> for SimilarityTable {
    type Error = TswError;

    fn try_from(raw: RawSimilarityTable) -> TswResult<Self> {
        let n = raw.labels.len();
        if raw.values.len() != n * n {
            return Err(TswError::InvalidSimilarityTable(format!(
                "{} labels need {} values, found {}",
                n,
                n * n,
                raw.values.len()
            )));
        }
        let rows = if n == 0 {
            Vec::new()
        } else {
            raw.values.chunks(n).map(<[f64]>::to_vec).collect()
        };
        Self::from_matrix(raw.labels, rows)
    }
}

/// Sequence mapped onto a similarity table's alphabet
///
/// Times are already converted to elapsed-time deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSequence {
    pub deltas: Vec<f64>,
    pub labels: Vec<usize>,
}

impl EncodedSequence {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl SimilarityTable {
    /// Build a table from a square matrix, one row per label
    pub fn from_matrix(labels: Vec<String>, rows: Vec<Vec<f64>>) -> TswResult<Self> {
        let n = labels.len();
        if rows.len() != n {
            return Err(TswError::InvalidSimilarityTable(format!(
                "{} labels but {} rows",
                n,
                rows.len()
            )));
        }

        let mut index = HashMap::with_capacity(n);
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(TswError::InvalidSimilarityTable(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
        }

        let mut values = Vec::with_capacity(n * n);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TswError::InvalidSimilarityTable(format!(
                    "row '{}' has {} values, expected {}",
                    labels[r],
                    row.len(),
                    n
                )));
            }
            for (c, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(TswError::invalid_score(format!(
                        "non-finite similarity {} for ('{}', '{}')",
                        value, labels[r], labels[c]
                    )));
                }
            }
            values.extend_from_slice(row);
        }

        for r in 0..n {
            for c in (r + 1)..n {
                let (a, b) = (values[r * n + c], values[c * n + r]);
                if (a - b).abs() > SYMMETRY_TOLERANCE {
                    return Err(TswError::InvalidSimilarityTable(format!(
                        "asymmetric entry ('{}', '{}'): {} vs {}",
                        labels[r], labels[c], a, b
                    )));
                }
            }
        }

        Ok(Self { labels, values, index })
    }

    /// Table with one value on the diagonal and another everywhere else
    pub fn uniform<I, S>(labels: I, match_score: f64, mismatch_score: f64) -> TswResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !unique.contains(&label) {
                unique.push(label);
            }
        }

        let n = unique.len();
        let rows = (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| if r == c { match_score } else { mismatch_score })
                    .collect()
            })
            .collect();

        Self::from_matrix(unique, rows)
    }

    /// Uniform table with the conventional 1.0 / -1.1 scores
    pub fn with_defaults<I, S>(labels: I) -> TswResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::uniform(labels, DEFAULT_MATCH, DEFAULT_MISMATCH)
    }

    /// Parse a delimited matrix: a header of labels (an optional leading
    /// corner cell is ignored) followed by one `label, v1, v2, ...` row per label
    pub fn parse_delimited(text: &str, delimiter: char) -> TswResult<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header = lines
            .next()
            .ok_or_else(|| TswError::InvalidSimilarityTable("empty similarity matrix".to_string()))?;
        let mut header_labels: Vec<String> = header
            .split(delimiter)
            .map(|s| s.trim().to_string())
            .collect();

        let body: Vec<&str> = lines.collect();
        if header_labels.len() == body.len() + 1 {
            header_labels.remove(0);
        }

        let mut rows = Vec::with_capacity(body.len());
        for (r, line) in body.iter().enumerate() {
            let mut fields = line.split(delimiter).map(str::trim);
            let row_label = fields.next().unwrap_or_default();
            if header_labels.get(r).map(String::as_str) != Some(row_label) {
                return Err(TswError::InvalidSimilarityTable(format!(
                    "row {} is labelled '{}', expected '{}'",
                    r + 1,
                    row_label,
                    header_labels.get(r).map(String::as_str).unwrap_or("<none>")
                )));
            }
            let row = fields
                .map(|f| {
                    f.parse::<f64>().map_err(|_| {
                        TswError::InvalidSimilarityTable(format!(
                            "invalid value '{}' in row '{}'",
                            f, row_label
                        ))
                    })
                })
                .collect::<TswResult<Vec<f64>>>()?;
            rows.push(row);
        }

        Self::from_matrix(header_labels, rows)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> TswResult<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| TswError::missing_label(label))
    }

    /// Similarity between two encoded labels
    #[inline]
    pub fn score(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.labels.len() + b]
    }

    pub fn score_labels(&self, a: &str, b: &str) -> TswResult<f64> {
        Ok(self.score(self.index_of(a)?, self.index_of(b)?))
    }

    /// Map a sequence onto this table's alphabet
    pub fn encode(&self, sequence: &Sequence, encoding: TimeEncoding) -> TswResult<EncodedSequence> {
        let labels = sequence
            .labels()
            .map(|label| self.index_of(label))
            .collect::<TswResult<Vec<usize>>>()?;
        let deltas = sequence.time_deltas(encoding)?;

        Ok(EncodedSequence { deltas, labels })
    }
}
