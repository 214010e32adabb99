//! Result tables
//!
//! Joins alignments with caller metadata and renders them. All formatting
//! choices arrive through [`ReportOptions`].

use serde::{Deserialize, Serialize};

use crate::align::Alignment;
use crate::record::format_aligned;

pub const COLUMNS: [&str; 12] = [
    "record_id",
    "template_name",
    "template_aligned",
    "record_aligned",
    "score",
    "adjusted_score",
    "template_start",
    "template_end",
    "record_start",
    "record_end",
    "aligned_count",
    "total_span_length",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub delimiter: char,
    /// Render spans one-based inclusive instead of zero-based half-open
    pub one_based: bool,
    /// Decimal places for scores in delimited output
    pub precision: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            one_based: true,
            precision: 4,
        }
    }
}

/// One output row: an alignment of a template (s1) within a record (s2)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRecord {
    pub record_id: String,
    pub template_name: String,
    pub template_aligned: String,
    pub record_aligned: String,
    pub score: f64,
    pub adjusted_score: f64,
    pub template_start: usize,
    pub template_end: usize,
    pub record_start: usize,
    pub record_end: usize,
    pub aligned_count: usize,
    pub total_span_length: usize,
}

impl AlignmentRecord {
    pub fn new(record_id: &str, template_name: &str, alignment: &Alignment, options: &ReportOptions) -> Self {
        let (template_start, template_end, record_start, record_end) = if options.one_based {
            let (ts, te) = alignment.s1_span.one_based();
            let (rs, re) = alignment.s2_span.one_based();
            (ts, te, rs, re)
        } else {
            (
                alignment.s1_span.start,
                alignment.s1_span.end,
                alignment.s2_span.start,
                alignment.s2_span.end,
            )
        };

        Self {
            record_id: record_id.to_string(),
            template_name: template_name.to_string(),
            template_aligned: format_aligned(&alignment.s1_aligned),
            record_aligned: format_aligned(&alignment.s2_aligned),
            score: alignment.raw_score,
            adjusted_score: alignment.adjusted_score,
            template_start,
            template_end,
            record_start,
            record_end,
            aligned_count: alignment.aligned_count,
            total_span_length: alignment.total_span_length,
        }
    }

    pub fn to_row(&self, options: &ReportOptions) -> String {
        let p = options.precision;
        [
            self.record_id.clone(),
            self.template_name.clone(),
            self.template_aligned.clone(),
            self.record_aligned.clone(),
            format!("{:.*}", p, self.score),
            format!("{:.*}", p, self.adjusted_score),
            self.template_start.to_string(),
            self.template_end.to_string(),
            self.record_start.to_string(),
            self.record_end.to_string(),
            self.aligned_count.to_string(),
            self.total_span_length.to_string(),
        ]
        .join(&options.delimiter.to_string())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn header(options: &ReportOptions) -> String {
    COLUMNS.join(&options.delimiter.to_string())
}

/// Records for every alignment of one (record, template) pair, best first
pub fn assemble(
    record_id: &str,
    template_name: &str,
    alignments: &[Alignment],
    options: &ReportOptions,
) -> Vec<AlignmentRecord> {
    alignments
        .iter()
        .map(|a| AlignmentRecord::new(record_id, template_name, a, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignedToken, Event, Span};

    fn sample() -> Alignment {
        Alignment {
            s1_aligned: vec![
                AlignedToken::Event(Event::new(14.0, "pemetrexed")),
                AlignedToken::Event(Event::new(14.0, "pemetrexed")),
            ],
            s2_aligned: vec![
                AlignedToken::Event(Event::new(21.0, "pemetrexed")),
                AlignedToken::Event(Event::new(21.0, "pemetrexed")),
            ],
            raw_score: 1.25,
            adjusted_score: 0.625,
            s1_span: Span::new(0, 2),
            s2_span: Span::new(3, 5),
            aligned_count: 2,
            total_span_length: 2,
            s1_gaps: 0,
            s2_gaps: 0,
        }
    }

    #[test]
    fn test_one_based_row() {
        let options = ReportOptions::default();
        let rec = AlignmentRecord::new("test1", "Regimen1", &sample(), &options);
        assert_eq!((rec.template_start, rec.template_end), (1, 2));
        assert_eq!((rec.record_start, rec.record_end), (4, 5));

        let row = rec.to_row(&options);
        let fields: Vec<&str> = row.split('\t').collect();
        assert_eq!(fields.len(), COLUMNS.len());
        assert_eq!(fields[2], "14.pemetrexed;14.pemetrexed");
        assert_eq!(fields[4], "1.2500");
    }

    #[test]
    fn test_zero_based_csv() {
        let options = ReportOptions {
            delimiter: ',',
            one_based: false,
            precision: 2,
        };
        let rec = AlignmentRecord::new("p", "r", &sample(), &options);
        assert_eq!(rec.record_start, 3);
        assert!(header(&options).starts_with("record_id,template_name,"));
        assert!(rec.to_row(&options).contains(",1.25,"));
    }

    #[test]
    fn test_json_output() {
        let rec = AlignmentRecord::new("p", "r", &sample(), &ReportOptions::default());
        let json = rec.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["template_name"], "r");
        assert_eq!(value["aligned_count"], 2);
    }

    #[test]
    fn test_assemble_keeps_order() {
        let mut second = sample();
        second.raw_score = 0.5;
        let rows = assemble("p", "r", &[sample(), second], &ReportOptions::default());
        assert_eq!(rows.len(), 2);
        assert!(rows[0].score > rows[1].score);
    }
}
