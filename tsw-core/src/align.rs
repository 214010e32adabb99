//! Alignment requests
//!
//! One request owns its matrices from fill to reconstruction; nothing is
//! shared between requests, so callers may run many of them in parallel.

use serde::{Deserialize, Serialize};

use crate::error::{TswError, TswResult};
use crate::extract::{BestScoreExtractor, ExclusionAxis, ExtractParams, Extraction, MaxAlignments};
use crate::score::{ScoreMatrices, ScoreMatrixBuilder};
use crate::similarity::SimilarityTable;
use crate::time_weight::TimeWeightMethod;
use crate::traceback::reconstruct;
use crate::types::{AlignedToken, Sequence, Span, TimeEncoding};

/// Parameters of an alignment request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignParams {
    /// Gap penalty `g`, subtracted per gap move
    pub gap_penalty: f64,
    /// Time-penalty parameter `T`
    pub time_param: f64,
    pub method: TimeWeightMethod,
    /// `mem`: -1 for unbounded
    pub max_alignments: MaxAlignments,
    pub remove_overlap: bool,
    pub exclusion: ExclusionAxis,
    pub time_encoding: TimeEncoding,
    pub verbose: u8,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            gap_penalty: 0.4,
            time_param: 0.5,
            method: TimeWeightMethod::PropDiff,
            max_alignments: MaxAlignments::UNBOUNDED,
            remove_overlap: true,
            exclusion: ExclusionAxis::S1,
            time_encoding: TimeEncoding::Elapsed,
            verbose: 0,
        }
    }
}

impl AlignParams {
    pub fn with_gap_penalty(mut self, g: f64) -> Self {
        self.gap_penalty = g;
        self
    }

    pub fn with_time_param(mut self, t: f64) -> Self {
        self.time_param = t;
        self
    }

    pub fn with_method(mut self, method: TimeWeightMethod) -> Self {
        self.method = method;
        self
    }

    /// Set `mem`, rejecting values below -1
    pub fn with_mem(mut self, mem: i64) -> TswResult<Self> {
        self.max_alignments = MaxAlignments::try_from(mem)?;
        Ok(self)
    }

    pub fn with_remove_overlap(mut self, remove_overlap: bool) -> Self {
        self.remove_overlap = remove_overlap;
        self
    }

    pub fn with_exclusion(mut self, exclusion: ExclusionAxis) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn with_time_encoding(mut self, encoding: TimeEncoding) -> Self {
        self.time_encoding = encoding;
        self
    }

    pub fn validate(&self) -> TswResult<()> {
        if !self.gap_penalty.is_finite() || self.gap_penalty < 0.0 {
            return Err(TswError::invalid_parameter(format!(
                "gap penalty must be a finite value >= 0, got {}",
                self.gap_penalty
            )));
        }
        if !self.time_param.is_finite() {
            return Err(TswError::invalid_parameter(format!(
                "time-penalty parameter must be finite, got {}",
                self.time_param
            )));
        }
        Ok(())
    }

    fn extract_params(&self) -> ExtractParams {
        ExtractParams {
            max_alignments: self.max_alignments,
            remove_overlap: self.remove_overlap,
            exclusion: self.exclusion,
            verbose: self.verbose,
        }
    }
}

/// One extracted alignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub s1_aligned: Vec<AlignedToken>,
    pub s2_aligned: Vec<AlignedToken>,
    pub raw_score: f64,
    /// `raw_score / total_span_length`
    pub adjusted_score: f64,
    pub s1_span: Span,
    pub s2_span: Span,
    /// Matched pairs
    pub aligned_count: usize,
    /// Matched pairs plus the leading s1 positions the alignment skipped
    pub total_span_length: usize,
    pub s1_gaps: usize,
    pub s2_gaps: usize,
}

impl Alignment {
    /// Number of alignment columns, gaps included
    pub fn len(&self) -> usize {
        self.s1_aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s1_aligned.is_empty()
    }
}

/// Everything a request produced, matrices included
#[derive(Debug, Clone)]
pub struct AlignmentOutcome {
    pub matrices: ScoreMatrices,
    pub extraction: Extraction,
    pub alignments: Vec<Alignment>,
}

/// Runs alignment requests against one similarity table
#[derive(Debug, Clone)]
pub struct TswAligner<'a> {
    table: &'a SimilarityTable,
    params: AlignParams,
}

impl<'a> TswAligner<'a> {
    /// Validates parameters before anything is allocated
    pub fn new(table: &'a SimilarityTable, params: AlignParams) -> TswResult<Self> {
        params.validate()?;
        Ok(Self { table, params })
    }

    pub fn params(&self) -> &AlignParams {
        &self.params
    }

    /// Align `s1` (template) against `s2` (record); alignments best first
    pub fn align(&self, s1: &Sequence, s2: &Sequence) -> TswResult<Vec<Alignment>> {
        Ok(self.align_detailed(s1, s2)?.alignments)
    }

    /// Like [`align`](Self::align) but keeps the filled matrices and hits
    pub fn align_detailed(&self, s1: &Sequence, s2: &Sequence) -> TswResult<AlignmentOutcome> {
        let p = &self.params;
        let e1 = self.table.encode(s1, p.time_encoding)?;
        let e2 = self.table.encode(s2, p.time_encoding)?;

        let builder = ScoreMatrixBuilder::new(self.table, p.gap_penalty, p.time_param)?;
        let matrices = builder.build(&e1, &e2, p.method)?;

        let extraction =
            BestScoreExtractor::new(&matrices.h, &matrices.trace, p.extract_params())?.extract()?;
        log::debug!(
            "Extracted {} alignment(s) from {}x{} matrices, best score {:.4}",
            extraction.len(),
            matrices.h.rows(),
            matrices.h.cols(),
            extraction.final_score()
        );

        let alignments = extraction
            .hits
            .iter()
            .map(|hit| {
                let tb = reconstruct(&matrices.trace, s1, s2, hit.cell)?;
                let total_span_length = tb.aligned_count + tb.s1_span.start;
                let adjusted_score = if total_span_length > 0 {
                    hit.score / total_span_length as f64
                } else {
                    0.0
                };
                Ok(Alignment {
                    s1_aligned: tb.s1_aligned,
                    s2_aligned: tb.s2_aligned,
                    raw_score: hit.score,
                    adjusted_score,
                    s1_span: tb.s1_span,
                    s2_span: tb.s2_span,
                    aligned_count: tb.aligned_count,
                    total_span_length,
                    s1_gaps: tb.s1_gaps,
                    s2_gaps: tb.s2_gaps,
                })
            })
            .collect::<TswResult<Vec<_>>>()?;

        Ok(AlignmentOutcome {
            matrices,
            extraction,
            alignments,
        })
    }
}

/// One-shot convenience wrapper around [`TswAligner`]
pub fn align(
    s1: &Sequence,
    s2: &Sequence,
    table: &SimilarityTable,
    params: &AlignParams,
) -> TswResult<Vec<Alignment>> {
    TswAligner::new(table, *params)?.align(s1, s2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;

    fn seq(events: &[(f64, &str)]) -> Sequence {
        events.iter().map(|&(t, l)| Event::new(t, l)).collect()
    }

    #[test]
    fn test_default_params() {
        let p = AlignParams::default();
        assert_eq!(p.gap_penalty, 0.4);
        assert_eq!(p.time_param, 0.5);
        assert_eq!(p.method, TimeWeightMethod::PropDiff);
        assert_eq!(p.max_alignments, MaxAlignments::UNBOUNDED);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_default_extract_params_match_aligner() {
        let defaults = ExtractParams::default();
        assert!(defaults.remove_overlap);
        assert_eq!(defaults, AlignParams::default().extract_params());
    }

    #[test]
    fn test_invalid_params_rejected_at_setup() {
        let table = SimilarityTable::with_defaults(["a"]).unwrap();
        let bad = AlignParams::default().with_gap_penalty(-1.0);
        assert!(matches!(TswAligner::new(&table, bad), Err(TswError::InvalidParameter(_))));
        assert!(AlignParams::default().with_mem(-3).is_err());
    }

    #[test]
    fn test_missing_label_surfaces() {
        let table = SimilarityTable::with_defaults(["a"]).unwrap();
        let err = align(
            &seq(&[(0.0, "a")]),
            &seq(&[(0.0, "b")]),
            &table,
            &AlignParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, TswError::missing_label("b"));
    }

    #[test]
    fn test_empty_sequence_yields_no_alignments() {
        let table = SimilarityTable::with_defaults(["a"]).unwrap();
        let out = align(&Sequence::default(), &seq(&[(0.0, "a")]), &table, &AlignParams::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_adjusted_score_uses_skipped_prefix() {
        // s1 = x a b, s2 = a b: the leading x is skipped
        let table = SimilarityTable::with_defaults(["x", "a", "b"]).unwrap();
        let params = AlignParams::default().with_method(TimeWeightMethod::Uniform);
        let out = align(
            &seq(&[(0.0, "x"), (0.0, "a"), (0.0, "b")]),
            &seq(&[(0.0, "a"), (0.0, "b")]),
            &table,
            &params,
        )
        .unwrap();

        let best = &out[0];
        assert_eq!(best.aligned_count, 2);
        assert_eq!(best.s1_span, Span::new(1, 3));
        assert_eq!(best.total_span_length, 3);
        assert!((best.raw_score - 2.0).abs() < 1e-9);
        assert!((best.adjusted_score - 2.0 / 3.0).abs() < 1e-9);
    }
}
