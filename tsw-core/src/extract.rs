//! Best and secondary alignment extraction
//!
//! Repeatedly takes the global maximum of a working copy of H (first
//! occurrence in row-major order wins ties). With overlap removal the
//! positions consumed by each accepted alignment are masked to zero along
//! the configured axis; a later candidate whose traceback would reach into a
//! masked range is discarded and the search continues. Without overlap
//! removal only the accepted cell itself is zeroed.

use serde::{Deserialize, Serialize};

use crate::error::{TswError, TswResult};
use crate::matrix::{ScoreMatrix, TraceMatrix};
use crate::traceback::{trace_span, WalkSummary};
use crate::types::{Cell, Span};

/// Axis along which accepted alignments exclude later ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionAxis {
    /// Columns: s1 positions may be used by one alignment only
    #[default]
    S1,
    /// Rows: s2 positions may be used by one alignment only
    S2,
    /// The rectangle spanned on both axes
    Both,
}

impl std::str::FromStr for ExclusionAxis {
    type Err = TswError;

    fn from_str(s: &str) -> TswResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s1" => Ok(Self::S1),
            "s2" => Ok(Self::S2),
            "both" => Ok(Self::Both),
            other => Err(TswError::invalid_parameter(format!(
                "unknown exclusion axis '{}', expected s1, s2 or both",
                other
            ))),
        }
    }
}

/// Limit on how many alignments to extract; `-1` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MaxAlignments(Option<usize>);

impl MaxAlignments {
    pub const UNBOUNDED: MaxAlignments = MaxAlignments(None);

    pub fn limit(n: usize) -> Self {
        Self(Some(n))
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }

    fn reached(&self, count: usize) -> bool {
        matches!(self.0, Some(limit) if count >= limit)
    }
}

impl Default for MaxAlignments {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl TryFrom<i64> for MaxAlignments {
    type Error = TswError;

    fn try_from(mem: i64) -> TswResult<Self> {
        match mem {
            -1 => Ok(Self::UNBOUNDED),
            n if n >= 0 => Ok(Self(Some(n as usize))),
            n => Err(TswError::invalid_parameter(format!(
                "mem must be -1 (unbounded) or >= 0, got {}",
                n
            ))),
        }
    }
}

impl From<MaxAlignments> for i64 {
    fn from(mem: MaxAlignments) -> Self {
        mem.0.map(|n| n as i64).unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractParams {
    pub max_alignments: MaxAlignments,
    pub remove_overlap: bool,
    pub exclusion: ExclusionAxis,
    /// Diagnostic logging level; has no effect on results
    pub verbose: u8,
}

impl Default for ExtractParams {
    /// Same extraction as `AlignParams::default()`: unbounded, overlap removed on s1
    fn default() -> Self {
        Self {
            max_alignments: MaxAlignments::UNBOUNDED,
            remove_overlap: true,
            exclusion: ExclusionAxis::default(),
            verbose: 0,
        }
    }
}

/// One extracted alignment end point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub cell: Cell,
    pub score: f64,
}

/// Extracted hits, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub hits: Vec<Hit>,
}

impl Extraction {
    pub fn best(&self) -> Option<&Hit> {
        self.hits.first()
    }

    pub fn final_score(&self) -> f64 {
        self.best().map(|h| h.score).unwrap_or(0.0)
    }

    pub fn indices(&self) -> Vec<Cell> {
        self.hits.iter().map(|h| h.cell).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.hits.iter().map(|h| h.score).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

pub struct BestScoreExtractor<'a> {
    h: &'a ScoreMatrix,
    trace: &'a TraceMatrix,
    params: ExtractParams,
}

impl<'a> BestScoreExtractor<'a> {
    pub fn new(h: &'a ScoreMatrix, trace: &'a TraceMatrix, params: ExtractParams) -> TswResult<Self> {
        if h.rows() != trace.rows() || h.cols() != trace.cols() {
            return Err(TswError::invalid_parameter(format!(
                "score matrix is {}x{} but trace matrix is {}x{}",
                h.rows(),
                h.cols(),
                trace.rows(),
                trace.cols()
            )));
        }
        Ok(Self { h, trace, params })
    }

    pub fn extract(&self) -> TswResult<Extraction> {
        let mut extraction = Extraction::default();
        if self.params.max_alignments.reached(0) {
            return Ok(extraction);
        }

        let mut work = self.h.clone();
        let mut claimed: Vec<WalkSummary> = Vec::new();

        while !self.params.max_alignments.reached(extraction.len()) {
            let Some((cell, score)) = max_cell(&work) else {
                break;
            };

            if !self.params.remove_overlap {
                work.set(cell.row, cell.col, 0.0);
                self.accept(&mut extraction, cell, score);
                continue;
            }

            let summary = trace_span(self.trace, cell)?;
            if claimed.iter().any(|c| self.collides(c, &summary)) {
                log::trace!(
                    "Discarding candidate at ({}, {}) with score {:.4}: reaches a claimed range",
                    cell.row,
                    cell.col,
                    score
                );
                work.set(cell.row, cell.col, 0.0);
                continue;
            }

            self.mask(&mut work, &summary);
            claimed.push(summary);
            self.accept(&mut extraction, cell, score);
        }

        Ok(extraction)
    }

    fn accept(&self, extraction: &mut Extraction, cell: Cell, score: f64) {
        if self.params.verbose > 0 {
            log::info!(
                "Alignment {} ends at (row {}, col {}) with score {:.4}",
                extraction.len() + 1,
                cell.row,
                cell.col,
                score
            );
        } else {
            log::trace!("Accepted ({}, {}) score {:.4}", cell.row, cell.col, score);
        }
        extraction.hits.push(Hit { cell, score });
    }

    fn collides(&self, claimed: &WalkSummary, candidate: &WalkSummary) -> bool {
        let s1 = claimed.s1_span.overlaps(&candidate.s1_span);
        let s2 = claimed.s2_span.overlaps(&candidate.s2_span);
        match self.params.exclusion {
            ExclusionAxis::S1 => s1,
            ExclusionAxis::S2 => s2,
            ExclusionAxis::Both => s1 && s2,
        }
    }

    fn mask(&self, work: &mut ScoreMatrix, summary: &WalkSummary) {
        let all_rows = Span::new(1, work.rows());
        let all_cols = Span::new(1, work.cols());
        let (rows, cols) = match self.params.exclusion {
            ExclusionAxis::S1 => (all_rows, matrix_span(summary.s1_span)),
            ExclusionAxis::S2 => (matrix_span(summary.s2_span), all_cols),
            ExclusionAxis::Both => (matrix_span(summary.s2_span), matrix_span(summary.s1_span)),
        };

        for row in rows.range() {
            for col in cols.range() {
                work.set(row, col, 0.0);
            }
        }
    }
}

/// Matrix indices of the cells that consume the positions of `span`
fn matrix_span(span: Span) -> Span {
    Span::new(span.start + 1, span.end + 1)
}

/// First strictly positive maximum in row-major order
fn max_cell(h: &ScoreMatrix) -> Option<(Cell, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in h.as_slice().iter().enumerate() {
        debug_assert!(value.is_finite(), "non-finite score at flat index {}", idx);
        if value > best.map(|(_, v)| v).unwrap_or(0.0) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, value)| (h.cell_of(idx), value))
}
