//! Backward reconstruction of an alignment from the trace matrix
//!
//! The walk starts at an extracted cell and follows trace codes until the
//! first `None` cell. Span boundaries and gap counts are tracked as the walk
//! proceeds; nothing is recovered from a rendered string afterwards.

use serde::Serialize;

use crate::error::{TswError, TswResult};
use crate::matrix::{TraceCode, TraceMatrix};
use crate::types::{AlignedToken, Cell, Sequence, Span};

/// Structural result of one traceback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traceback {
    pub s1_aligned: Vec<AlignedToken>,
    pub s2_aligned: Vec<AlignedToken>,
    /// Number of `Diag` moves, i.e. matched pairs
    pub aligned_count: usize,
    pub s1_span: Span,
    pub s2_span: Span,
    /// Gap markers on the s1 side (`Up` moves)
    pub s1_gaps: usize,
    /// Gap markers on the s2 side (`Left` moves)
    pub s2_gaps: usize,
}

impl Traceback {
    /// Number of alignment columns, gaps included
    pub fn len(&self) -> usize {
        self.s1_aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s1_aligned.is_empty()
    }
}

/// Spans and counts of a walk, without the tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub s1_span: Span,
    pub s2_span: Span,
    pub aligned_count: usize,
    pub s1_gaps: usize,
    pub s2_gaps: usize,
}

/// Walk backward from `start`, reporting each move and the cell it leaves
///
/// Stops at the first `None` cell or at the matrix boundary.
fn walk<F>(trace: &TraceMatrix, start: Cell, mut visit: F) -> TswResult<WalkSummary>
where
    F: FnMut(TraceCode, usize, usize),
{
    if start.row >= trace.rows() || start.col >= trace.cols() {
        return Err(TswError::invalid_parameter(format!(
            "traceback start ({}, {}) outside a {}x{} trace matrix",
            start.row,
            start.col,
            trace.rows(),
            trace.cols()
        )));
    }

    let (mut j, mut i) = (start.row, start.col);
    let mut aligned_count = 0;
    let mut s1_gaps = 0;
    let mut s2_gaps = 0;

    while j > 0 && i > 0 {
        let code = trace.get(j, i)?;
        match code {
            TraceCode::None => break,
            TraceCode::Diag => {
                visit(code, j, i);
                aligned_count += 1;
                i -= 1;
                j -= 1;
            }
            TraceCode::Left => {
                visit(code, j, i);
                s2_gaps += 1;
                i -= 1;
            }
            TraceCode::Up => {
                visit(code, j, i);
                s1_gaps += 1;
                j -= 1;
            }
        }
    }

    Ok(WalkSummary {
        s1_span: Span::new(i, start.col),
        s2_span: Span::new(j, start.row),
        aligned_count,
        s1_gaps,
        s2_gaps,
    })
}

/// Spans covered by the alignment ending at `start`, without building tokens
pub fn trace_span(trace: &TraceMatrix, start: Cell) -> TswResult<WalkSummary> {
    walk(trace, start, |_, _, _| {})
}

/// Rebuild the aligned token sequences for the alignment ending at `start`
pub fn reconstruct(
    trace: &TraceMatrix,
    s1: &Sequence,
    s2: &Sequence,
    start: Cell,
) -> TswResult<Traceback> {
    if trace.cols() != s1.len() + 1 || trace.rows() != s2.len() + 1 {
        return Err(TswError::invalid_parameter(format!(
            "trace matrix is {}x{} but sequences need {}x{}",
            trace.rows(),
            trace.cols(),
            s2.len() + 1,
            s1.len() + 1
        )));
    }

    let mut s1_aligned = Vec::new();
    let mut s2_aligned = Vec::new();

    let summary = walk(trace, start, |code, j, i| {
        let (left, right) = match code {
            TraceCode::Diag => (
                AlignedToken::Event(s1.events[i - 1].clone()),
                AlignedToken::Event(s2.events[j - 1].clone()),
            ),
            TraceCode::Left => (AlignedToken::Event(s1.events[i - 1].clone()), AlignedToken::Gap),
            TraceCode::Up => (AlignedToken::Gap, AlignedToken::Event(s2.events[j - 1].clone())),
            TraceCode::None => return,
        };
        s1_aligned.push(left);
        s2_aligned.push(right);
    })?;

    s1_aligned.reverse();
    s2_aligned.reverse();

    Ok(Traceback {
        s1_aligned,
        s2_aligned,
        aligned_count: summary.aligned_count,
        s1_span: summary.s1_span,
        s2_span: summary.s2_span,
        s1_gaps: summary.s1_gaps,
        s2_gaps: summary.s2_gaps,
    })
}
