//! Dense row-major matrices for the dynamic-programming fill
//!
//! Every matrix of a request has shape `(len(s2) + 1) x (len(s1) + 1)`;
//! row 0 and column 0 are the boundary.

use serde::Serialize;

use crate::error::{TswError, TswResult};
use crate::types::Cell;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DpMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> DpMatrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }
}

impl<T: Copy> DpMatrix<T> {
    /// Wrap an existing row-major buffer
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> TswResult<Self> {
        if data.len() != rows * cols {
            return Err(TswError::invalid_parameter(format!(
                "buffer of {} cells cannot form a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = row * self.cols + col;
        self.data[idx] = value;
    }

    pub fn at(&self, cell: Cell) -> T {
        self.get(cell.row, cell.col)
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Cell for a flat row-major index
    pub fn cell_of(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact panics on a zero chunk size; a zero-column matrix has no rows to show
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }
}

pub type ScoreMatrix = DpMatrix<f64>;

/// Move that produced a cell's value in the H matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TraceCode {
    /// Alignment start; H is 0 here
    None = 0,
    /// Consume one element of each sequence
    Diag = 1,
    /// Consume only an s2 element (TR source)
    Up = 2,
    /// Consume only an s1 element (TC source)
    Left = 3,
}

impl TraceCode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TraceCode::None),
            1 => Some(TraceCode::Diag),
            2 => Some(TraceCode::Up),
            3 => Some(TraceCode::Left),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Move codes stored as raw bytes, as exchanged with other tools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceMatrix {
    codes: DpMatrix<u8>,
}

impl TraceMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            codes: DpMatrix::new(rows, cols),
        }
    }

    /// Adopt externally produced codes; they are checked lazily on traceback
    pub fn from_codes(rows: usize, cols: usize, codes: Vec<u8>) -> TswResult<Self> {
        Ok(Self {
            codes: DpMatrix::from_vec(rows, cols, codes)?,
        })
    }

    pub fn rows(&self) -> usize {
        self.codes.rows()
    }

    pub fn cols(&self) -> usize {
        self.codes.cols()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, code: TraceCode) {
        self.codes.set(row, col, code.code());
    }

    pub fn raw(&self, row: usize, col: usize) -> u8 {
        self.codes.get(row, col)
    }

    /// Decoded move at a cell
    pub fn get(&self, row: usize, col: usize) -> TswResult<TraceCode> {
        let code = self.codes.get(row, col);
        TraceCode::from_code(code).ok_or_else(|| {
            log::error!(
                "Unrecognized trace code {} at ({}, {}); trace matrix is corrupt",
                code,
                row,
                col
            );
            TswError::CorruptTraceState { code, row, col }
        })
    }

    pub fn codes(&self) -> &DpMatrix<u8> {
        &self.codes
    }
}
