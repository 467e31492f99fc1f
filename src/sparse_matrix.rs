use crate::LdpcError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseError {
    #[error("Invalid matrix dimensions")]
    InvalidDimensions,
    #[error("Row or column index out of bounds")]
    IndexOutOfBounds,
}

/// Binary parity-check matrix H, stored as sorted incidence lists.
///
/// Row `i` lists the variables taking part in check `i`; column `j` lists the
/// checks that variable `j` takes part in. Both lists are kept in ascending
/// order so that everything derived from the matrix is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckMatrix {
    n_rows: usize,
    n_cols: usize,
    row_entries: Vec<Vec<usize>>, // For each check, ascending variable indices
    col_entries: Vec<Vec<usize>>, // For each variable, ascending check indices
}

impl ParityCheckMatrix {
    /// Allocate an all-zero m×n matrix.
    pub fn allocate(n_rows: usize, n_cols: usize) -> Result<Self, SparseError> {
        if n_rows == 0 || n_cols == 0 {
            return Err(SparseError::InvalidDimensions);
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_entries: vec![Vec::new(); n_rows],
            col_entries: vec![Vec::new(); n_cols],
        })
    }

    /// Build a matrix from dense rows of 0/1 entries.
    ///
    /// Fails with `InvalidMatrix` on any entry other than 0 or 1 and with
    /// `DimensionMismatch` when the rows are not all the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, LdpcError> {
        let n_cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut h = Self::allocate(rows.len(), n_cols)?;

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(LdpcError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                match value {
                    0 => {}
                    1 => h.insert(i, j)?,
                    _ => {
                        return Err(LdpcError::InvalidMatrix {
                            row: i,
                            col: j,
                            value,
                        })
                    }
                }
            }
        }

        Ok(h)
    }

    /// Number of checks (m).
    pub fn rows(&self) -> usize {
        self.n_rows
    }

    /// Number of variables (n).
    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// Set entry (row, col) to 1. Inserting an existing entry is a no-op.
    pub fn insert(&mut self, row: usize, col: usize) -> Result<(), SparseError> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(SparseError::IndexOutOfBounds);
        }

        let row_pos = match self.row_entries[row].binary_search(&col) {
            Ok(_) => return Ok(()),
            Err(pos) => pos,
        };
        self.row_entries[row].insert(row_pos, col);

        let col_pos = self.col_entries[col]
            .binary_search(&row)
            .unwrap_or_else(|x| x);
        self.col_entries[col].insert(col_pos, row);

        Ok(())
    }

    /// Iterate over the columns set in a row, ascending.
    pub fn entries_in_row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.row_entries[row].iter().copied()
    }

    /// Iterate over the rows set in a column, ascending.
    pub fn entries_in_col(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        self.col_entries[col].iter().copied()
    }

    /// Get weight (number of 1s) in a row
    pub fn row_weight(&self, row: usize) -> usize {
        self.row_entries[row].len()
    }

    /// Get weight (number of 1s) in a column
    pub fn col_weight(&self, col: usize) -> usize {
        self.col_entries[col].len()
    }

    /// Total number of 1s, i.e. the number of Tanner graph edges.
    pub fn count_ones(&self) -> usize {
        self.row_entries.iter().map(Vec::len).sum()
    }

    /// Dense 0/1 rows, the inverse of [`ParityCheckMatrix::from_rows`].
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.row_entries
            .iter()
            .map(|cols| {
                let mut row = vec![0u8; self.n_cols];
                for &j in cols {
                    row[j] = 1;
                }
                row
            })
            .collect()
    }

    /// Compute `H · bits mod 2`, one entry per check.
    pub fn syndrome(&self, bits: &[u8]) -> Result<Vec<u8>, LdpcError> {
        if bits.len() != self.n_cols {
            return Err(LdpcError::DimensionMismatch {
                expected: self.n_cols,
                actual: bits.len(),
            });
        }

        Ok(self
            .row_entries
            .iter()
            .map(|cols| cols.iter().fold(0u8, |acc, &j| acc ^ (bits[j] & 1)))
            .collect())
    }

    /// Number of unsatisfied parity checks for `bits`.
    pub fn syndrome_weight(&self, bits: &[u8]) -> Result<usize, LdpcError> {
        Ok(self.syndrome(bits)?.iter().filter(|&&s| s != 0).count())
    }

    pub fn is_codeword(&self, bits: &[u8]) -> Result<bool, LdpcError> {
        Ok(self.syndrome_weight(bits)? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut matrix = ParityCheckMatrix::allocate(3, 4).unwrap();

        matrix.insert(0, 1).unwrap();
        matrix.insert(1, 2).unwrap();
        matrix.insert(0, 3).unwrap();
        matrix.insert(0, 3).unwrap();

        assert_eq!(matrix.count_ones(), 3);

        let row0_cols: Vec<usize> = matrix.entries_in_row(0).collect();
        assert_eq!(row0_cols, vec![1, 3]);
        assert_eq!(matrix.entries_in_col(2).collect::<Vec<_>>(), vec![1]);
        assert_eq!(matrix.row_weight(2), 0);
        assert_eq!(matrix.col_weight(0), 0);
        assert_eq!(matrix.col_weight(3), 1);
        assert_eq!(matrix.insert(3, 0), Err(SparseError::IndexOutOfBounds));
    }

    #[test]
    fn test_from_rows_round_trip() {
        let rows = vec![
            vec![1u8, 1, 0, 1, 0, 0],
            vec![1, 0, 1, 0, 1, 0],
            vec![0, 1, 1, 0, 0, 1],
        ];
        let h = ParityCheckMatrix::from_rows(&rows).unwrap();

        assert_eq!(h.rows(), 3);
        assert_eq!(h.cols(), 6);
        assert_eq!(h.col_weight(0), 2);
        assert_eq!(h.col_weight(5), 1);
        assert_eq!(h.row_weight(2), 3);
        assert_eq!(h.entries_in_col(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(h.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_rejects_non_binary() {
        let err = ParityCheckMatrix::from_rows(&[[1u8, 0, 2], [0, 1, 1]]).unwrap_err();
        assert!(matches!(
            err,
            LdpcError::InvalidMatrix {
                row: 0,
                col: 2,
                value: 2
            }
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 0, 1], vec![0, 1]];
        let err = ParityCheckMatrix::from_rows(&rows).unwrap_err();
        assert!(matches!(
            err,
            LdpcError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_from_rows_rejects_empty() {
        let rows: Vec<Vec<u8>> = Vec::new();
        assert!(ParityCheckMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_syndrome() {
        let h = ParityCheckMatrix::from_rows(&[
            [1u8, 1, 0, 1, 0, 0],
            [1, 0, 1, 0, 1, 0],
            [0, 1, 1, 0, 0, 1],
        ])
        .unwrap();

        assert_eq!(h.syndrome(&[0; 6]).unwrap(), vec![0, 0, 0]);
        assert_eq!(h.syndrome(&[1, 0, 0, 0, 0, 0]).unwrap(), vec![1, 1, 0]);
        assert_eq!(h.syndrome_weight(&[1, 0, 0, 0, 0, 0]).unwrap(), 2);
        assert!(!h.is_codeword(&[1, 1, 0, 1, 0, 0]).unwrap());
        assert!(h.is_codeword(&[1, 1, 1, 0, 0, 0]).unwrap());
        assert!(h.syndrome(&[0; 5]).is_err());
    }
}
