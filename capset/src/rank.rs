//! Rank over GF(2).
//!
//! The affine rank of a point set is computed from the difference vectors
//! `p ^ origin`, laid out as `dim`-bit rows (most significant bit first),
//! transposed and reduced by Gauss-Jordan elimination mod 2.

/// Dense 0/1 matrix over GF(2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gf2Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<u8>>,
}

impl Gf2Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![vec![0u8; cols]; rows],
        }
    }

    /// Builds a matrix from equal-length rows. Entries are reduced mod 2.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "rows must have equal length"
        );
        let data: Vec<Vec<u8>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|x| x & 1).collect())
            .collect();
        Self {
            rows: data.len(),
            cols,
            data,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row][col]
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for (r, row) in self.data.iter().enumerate() {
            for (c, &x) in row.iter().enumerate() {
                out.data[c][r] = x;
            }
        }
        out
    }

    pub fn rank(&self) -> usize {
        self.clone().into_rank()
    }

    /// Gauss-Jordan elimination in place.
    ///
    /// Walks the diagonal. A nonzero pivot clears its column in every other
    /// row. A zero pivot is swapped with the first lower row holding a one in
    /// that column; if there is none the column is dropped by moving the last
    /// live column into its place. The number of live columns left is the
    /// rank.
    fn into_rank(mut self) -> usize {
        let mut rank = self.cols;
        let mut row = 0;
        while row < rank {
            if row < self.rows && self.data[row][row] != 0 {
                let pivot = self.data[row].clone();
                for (r, other) in self.data.iter_mut().enumerate() {
                    if r != row && other[row] != 0 {
                        for c in 0..rank {
                            other[c] ^= pivot[c];
                        }
                    }
                }
                row += 1;
                continue;
            }

            match (row + 1..self.rows).find(|&r| self.data[r][row] != 0) {
                Some(r) => self.data.swap(row, r),
                None => {
                    rank -= 1;
                    for other in &mut self.data {
                        other[row] = other[rank];
                    }
                }
            }
        }
        rank
    }
}

/// `value` as a `dim`-entry 0/1 row, most significant bit first.
pub fn bit_row(value: u32, dim: u32) -> Vec<u8> {
    (0..dim).rev().map(|bit| ((value >> bit) & 1) as u8).collect()
}

/// Affine rank of `points` in GF(2)^dim, taking `points[0]` as the origin.
///
/// Zero or one point has rank equal to the count. Otherwise the result is the
/// rank of the difference vectors plus one, which does not depend on the
/// choice of origin.
pub fn affine_rank(points: &[u32], dim: u32) -> usize {
    let Some((&origin, rest)) = points.split_first() else {
        return 0;
    };
    if rest.is_empty() {
        return 1;
    }
    let differences: Vec<Vec<u8>> = rest.iter().map(|&p| bit_row(p ^ origin, dim)).collect();
    Gf2Matrix::from_rows(differences).transpose().rank() + 1
}
