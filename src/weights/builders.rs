//! Weight constructors for common spatial layouts.

use super::{SpatialWeights, WeightsError};

/// Neighbour criterion on a regular lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contiguity {
    /// Shared edges only (4 neighbours in the interior).
    Rook,
    /// Shared edges or corners (8 neighbours in the interior).
    Queen,
}

impl SpatialWeights {
    /// Contiguity weights for a rows x cols regular lattice, cells numbered
    /// row-major.
    pub fn lattice(
        rows: usize,
        cols: usize,
        contiguity: Contiguity,
    ) -> Result<Self, WeightsError> {
        if rows == 0 || cols == 0 {
            return Err(WeightsError::EmptyLattice { rows, cols });
        }

        let offsets: &[(i64, i64)] = match contiguity {
            Contiguity::Rook => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Contiguity::Queen => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
        };

        let mut neighbors = Vec::with_capacity(rows * cols);
        for r in 0..rows as i64 {
            for c in 0..cols as i64 {
                let mut ns = Vec::new();
                for &(dr, dc) in offsets {
                    let (nr, nc) = (r + dr, c + dc);
                    if nr >= 0 && nr < rows as i64 && nc >= 0 && nc < cols as i64 {
                        ns.push((nr * cols as i64 + nc) as usize);
                    }
                }
                ns.sort_unstable();
                neighbors.push(ns);
            }
        }

        Self::from_neighbors(neighbors)
    }

    /// k-nearest-neighbour weights from planar coordinates under Euclidean
    /// distance. Distance ties are broken by index order.
    pub fn knn(points: &[(f64, f64)], k: usize) -> Result<Self, WeightsError> {
        let n = points.len();
        if k == 0 || k >= n {
            return Err(WeightsError::InvalidK { k, n });
        }

        let mut neighbors = Vec::with_capacity(n);
        for (i, &(xi, yi)) in points.iter().enumerate() {
            let mut dist: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, &(xj, yj))| ((xi - xj).hypot(yi - yj), j))
                .collect();
            dist.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            let mut ns: Vec<usize> = dist.iter().take(k).map(|&(_, j)| j).collect();
            ns.sort_unstable();
            neighbors.push(ns);
        }

        Self::from_neighbors(neighbors)
    }
}
