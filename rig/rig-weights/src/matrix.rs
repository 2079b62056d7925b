//! Dense per-vertex bone weights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weight of a single bone's influence on a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneWeight {
    /// Index of the bone.
    pub bone_index: usize,

    /// Weight of this bone's influence (0.0 to 1.0).
    pub weight: f64,
}

/// Row-major `vertex_count x bone_count` weight table.
///
/// Rows produced by [`paint_weights`](crate::paint_weights) are
/// non-negative and sum to 1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightMatrix {
    vertex_count: usize,
    bone_count: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    /// All-zero matrix.
    #[must_use]
    pub fn zeros(vertex_count: usize, bone_count: usize) -> Self {
        Self {
            vertex_count,
            bone_count,
            data: vec![0.0; vertex_count * bone_count],
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of columns.
    #[must_use]
    pub const fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Weights of one vertex, one entry per bone.
    #[must_use]
    pub fn row(&self, vertex: usize) -> Option<&[f64]> {
        let start = vertex.checked_mul(self.bone_count)?;
        self.data.get(start..start + self.bone_count)
    }

    /// One weight.
    #[must_use]
    pub fn get(&self, vertex: usize, bone: usize) -> Option<f64> {
        if bone >= self.bone_count {
            return None;
        }
        self.row(vertex).map(|r| r[bone])
    }

    /// The whole table, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks` rejects a zero size; a bone-less matrix has no data anyway.
        self.data.chunks(self.bone_count.max(1))
    }

    /// Nonzero weights of a vertex, strongest first.
    #[must_use]
    pub fn influences(&self, vertex: usize) -> Vec<BoneWeight> {
        let Some(row) = self.row(vertex) else {
            return Vec::new();
        };
        let mut weights: Vec<BoneWeight> = row
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0.0)
            .map(|(bone_index, &weight)| BoneWeight { bone_index, weight })
            .collect();
        weights.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.bone_index.cmp(&b.bone_index)));
        weights
    }

    /// Bone with the largest weight for a vertex. Ties go to the lower index.
    #[must_use]
    pub fn dominant_bone(&self, vertex: usize) -> Option<usize> {
        self.influences(vertex).first().map(|w| w.bone_index)
    }

    /// True if every row sums to 1 within `tolerance`.
    #[must_use]
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.rows().all(|r| (r.iter().sum::<f64>() - 1.0).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightMatrix {
        let mut m = WeightMatrix::zeros(2, 3);
        m.as_mut_slice().copy_from_slice(&[0.2, 0.0, 0.8, 0.5, 0.5, 0.0]);
        m
    }

    #[test]
    fn row_access() {
        let m = sample();
        assert_eq!(m.row(1), Some(&[0.5, 0.5, 0.0][..]));
        assert_eq!(m.row(2), None);
        assert_eq!(m.get(0, 2), Some(0.8));
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.rows().count(), 2);
        assert!(m.is_normalized(1e-12));
    }

    #[test]
    fn influences_sorted_strongest_first() {
        let m = sample();
        let w = m.influences(0);
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].bone_index, 2);
        assert_eq!(m.dominant_bone(0), Some(2));
        // Equal weights fall back to the lower bone index.
        assert_eq!(m.dominant_bone(1), Some(0));
    }
}
