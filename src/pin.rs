//! Edge selection for pinning and hoisting.

use alloc::vec::Vec as AllocVec;

/// One side of the particle grid.
///
/// `Top` is row 0 and `Left` is column 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Left,
    Bottom,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right];

    /// Parse an edge name, case-insensitively. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Edge> {
        let name = name.trim();
        Edge::ALL.into_iter().find(|edge| edge.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Left => "left",
            Edge::Bottom => "bottom",
            Edge::Right => "right",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Edge::Top => 1,
            Edge::Left => 2,
            Edge::Bottom => 4,
            Edge::Right => 8,
        }
    }

    /// Grid indices along this edge, every `stride`-th particle starting at
    /// the first corner. `columns` and `rows` count particles, not segments.
    pub fn indices(self, columns: usize, rows: usize, stride: usize) -> AllocVec<usize> {
        let stride = stride.max(1);
        match self {
            Edge::Top => (0..columns).step_by(stride).collect(),
            Edge::Bottom => {
                let last = (rows - 1) * columns;
                (0..columns).step_by(stride).map(|x| last + x).collect()
            }
            Edge::Left => (0..rows).step_by(stride).map(|y| y * columns).collect(),
            Edge::Right => (0..rows).step_by(stride).map(|y| y * columns + columns - 1).collect(),
        }
    }
}

/// A set of grid edges. Iteration order is always top, left, bottom, right.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeSet {
    bits: u8,
}

impl EdgeSet {
    pub const fn empty() -> Self {
        EdgeSet { bits: 0 }
    }

    pub fn only(edge: Edge) -> Self {
        EdgeSet { bits: edge.bit() }
    }

    /// Builds a set from edge names, skipping names that are not edges.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().filter_map(Edge::from_name).collect()
    }

    pub fn with(mut self, edge: Edge) -> Self {
        self.insert(edge);
        self
    }

    pub fn insert(&mut self, edge: Edge) {
        self.bits |= edge.bit();
    }

    pub fn contains(&self, edge: Edge) -> bool {
        self.bits & edge.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Edge> + '_ {
        Edge::ALL.into_iter().filter(move |edge| self.contains(*edge))
    }
}

impl From<Edge> for EdgeSet {
    fn from(edge: Edge) -> Self {
        EdgeSet::only(edge)
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut set = EdgeSet::empty();
        for edge in iter {
            set.insert(edge);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn parses_names_and_ignores_unknown() {
        assert_eq!(Edge::from_name("Top"), Some(Edge::Top));
        assert_eq!(Edge::from_name(" right "), Some(Edge::Right));
        assert_eq!(Edge::from_name("hoist"), None);

        let set = EdgeSet::from_names(["left", "diagonal", "bottom", "left"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Edge::Left) && set.contains(Edge::Bottom));
    }

    #[test]
    fn edge_indices_with_stride() {
        // 4 columns x 3 rows of particles.
        assert_eq!(Edge::Top.indices(4, 3, 1), vec![0, 1, 2, 3]);
        assert_eq!(Edge::Top.indices(4, 3, 2), vec![0, 2]);
        assert_eq!(Edge::Bottom.indices(4, 3, 3), vec![8, 11]);
        assert_eq!(Edge::Left.indices(4, 3, 1), vec![0, 4, 8]);
        assert_eq!(Edge::Right.indices(4, 3, 2), vec![3, 11]);
    }

    #[test]
    fn zero_stride_behaves_like_one() {
        assert_eq!(Edge::Left.indices(2, 3, 0), Edge::Left.indices(2, 3, 1));
    }

    #[test]
    fn iteration_order_is_fixed() {
        let set = EdgeSet::only(Edge::Right).with(Edge::Top);
        let edges: AllocVec<Edge> = set.iter().collect();
        assert_eq!(edges, vec![Edge::Top, Edge::Right]);
    }
}
