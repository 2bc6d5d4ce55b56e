//! Render-side geometry derived from the particle grid.
//!
//! The solver never reads any of this. It exists so a renderer can build a
//! surface once and then only stream positions every frame.

use crate::float::Float;
use crate::cloth::ClothMesh;
use crate::flag::{Hoisting, Orientation};
use alloc::vec::Vec as AllocVec;

/// Texture coordinate `[u, v]` for grid particle `(x, y)`.
///
/// Horizontal flags map the picture straight onto the sheet, hoist side on
/// the left. Vertical flags rotate it a quarter turn clockwise so the hoist
/// side runs along the top. Sinister hoisting mirrors the picture.
pub fn texture_coordinate<F: Float>(
    x: usize,
    y: usize,
    x_segments: usize,
    y_segments: usize,
    orientation: Orientation,
    hoisting: Hoisting,
) -> [F; 2] {
    let s = F::from_usize(x) / F::from_usize(x_segments.max(1));
    let t = F::from_usize(y) / F::from_usize(y_segments.max(1));
    let (u, v) = match orientation {
        Orientation::Horizontal => (s, F::one() - t),
        Orientation::Vertical => (t, s),
    };
    match hoisting {
        Hoisting::Dexter => [u, v],
        Hoisting::Sinister => [F::one() - u, v],
    }
}

/// Triangle indices and per-vertex texture coordinates for the cloth grid.
#[derive(Clone, Debug)]
pub struct GridGeometry<F: Float> {
    /// Three indices per triangle, two triangles per cell.
    pub indices: AllocVec<u32>,
    /// One coordinate per particle, row-major like the positions.
    pub uvs: AllocVec<[F; 2]>,
}

impl<F: Float> GridGeometry<F> {
    pub fn from_cloth(cloth: &ClothMesh<F>, orientation: Orientation, hoisting: Hoisting) -> Self {
        let indices = cloth
            .triangles()
            .iter()
            .flat_map(|tri| tri.iter().map(|&i| i as u32))
            .collect();

        let (xs, ys) = (cloth.x_segments(), cloth.y_segments());
        let mut uvs = AllocVec::with_capacity(cloth.particle_count());
        for y in 0..cloth.rows() {
            for x in 0..cloth.columns() {
                uvs.push(texture_coordinate(x, y, xs, ys, orientation, hoisting));
            }
        }

        GridGeometry { indices, uvs }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat `[u0, v0, u1, v1, ...]`.
    pub fn uv_buffer(&self) -> AllocVec<F> {
        self.uvs.iter().flatten().copied().collect()
    }
}
