use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::{block::BlockSide, coords::LocalPos},
};

/// Texture coordinates for the four corners, in `ll, lr, ur, ul` order.
const CORNER_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Represents a single quad face of a voxel in the mesh.
///
/// A voxel at local `(i, j, k)` spans `[i, i + 1]` on every axis. The corners are
/// ordered counter-clockwise when seen from outside the voxel, so the two triangles
/// `(ll, lr, ur)` and `(ur, ul, ll)` face outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<usize>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<usize>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<usize>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<usize>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face on `block_side` of the voxel at `pos`.
    pub fn new(pos: LocalPos, block_side: BlockSide) -> Self {
        let (i, j, k) = (pos.x, pos.y, pos.z);
        let p = |x: usize, y: usize, z: usize| Point3::new(i + x, j + y, k + z);

        let [ll, lr, ur, ul] = match block_side {
            BlockSide::FRONT => [p(0, 0, 1), p(1, 0, 1), p(1, 1, 1), p(0, 1, 1)],
            BlockSide::BACK => [p(1, 0, 0), p(0, 0, 0), p(0, 1, 0), p(1, 1, 0)],
            BlockSide::LEFT => [p(0, 0, 0), p(0, 0, 1), p(0, 1, 1), p(0, 1, 0)],
            BlockSide::RIGHT => [p(1, 0, 1), p(1, 0, 0), p(1, 1, 0), p(1, 1, 1)],
            BlockSide::BOTTOM => [p(0, 0, 0), p(1, 0, 0), p(1, 0, 1), p(0, 0, 1)],
            BlockSide::TOP => [p(0, 1, 1), p(1, 1, 1), p(1, 1, 0), p(0, 1, 0)],
        };

        Face {
            ll,
            lr,
            ur,
            ul,
            block_side,
        }
    }

    /// The four vertices of this face in `ll, lr, ur, ul` order.
    pub fn vertices(&self) -> [Vertex; 4] {
        let normal = self.block_side.normal();
        let corners = [self.ll, self.lr, self.ur, self.ul];
        std::array::from_fn(|i| {
            let corner = corners[i];
            Vertex::new(
                Point3::new(corner.x as f32, corner.y as f32, corner.z as f32),
                normal,
                CORNER_TEX_COORDS[i],
            )
        })
    }

    /// Index data for this face given the vertex count already in the stream.
    pub fn indices(base: u32) -> [u32; 6] {
        [base, base + 1, base + 2, base + 2, base + 3, base]
    }
}
