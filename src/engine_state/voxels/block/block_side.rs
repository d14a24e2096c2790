//! # Block Side Module
//!
//! This module defines the six faces of a voxel and the neighbour each one looks at
//! during face culling.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Offset to the neighbouring voxel this face touches.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward unit normal of the face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_unit_and_opposite_pairs_cancel() {
        for side in BlockSide::all() {
            let o = side.offset();
            assert_eq!(o.x.abs() + o.y.abs() + o.z.abs(), 1);
        }
        assert_eq!(BlockSide::FRONT.offset() + BlockSide::BACK.offset(), Vector3::new(0, 0, 0));
        assert_eq!(BlockSide::TOP.offset() + BlockSide::BOTTOM.offset(), Vector3::new(0, 0, 0));
        assert_eq!(BlockSide::LEFT.offset() + BlockSide::RIGHT.offset(), Vector3::new(0, 0, 0));
    }

    #[test]
    fn test_discriminants_match_all_order() {
        for (i, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, i);
        }
    }
}
