//! # Chunk Volume
//!
//! Fixed-size voxel storage for one chunk column.
//!
//! ## Layout
//!
//! The volume keeps two views of the same data:
//! 1. `voxels`: a flat array with one `VoxelType` per slot, indexed `x` fastest,
//!    then `z`, then `y`
//! 2. `solid_array`: a bit vector with one bit per slot plus a one-voxel border of
//!    permanently clear bits on every side
//!
//! The padded bit vector lets the mesher test all six neighbours of any voxel
//! without bounds checks: a neighbour outside the chunk reads as air, so faces on
//! chunk edges are always emitted.

use bitvec::prelude::BitVec;

use crate::engine_state::voxels::{
    block::{BlockSide, VoxelType},
    coords::LocalPos,
};

use super::{CHUNK_HEIGHT, CHUNK_SIZE};

const SIZE: usize = CHUNK_SIZE as usize;
const HEIGHT: usize = CHUNK_HEIGHT as usize;

/// Number of voxel slots in a chunk.
pub const CHUNK_VOLUME: usize = SIZE * SIZE * HEIGHT;

/// Horizontal dimension including the padding on both sides.
const SIZE_WRAPPED: usize = SIZE + 2;
/// Vertical dimension including the padding on both sides.
const HEIGHT_WRAPPED: usize = HEIGHT + 2;
/// Number of bits in one padded horizontal layer.
const LAYER_SIZE_WRAPPED: usize = SIZE_WRAPPED * SIZE_WRAPPED;
/// Total number of bits in the padded solidity mask.
const VOLUME_WRAPPED: usize = LAYER_SIZE_WRAPPED * HEIGHT_WRAPPED;

/// Voxel contents of one chunk.
#[derive(Clone, Debug)]
pub struct ChunkVolume {
    voxels: Box<[VoxelType]>,
    solid_array: BitVec,
    solid_count: usize,
}

impl Default for ChunkVolume {
    fn default() -> Self {
        Self::empty()
    }
}

impl ChunkVolume {
    /// A volume filled with air.
    pub fn empty() -> Self {
        ChunkVolume {
            voxels: vec![VoxelType::Air; CHUNK_VOLUME].into_boxed_slice(),
            solid_array: BitVec::repeat(false, VOLUME_WRAPPED),
            solid_count: 0,
        }
    }

    #[inline]
    fn index(pos: LocalPos) -> usize {
        pos.x + SIZE * (pos.z + SIZE * pos.y)
    }

    #[inline]
    fn wrapped_index(i: usize, j: usize, k: usize) -> usize {
        i + SIZE_WRAPPED * k + LAYER_SIZE_WRAPPED * j
    }

    /// Material at `pos`.
    #[inline]
    pub fn get(&self, pos: LocalPos) -> VoxelType {
        self.voxels[Self::index(pos)]
    }

    /// Writes `voxel_type` at `pos` and returns what was there before.
    ///
    /// Writing `Air` clears the slot.
    pub fn set(&mut self, pos: LocalPos, voxel_type: VoxelType) -> VoxelType {
        let slot = &mut self.voxels[Self::index(pos)];
        let previous = *slot;
        *slot = voxel_type;

        match (previous.is_solid(), voxel_type.is_solid()) {
            (false, true) => self.solid_count += 1,
            (true, false) => self.solid_count -= 1,
            _ => {}
        }
        self.solid_array.set(
            Self::wrapped_index(pos.x + 1, pos.y + 1, pos.z + 1),
            voxel_type.is_solid(),
        );

        previous
    }

    /// Checks the padded solidity mask. Coordinates are shifted by one, so `0` and
    /// `SIZE + 1` address the always-empty border.
    #[inline]
    pub fn is_block_solid(&self, i: usize, j: usize, k: usize) -> bool {
        self.solid_array[Self::wrapped_index(i, j, k)]
    }

    /// Whether the neighbour of `pos` across `side` is solid. Neighbours outside
    /// the chunk are never solid.
    #[inline]
    pub fn is_neighbor_solid(&self, pos: LocalPos, side: BlockSide) -> bool {
        let offset = side.offset();
        let i = (pos.x as i32 + 1 + offset.x) as usize;
        let j = (pos.y as i32 + 1 + offset.y) as usize;
        let k = (pos.z as i32 + 1 + offset.z) as usize;
        self.is_block_solid(i, j, k)
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// Iterates every non-air voxel with its local position.
    pub fn iter_solid(&self) -> impl Iterator<Item = (LocalPos, VoxelType)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter(|(_, voxel_type)| voxel_type.is_solid())
            .map(|(index, voxel_type)| {
                let x = index % SIZE;
                let z = (index / SIZE) % SIZE;
                let y = index / (SIZE * SIZE);
                (LocalPos { x, y, z }, *voxel_type)
            })
    }
}
