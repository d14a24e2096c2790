//! # Block Module
//!
//! Voxel materials and voxel faces.

pub mod block_side;
pub mod block_type;

pub use block_side::BlockSide;
pub use block_type::VoxelType;
