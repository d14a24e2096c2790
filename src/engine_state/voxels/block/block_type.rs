//! # Block Type Module
//!
//! This module defines the fixed set of materials a voxel can hold.

use std::fmt;

/// Enumerates all possible voxel materials.
///
/// The set is deliberately small and closed. `Air` is the empty material; an
/// unset slot in a chunk volume and a missing chunk both read back as `Air`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoxelType {
    /// Plain dirt, found in the three layers under grass.
    Dirt,

    /// Stone found below the dirt layers of land columns.
    Cobblestone,

    /// Fills every column whose surface is below sea level.
    Sand,

    /// Surface block of land columns. Its top, sides and bottom render with
    /// different textures.
    Grass,

    /// Empty space.
    #[default]
    Air,
}

impl VoxelType {
    /// Every material, `Air` included.
    pub const ALL: [VoxelType; 5] = [
        VoxelType::Dirt,
        VoxelType::Cobblestone,
        VoxelType::Sand,
        VoxelType::Grass,
        VoxelType::Air,
    ];

    /// Returns `true` for anything that occludes faces and collides.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != VoxelType::Air
    }
}

impl fmt::Display for VoxelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoxelType::Dirt => "dirt",
            VoxelType::Cobblestone => "cobblestone",
            VoxelType::Sand => "sand",
            VoxelType::Grass => "grass",
            VoxelType::Air => "air",
        };
        f.write_str(name)
    }
}
