//! # Chunk Addressing
//!
//! Conversions between world positions, chunk coordinates, chunk-local voxel
//! coordinates and the packed 64-bit [`ChunkKey`].
//!
//! Chunks are columns: they are addressed by `(x, z)` only and span the full world
//! height. World-to-chunk conversion uses floor division so that negative world
//! coordinates land in negative chunks (`-1` is in chunk `-1`, not chunk `0`).

use std::fmt;

use cgmath::Point3;

use super::chunk::{CHUNK_HEIGHT, CHUNK_SIZE};

/// Smallest chunk index whose world origin fits in an `i32`.
pub const MIN_CHUNK_COORD: i32 = i32::MIN / CHUNK_SIZE;
/// Largest chunk index whose last world column fits in an `i32`.
pub const MAX_CHUNK_COORD: i32 = i32::MAX / CHUNK_SIZE;

/// Horizontal index of a chunk column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Chunk index along world X.
    pub x: i32,
    /// Chunk index along world Z.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// Packs this coordinate into a [`ChunkKey`].
    pub fn key(self) -> ChunkKey {
        ChunkKey::new(self.x, self.z)
    }

    /// World-space position of the chunk's minimum corner.
    pub fn world_origin(self) -> Point3<f32> {
        Point3::new(
            self.x as f32 * CHUNK_SIZE as f32,
            0.0,
            self.z as f32 * CHUNK_SIZE as f32,
        )
    }

    /// Whether every world column of this chunk is addressable with `i32`.
    pub fn in_world_range(self) -> bool {
        let range = MIN_CHUNK_COORD..=MAX_CHUNK_COORD;
        range.contains(&self.x) && range.contains(&self.z)
    }

    /// The chunk `(dx, dz)` away, or `None` past the edge of the world.
    pub fn offset(self, dx: i32, dz: i32) -> Option<Self> {
        let coord = ChunkCoord {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        };
        coord.in_world_range().then_some(coord)
    }

    /// Returns the chunk containing the integer world column `(x, z)`.
    pub fn from_block(x: i32, z: i32) -> Self {
        ChunkCoord {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Returns the chunk containing a floating point world position.
    ///
    /// Positions past the edge of the world map to the outermost chunk.
    pub fn from_world(position: Point3<f32>) -> Self {
        let axis = |value: f32| {
            ((value / CHUNK_SIZE as f32).floor() as i32).clamp(MIN_CHUNK_COORD, MAX_CHUNK_COORD)
        };
        ChunkCoord {
            x: axis(position.x),
            z: axis(position.z),
        }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Packed chunk identity: high 32 bits hold chunk X, low 32 bits hold chunk Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(pub i64);

impl ChunkKey {
    /// Packs `(chunk_x, chunk_z)`.
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        ChunkKey(((chunk_x as i64) << 32) | (chunk_z as i64 & 0xFFFF_FFFF))
    }

    /// Unpacks the key.
    pub fn coord(self) -> ChunkCoord {
        ChunkCoord {
            x: (self.0 >> 32) as i32,
            z: self.0 as i32,
        }
    }
}

impl From<ChunkCoord> for ChunkKey {
    fn from(coord: ChunkCoord) -> Self {
        coord.key()
    }
}

/// Chunk-local voxel position, each axis inside the chunk bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalPos {
    /// 0..CHUNK_SIZE
    pub x: usize,
    /// 0..CHUNK_HEIGHT
    pub y: usize,
    /// 0..CHUNK_SIZE
    pub z: usize,
}

impl LocalPos {
    /// Validates signed local coordinates, returning `None` when any axis is out of
    /// range.
    pub fn new(x: i32, y: i32, z: i32) -> Option<Self> {
        let in_range = (0..CHUNK_SIZE).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_SIZE).contains(&z);
        in_range.then_some(LocalPos {
            x: x as usize,
            y: y as usize,
            z: z as usize,
        })
    }
}

/// Splits an integer world position into its owning chunk and the local position
/// inside it. Returns `None` when `y` is outside the world height.
pub fn world_to_local(x: i32, y: i32, z: i32) -> Option<(ChunkCoord, LocalPos)> {
    let coord = ChunkCoord::from_block(x, z);
    let local = LocalPos::new(x.rem_euclid(CHUNK_SIZE), y, z.rem_euclid(CHUNK_SIZE))?;
    Some((coord, local))
}

/// Circular load test: `dx² + dz² <= radius²`.
pub fn should_load(dx: i32, dz: i32, radius: i32) -> bool {
    let dx = dx as i64;
    let dz = dz as i64;
    let radius = radius as i64;
    dx * dx + dz * dz <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let samples = [
            (0, 0),
            (1, -1),
            (-1, 1),
            (-1, -1),
            (123_456, -987_654),
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MAX),
            (i32::MIN, -1),
        ];
        for (x, z) in samples {
            assert_eq!(ChunkKey::new(x, z).coord(), ChunkCoord::new(x, z));
        }
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(ChunkKey::new(1, 2).0, (1i64 << 32) | 2);
        assert_eq!(ChunkKey::new(0, -1).0, 0xFFFF_FFFF);
        assert_ne!(ChunkKey::new(0, -1), ChunkKey::new(-1, 0));
    }

    #[test]
    fn test_floor_division_for_negative_blocks() {
        assert_eq!(ChunkCoord::from_block(0, 15), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block(16, -1), ChunkCoord::new(1, -1));
        assert_eq!(ChunkCoord::from_block(-16, -17), ChunkCoord::new(-1, -2));
        assert_eq!(
            ChunkCoord::from_world(Point3::new(-0.5, 10.0, 31.9)),
            ChunkCoord::new(-1, 1)
        );
    }

    #[test]
    fn test_from_world_clamps_to_world_edge() {
        let far = ChunkCoord::from_world(Point3::new(1.0e10, 40.0, -1.0e10));
        assert_eq!(far, ChunkCoord::new(MAX_CHUNK_COORD, MIN_CHUNK_COORD));
        assert!(far.in_world_range());
        assert_eq!(MAX_CHUNK_COORD * CHUNK_SIZE + (CHUNK_SIZE - 1), i32::MAX);
        assert_eq!(MIN_CHUNK_COORD * CHUNK_SIZE, i32::MIN);

        assert_eq!(far.offset(1, 0), None);
        assert_eq!(far.offset(0, -1), None);
        assert_eq!(
            far.offset(-1, 1),
            Some(ChunkCoord::new(MAX_CHUNK_COORD - 1, MIN_CHUNK_COORD + 1))
        );
        assert_eq!(ChunkCoord::new(i32::MAX, 0).offset(1, 0), None);
    }

    #[test]
    fn test_world_to_local() {
        let (coord, local) = world_to_local(-1, 5, 17).unwrap();
        assert_eq!(coord, ChunkCoord::new(-1, 1));
        assert_eq!(local, LocalPos { x: 15, y: 5, z: 1 });

        assert!(world_to_local(0, -1, 0).is_none());
        assert!(world_to_local(0, CHUNK_HEIGHT, 0).is_none());
    }

    #[test]
    fn test_local_pos_rejects_out_of_range() {
        assert!(LocalPos::new(-1, 0, 0).is_none());
        assert!(LocalPos::new(0, 0, CHUNK_SIZE).is_none());
        assert!(LocalPos::new(CHUNK_SIZE - 1, CHUNK_HEIGHT - 1, 0).is_some());
    }

    #[test]
    fn test_should_load_boundary() {
        assert!(should_load(0, 0, 0));
        assert!(should_load(3, 0, 3));
        assert!(should_load(0, -3, 3));
        assert!(!should_load(3, 1, 3));
        assert!(should_load(3, 4, 5));
        assert!(!should_load(4, 4, 5));
        assert!(!should_load(6, 0, 5));
    }

    #[test]
    fn test_world_origin() {
        assert_eq!(ChunkCoord::new(-2, 3).world_origin(), Point3::new(-32.0, 0.0, 48.0));
    }
}
