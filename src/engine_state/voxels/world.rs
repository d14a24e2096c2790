//! # World Module
//!
//! The world owns every loaded chunk, the chunk worker pool and the renderer, and
//! streams terrain in and out around an observer.
//!
//! ## Streaming
//!
//! Each call to [`World::update`]:
//! 1. Recomputes the load set when the observer moved far enough. Missing chunks
//!    inside the render distance are queued for generation, and loaded chunks
//!    beyond the render distance plus the hysteresis margin are unloaded
//! 2. Materialises a bounded number of finished chunks. This is the only place
//!    backend resources are created for new chunks
//!
//! A coordinate is queued at most once while it is loaded or generating. Results
//! for chunks that left the unload radius while they were being generated are
//! dropped on arrival.
//!
//! ## Threading
//!
//! Workers only see a coordinate and a shared [`TerrainGenerator`]. The chunk table
//! and the renderer are touched exclusively through `&mut self` on the owning
//! thread.

use std::{
    cell::Cell,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use cgmath::{MetricSpace, Point3};
use log::{debug, info};

use crate::engine_state::{
    config::WorldConfig,
    error::WorldError,
    generation::terrain::TerrainGenerator,
    rendering::{ChunkDrawer, ChunkRenderer, Renderable},
    task_management::WorkerPool,
    voxels::{
        block::VoxelType,
        chunk::Chunk,
        coords::{should_load, world_to_local, ChunkCoord, ChunkKey},
        tasks::{ChunkGenerationTask, ChunkMeshData},
    },
};

/// Prefix of the worker thread names.
pub const WORKER_THREAD_NAME: &str = "chunk-worker";

/// How often [`World::render`] reports the loaded chunk count.
const RENDER_LOG_INTERVAL: u64 = 60;

/// What a single [`World::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Coordinates newly queued for generation
    pub requested: usize,
    /// Chunks unloaded for being out of range
    pub unloaded: usize,
    /// Finished chunks uploaded and inserted
    pub materialized: usize,
    /// Finished chunks dropped because they were no longer wanted
    pub discarded: usize,
}

impl UpdateSummary {
    /// Whether the call changed nothing.
    pub fn is_idle(&self) -> bool {
        *self == UpdateSummary::default()
    }
}

/// Loaded chunks plus the coordinates currently being generated.
#[derive(Debug)]
struct ChunkTable<M> {
    loaded: HashMap<ChunkKey, Chunk<M>>,
    generating: HashSet<ChunkKey>,
}

impl<M> ChunkTable<M> {
    fn new() -> Self {
        ChunkTable {
            loaded: HashMap::new(),
            generating: HashSet::new(),
        }
    }

    /// Marks `key` as generating unless it is already loaded or generating.
    fn try_mark_generating(&mut self, key: ChunkKey) -> bool {
        if self.loaded.contains_key(&key) {
            return false;
        }
        self.generating.insert(key)
    }
}

/// A streaming voxel world rendered through `R`.
pub struct World<R: ChunkRenderer> {
    config: WorldConfig,
    generator: Arc<TerrainGenerator>,
    pool: WorkerPool<ChunkCoord, ChunkMeshData>,
    table: ChunkTable<R::Mesh>,
    renderer: R,
    last_player_pos: Option<Point3<f32>>,
    observer_chunk: ChunkCoord,
    render_calls: Cell<u64>,
}

impl<R: ChunkRenderer> World<R> {
    /// Builds the world and starts its worker threads.
    pub fn new(config: WorldConfig, renderer: R) -> Result<Self, WorldError> {
        let config = config.validated();
        let generator = Arc::new(TerrainGenerator::new(config.seed));
        let task = ChunkGenerationTask::new(Arc::clone(&generator));
        let pool = WorkerPool::spawn(WORKER_THREAD_NAME, config.worker_count, move |coord| {
            task.process(coord)
        })?;

        info!(
            "World created: seed {}, render distance {}, {} workers",
            config.seed,
            config.render_distance,
            pool.worker_count()
        );

        Ok(World {
            config,
            generator,
            pool,
            table: ChunkTable::new(),
            renderer,
            last_player_pos: None,
            observer_chunk: ChunkCoord::default(),
            render_calls: Cell::new(0),
        })
    }

    /// Per-frame driver. Never blocks on the workers. Does nothing after
    /// [`shutdown`](Self::shutdown).
    pub fn update(&mut self, player_pos: Point3<f32>) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        if !self.pool.is_running() {
            return summary;
        }

        let moved = self.last_player_pos.map_or(true, |last| {
            last.distance(player_pos) > self.config.movement_threshold
        });
        if moved {
            self.last_player_pos = Some(player_pos);
            self.observer_chunk = ChunkCoord::from_world(player_pos);
            summary.requested = self.request_chunks_in_range();
            summary.unloaded = self.unload_chunks_out_of_range();
        }

        for _ in 0..self.config.max_results_per_update {
            let Some(data) = self.pool.try_recv() else {
                break;
            };
            if self.materialize(data) {
                summary.materialized += 1;
            } else {
                summary.discarded += 1;
            }
        }

        if !summary.is_idle() {
            debug!(
                "Update at chunk {}: {:?}, {} loaded, {} generating",
                self.observer_chunk,
                summary,
                self.table.loaded.len(),
                self.table.generating.len()
            );
        }
        summary
    }

    fn request_chunks_in_range(&mut self) -> usize {
        let radius = self.config.render_distance;
        let center = self.observer_chunk;

        let mut offsets: Vec<(i32, i32)> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| (dx, dz)))
            .filter(|&(dx, dz)| should_load(dx, dz, radius))
            .collect();
        offsets.sort_by_key(|&(dx, dz)| dx * dx + dz * dz);

        let mut requested = 0;
        for (dx, dz) in offsets {
            let Some(coord) = center.offset(dx, dz) else {
                continue;
            };
            if self.table.try_mark_generating(coord.key()) {
                self.pool.submit(coord);
                requested += 1;
            }
        }
        requested
    }

    fn unload_chunks_out_of_range(&mut self) -> usize {
        let unload_distance = self.config.unload_distance();
        let center = self.observer_chunk;

        let stale: Vec<ChunkKey> = self
            .table
            .loaded
            .keys()
            .copied()
            .filter(|key| {
                let coord = key.coord();
                !should_load(coord.x - center.x, coord.z - center.z, unload_distance)
            })
            .collect();

        for key in &stale {
            if let Some(mut chunk) = self.table.loaded.remove(key) {
                chunk.cleanup(&mut self.renderer);
                debug!("Unloaded chunk {}", chunk.coord());
            }
        }
        stale.len()
    }

    /// Uploads and inserts a finished chunk. Returns `false` if it was discarded.
    fn materialize(&mut self, data: ChunkMeshData) -> bool {
        let key = data.key();
        self.table.generating.remove(&key);

        let center = self.observer_chunk;
        let wanted = should_load(
            data.coord.x - center.x,
            data.coord.z - center.z,
            self.config.unload_distance(),
        );
        if !wanted || self.table.loaded.contains_key(&key) {
            debug!("Discarded chunk {} generated out of range", data.coord);
            return false;
        }

        let mut chunk = Chunk::new(data.coord, data.volume, data.mesh);
        chunk.upload_mesh(&mut self.renderer);
        self.table.loaded.insert(key, chunk);
        true
    }

    /// Draws every loaded chunk that has geometry. Returns the number drawn.
    pub fn render<D: ChunkDrawer<R::Mesh>>(&self, drawer: &mut D) -> usize {
        let mut drawn = 0;
        for chunk in self.table.loaded.values() {
            if chunk.is_uploaded() {
                Renderable::<R>::render(chunk, drawer);
                drawn += 1;
            }
        }

        let calls = self.render_calls.get() + 1;
        self.render_calls.set(calls);
        if calls % RENDER_LOG_INTERVAL == 0 {
            debug!("Rendering {} loaded chunks", self.table.loaded.len());
        }
        drawn
    }

    /// Voxel at a world position. Air when the chunk is not loaded or `y` is out of
    /// range. Never triggers generation.
    pub fn get_block_type_at(&self, x: i32, y: i32, z: i32) -> VoxelType {
        world_to_local(x, y, z)
            .and_then(|(coord, local)| {
                self.table
                    .loaded
                    .get(&coord.key())
                    .map(|chunk| chunk.get_block(local))
            })
            .unwrap_or(VoxelType::Air)
    }

    /// Writes a voxel and remeshes its chunk. Returns whether anything changed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, voxel_type: VoxelType) -> bool {
        let Some((coord, local)) = world_to_local(x, y, z) else {
            return false;
        };
        let Some(chunk) = self.table.loaded.get_mut(&coord.key()) else {
            return false;
        };
        chunk
            .set_block(local, voxel_type, &mut self.renderer)
            .is_some()
    }

    /// Places a solid voxel into an empty slot.
    pub fn place_block(&mut self, x: i32, y: i32, z: i32, voxel_type: VoxelType) -> bool {
        if !voxel_type.is_solid() || self.get_block_type_at(x, y, z) != VoxelType::Air {
            return false;
        }
        self.set_block(x, y, z, voxel_type)
    }

    /// Clears a solid voxel and returns what was removed.
    pub fn break_block(&mut self, x: i32, y: i32, z: i32) -> Option<VoxelType> {
        let current = self.get_block_type_at(x, y, z);
        if !current.is_solid() {
            return None;
        }
        self.set_block(x, y, z, VoxelType::Air).then_some(current)
    }

    /// Terrain surface height of a world column, loaded or not.
    pub fn get_terrain_height(&self, x: i32, z: i32) -> i32 {
        self.generator.height_at(x, z)
    }

    /// The loaded chunk at chunk coordinates `(cx, cz)`.
    pub fn get_chunk(&self, cx: i32, cz: i32) -> Option<&Chunk<R::Mesh>> {
        self.table.loaded.get(&ChunkKey::new(cx, cz))
    }

    /// Current load radius in chunks.
    pub fn render_distance(&self) -> i32 {
        self.config.render_distance
    }

    /// Changes the load radius. Takes effect on the next `update`.
    pub fn set_render_distance(&mut self, render_distance: i32) {
        self.config.render_distance = render_distance.max(0);
        self.last_player_pos = None;
    }

    /// Number of loaded chunks.
    pub fn loaded_chunk_count(&self) -> usize {
        self.table.loaded.len()
    }

    /// Number of chunks queued or in progress on the workers.
    pub fn generating_count(&self) -> usize {
        self.table.generating.len()
    }

    /// Active configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The renderer that owns every uploaded mesh.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Releases every chunk's backend resources and empties the table.
    ///
    /// Chunks still generating are dropped when they arrive unless the observer
    /// still wants them.
    pub fn cleanup(&mut self) {
        let count = self.table.loaded.len();
        for (_, mut chunk) in self.table.loaded.drain() {
            chunk.cleanup(&mut self.renderer);
        }
        self.last_player_pos = None;
        debug!("Released {count} chunks");
    }

    /// Stops and joins the workers, then releases every chunk. Idempotent.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
        if !self.table.loaded.is_empty() {
            self.cleanup();
        }
    }
}

impl<R: ChunkRenderer> Drop for World<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        generation::terrain::SEA_LEVEL,
        rendering::{
            headless::{CountingDrawer, HeadlessRenderer},
            meshing::MeshMaterial,
        },
        voxels::{
            block::BlockSide,
            chunk::{CHUNK_HEIGHT, CHUNK_SIZE},
            coords::{LocalPos, MAX_CHUNK_COORD},
        },
    };
    use std::{
        thread,
        time::{Duration, Instant},
    };

    fn test_world(render_distance: i32, seed: u32) -> World<HeadlessRenderer> {
        let config = WorldConfig::default()
            .with_render_distance(render_distance)
            .with_seed(seed)
            .with_worker_count(2);
        World::new(config, HeadlessRenderer::new()).unwrap()
    }

    /// Calls `update` at `pos` until nothing is generating, returning the summed
    /// summary.
    fn settle(world: &mut World<HeadlessRenderer>, pos: Point3<f32>) -> UpdateSummary {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut total = UpdateSummary::default();
        loop {
            let summary = world.update(pos);
            total.requested += summary.requested;
            total.unloaded += summary.unloaded;
            total.materialized += summary.materialized;
            total.discarded += summary.discarded;

            assert_tables_disjoint(world);
            if world.generating_count() == 0 {
                return total;
            }
            assert!(Instant::now() < deadline, "chunks never finished generating");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn assert_tables_disjoint(world: &World<HeadlessRenderer>) {
        for key in &world.table.generating {
            assert!(
                !world.table.loaded.contains_key(key),
                "chunk {} is both loaded and generating",
                key.coord()
            );
        }
    }

    fn chunk_center(coord: ChunkCoord) -> Point3<f32> {
        let origin = coord.world_origin();
        Point3::new(origin.x + 8.0, 40.0, origin.z + 8.0)
    }

    #[test]
    fn test_initial_load_fills_render_distance() {
        let mut world = test_world(2, 42);
        let summary = settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        let expected = (-2..=2)
            .flat_map(|x| (-2..=2).map(move |z| (x, z)))
            .filter(|&(x, z)| x * x + z * z <= 4)
            .count();
        assert_eq!(expected, 13);
        assert_eq!(world.loaded_chunk_count(), expected);
        assert_eq!(summary.requested, expected);
        assert_eq!(summary.materialized, expected);
        assert!(world.get_chunk(2, 0).is_some());
        assert!(world.get_chunk(2, 1).is_none());
    }

    #[test]
    fn test_loaded_terrain_matches_height() {
        let mut world = test_world(2, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        for x in -CHUNK_SIZE..2 * CHUNK_SIZE {
            for z in [-5, 0, 7, 15] {
                let height = world.get_terrain_height(x, z);
                let surface = world.get_block_type_at(x, height, z);
                if height >= SEA_LEVEL {
                    assert_eq!(surface, VoxelType::Grass, "column ({x}, {z})");
                } else {
                    assert_eq!(surface, VoxelType::Sand, "column ({x}, {z})");
                }
                for y in height + 1..CHUNK_HEIGHT {
                    assert_eq!(world.get_block_type_at(x, y, z), VoxelType::Air);
                }
            }
        }
    }

    #[test]
    fn test_set_block_exposes_hidden_face() {
        let mut world = test_world(1, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        let (x, z) = (5, 6);
        let height = world.get_terrain_height(x, z);
        assert!(height >= 1);
        let below = world.get_block_type_at(x, height - 1, z);
        let material = MeshMaterial::for_face(below, BlockSide::TOP).unwrap();
        let below_local = LocalPos::new(x, height - 1, z).unwrap();

        let hidden = |world: &World<HeadlessRenderer>| {
            !world
                .get_chunk(0, 0)
                .unwrap()
                .mesh()
                .stream(material)
                .contains_face(below_local, BlockSide::TOP)
        };
        assert!(hidden(&world));

        assert!(world.set_block(x, height, z, VoxelType::Air));
        assert_eq!(world.get_block_type_at(x, height, z), VoxelType::Air);
        assert!(!hidden(&world));
    }

    #[test]
    fn test_far_chunks_unload_after_moving() {
        let mut world = test_world(1, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));
        assert!(world.get_chunk(0, 0).is_some());

        // Two chunks away is still inside the hysteresis margin.
        let summary = world.update(chunk_center(ChunkCoord::new(2, 0)));
        assert_eq!(summary.unloaded, 0);
        assert!(world.get_chunk(0, 0).is_some());

        // Chunks around (2, 0) may already have arrived, so at least the first five
        // go.
        let summary = world.update(chunk_center(ChunkCoord::new(10, 0)));
        assert!(summary.unloaded >= 5);
        assert!(world.get_chunk(0, 0).is_none());
        assert_eq!(world.get_block_type_at(0, 0, 0), VoxelType::Air);

        settle(&mut world, chunk_center(ChunkCoord::new(10, 0)));
        assert_eq!(world.loaded_chunk_count(), 5);
        assert!(world.renderer().releases() >= 5);
        assert!(world.get_chunk(10, 0).is_some());
    }

    #[test]
    fn test_stationary_updates_request_each_chunk_once() {
        let mut world = test_world(1, 3);
        let origin = Point3::new(1.0, 40.0, 1.0);

        let first = world.update(origin);
        assert_eq!(first.requested, 5);

        // Beyond the movement threshold but inside the same chunk, while the first
        // batch is still generating or already loaded.
        let second = world.update(Point3::new(10.0, 40.0, 1.0));
        assert_eq!(second.requested, 0);

        let rest = settle(&mut world, Point3::new(10.0, 40.0, 1.0));
        assert_eq!(rest.requested, 0);
        assert_eq!(world.loaded_chunk_count(), 5);

        // Small moves never trigger a recompute.
        for step in 0..5 {
            let summary = world.update(Point3::new(10.0 + step as f32, 40.0, 1.0));
            assert_eq!(summary.requested, 0);
        }
    }

    #[test]
    fn test_jittered_updates_keep_tables_disjoint() {
        let mut world = test_world(2, 8);
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..500 {
            let pos = Point3::new(rng.f32() * 96.0 - 48.0, 40.0, rng.f32() * 96.0 - 48.0);
            world.update(pos);
            assert_tables_disjoint(&world);
        }
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));
    }

    #[test]
    fn test_struct_literal_config_is_validated() {
        let config = WorldConfig {
            render_distance: 1,
            seed: 42,
            hysteresis_margin: 0,
            movement_threshold: 8.0,
            max_results_per_update: 0,
            worker_count: 2,
        };
        let mut world = World::new(config, HeadlessRenderer::new()).unwrap();
        assert_eq!(world.config().max_results_per_update, 1);
        assert_eq!(world.config().unload_distance(), 3);

        settle(&mut world, Point3::new(0.0, 40.0, 0.0));
        assert_eq!(world.loaded_chunk_count(), 5);

        let negative = WorldConfig {
            render_distance: -3,
            ..WorldConfig::default().with_worker_count(1)
        };
        let world = World::new(negative, HeadlessRenderer::new()).unwrap();
        assert_eq!(world.render_distance(), 0);
    }

    #[test]
    fn test_observer_past_world_edge() {
        let mut world = test_world(1, 42);
        let summary = settle(&mut world, Point3::new(1.0e10, 40.0, 0.0));

        // Only the edge chunk and its neighbours on the inner side exist.
        assert_eq!(summary.requested, 4);
        assert_eq!(world.loaded_chunk_count(), 4);
        assert!(world.get_chunk(MAX_CHUNK_COORD, 0).is_some());
        world.shutdown();
    }

    #[test]
    fn test_update_after_shutdown_is_inert() {
        let mut world = test_world(1, 42);
        world.shutdown();

        let summary = world.update(Point3::new(0.0, 40.0, 0.0));
        assert!(summary.is_idle());
        assert_eq!(world.generating_count(), 0);
        assert_eq!(world.loaded_chunk_count(), 0);
    }

    #[test]
    fn test_results_outside_unload_radius_are_discarded() {
        let mut world = test_world(1, 11);
        let first = world.update(Point3::new(0.0, 40.0, 0.0));
        assert_eq!(first.requested, 5);

        let far = chunk_center(ChunkCoord::new(100, 100));
        let rest = settle(&mut world, far);

        assert_eq!(first.materialized + rest.discarded, 5);
        assert!(world.get_chunk(0, 0).is_none());
        assert!(world.get_chunk(100, 100).is_some());
        assert_eq!(world.loaded_chunk_count(), 5);
    }

    #[test]
    fn test_uploads_happen_on_calling_thread() {
        let mut world = test_world(1, 5);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        assert!(world.renderer().uploads() > 0);
        assert_eq!(world.renderer().upload_threads(), &[thread::current().id()]);
    }

    #[test]
    fn test_place_and_break() {
        let mut world = test_world(1, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        let (x, z) = (3, -4);
        let height = world.get_terrain_height(x, z);
        let surface = world.get_block_type_at(x, height, z);

        assert!(!world.place_block(x, height, z, VoxelType::Dirt));
        assert!(!world.place_block(x, height + 1, z, VoxelType::Air));
        assert!(world.place_block(x, height + 1, z, VoxelType::Cobblestone));
        assert_eq!(world.get_block_type_at(x, height + 1, z), VoxelType::Cobblestone);

        assert_eq!(world.break_block(x, height, z), Some(surface));
        assert_eq!(world.break_block(x, height, z), None);
        assert_eq!(world.get_block_type_at(x, height, z), VoxelType::Air);

        // Outside the world height or in unloaded chunks nothing happens.
        assert!(!world.set_block(x, CHUNK_HEIGHT, z, VoxelType::Dirt));
        assert!(!world.set_block(10_000, 10, 10_000, VoxelType::Dirt));
        assert_eq!(world.get_block_type_at(x, -1, z), VoxelType::Air);
    }

    #[test]
    fn test_render_and_cleanup() {
        let mut world = test_world(1, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));

        let mut drawer = CountingDrawer::default();
        assert_eq!(world.render(&mut drawer), 5);
        assert_eq!(drawer.chunks, 5);
        assert!(drawer.draw_calls >= 5);

        world.cleanup();
        assert_eq!(world.loaded_chunk_count(), 0);
        assert_eq!(world.renderer().live_meshes(), 0);
        assert_eq!(world.renderer().live_vertices(), 0);

        let mut drawer = CountingDrawer::default();
        assert_eq!(world.render(&mut drawer), 0);
    }

    #[test]
    fn test_set_render_distance_grows_load_set() {
        let mut world = test_world(1, 42);
        settle(&mut world, Point3::new(0.0, 40.0, 0.0));
        assert_eq!(world.loaded_chunk_count(), 5);

        world.set_render_distance(2);
        assert_eq!(world.render_distance(), 2);
        let summary = settle(&mut world, Point3::new(0.0, 40.0, 0.0));
        assert_eq!(summary.requested, 8);
        assert_eq!(world.loaded_chunk_count(), 13);
    }

    #[test]
    fn test_terrain_height_is_pure() {
        let world = test_world(0, 42);
        assert_eq!(world.loaded_chunk_count(), 0);
        let height = world.get_terrain_height(-1234, 5678);
        assert_eq!(height, TerrainGenerator::new(42).height_at(-1234, 5678));
        assert!((0..CHUNK_HEIGHT).contains(&height));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut world = test_world(1, 42);
        world.update(Point3::new(0.0, 40.0, 0.0));
        world.shutdown();
        world.shutdown();
        assert_eq!(world.loaded_chunk_count(), 0);
    }
}
