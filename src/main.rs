//! # Voxel World Demo Entry Point
//!
//! Runs the headless streaming demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_WORLD_SEED=42 VOXEL_RENDER_DISTANCE=6 cargo run --release
//! ```

fn main() {
    voxel_world::run();
}
