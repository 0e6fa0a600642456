//! Image tiling and render progress accounting.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// A rectangular pixel region `[x_start, x_end) x [y_start, y_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl Tile {
    pub fn new(x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    pub fn pixel_count(&self) -> u32 {
        self.width() * self.height()
    }
}

/// Partition an image into tiles of at most `tile_size` on a side, clipped
/// at the right and bottom edges. The tiles are disjoint and together cover
/// the image exactly once.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    if width == 0 || height == 0 || tile_size == 0 {
        return tiles;
    }

    let mut y = 0;
    while y < height {
        let y_end = (y + tile_size).min(height);
        let mut x = 0;
        while x < width {
            let x_end = (x + tile_size).min(width);
            tiles.push(Tile::new(x, y, x_end, y_end));
            x = x_end;
        }
        y = y_end;
    }

    tiles
}

/// Shared progress counters for one render invocation.
///
/// Workers bump the counters with relaxed fetch-adds; a reporting task may
/// poll them at any cadence. This is the only mutable state shared across
/// tile workers.
#[derive(Debug)]
pub struct RenderProgress {
    completed_rays: AtomicU64,
    completed_tiles: AtomicUsize,
    rendering: AtomicBool,
    total_rays: u64,
    total_tiles: usize,
}

impl RenderProgress {
    pub fn new(total_rays: u64, total_tiles: usize) -> Self {
        Self {
            completed_rays: AtomicU64::new(0),
            completed_tiles: AtomicUsize::new(0),
            rendering: AtomicBool::new(true),
            total_rays,
            total_tiles,
        }
    }

    pub fn add_completed_rays(&self, rays: u64) {
        self.completed_rays.fetch_add(rays, Ordering::Relaxed);
    }

    pub fn add_completed_tile(&self) {
        self.completed_tiles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed_rays(&self) -> u64 {
        self.completed_rays.load(Ordering::Relaxed)
    }

    pub fn completed_tiles(&self) -> usize {
        self.completed_tiles.load(Ordering::Relaxed)
    }

    pub fn total_rays(&self) -> u64 {
        self.total_rays
    }

    pub fn total_tiles(&self) -> usize {
        self.total_tiles
    }

    pub fn percentage(&self) -> f32 {
        if self.total_rays == 0 {
            return 100.0;
        }
        self.completed_rays() as f32 / self.total_rays as f32 * 100.0
    }

    pub(crate) fn finish(&self) {
        self.rendering.store(false, Ordering::Release);
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering.load(Ordering::Acquire)
    }
}
