//! Tile-parallel render scheduler.
//!
//! The image is cut into tiles which are fanned out over the rayon worker
//! pool. Each tile renders into a local buffer with its own RNG, then
//! splices its pixels into the shared image and bumps the progress
//! counters. The whole render runs on a coordinating thread so the caller
//! gets a handle back immediately.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use quasar_core::RenderSettings;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::camera::Camera;
use crate::material::Color;
use crate::sampling::{SampleIntegrator, SamplePattern, SamplingError};
use crate::scene::Scene;
use crate::tile::{generate_tiles, RenderProgress, Tile};
use crate::tracer::RayTracer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a render worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Everything the scheduler needs besides scene and camera.
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_reflection_depth: u32,
    pub tile_size: u32,
    pub pattern: SamplePattern,
    pub integrator: SampleIntegrator,
}

impl RenderConfig {
    /// Build from parsed render settings, resolving the pattern and
    /// integrator names.
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, RenderError> {
        let ms = &settings.multisampling;

        Ok(Self {
            width: settings.width,
            height: settings.height,
            samples_per_pixel: ms.samples_per_pixel,
            max_reflection_depth: settings.max_reflection_depth,
            tile_size: settings.tile_size,
            pattern: SamplePattern::from_name(&ms.sampling_pattern)?,
            integrator: SampleIntegrator::from_name(
                &ms.sample_integrator,
                ms.samples_per_pixel,
                ms.max_samples_per_pixel,
                ms.variance_threshold,
                ms.adaptation_levels,
            )?,
        })
    }
}

/// Handle to a render in flight.
///
/// Dropping the handle detaches the render; [`RenderHandle::wait`] blocks
/// until every tile is done and yields the pixel buffer. A panic in any tile
/// worker surfaces here as [`RenderError::WorkerPanicked`].
pub struct RenderHandle {
    thread: JoinHandle<Vec<Color>>,
    progress: Arc<RenderProgress>,
    width: u32,
    height: u32,
}

impl RenderHandle {
    pub fn progress(&self) -> &RenderProgress {
        &self.progress
    }

    /// Shareable progress handle for a reporting task.
    pub fn progress_handle(&self) -> Arc<RenderProgress> {
        Arc::clone(&self.progress)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Block until the render completes and return the `width * height`
    /// pixel buffer in row-major order, top row first.
    pub fn wait(self) -> Result<Vec<Color>, RenderError> {
        self.thread.join().map_err(|_| RenderError::WorkerPanicked)
    }
}

/// Start rendering and return immediately.
///
/// The scene must already be [`Scene::prepare`]d; scene and camera are
/// shared read-only across all tile workers for the duration.
pub fn render_async(scene: Arc<Scene>, camera: Arc<Camera>, config: RenderConfig) -> RenderHandle {
    let width = config.width;
    let height = config.height;

    let tiles = generate_tiles(width, height, config.tile_size);
    let total_rays = width as u64 * height as u64 * config.samples_per_pixel as u64;
    let progress = Arc::new(RenderProgress::new(total_rays, tiles.len()));

    log::info!(
        "rendering {}x{} at {} spp: {} tiles of {}px",
        width,
        height,
        config.samples_per_pixel,
        tiles.len(),
        config.tile_size
    );

    let worker_progress = Arc::clone(&progress);
    let thread = thread::spawn(move || {
        if !scene.is_prepared() {
            log::warn!("scene was not prepared; mesh queries fall back to linear scans");
        }

        let buffer = Arc::new(Mutex::new(vec![Color::ZERO; (width * height) as usize]));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tiles.par_iter().for_each(|tile| {
                let mut rng = SmallRng::from_entropy();
                let tile_pixels = render_tile(&scene, &camera, &config, tile, &mut rng);

                // Splice the finished tile into the shared image row by row.
                // The lock is held once per tile, not per pixel.
                let mut image = buffer.lock().expect("poisoned pixel buffer lock");
                for (row, y) in (tile.y_start..tile.y_end).enumerate() {
                    let src_start = row * tile.width() as usize;
                    let dst_start = (y * width + tile.x_start) as usize;
                    image[dst_start..dst_start + tile.width() as usize].copy_from_slice(
                        &tile_pixels[src_start..src_start + tile.width() as usize],
                    );
                }
                drop(image);

                worker_progress
                    .add_completed_rays(tile.pixel_count() as u64 * config.samples_per_pixel as u64);
                worker_progress.add_completed_tile();
            });
        }));

        // Reporters polling `is_rendering` must see the render end even if
        // a tile panicked; completed tiles stay valid in the buffer
        worker_progress.finish();
        if let Err(payload) = outcome {
            std::panic::resume_unwind(payload);
        }

        match Arc::try_unwrap(buffer) {
            Ok(mutex) => mutex.into_inner().expect("poisoned pixel buffer lock"),
            Err(shared) => shared.lock().expect("poisoned pixel buffer lock").clone(),
        }
    });

    RenderHandle {
        thread,
        progress,
        width,
        height,
    }
}

/// Render one tile into a fresh row-major buffer of its own size.
fn render_tile(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    tile: &Tile,
    rng: &mut SmallRng,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(tile.pixel_count() as usize);

    for y in tile.y_start..tile.y_end {
        for x in tile.x_start..tile.x_end {
            pixels.push(render_pixel(scene, camera, config, x, y, rng));
        }
    }

    pixels
}

/// Render a single pixel: samples -> camera rays -> traced colors ->
/// integrated color.
fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let tracer = RayTracer::new(scene, config.max_reflection_depth);

    let to_uv = |sample_x: f32, sample_y: f32| {
        let u = (x as f32 + sample_x) / config.width as f32;
        // Buffer row 0 is the top of the image
        let v = ((config.height - 1 - y) as f32 + sample_y) / config.height as f32;
        (u, v)
    };

    match &config.integrator {
        SampleIntegrator::Adaptive(adaptive) => {
            adaptive.integrate_adaptive(&config.pattern, rng, |sample, rng| {
                let (u, v) = to_uv(sample.x, sample.y);
                let ray = camera.get_ray(u, v, rng);
                tracer.trace_with_reflections(ray, rng)
            })
        }
        integrator => {
            let samples = config.pattern.generate_samples(config.samples_per_pixel, rng);

            let colors: Vec<Color> = samples
                .iter()
                .map(|sample| {
                    let (u, v) = to_uv(sample.x, sample.y);
                    let ray = camera.get_ray(u, v, rng);
                    tracer.trace_with_reflections(ray, rng)
                })
                .collect();

            integrator.integrate(&samples, &colors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::PointLight;
    use crate::material::{Material, SolidMaterial};
    use crate::sphere::Sphere;
    use quasar_math::Vec3;

    const BACKGROUND: Color = Vec3::new(0.05, 0.05, 0.2);

    fn unit_sphere_scene() -> Arc<Scene> {
        let mut scene = Scene::new();
        scene.set_background(BACKGROUND);
        scene.add_sphere(
            Sphere::new(Vec3::ZERO, 1.0),
            Arc::new(SolidMaterial::with_reflectance(Color::new(1.0, 0.2, 0.2), 0.0)),
        );
        scene.add_light(Arc::new(PointLight::new(
            Vec3::new(5.0, 5.0, 5.0),
            Color::ONE,
        )));
        scene.prepare();
        Arc::new(scene)
    }

    fn test_camera() -> Arc<Camera> {
        Arc::new(Camera::new(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.0,
        ))
    }

    fn test_config(width: u32, height: u32) -> RenderConfig {
        RenderConfig {
            width,
            height,
            samples_per_pixel: 1,
            max_reflection_depth: 3,
            tile_size: 16,
            pattern: SamplePattern::from_name("stratified").unwrap(),
            integrator: SampleIntegrator::Average,
        }
    }

    #[test]
    fn test_sphere_center_and_corners() {
        let width = 33u32;
        let height = 33u32;

        let handle = render_async(unit_sphere_scene(), test_camera(), test_config(width, height));
        let pixels = handle.wait().unwrap();
        assert_eq!(pixels.len(), (width * height) as usize);

        // Center pixel sees the sphere
        let center = pixels[(height / 2 * width + width / 2) as usize];
        assert_ne!(center, BACKGROUND);

        // All four corners see the background
        for corner in [
            pixels[0],
            pixels[(width - 1) as usize],
            pixels[((height - 1) * width) as usize],
            pixels[((height - 1) * width + width - 1) as usize],
        ] {
            assert_eq!(corner, BACKGROUND);
        }
    }

    #[test]
    fn test_progress_reaches_total() {
        let config = test_config(40, 25);
        let handle = render_async(unit_sphere_scene(), test_camera(), config);
        let progress = handle.progress_handle();

        let pixels = handle.wait().unwrap();
        assert_eq!(pixels.len(), 1000);

        assert_eq!(progress.completed_tiles(), progress.total_tiles());
        assert_eq!(progress.completed_rays(), progress.total_rays());
        assert!((progress.percentage() - 100.0).abs() < 1e-4);
        assert!(!progress.is_rendering());
    }

    #[test]
    fn test_adaptive_integrator_end_to_end() {
        let mut config = test_config(16, 16);
        config.samples_per_pixel = 2;
        config.integrator = SampleIntegrator::from_name("adaptive", 2, 8, 0.0001, 2).unwrap();

        let handle = render_async(unit_sphere_scene(), test_camera(), config);
        let pixels = handle.wait().unwrap();

        // Background pixels have zero variance and stay exactly background
        assert_eq!(pixels[0], BACKGROUND);
        // The sphere is still in the middle
        assert_ne!(pixels[8 * 16 + 8], BACKGROUND);
    }

    #[test]
    fn test_worker_panic_propagates() {
        struct PanickingMaterial;

        impl Material for PanickingMaterial {
            fn diffuse_color(&self, _u: f32, _v: f32) -> Color {
                panic!("invalid material dereference")
            }
            fn ambient_color(&self) -> Color {
                panic!("invalid material dereference")
            }
            fn specular_color(&self) -> Color {
                Color::ZERO
            }
            fn shininess(&self) -> f32 {
                1.0
            }
            fn reflectance(&self) -> f32 {
                0.0
            }
        }

        let mut scene = Scene::new();
        scene.set_background(BACKGROUND);
        scene.add_sphere(Sphere::new(Vec3::ZERO, 1.0), Arc::new(PanickingMaterial));
        scene.add_light(Arc::new(PointLight::new(
            Vec3::new(5.0, 5.0, 5.0),
            Color::ONE,
        )));
        scene.prepare();

        let handle = render_async(Arc::new(scene), test_camera(), test_config(8, 8));
        assert!(matches!(handle.wait(), Err(RenderError::WorkerPanicked)));
    }

    #[test]
    fn test_config_from_settings() {
        let settings: RenderSettings = serde_json::from_str(
            r#"{
                "width": 320,
                "height": 240,
                "multisampling": {
                    "samples_per_pixel": 4,
                    "sampling_pattern": "blue_noise",
                    "sample_integrator": "adaptive"
                }
            }"#,
        )
        .unwrap();

        let config = RenderConfig::from_settings(&settings).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.tile_size, 64);
        assert!(matches!(config.pattern, SamplePattern::BlueNoise(_)));
        assert!(matches!(config.integrator, SampleIntegrator::Adaptive(_)));

        let mut bad = settings.clone();
        bad.multisampling.sampling_pattern = "sobol".to_string();
        assert!(RenderConfig::from_settings(&bad).is_err());
    }
}
