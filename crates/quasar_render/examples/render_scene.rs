//! Simple raytracer example.
//!
//! Renders a small scene with spheres, a mirror floor, and an area light,
//! then saves the result as PPM.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quasar_core::AreaSamplingMethod;
use quasar_render::{
    render_async, Camera, Color, PointLight, RectangularAreaLight, RenderConfig, SampleIntegrator,
    SamplePattern, Scene, SolidMaterial, Sphere, Triangle, Vec3,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
const SAMPLES_PER_PIXEL: u32 = 16;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    println!("Quasar - render example");
    println!("=======================");

    let start = Instant::now();
    let scene = Arc::new(build_scene());
    println!("Scene built in {:?}", start.elapsed());

    let camera = Arc::new(Camera::new(
        Vec3::new(0.0, 2.0, 8.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        40.0,
        WIDTH as f32 / HEIGHT as f32,
    ));

    let config = RenderConfig {
        width: WIDTH,
        height: HEIGHT,
        samples_per_pixel: SAMPLES_PER_PIXEL,
        max_reflection_depth: 4,
        tile_size: 64,
        pattern: SamplePattern::from_name("stratified")?,
        integrator: SampleIntegrator::from_name("adaptive", SAMPLES_PER_PIXEL, 64, 0.005, 3)?,
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        WIDTH, HEIGHT, SAMPLES_PER_PIXEL
    );

    let start = Instant::now();
    let handle = render_async(scene, camera, config);
    let progress = handle.progress_handle();

    // Poll-only reporting loop; the workers never see this thread
    let reporter = std::thread::spawn(move || {
        while progress.is_rendering() {
            print!(
                "\rRay {}/{} {:3.0}% ({}/{} tiles)",
                progress.completed_rays(),
                progress.total_rays(),
                progress.percentage(),
                progress.completed_tiles(),
                progress.total_tiles()
            );
            let _ = std::io::stdout().flush();
            std::thread::sleep(Duration::from_millis(500));
        }
    });

    let pixels = handle.wait()?;
    reporter.join().expect("reporter thread panicked");
    println!("\rRendered in {:?}                    ", start.elapsed());

    let filename = "output.ppm";
    save_ppm(&pixels, WIDTH, HEIGHT, filename)?;
    println!("Saved to {}", filename);

    Ok(())
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_background(Color::new(0.05, 0.07, 0.12));

    // Mirror-ish floor
    let floor = Arc::new(SolidMaterial::with_reflectance(Color::splat(0.4), 0.4));
    scene.add_triangle(
        Triangle::new(
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(20.0, 0.0, -20.0),
            Vec3::new(20.0, 0.0, 20.0),
        ),
        floor.clone(),
    );
    scene.add_triangle(
        Triangle::new(
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(20.0, 0.0, 20.0),
            Vec3::new(-20.0, 0.0, 20.0),
        ),
        floor,
    );

    scene.add_sphere(
        Sphere::new(Vec3::new(-1.5, 1.0, 0.0), 1.0),
        Arc::new(SolidMaterial::with_reflectance(Color::new(0.9, 0.2, 0.2), 0.1)),
    );
    scene.add_sphere(
        Sphere::new(Vec3::new(1.5, 1.0, -1.0), 1.0),
        Arc::new(SolidMaterial::with_reflectance(Color::new(0.2, 0.4, 0.9), 0.6)),
    );
    scene.add_sphere(
        Sphere::new(Vec3::new(0.3, 0.5, 1.5), 0.5),
        Arc::new(SolidMaterial::with_reflectance(Color::new(0.2, 0.8, 0.3), 0.0)),
    );

    // Soft key light plus a dim fill
    scene.add_light(Arc::new(RectangularAreaLight::new(
        Vec3::new(3.0, 6.0, 3.0),
        Vec3::X,
        Vec3::Z,
        3.0,
        3.0,
        Color::splat(14.0),
        16,
        AreaSamplingMethod::Stratified,
    )));
    scene.add_light(Arc::new(PointLight::new(
        Vec3::new(-6.0, 4.0, 4.0),
        Color::splat(0.3),
    )));

    scene.prepare();
    scene
}

/// Apply gamma correction (gamma = 2.0).
fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

fn save_ppm(pixels: &[Color], width: u32, height: u32, filename: &str) -> anyhow::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", width, height)?;
    writeln!(writer, "255")?;

    for color in pixels {
        let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
        let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
        let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    writer.flush()?;
    Ok(())
}
