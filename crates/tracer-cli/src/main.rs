mod cli;
mod output;
mod progress;
mod scenes;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use tracer::{
    camera::Camera,
    color::Rgb,
    environment::{Environment, Gradient, Panorama},
    integrator::PathTracer,
    math::point::Point,
    renderer::{RenderConfig, Renderer, World},
};

use cli::Args;
use progress::PercentBar;

fn build_renderer(args: &Args) -> Result<Renderer> {
    let scene = scenes::build(args.scene);
    let environment = match (&args.panorama, args.sky) {
        (Some(path), _) => {
            log::info!("loading panorama {}", path.display());
            let image = image::open(path)
                .with_context(|| format!("opening {}", path.display()))?
                .into_rgb32f();
            Box::new(Panorama::new(image)) as Box<dyn Environment>
        }
        (None, Some(sky)) => {
            let ground = args.ground.unwrap_or(sky).0;
            Box::new(Gradient {
                ground: Rgb::new(ground.x, ground.y, ground.z),
                sky: Rgb::new(sky.0.x, sky.0.y, sky.0.z),
            })
        }
        (None, None) => scene.environment,
    };

    log::info!("building spatial index");
    let world = World::new(scene.primitives, environment);

    let from = Point(args.from.0);
    let to = Point(args.to.0);
    let camera = Camera::new(
        from,
        to,
        Vec3::Y,
        args.fov,
        args.dimensions.width as f32 / args.dimensions.height as f32,
        args.aperture,
        args.focus.unwrap_or_else(|| (to - from).length()),
    );

    let mut integrator = PathTracer::new(args.bounces);
    if let Some(clamp) = args.clamp {
        integrator = integrator.with_clamp(clamp);
    }

    Ok(Renderer::new(
        world,
        camera,
        Box::new(integrator),
        RenderConfig {
            width: args.dimensions.width,
            height: args.dimensions.height,
            samples_per_pass: args.samples_per_pass,
            passes: args.passes,
            tile_size: args.tile_size,
            seed: args.seed,
            adapt: args.adapt,
            adapt_cap: args.adapt_cap,
        },
    ))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(workers) = args.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()?;
    }

    log::info!(
        "rendering {:?} at {} ({} passes of {} spp)",
        args.scene,
        args.dimensions,
        args.passes,
        args.samples_per_pass
    );
    let renderer = build_renderer(&args)?;

    let mut pass = 0;
    let film = renderer.run(|partial| {
        pass += 1;
        print!(
            "\r{}",
            PercentBar {
                percent: pass as f32 / args.passes as f32,
                width: 50,
            }
        );
        std::io::stdout().flush().ok();

        // Keep the output fresh so long renders can be watched from disk
        if let Err(err) = output::save_png(&partial.image(args.exposure), &args.output) {
            log::error!("could not refresh {}: {err}", args.output.display());
        }
    });
    println!();

    output::save_png(&film.image(args.exposure), &args.output)?;
    log::info!("wrote {}", args.output.display());

    if let Some(path) = &args.heatmap {
        output::save_png(&film.heatmap(), path)?;
    }
    if let Some(path) = &args.noisemap {
        output::save_png(&film.noisemap(), path)?;
    }
    Ok(())
}
