use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use glam::Vec3;

#[derive(Copy, Clone, Debug)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| anyhow!("expected `width`x`height`"))?;
        Ok(Dimensions {
            width: w.parse()?,
            height: h.parse()?,
        })
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A `x,y,z` triple on the command line.
#[derive(Copy, Clone, Debug)]
pub struct Vector(pub Vec3);

impl FromStr for Vector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f32> = s
            .split(',')
            .map(|p| p.trim().parse())
            .collect::<Result<_, _>>()?;
        let [x, y, z] = parts[..] else {
            return Err(anyhow!("expected `x,y,z`"));
        };
        Ok(Vector(Vec3::new(x, y, z)))
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.0.x, self.0.y, self.0.z)
    }
}

#[derive(Debug, Default, Clone, Copy, ValueEnum)]
pub enum AvailableScene {
    #[default]
    Spheres,
    Cornell,
    Glass,
}

#[derive(Parser, Debug)]
pub struct Args {
    /// Output image path
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Screen dimension in format `width`x`height`
    #[arg(short, long, default_value = "800x600")]
    pub dimensions: Dimensions,

    /// Base samples per pixel per pass, before the adaptive multiplier
    #[arg(long = "spp", default_value_t = 16)]
    pub samples_per_pass: u32,

    /// Number of progressive passes; the output is refreshed after each
    #[arg(long, default_value_t = 8)]
    pub passes: u32,

    /// Maximum path length
    #[arg(long, default_value_t = 16)]
    pub bounces: u32,

    /// Worker threads; defaults to one per core
    #[arg(short, long)]
    pub workers: Option<usize>,

    #[arg(long, default_value_t = 32)]
    pub tile_size: u32,

    /// Adaptive sampling exponent applied to the relative pixel noise;
    /// 0 renders every pixel with the same budget
    #[arg(long, default_value_t = 0.5)]
    pub adapt: f32,

    /// Upper bound on the adaptive per-pixel budget multiplier
    #[arg(long, default_value_t = 8.0)]
    pub adapt_cap: f32,

    /// Per-channel ceiling on a single sample, to suppress fireflies
    #[arg(long)]
    pub clamp: Option<f32>,

    /// Scene selector
    #[arg(short, long, value_enum, default_value_t)]
    pub scene: AvailableScene,

    /// Camera position as `x,y,z`
    #[arg(long, default_value = "0,2,6")]
    pub from: Vector,

    /// Camera target as `x,y,z`
    #[arg(long, default_value = "0,0.5,0")]
    pub to: Vector,

    /// Vertical field of view, degrees
    #[arg(long, default_value_t = 50.0)]
    pub fov: f32,

    /// Lens diameter in scene units; 0 is a pinhole
    #[arg(long, default_value_t = 0.0)]
    pub aperture: f32,

    /// Focus distance; defaults to the from-to distance
    #[arg(long)]
    pub focus: Option<f32>,

    /// Equirectangular environment image replacing the scene sky
    #[arg(long)]
    pub panorama: Option<PathBuf>,

    /// Sky color as linear `r,g,b`, replacing the scene sky with a
    /// vertical gradient
    #[arg(long)]
    pub sky: Option<Vector>,

    /// Ground color of the `--sky` gradient; defaults to the sky color
    #[arg(long)]
    pub ground: Option<Vector>,

    /// Linear exposure multiplier applied at export
    #[arg(long, default_value_t = 1.0)]
    pub exposure: f32,

    /// Also write the sample-count heatmap here
    #[arg(long)]
    pub heatmap: Option<PathBuf>,

    /// Also write the noise-estimate map here
    #[arg(long)]
    pub noisemap: Option<PathBuf>,

    /// Seed for all the random draws; a given seed makes the render
    /// deterministic (the output only depends on x, y, pass and seed)
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}
