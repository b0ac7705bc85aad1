//! Scene optimization demo
//!
//! Builds a synthetic imported scene (split-quad grids wrapped in redundant
//! groups, identity transforms, a spinning node with a padded timeline),
//! validates it, optimizes it and prints the report.
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=sceneslim=debug`.

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::Vector3;
use sceneslim::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Optimize a synthetic scene and report what changed.
#[derive(Parser, Debug)]
#[command(name = "optimize_scene")]
#[command(about = "Builds a synthetic scene and runs the sceneslim optimizer on it")]
struct Args {
    /// Number of mesh leaves.
    #[arg(short, long, default_value_t = 4)]
    meshes: u32,

    /// Cells per side of each grid mesh.
    #[arg(short, long, default_value_t = 8)]
    grid: u32,

    /// Optimizer configuration as JSON; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Keep continuous interpolation on surviving key values.
    #[arg(long)]
    keep_continuous: bool,

    #[arg(long)]
    no_timeline: bool,

    #[arg(long)]
    no_prune: bool,

    #[arg(long)]
    no_flatten: bool,

    #[arg(long)]
    no_dedup: bool,

    #[arg(long)]
    no_degenerate: bool,

    /// Drop points and texcoords no face references.
    #[arg(long)]
    remove_unreferenced: bool,
}

impl Args {
    fn optimizer_config(&self) -> Result<OptimizerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("Invalid config: {}", path.display()))?
            }
            None => OptimizerConfig::default(),
        };
        if self.keep_continuous {
            config = config.with_downgrade_to_discrete(false);
        }
        if self.no_timeline {
            config = config.with_optimize_timeline(false);
        }
        if self.no_prune {
            config = config.with_prune_transforms(false);
        }
        if self.no_flatten {
            config = config.with_flatten_groups(false);
        }
        if self.no_dedup {
            config = config.with_dedup_geometry(false);
        }
        if self.no_degenerate {
            config = config.with_remove_degenerate(false);
        }
        if self.remove_unreferenced {
            config = config.with_remove_unreferenced(true);
        }
        Ok(config)
    }
}

/// Grid of quads that each carry their own corners, plus a few slivers.
fn split_grid(cells: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let scale = cells.max(1) as f32;
    for y in 0..cells {
        for x in 0..cells {
            let base = mesh.point_count() as u32;
            for (cx, cy) in [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)] {
                let height = (cx as f32 / scale * std::f32::consts::PI).sin();
                mesh.add_point(cx as f32, cy as f32, height);
                mesh.add_texcoord(cx as f32 / scale, cy as f32 / scale);
            }
            let (a, b, c, d) = (base, base + 1, base + 2, base + 3);
            mesh.add_face([a, a, b, b, c, c]);
            mesh.add_face([a, a, c, c, d, d]);
            if x == y {
                // Collapsed corner, as some exporters emit for seams.
                mesh.add_face([a, a, b, b, b, b]);
            }
        }
    }
    mesh
}

fn build_scene(meshes: u32, cells: u32) -> Scene {
    let spin = Transform::rotate(0.0, Vector3::y());
    let angle = PropertyTarget::transform(spin.id(), TransformProperty::Angle);

    let mut children: Vec<SceneNode> = (0..meshes)
        .map(|i| {
            let leaf = SceneNode::mesh(split_grid(cells))
                .with_name(format!("grid {i}"))
                .with_transform(Transform::translate(i as f64 * cells as f64, 0.0, 0.0))
                .with_transform(Transform::scale(1.0, 1.0, 1.0));
            SceneNode::group(vec![leaf])
                .with_name(format!("import wrapper {i}"))
                .with_transform(Transform::identity())
        })
        .collect();
    children.push(SceneNode::empty().with_name("turntable").with_transform(spin));

    let timeline = Timeline::new(vec![
        KeyFrame::new(0.0, vec![KeyValue::new(angle.clone(), 0.0)]),
        KeyFrame::new(1.0, vec![KeyValue::new(angle.clone(), 0.0)]),
        KeyFrame::new(2.0, vec![KeyValue::new(angle.clone(), 180.0)]),
        KeyFrame::new(3.0, vec![KeyValue::new(angle.clone(), 180.0)]),
        KeyFrame::new(4.0, vec![KeyValue::new(angle.clone(), 180.0)])
            .with_callback(CallbackMarker("half-turn".to_string())),
        KeyFrame::new(5.0, vec![KeyValue::new(angle.clone(), 180.0)]),
        KeyFrame::new(6.0, vec![KeyValue::new(angle, 360.0)]).with_name("full-turn"),
    ]);

    Scene::new(SceneNode::group(children).with_name("scene")).with_timeline(timeline)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.optimizer_config()?;

    let mut scene = build_scene(args.meshes, args.grid);
    let checked = validate_scene(&scene.root).context("Synthetic scene is malformed")?;
    info!("validated {} meshes, {} nodes", checked, scene.root.node_count());

    let optimizer = if args.json {
        Optimizer::new(config).with_sink(NullSink)
    } else {
        Optimizer::new(config)
    };
    let report = optimizer.optimize(&mut scene).context("Optimization failed")?;

    validate_scene(&scene.root).context("Optimized scene is malformed")?;
    info!("{} nodes after optimization", scene.root.node_count());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
