//! Parcel Mesher CLI
//!
//! Generate 3D meshes from voxel parcel descriptions.

use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use parcel_mesher::{
    count_faces, encode_voxels, export_glb, export_raw, export_scene_glb, load_palette,
    load_parcels, GlbOptions, Layer, Mesher, MesherConfig, ObjExport, ParcelDescription,
    ParcelMesh, Placement, SizePolicy, VoxelCode, VoxelGrid,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "parcel-mesher")]
#[command(author, version, about = "Generate 3D meshes from voxel parcels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh parcels from a JSON input file
    Mesh {
        /// Input JSON file: one parcel, or {"parcels": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (one file per parcel) or file (with --combine)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// Write every parcel into a single GLB scene
        #[arg(long)]
        combine: bool,

        /// Reject payloads whose size does not match the parcel bounds
        #[arg(long)]
        strict_size: bool,

        /// Palette JSON file (array of "#rrggbb")
        #[arg(long)]
        palette: Option<PathBuf>,

        /// Place meshes at their world position
        #[arg(long)]
        world_space: bool,

        /// Maximum number of parcels to mesh (0 for no limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Skip parcels whose ground origin is further than this from
        /// (X, 0, Z) at --center (0 for no limit)
        #[arg(long)]
        max_distance: Option<f32>,

        /// Centre for --max-distance, as X,Z
        #[arg(long, value_parser = parse_center, default_value = "0,0")]
        center: (f32, f32),

        /// Mesh solid and glass layers concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Show information about the parcels in a JSON file
    Info {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Reject payloads whose size does not match the parcel bounds
        #[arg(long)]
        strict_size: bool,
    },

    /// Encode a JSON array of voxel codes into a payload string
    Encode {
        /// Input JSON file containing an array of codes
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
    /// Raw JSON arrays
    Raw,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Glb => "glb",
            OutputFormat::Obj => "obj",
            OutputFormat::Raw => "json",
        }
    }
}

fn parse_center(s: &str) -> Result<(f32, f32), String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid centre format: '{}'. Use X,Z", s))?;
    let x = x.trim().parse().map_err(|e| format!("Invalid X '{}': {}", x, e))?;
    let z = z.trim().parse().map_err(|e| format!("Invalid Z '{}': {}", z, e))?;
    Ok((x, z))
}

fn size_policy(strict: bool) -> SizePolicy {
    if strict {
        SizePolicy::Strict
    } else {
        SizePolicy::Truncate
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mesh {
            input,
            output,
            format,
            combine,
            strict_size,
            palette,
            world_space,
            limit,
            max_distance,
            center,
            parallel,
        } => {
            let mut config = MesherConfig::default()
                .with_size_policy(size_policy(strict_size))
                .with_parallel_layers(parallel);
            if let Some(path) = &palette {
                config = config.with_palette(load_palette(path)?);
            }

            let parcels = select_parcels(load_parcels(&input)?, limit, max_distance, center);
            println!("Meshing {} parcels from {:?}...", parcels.len(), input);

            let meshes = mesh_all(&Mesher::with_config(config), &parcels);

            if combine {
                if format != OutputFormat::Glb {
                    return Err("--combine is only supported for GLB output".into());
                }
                let options = GlbOptions {
                    world_placement: world_space,
                    ..Default::default()
                };
                let glb_data = export_scene_glb(&meshes, &options)?;
                fs::write(&output, &glb_data)?;
                println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), output);
            } else {
                fs::create_dir_all(&output)?;
                for mesh in &meshes {
                    export_mesh(mesh, &output, format, world_space)?;
                }
            }
        }
        Commands::Info { input, strict_size } => {
            show_parcel_info(&input, size_policy(strict_size))?;
        }
        Commands::Encode { input } => {
            let codes: Vec<VoxelCode> = serde_json::from_str(&fs::read_to_string(&input)?)?;
            println!("{}", encode_voxels(&codes)?);
        }
    }

    Ok(())
}

/// Apply the distance filter, then the limit, keeping input order.
///
/// Distance runs from `(x, 0, z)` at the centre to the parcel's placement origin.
/// A limit or distance of zero disables that filter.
fn select_parcels(
    parcels: Vec<ParcelDescription>,
    limit: Option<usize>,
    max_distance: Option<f32>,
    center: (f32, f32),
) -> Vec<ParcelDescription> {
    let max_distance = max_distance.filter(|&d| d != 0.0);
    let limit = limit.filter(|&n| n != 0).unwrap_or(usize::MAX);
    let center = Vec3::new(center.0, 0.0, center.1);

    parcels
        .into_iter()
        .filter(|parcel| match (max_distance, parcel.bounds()) {
            (Some(max), Ok(bounds)) => {
                let origin = Vec3::from(Placement::for_parcel(&bounds).origin);
                center.distance(origin) <= max
            }
            _ => true,
        })
        .take(limit)
        .collect()
}

/// Mesh every parcel, logging and skipping failures and empty results.
fn mesh_all(mesher: &Mesher, parcels: &[ParcelDescription]) -> Vec<ParcelMesh> {
    let mut meshes = Vec::with_capacity(parcels.len());

    for (parcel, result) in parcels.iter().zip(mesher.mesh_parcels(parcels)) {
        match result {
            Ok(mesh) if mesh.is_empty() => {
                log::info!("parcel {} has no geometry, skipping", parcel.id);
            }
            Ok(mesh) => {
                println!(
                    "  Parcel {} ({}): {} vertices ({} solid, {} glass), {} triangles",
                    parcel.id,
                    parcel.display_name(),
                    mesh.total_vertices(),
                    mesh.solid.vertex_count(),
                    mesh.glass.vertex_count(),
                    mesh.total_triangles()
                );
                meshes.push(mesh);
            }
            Err(e) => log::warn!("parcel {}: {}", parcel.id, e),
        }
    }

    meshes
}

fn export_mesh(
    mesh: &ParcelMesh,
    dir: &Path,
    format: OutputFormat,
    world_space: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = match mesh.parcel_id {
        Some(id) => format!("parcel-{}", id),
        None => "parcel".to_string(),
    };

    match format {
        OutputFormat::Glb => {
            let options = GlbOptions {
                world_placement: world_space,
                ..Default::default()
            };
            let path = dir.join(&name).with_extension(format.extension());
            let glb_data = export_glb(mesh, &options)?;
            fs::write(&path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), path);
        }
        OutputFormat::Obj => {
            let mesh = if world_space { mesh.to_world() } else { mesh.clone() };
            let path = ObjExport::from_mesh(&mesh, &name)?.write_to_dir(dir)?;
            println!("Exported OBJ to {:?}", path);
        }
        OutputFormat::Raw => {
            let mesh = if world_space { mesh.to_world() } else { mesh.clone() };
            let path = dir.join(&name).with_extension(format.extension());
            fs::write(&path, export_raw(&mesh).to_json()?)?;
            println!("Exported raw mesh to {:?}", path);
        }
    }

    Ok(())
}

fn show_parcel_info(input: &Path, policy: SizePolicy) -> Result<(), Box<dyn std::error::Error>> {
    let parcels = load_parcels(input)?;
    println!("Loaded {} parcels from {:?}", parcels.len(), input);

    for parcel in &parcels {
        println!("\nParcel {} ({}):", parcel.id, parcel.display_name());

        let bounds = match parcel.bounds() {
            Ok(bounds) => bounds,
            Err(e) => {
                println!("  Invalid: {}", e);
                continue;
            }
        };
        println!(
            "  Bounds: {:?} -> {:?} ({}x{}x{})",
            bounds.min,
            bounds.max,
            bounds.width(),
            bounds.height(),
            bounds.depth()
        );

        let grid = match VoxelGrid::from_parcel(parcel, policy) {
            Ok(grid) => grid,
            Err(e) => {
                println!("  Payload: {}", e);
                continue;
            }
        };
        println!("  Grid: {:?} ({} voxels)", grid.dims(), grid.len());

        for (code, count) in grid.histogram() {
            println!("    code {:>5}: {}", code, count);
        }
        for layer in Layer::ALL {
            println!("  {} faces: {}", layer, count_faces(&grid, layer));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(id: i64, x: i32, z: i32) -> ParcelDescription {
        ParcelDescription {
            id,
            x1: x,
            x2: x + 2,
            y1: 0,
            y2: 4,
            z1: z,
            z2: z + 2,
            name: None,
            voxels: String::new(),
            tileset: None,
        }
    }

    fn ids(parcels: &[ParcelDescription]) -> Vec<i64> {
        parcels.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_zero_disables_filters() {
        let parcels = vec![parcel(1, 0, 0), parcel(2, 500, 500), parcel(3, -9, 4)];

        let all = select_parcels(parcels.clone(), Some(0), Some(0.0), (0.0, 0.0));
        assert_eq!(ids(&all), vec![1, 2, 3]);

        let first_two = select_parcels(parcels, Some(2), None, (0.0, 0.0));
        assert_eq!(ids(&first_two), vec![1, 2]);
    }

    #[test]
    fn test_distance_includes_ground_offset() {
        // Origin (1, -0.999, 1): horizontal distance from the centre is zero.
        let parcels = vec![parcel(1, 0, 0), parcel(2, 10, 0)];

        let kept = select_parcels(parcels.clone(), None, Some(0.5), (1.0, 1.0));
        assert!(kept.is_empty());

        let kept = select_parcels(parcels.clone(), None, Some(1.0), (1.0, 1.0));
        assert_eq!(ids(&kept), vec![1]);

        let kept = select_parcels(parcels, Some(1), Some(100.0), (1.0, 1.0));
        assert_eq!(ids(&kept), vec![1]);
    }

    #[test]
    fn test_invalid_bounds_pass_distance_filter() {
        let mut inverted = parcel(4, 900, 900);
        inverted.x2 = inverted.x1 - 1;
        let kept = select_parcels(vec![inverted, parcel(5, 900, 900)], None, Some(1.0), (0.0, 0.0));
        assert_eq!(ids(&kept), vec![4]);
    }

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center("3.5, -2").unwrap(), (3.5, -2.0));
        assert!(parse_center("3.5").is_err());
        assert!(parse_center("a,1").is_err());
    }
}
