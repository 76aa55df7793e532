// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Boolean CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polyframe_boolean::cli::{init_logger, Reporter};
use polyframe_boolean::geometry::analyze;
use polyframe_boolean::{read_mesh, write_mesh, BooleanConfig, BooleanKernel, BooleanOp};
use polyframe_boolean::{PredicateStats, TriMesh};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "polyframe-bool")]
#[command(version, about = "Robust Boolean operations on closed triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print predicate and resolution counters
    #[arg(long, global = true)]
    stats: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a mesh is closed and free of self-intersections
    Solid {
        input: PathBuf,
    },

    /// Union of two meshes
    Union {
        in0: PathBuf,
        in1: PathBuf,
        out: PathBuf,
    },

    /// First mesh minus the second
    Diff {
        in0: PathBuf,
        in1: PathBuf,
        out: PathBuf,
    },

    /// Intersection of two meshes
    Isct {
        in0: PathBuf,
        in1: PathBuf,
        out: PathBuf,
    },

    /// Symmetric difference of two meshes
    Xor {
        in0: PathBuf,
        in1: PathBuf,
        out: PathBuf,
    },

    /// Cut both meshes along their intersection and write them as one mesh
    Resolve {
        in0: PathBuf,
        in1: PathBuf,
        out: PathBuf,
    },

    /// Print mesh statistics
    Info {
        input: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose).context("Failed to install logger")?;

    let config = match &cli.config {
        Some(path) => BooleanConfig::from_file(path)?,
        None => BooleanConfig::load()?,
    };

    let stats = Arc::new(PredicateStats::new());
    let kernel = BooleanKernel::new(config).with_stats(Arc::clone(&stats));

    match &cli.command {
        Commands::Solid { input } => {
            let mesh = read_mesh(input)?;
            let solid = kernel
                .is_solid(&mesh)
                .with_context(|| format!("Invalid mesh: {}", input.display()))?;
            Reporter::report_solidity(&input.display().to_string(), solid);
            if cli.stats {
                Reporter::report_predicates(&stats.snapshot());
            }
        }
        Commands::Union { in0, in1, out } => {
            boolean_command(&kernel, BooleanOp::Union, in0, in1, out, cli.stats)?;
        }
        Commands::Diff { in0, in1, out } => {
            boolean_command(&kernel, BooleanOp::Difference, in0, in1, out, cli.stats)?;
        }
        Commands::Isct { in0, in1, out } => {
            boolean_command(&kernel, BooleanOp::Intersection, in0, in1, out, cli.stats)?;
        }
        Commands::Xor { in0, in1, out } => {
            boolean_command(
                &kernel,
                BooleanOp::SymmetricDifference,
                in0,
                in1,
                out,
                cli.stats,
            )?;
        }
        Commands::Resolve { in0, in1, out } => {
            let (a, b) = read_pair(in0, in1)?;
            let output = kernel
                .run_resolve(&a, &b)
                .context("Intersection resolution failed")?;
            write_mesh(out, &output.mesh)?;
            Reporter::report_operation(
                "resolve",
                &out.display().to_string(),
                output.mesh.n_triangles(),
                output.report.duration,
            );
            if cli.stats {
                Reporter::report_stats(&output.report);
            }
        }
        Commands::Info { input, json } => {
            info_command(&kernel, input, *json)?;
        }
    }

    Ok(())
}

fn read_pair(in0: &Path, in1: &Path) -> Result<(TriMesh, TriMesh)> {
    Ok((read_mesh(in0)?, read_mesh(in1)?))
}

fn boolean_command(
    kernel: &BooleanKernel,
    op: BooleanOp,
    in0: &Path,
    in1: &Path,
    out: &Path,
    show_stats: bool,
) -> Result<()> {
    let (a, b) = read_pair(in0, in1)?;
    let output = kernel
        .run(op, &a, &b)
        .with_context(|| format!("Failed to compute {}", op))?;
    write_mesh(out, &output.mesh)?;

    Reporter::report_operation(
        &op.to_string(),
        &out.display().to_string(),
        output.mesh.n_triangles(),
        output.report.duration,
    );
    if show_stats {
        Reporter::report_stats(&output.report);
    }
    Ok(())
}

fn info_command(kernel: &BooleanKernel, input: &Path, json: bool) -> Result<()> {
    let mesh = read_mesh(input)?;
    let indexed = mesh
        .to_mesh(kernel.config().weld_vertices)
        .with_context(|| format!("Invalid mesh: {}", input.display()))?;

    let mut stats = analyze(&indexed);
    stats.is_solid = Some(kernel.is_solid(&mesh)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print();
    }
    Ok(())
}
