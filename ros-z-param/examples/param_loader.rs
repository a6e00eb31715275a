use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ros_z_param::{Builder, LoadError, ParameterLoader, ParameterNode};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Load an IK solver configuration the way a node does at startup.
#[derive(Debug, Parser)]
struct Args {
    /// Node name
    #[arg(short, long, default_value = "ik_solver")]
    name: String,

    /// Node namespace
    #[arg(long, default_value = "")]
    namespace: String,

    /// ROS 2 parameter file applied before declaration
    #[arg(short, long)]
    params_file: Option<PathBuf>,

    /// Print parameter descriptors instead of values
    #[arg(long)]
    describe: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

struct SolverParams {
    mode: String,
    max_iterations: i64,
    timeout: f64,
    tip_frames: Vec<String>,
    joint_weights: Vec<f64>,
    approximate: bool,
    threads: i32,
}

impl SolverParams {
    fn load(load: &ParameterLoader) -> Result<Self, LoadError> {
        Ok(Self {
            mode: load.load(
                "mode",
                "bio2_memetic".to_string(),
                "IK solver mode",
                "one of: bio1, bio2, bio2_memetic",
            )?,
            max_iterations: load.load(
                "max_iterations",
                100,
                "max solver iterations",
                "must be positive",
            )?,
            timeout: load
                .request("timeout", 1.0)
                .description("solver timeout in seconds")
                .constraints("must be positive")
                .load()?,
            tip_frames: load
                .request("tip_frames", vec!["tool0".to_string()])
                .description("end-effector frames")
                .load()?,
            joint_weights: load.request("joint_weights", Vec::<f64>::new()).load()?,
            approximate: load
                .request("approximate", true)
                .description("accept approximate solutions")
                .load()?,
            threads: load
                .request("threads", 1)
                .constraints("between 1 and the number of cores")
                .load()?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("ros_z_param=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ros_z_param=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    let mut builder = ParameterNode::builder(&args.name).with_namespace(&args.namespace);
    if let Some(path) = &args.params_file {
        builder = builder.with_parameter_file(path);
    }
    let node = Arc::new(builder.build()?);

    let load = ParameterLoader::new(node.clone());
    let params = SolverParams::load(&load)?;
    tracing::info!(
        "Solver {} on {} thread(s): {} iterations, {}s timeout, approximate={}",
        params.mode,
        params.threads,
        params.max_iterations,
        params.timeout,
        params.approximate
    );
    tracing::info!(
        "Tips {:?} with joint weights {:?}",
        params.tip_frames,
        params.joint_weights
    );

    if args.describe {
        for param in node.parameters() {
            let descriptor = node.describe_parameter(&param.name)?;
            println!("---\n{}", serde_yaml::to_string(&descriptor)?.trim_end());
        }
    } else {
        print!("{}", node.dump_parameters()?);
    }
    Ok(())
}
