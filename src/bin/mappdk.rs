//! MAPPDK command-line client
//!
//! Connects to a controller, runs one operation, prints the result and
//! disconnects.
//!
//! ```text
//! mappdk --host 192.168.1.100 pose
//! mappdk --config robot.toml move joint 0 0 0 0 0 0 --velocity 50
//! mappdk --host 192.168.1.100 --output-kind RDO --output-index 7 gripper on
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use mappdk::{ClientConfig, MoveCommand, MoveKind, OutputKind, ProtocolRevision, Response, Robot};

/// Command line arguments
#[derive(Parser)]
#[command(name = "mappdk")]
#[command(about = "Send commands to a MAPPDK robot controller")]
#[command(version)]
struct Args {
    /// TOML configuration file; flags below override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Controller hostname or IP address
    #[arg(long, global = true)]
    host: Option<String>,

    /// Controller TCP port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Socket timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// End-effector output kind (RDO or DO)
    #[arg(long, global = true)]
    output_kind: Option<OutputKind>,

    /// End-effector output index
    #[arg(long, global = true)]
    output_index: Option<u32>,

    /// Use the legacy wire format
    #[arg(long, global = true)]
    legacy: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Joint,
    Pose,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> bool {
        matches!(switch, Switch::On)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current XYZWPR pose
    Pose,
    /// Print the current joint angles
    Joints,
    /// Print the instantaneous power draw in watts
    Power,
    /// Move in joint or Cartesian space
    Move {
        /// Target kind
        kind: Kind,
        /// Joint angles or XYZWPR values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
        /// Percent or mm/s
        #[arg(long, default_value = "25")]
        velocity: u16,
        /// Percent or mm/s^2
        #[arg(long, default_value = "100")]
        acceleration: u16,
        /// Blend (CNT) value, 0-100
        #[arg(long, default_value = "0")]
        blend: u8,
        /// Linear interpolation
        #[arg(long)]
        linear: bool,
        /// Report controller errors instead of failing
        #[arg(long)]
        continue_on_error: bool,
    },
    /// Switch the end-effector output
    Gripper {
        /// Output state
        state: Switch,
    },
    /// Call a program on the controller
    Call {
        /// Program name
        program: String,
    },
    /// Read a digital output
    DoutGet {
        /// Output index
        index: u32,
        /// Output kind; defaults to the end-effector's
        #[arg(long)]
        kind: Option<OutputKind>,
    },
    /// Write a digital output
    DoutSet {
        /// Output index
        index: u32,
        /// Output state
        state: Switch,
        /// Output kind; defaults to the end-effector's
        #[arg(long)]
        kind: Option<OutputKind>,
    },
    /// Set a boolean system variable
    Sysvar {
        /// Variable name, e.g. $RMT_MASTER
        name: String,
        /// Value
        state: Switch,
    },
    /// Send a raw command line
    Raw {
        /// Command line, without terminator
        line: String,
        /// Report controller errors instead of failing
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let host = args
                .host
                .clone()
                .context("either --config or --host is required")?;
            ClientConfig::new("Fanuc", host)
        }
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(seconds) = args.timeout {
        config.socket_timeout = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid timeout: {}", seconds))?;
    }
    if let Some(kind) = args.output_kind {
        config.end_effector_output_kind = Some(kind);
    }
    if let Some(index) = args.output_index {
        config.end_effector_output_index = Some(index);
    }
    if args.legacy {
        config.revision = ProtocolRevision::Legacy;
    }

    Ok(config)
}

fn print_response(response: &Response) {
    if response.is_success() {
        println!("ok: {}", response.message);
    } else {
        println!("error: {}", response.message);
    }
}

fn execute(robot: &mut Robot, command: Commands) -> Result<()> {
    match command {
        Commands::Pose => println!("{:?}", robot.get_current_pose()?),
        Commands::Joints => println!("{:?}", robot.get_current_joint_position()?),
        Commands::Power => println!("{} W", robot.get_instantaneous_power()?),
        Commands::Move {
            kind,
            values,
            velocity,
            acceleration,
            blend,
            linear,
            continue_on_error,
        } => {
            let kind = match kind {
                Kind::Joint => MoveKind::Joint,
                Kind::Pose => MoveKind::Pose,
            };
            let command = MoveCommand::new(kind, values)
                .with_velocity(velocity)
                .with_acceleration(acceleration)
                .with_blend(blend)
                .with_linear(linear);
            print_response(&robot.move_robot(&command, continue_on_error)?);
        }
        Commands::Gripper { state } => print_response(&robot.gripper(state.into())?),
        Commands::Call { program } => print_response(&robot.call_program(&program)?),
        Commands::DoutGet { index, kind } => {
            let on = match kind {
                Some(kind) => robot.read_output(kind, index)?,
                None => robot.get_digital_output(index)?,
            };
            println!("{}", if on { "on" } else { "off" });
        }
        Commands::DoutSet { index, state, kind } => {
            let response = match kind {
                Some(kind) => robot.write_output(kind, index, state.into(), false)?,
                None => robot.set_digital_output(index, state.into(), false)?,
            };
            print_response(&response);
        }
        Commands::Sysvar { name, state } => {
            print_response(&robot.set_system_variable(&name, state.into(), false)?)
        }
        Commands::Raw {
            line,
            continue_on_error,
        } => print_response(&robot.send_command(&line, continue_on_error)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "mappdk=debug" } else { "mappdk=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = build_config(&args)?;
    debug!(address = %config.address(), "connecting");

    let mut robot = Robot::new(config);
    let handshake = robot.connect().context("connecting to controller")?;
    debug!(message = %handshake.message, "handshake");

    let result = execute(&mut robot, args.command);
    // A lost-sync failure has already closed the connection.
    if robot.is_connected() {
        robot.disconnect().context("disconnecting")?;
    }
    result
}
