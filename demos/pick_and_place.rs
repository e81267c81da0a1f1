//! Pick-and-place cycle driven by the run harness
//!
//! Waypoints and speeds come from a TOML file; see `pick_and_place.toml`
//! next to this source.
//!
//! ```bash
//! cargo run --example pick_and_place -- demos/pick_and_place.toml
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

use mappdk::app::RobotApp;
use mappdk::{ClientConfig, MoveCommand, MoveKind, Robot};

#[derive(Parser)]
#[command(about = "Run one pick-and-place cycle")]
struct Args {
    /// Cycle description
    #[arg(default_value = "demos/pick_and_place.toml")]
    file: PathBuf,
}

/// A fixed target taught on the cell.
#[derive(Debug, Clone, Deserialize)]
struct Waypoint {
    move_type: String,
    pose: Vec<f64>,
    #[serde(default)]
    cnt_val: u8,
    #[serde(default)]
    linear: bool,
}

/// Speeds tuned per segment.
#[derive(Debug, Clone, Copy, Deserialize)]
struct Speed {
    velocity: u16,
    acceleration: u16,
}

#[derive(Debug, Deserialize)]
struct Cycle {
    robot: ClientConfig,
    waypoints: HashMap<String, Waypoint>,
    tunable: HashMap<String, Speed>,
}

enum Step {
    Move(&'static str),
    Gripper(bool),
}

const SEQUENCE: &[Step] = &[
    Step::Move("pick_approach"),
    Step::Gripper(true),
    Step::Move("pick"),
    Step::Gripper(false),
    Step::Move("pick_retract"),
    Step::Move("place_approach"),
    Step::Move("place"),
    Step::Gripper(true),
    Step::Move("place_retract"),
    Step::Gripper(false),
    Step::Move("home"),
];

struct PickAndPlaceApp {
    robot: Robot,
}

impl PickAndPlaceApp {
    fn new(config: ClientConfig) -> Self {
        Self {
            robot: Robot::new(config),
        }
    }

    fn move_to(&mut self, cycle: &Cycle, name: &str) -> Result<()> {
        let waypoint = cycle
            .waypoints
            .get(name)
            .with_context(|| format!("missing waypoint {}", name))?;
        let speed = cycle
            .tunable
            .get(name)
            .with_context(|| format!("missing speeds for {}", name))?;

        let kind: MoveKind = waypoint.move_type.parse()?;
        let command = MoveCommand::new(kind, waypoint.pose.clone())
            .with_velocity(speed.velocity)
            .with_acceleration(speed.acceleration)
            .with_blend(waypoint.cnt_val)
            .with_linear(waypoint.linear);

        info!(waypoint = name, %kind, "moving");
        self.robot.move_robot(&command, false)?;
        Ok(())
    }
}

impl RobotApp for PickAndPlaceApp {
    type Args = Cycle;
    type Output = &'static str;

    fn configure(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.robot.config().end_effector_output_kind.is_some(),
            "the gripper output must be configured"
        );
        Ok(())
    }

    fn run_main(&mut self, cycle: Cycle) -> Result<&'static str> {
        self.robot.connect().context("connecting")?;

        for step in SEQUENCE {
            match *step {
                Step::Move(name) => self
                    .move_to(&cycle, name)
                    .with_context(|| format!("moving to {}", name))?,
                Step::Gripper(open) => {
                    info!(open, "gripper");
                    self.robot.gripper(open)?;
                }
            }
        }

        self.robot.disconnect()?;
        Ok("done")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pick_and_place=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let document = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let cycle: Cycle = toml::from_str(&document).context("parsing cycle")?;

    let mut app = PickAndPlaceApp::new(cycle.robot.clone());
    app.configure()?;

    let outcome = app.run(cycle);
    if outcome.success {
        println!("{}", outcome.value.unwrap_or_default());
    } else {
        eprintln!("cycle failed:\n{}", outcome.message);
        std::process::exit(1);
    }
    Ok(())
}
