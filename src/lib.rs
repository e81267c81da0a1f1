//! # MAPPDK Robot Protocol Library
//!
//! A Rust client for the MAPPDK line-oriented text protocol, used to command
//! industrial robot controllers (Fanuc and compatible) over a persistent TCP
//! connection.
//!
//! This is a **protocol-only** library. Each call produces exactly 1 command
//! line and reads exactly 1 response line. No automatic retries, caching,
//! pipelining, or reconnection.
//!
//! ## Features
//!
//! - **Exact encoding** — fixed-width, sign-prefixed numeric fields the controller parses positionally
//! - **Validated before sent** — bad arguments never put a partial command on the wire
//! - **Classified responses** — controller errors, unknown codes and timeouts are distinct errors
//! - **No panics** — all errors returned as `Result<T, RobotError>`
//! - **Run harness** — [`app::run`] turns any failure into an inspectable [`app::RunOutcome`]
//! - **Pose math** — [`transform`] converts XYZWPR poses, matrices and quaternions
//!
//! ## Quick Start
//!
//! ```no_run
//! use mappdk::{ClientConfig, MoveCommand, OutputKind, Robot};
//!
//! fn main() -> mappdk::Result<()> {
//!     let config = ClientConfig::new("Fanuc", "192.168.1.100")
//!         .with_end_effector(OutputKind::Rdo, 7);
//!     let mut robot = Robot::new(config);
//!     robot.connect()?;
//!
//!     // Joint move at 100% velocity and acceleration
//!     let home = MoveCommand::joint(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
//!         .with_velocity(100)
//!         .with_acceleration(100);
//!     robot.move_robot(&home, false)?;
//!
//!     // Linear Cartesian move at 50 mm/s
//!     let approach = MoveCommand::pose(vec![350.0, 0.0, 280.0, -15.0, -90.0, -160.0])
//!         .with_velocity(50)
//!         .with_linear(true);
//!     robot.move_robot(&approach, false)?;
//!
//!     // Close the gripper and read back the state
//!     robot.gripper(true)?;
//!     println!("pose   = {:?}", robot.get_current_pose()?);
//!     println!("joints = {:?}", robot.get_current_joint_position()?);
//!     println!("power  = {} W", robot.get_instantaneous_power()?);
//!
//!     robot.disconnect()
//! }
//! ```
//!
//! ## Wire Format
//!
//! | Direction | Line |
//! |-----------|------|
//! | Command | `<verb>[:<field>]*\n` |
//! | Response | `<code>:<message>\n`, code `0` = success, `1` = error |
//!
//! A move is encoded as
//! `movej:<vel:04>:<acc:04>:<cnt:03>:<linear 0|1>:<count>:<±value>...`,
//! each value being a sign followed by a zero-padded magnitude with six
//! fractional digits.
//!
//! ## Error Handling
//!
//! ```no_run
//! use mappdk::{ClientConfig, Robot, RobotError};
//!
//! let mut robot = Robot::new(ClientConfig::new("Fanuc", "192.168.1.100"));
//! robot.connect()?;
//!
//! match robot.call_program("PICK_PART") {
//!     Ok(response) => println!("started: {}", response.message),
//!     Err(RobotError::Timeout) => println!("controller did not answer"),
//!     Err(RobotError::Protocol { message }) => println!("controller refused: {}", message),
//!     Err(e) => println!("error: {}", e),
//! }
//! # Ok::<(), RobotError>(())
//! ```
//!
//! Pass `continue_on_error = true` to commands that accept it to receive
//! controller errors as a [`Response`] instead. Unknown response codes are
//! always raised: they mean the two sides no longer agree on framing.
//!
//! ## Configuration
//!
//! ```no_run
//! use mappdk::{ClientConfig, OutputKind, ProtocolRevision};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("Fanuc", "192.168.1.100")
//!     .with_port(18736)                          // Custom port (default: 18735)
//!     .with_timeout(Duration::from_secs(5))      // Custom timeout (default: 60s)
//!     .with_end_effector(OutputKind::Do, 3)      // Gripper on DO[3]
//!     .with_revision(ProtocolRevision::Legacy);  // Older controller program
//!
//! // Or from a TOML file
//! let config = ClientConfig::load("robot.toml")?;
//! # Ok::<(), mappdk::RobotError>(())
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod app;
mod client;
mod command;
mod config;
mod error;
mod output;
mod response;
pub mod transform;
mod transport;

// Public re-exports
pub use client::Robot;
pub use command::{
    format_coordinate, parse_coordinate, CallProgramCommand, GetOutputCommand, MoveCommand,
    MoveKind, Query, SetOutputCommand, SetSysVarCommand, COORDINATE_PRECISION, MAX_BLEND_VALUE,
    MAX_SPEED_FIELD,
};
pub use config::ClientConfig;
pub use error::{Result, RobotError};
pub use output::{OutputKind, ProtocolRevision};
pub use response::{
    parse_named_values, parse_output_state, parse_power_watts, Response, ResponseCode,
    NO_VALUE_SENTINEL, WATTS_PER_KILOWATT,
};
pub use transport::{TcpTransport, Transport, DEFAULT_PORT, DEFAULT_TIMEOUT, MAX_LINE_LENGTH};
