//! Command structures and their line encoding.
//!
//! Every command is one line of colon-delimited fields led by a verb. The
//! controller parses fields positionally, so numeric fields are rendered
//! with fixed widths and explicit signs and never "just parseable".
//!
//! # Command Types
//!
//! ## Motion
//! - [`MoveCommand`] - Joint (`movej`) or Cartesian (`movep`) move
//!
//! ## Programs and variables
//! - [`CallProgramCommand`] - Call a program on the controller (`mappdkcall`)
//! - [`SetSysVarCommand`] - Set a boolean system variable (`setsysvar`)
//!
//! ## Digital outputs
//! - [`GetOutputCommand`] - Read an RDO/DO (`getrdo` / `getdout`)
//! - [`SetOutputCommand`] - Write an RDO/DO (`setrdo` / `setdout`)
//!
//! ## Status queries
//! - [`Query`] - Parameterless queries (`curpos`, `curjpos`, `ins_pwr`)
//!
//! # Example
//!
//! ```
//! use mappdk::{MoveCommand, MoveKind, ProtocolRevision};
//!
//! let cmd = MoveCommand::new(MoveKind::Pose, vec![350.0, 0.0, 280.0, -15.0, -90.0, -160.0])
//!     .with_velocity(50);
//! let line = cmd.encode(ProtocolRevision::Current).unwrap();
//! assert!(line.starts_with("movep:0050:0100:000:0:6:+000350.000000:"));
//! ```

use crate::error::{Result, RobotError};
use crate::output::{OutputKind, ProtocolRevision};

/// Largest value a 4-digit velocity/acceleration field can hold.
pub const MAX_SPEED_FIELD: u16 = 9999;

/// Largest blend (CNT) value.
pub const MAX_BLEND_VALUE: u8 = 100;

/// Fractional digits of a coordinate field.
pub const COORDINATE_PRECISION: usize = 6;

const VELOCITY_WIDTH: usize = 4;
const BLEND_WIDTH: usize = 3;

/// Motion target kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Target is a set of joint angles.
    Joint,
    /// Target is a Cartesian XYZWPR pose.
    Pose,
}

impl MoveKind {
    /// Protocol verb for this move kind.
    pub fn verb(self) -> &'static str {
        match self {
            MoveKind::Joint => "movej",
            MoveKind::Pose => "movep",
        }
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveKind::Joint => write!(f, "joint"),
            MoveKind::Pose => write!(f, "pose"),
        }
    }
}

impl std::str::FromStr for MoveKind {
    type Err = RobotError;

    /// Accepts `joint`/`movej` and `pose`/`movep`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "joint" | "movej" => Ok(MoveKind::Joint),
            "pose" | "movep" => Ok(MoveKind::Pose),
            _ => Err(RobotError::invalid_argument(
                "move_kind",
                format!("expected joint or pose, got {:?}", s),
            )),
        }
    }
}

/// Parameters of a single move.
///
/// Defaults match the controller program's: 25% velocity, 100% acceleration,
/// blend 0 (fine stop), joint interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    /// Joint or Cartesian target.
    pub kind: MoveKind,
    /// Joint angles or XYZWPR values, in order.
    pub values: Vec<f64>,
    /// Percent (joint) or mm/s (linear), 0-9999.
    pub velocity: u16,
    /// Percent or mm/s², 0-9999.
    pub acceleration: u16,
    /// Blend (CNT) value, 0-100.
    pub blend_value: u8,
    /// Linear interpolation instead of joint interpolation.
    pub linear: bool,
}

impl MoveCommand {
    /// Creates a move with default velocity, acceleration and blend.
    pub fn new(kind: MoveKind, values: Vec<f64>) -> Self {
        Self {
            kind,
            values,
            velocity: 25,
            acceleration: 100,
            blend_value: 0,
            linear: false,
        }
    }

    /// Joint-space move.
    pub fn joint(values: Vec<f64>) -> Self {
        Self::new(MoveKind::Joint, values)
    }

    /// Cartesian move to an XYZWPR pose.
    pub fn pose(values: Vec<f64>) -> Self {
        Self::new(MoveKind::Pose, values)
    }

    /// Sets the velocity.
    pub fn with_velocity(mut self, velocity: u16) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the acceleration.
    pub fn with_acceleration(mut self, acceleration: u16) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Sets the blend (CNT) value.
    pub fn with_blend(mut self, blend_value: u8) -> Self {
        self.blend_value = blend_value;
        self
    }

    /// Selects linear interpolation.
    pub fn with_linear(mut self, linear: bool) -> Self {
        self.linear = linear;
        self
    }

    /// Validates the parameters and renders the command line (without terminator).
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidArgument`] if:
    /// - `blend_value` > 100
    /// - `velocity` or `acceleration` > 9999
    /// - `values` is empty
    /// - a value is not finite or does not fit the coordinate field
    pub fn encode(&self, revision: ProtocolRevision) -> Result<String> {
        if self.blend_value > MAX_BLEND_VALUE {
            return Err(RobotError::invalid_argument(
                "blend_value",
                format!("must be 0-{}, got {}", MAX_BLEND_VALUE, self.blend_value),
            ));
        }
        let velocity = format_speed_field("velocity", self.velocity)?;
        let acceleration = format_speed_field("acceleration", self.acceleration)?;
        if self.values.is_empty() {
            return Err(RobotError::invalid_argument(
                "values",
                "at least one coordinate is required",
            ));
        }

        let mut line = format!(
            "{}:{}:{}:{:0blend$}:{}:{}",
            self.kind.verb(),
            velocity,
            acceleration,
            self.blend_value,
            u8::from(self.linear),
            self.values.len(),
            blend = BLEND_WIDTH,
        );
        for &value in &self.values {
            line.push(':');
            line.push_str(&format_coordinate(value, revision.coordinate_width())?);
        }

        Ok(line)
    }
}

fn format_speed_field(parameter: &str, value: u16) -> Result<String> {
    if value > MAX_SPEED_FIELD {
        return Err(RobotError::invalid_argument(
            parameter,
            format!("must not exceed {}, got {}", MAX_SPEED_FIELD, value),
        ));
    }
    Ok(format!("{:0width$}", value, width = VELOCITY_WIDTH))
}

/// Renders a coordinate as a sign followed by a zero-padded magnitude.
///
/// `width` is the magnitude's total width including the decimal point and
/// the six fractional digits.
///
/// # Errors
///
/// Returns [`RobotError::InvalidArgument`] for non-finite values and for
/// magnitudes too large for `width`.
///
/// # Example
///
/// ```
/// use mappdk::format_coordinate;
///
/// assert_eq!(format_coordinate(-15.5, 13).unwrap(), "-000015.500000");
/// assert_eq!(format_coordinate(0.0, 13).unwrap(), "+000000.000000");
/// assert!(format_coordinate(1e7, 13).is_err());
/// ```
pub fn format_coordinate(value: f64, width: usize) -> Result<String> {
    if !value.is_finite() {
        return Err(RobotError::invalid_argument(
            "values",
            format!("coordinate must be finite, got {}", value),
        ));
    }

    let magnitude = format!(
        "{:0width$.prec$}",
        value.abs(),
        width = width,
        prec = COORDINATE_PRECISION
    );
    if magnitude.len() > width {
        return Err(RobotError::invalid_argument(
            "values",
            format!("coordinate {} does not fit a {}-character field", value, width),
        ));
    }

    let sign = if value >= 0.0 { '+' } else { '-' };
    Ok(format!("{}{}", sign, magnitude))
}

/// Decodes a field produced by [`format_coordinate`].
///
/// # Example
///
/// ```
/// use mappdk::parse_coordinate;
///
/// assert_eq!(parse_coordinate("-000015.500000").unwrap(), -15.5);
/// ```
pub fn parse_coordinate(field: &str) -> Result<f64> {
    let invalid = || RobotError::invalid_payload(format!("bad coordinate field {:?}", field));

    let (negative, magnitude) = if let Some(rest) = field.strip_prefix('+') {
        (false, rest)
    } else if let Some(rest) = field.strip_prefix('-') {
        (true, rest)
    } else {
        return Err(invalid());
    };
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid());
    }

    let value: f64 = magnitude.parse().map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

/// Call an external program on the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallProgramCommand {
    program: String,
}

impl CallProgramCommand {
    /// Creates a program call.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains `:` or whitespace.
    pub fn new(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        validate_name("program", &program)?;
        Ok(Self { program })
    }

    /// Renders the command line.
    pub fn to_line(&self) -> String {
        format!("mappdkcall:{}", self.program)
    }
}

/// Set a boolean system variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSysVarCommand {
    name: String,
    value: bool,
}

impl SetSysVarCommand {
    /// Creates a system-variable write.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains `:` or whitespace.
    pub fn new(name: impl Into<String>, value: bool) -> Result<Self> {
        let name = name.into();
        validate_name("sys_var", &name)?;
        Ok(Self { name, value })
    }

    /// Renders the command line. Values are sent as `T`/`F`.
    pub fn to_line(&self) -> String {
        format!("setsysvar:{}:{}", self.name, if self.value { 'T' } else { 'F' })
    }
}

/// Read a digital output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOutputCommand {
    kind: OutputKind,
    index: u32,
}

impl GetOutputCommand {
    /// Creates a digital-output read.
    ///
    /// # Errors
    ///
    /// Returns an error if the index does not fit the kind's field.
    pub fn new(kind: OutputKind, index: u32) -> Result<Self> {
        validate_index(kind, index)?;
        Ok(Self { kind, index })
    }

    /// Renders the command line.
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.kind.get_verb(), self.kind.format_index(self.index))
    }
}

/// Write a digital output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutputCommand {
    kind: OutputKind,
    index: u32,
    value: bool,
    revision: ProtocolRevision,
}

impl SetOutputCommand {
    /// Creates a digital-output write.
    ///
    /// # Errors
    ///
    /// Returns an error if the index does not fit the kind's field.
    pub fn new(
        kind: OutputKind,
        index: u32,
        value: bool,
        revision: ProtocolRevision,
    ) -> Result<Self> {
        validate_index(kind, index)?;
        Ok(Self {
            kind,
            index,
            value,
            revision,
        })
    }

    /// Renders the command line. Values are sent as `true`/`false`.
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}",
            self.kind.set_verb(self.revision),
            self.kind.format_set_index(self.index, self.revision),
            self.value
        )
    }
}

/// Parameterless status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Current Cartesian pose of the tool center point.
    CurrentPose,
    /// Current joint angles.
    CurrentJoints,
    /// Instantaneous power draw.
    InstantaneousPower,
}

impl Query {
    /// Protocol verb for this query.
    pub fn verb(self) -> &'static str {
        match self {
            Query::CurrentPose => "curpos",
            Query::CurrentJoints => "curjpos",
            Query::InstantaneousPower => "ins_pwr",
        }
    }
}

fn validate_name(parameter: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RobotError::invalid_argument(parameter, "must not be empty"));
    }
    if name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(RobotError::invalid_argument(
            parameter,
            format!("must not contain ':' or whitespace, got {:?}", name),
        ));
    }
    Ok(())
}

fn validate_index(kind: OutputKind, index: u32) -> Result<()> {
    if index > kind.max_index() {
        return Err(RobotError::invalid_argument(
            "index",
            format!("{} index must not exceed {}", kind, kind.max_index()),
        ));
    }
    Ok(())
}
