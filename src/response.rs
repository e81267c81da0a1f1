//! Response parsing and classification.
//!
//! Every command, and the connection handshake, is answered by one line:
//!
//! ```text
//! <code>:<message>
//! ```
//!
//! | Code | Meaning |
//! |------|---------|
//! | `0` | Success, `message` carries the result |
//! | `1` | Controller error, `message` describes it |
//! | other | Protocol desynchronization, always an error |
//!
//! The line is split on the first colon only; the message may contain
//! further colons.
//!
//! # Example
//!
//! ```
//! use mappdk::{Response, ResponseCode};
//!
//! let response = Response::parse("0:x=1.0,y=2.0").unwrap();
//! assert_eq!(response.code, ResponseCode::Success);
//! assert_eq!(response.message, "x=1.0,y=2.0");
//!
//! // Error codes are raised unless the caller opts in to inspect them
//! assert!(Response::classify("1:Position not reachable", false).is_err());
//! let response = Response::classify("1:Position not reachable", true).unwrap();
//! assert!(!response.is_success());
//! ```

use crate::error::{Result, RobotError};

/// Value marking an absent entry in a `name=value` list, e.g. `j=none`.
pub const NO_VALUE_SENTINEL: &str = "none";

/// Factor from the controller's kilowatt power readings to watts.
pub const WATTS_PER_KILOWATT: f64 = 1000.0;

/// Recognized response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// The instruction executed.
    Success = 0,
    /// The controller rejected or failed the instruction.
    Error = 1,
}

impl ResponseCode {
    /// Numeric value on the wire.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Parsed response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response code.
    pub code: ResponseCode,
    /// Everything after the first colon.
    pub message: String,
}

impl Response {
    /// Parses a response line (terminator already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::UnknownResponse`] if the line has no colon, the
    /// code is not an integer, or the code is neither 0 nor 1.
    pub fn parse(line: &str) -> Result<Self> {
        let (code, message) = line
            .split_once(':')
            .ok_or_else(|| RobotError::unknown_response(line))?;

        let code = match code.trim().parse::<i64>() {
            Ok(0) => ResponseCode::Success,
            Ok(1) => ResponseCode::Error,
            _ => return Err(RobotError::unknown_response(line)),
        };

        Ok(Self {
            code,
            message: message.to_string(),
        })
    }

    /// Parses a line and applies the error policy.
    ///
    /// With `continue_on_error` false, an error code becomes
    /// [`RobotError::Protocol`]. With it true, the error response is returned
    /// for inspection. Unknown responses are raised either way.
    pub fn classify(line: &str, continue_on_error: bool) -> Result<Self> {
        let response = Self::parse(line)?;
        if response.code == ResponseCode::Error && !continue_on_error {
            return Err(RobotError::protocol(response.message));
        }
        Ok(response)
    }

    /// Returns whether the response carries the success code.
    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Success
    }

    /// Splits the response into its code and message.
    pub fn into_parts(self) -> (ResponseCode, String) {
        (self.code, self.message)
    }
}

/// Parses a `name=value,name=value,...` payload into its values, in order.
///
/// Entries whose value is the `none` sentinel are skipped.
///
/// # Example
///
/// ```
/// use mappdk::parse_named_values;
///
/// let values = parse_named_values("j=10.5,j=-3.0,j=none").unwrap();
/// assert_eq!(values, vec![10.5, -3.0]);
/// ```
pub fn parse_named_values(message: &str) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for entry in message.trim().split(',') {
        let (_, value) = entry.split_once('=').ok_or_else(|| {
            RobotError::invalid_payload(format!("entry {:?} is not name=value", entry))
        })?;
        let value = value.trim();
        if value.eq_ignore_ascii_case(NO_VALUE_SENTINEL) {
            continue;
        }
        let value = value.parse::<f64>().map_err(|_| {
            RobotError::invalid_payload(format!("entry {:?} has a non-numeric value", entry))
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Parses a power reading in kilowatts and returns watts.
pub fn parse_power_watts(message: &str) -> Result<f64> {
    let kilowatts = message.trim().parse::<f64>().map_err(|_| {
        RobotError::invalid_payload(format!("power reading {:?} is not a number", message))
    })?;
    Ok(kilowatts * WATTS_PER_KILOWATT)
}

/// Parses a digital-output state; any non-zero integer is ON.
pub fn parse_output_state(message: &str) -> Result<bool> {
    let state = message.trim().parse::<i64>().map_err(|_| {
        RobotError::invalid_payload(format!("output state {:?} is not an integer", message))
    })?;
    Ok(state != 0)
}
