//! High-level robot client.
//!
//! This module provides the [`Robot`] struct, the primary interface for
//! commanding a controller over the text protocol.
//!
//! # Overview
//!
//! The client handles:
//! - Connection lifecycle and the controller's handshake line
//! - Command validation and encoding
//! - Response classification and payload parsing
//!
//! Each operation produces exactly 1 command line and reads exactly 1
//! response line. No automatic retries, pipelining, or reconnection.
//!
//! # Lost Synchronization
//!
//! A timeout, an I/O failure or an unrecognized response means the next
//! line read may not belong to the next command. The client then closes the
//! connection; later calls fail with `NotConnected` until
//! [`connect`](Robot::connect) is called again.
//!
//! # Example
//!
//! ```no_run
//! use mappdk::{ClientConfig, MoveCommand, OutputKind, Robot};
//!
//! let config = ClientConfig::new("Fanuc", "192.168.1.100")
//!     .with_end_effector(OutputKind::Rdo, 7);
//! let mut robot = Robot::new(config);
//! robot.connect()?;
//!
//! robot.move_robot(&MoveCommand::joint(vec![19.0, 66.0, -33.0, 18.0, -30.0, -33.0]), false)?;
//! robot.gripper(true)?;
//! println!("pose: {:?}", robot.get_current_pose()?);
//!
//! robot.disconnect()?;
//! # Ok::<(), mappdk::RobotError>(())
//! ```
//!
//! # Thread Safety
//!
//! Every I/O method takes `&mut self`: a client serves one caller at a time
//! and the protocol has no request correlation. Drive several robots with
//! one `Robot` per connection.

use std::io;

use tracing::{debug, info, warn};

use crate::command::{
    CallProgramCommand, GetOutputCommand, MoveCommand, Query, SetOutputCommand, SetSysVarCommand,
};
use crate::config::ClientConfig;
use crate::error::{Result, RobotError};
use crate::output::OutputKind;
use crate::response::{parse_named_values, parse_output_state, parse_power_watts, Response};
use crate::transport::{TcpTransport, Transport};

/// Client for one robot controller.
///
/// Holds at most one live connection, opened by [`connect`](Robot::connect)
/// and closed by [`disconnect`](Robot::disconnect).
pub struct Robot<T: Transport = TcpTransport> {
    config: ClientConfig,
    transport: Option<T>,
}

impl Robot {
    /// Creates an unconnected TCP client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_config(config)
    }

    /// Opens the TCP connection and reads the controller's handshake line.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A connection is already open (`AlreadyConnected`)
    /// - The socket cannot be opened or no handshake arrives in time (`Connection`)
    /// - The handshake carries the error code (`Protocol`) or is malformed (`UnknownResponse`)
    pub fn connect(&mut self) -> Result<Response> {
        if self.transport.is_some() {
            return Err(RobotError::AlreadyConnected);
        }
        let transport = TcpTransport::connect(
            &self.config.host,
            self.config.port,
            self.config.socket_timeout,
        )?;
        self.connect_with(transport)
    }
}

impl<T: Transport> Robot<T> {
    /// Creates an unconnected client for any transport type.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Adopts an already-open transport and performs the handshake over it.
    pub fn connect_with(&mut self, mut transport: T) -> Result<Response> {
        if self.transport.is_some() {
            return Err(RobotError::AlreadyConnected);
        }

        let address = self.config.address();
        let line = match transport.recv_line() {
            Ok(line) => line,
            Err(RobotError::Timeout) => {
                let _ = transport.close();
                return Err(RobotError::connection(
                    address,
                    io::Error::new(io::ErrorKind::TimedOut, "no handshake before timeout"),
                ));
            }
            Err(RobotError::Io(e)) => {
                let _ = transport.close();
                return Err(RobotError::connection(address, e));
            }
            Err(e) => {
                let _ = transport.close();
                return Err(e);
            }
        };
        debug!(response = %line, "received handshake");

        let response = match Response::classify(&line, false) {
            Ok(response) => response,
            Err(e) => {
                let _ = transport.close();
                return Err(e);
            }
        };

        info!(
            address = %address,
            model = %self.config.robot_model,
            message = %response.message,
            "connected to controller"
        );
        self.transport = Some(transport);
        Ok(response)
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no connection is open.
    pub fn disconnect(&mut self) -> Result<()> {
        let mut transport = self.transport.take().ok_or(RobotError::NotConnected)?;
        info!(address = %self.config.address(), "disconnecting from controller");
        transport.close()
    }

    /// Returns whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the live transport, if connected.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Sends one raw command line and reads its response.
    ///
    /// Surrounding whitespace (including a trailing `\r\n`) is trimmed and a
    /// newline terminator is appended. With `continue_on_error` the
    /// controller's error responses are returned instead of raised; unknown
    /// responses are raised regardless.
    ///
    /// The connection is closed when the exchange fails with `Timeout`,
    /// `Io` or `UnknownResponse`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command contains an interior line break (`InvalidArgument`)
    /// - No connection is open (`NotConnected`)
    /// - No response arrives in time (`Timeout`)
    /// - The controller reports an error and `continue_on_error` is false (`Protocol`)
    /// - The response cannot be classified (`UnknownResponse`)
    pub fn send_command(&mut self, raw: &str, continue_on_error: bool) -> Result<Response> {
        let body = raw.trim();
        if body.contains(['\n', '\r']) {
            return Err(RobotError::invalid_argument(
                "command",
                "must be a single line",
            ));
        }
        let transport = self.transport.as_mut().ok_or(RobotError::NotConnected)?;

        match exchange(transport, body, continue_on_error) {
            Err(e) if e.desynchronizes() => {
                warn!(command = %body, error = %e, "lost sync with controller, closing connection");
                if let Some(mut transport) = self.transport.take() {
                    let _ = transport.close();
                }
                Err(e)
            }
            result => result,
        }
    }

    /// Moves the robot.
    ///
    /// All parameters are validated before anything is written.
    pub fn move_robot(&mut self, command: &MoveCommand, continue_on_error: bool) -> Result<Response> {
        let line = command.encode(self.config.revision)?;
        self.send_command(&line, continue_on_error)
    }

    /// Calls an external program on the controller.
    pub fn call_program(&mut self, program: &str) -> Result<Response> {
        let command = CallProgramCommand::new(program)?;
        self.send_command(&command.to_line(), false)
    }

    /// Reads the instantaneous power draw, in watts.
    pub fn get_instantaneous_power(&mut self) -> Result<f64> {
        let response = self.send_command(Query::InstantaneousPower.verb(), false)?;
        parse_power_watts(&response.message)
    }

    /// Reads the current Cartesian pose of the tool center point (XYZWPR).
    pub fn get_current_pose(&mut self) -> Result<Vec<f64>> {
        let response = self.send_command(Query::CurrentPose.verb(), false)?;
        parse_named_values(&response.message)
    }

    /// Reads the current joint angles. Absent joints are omitted.
    pub fn get_current_joint_position(&mut self) -> Result<Vec<f64>> {
        let response = self.send_command(Query::CurrentJoints.verb(), false)?;
        parse_named_values(&response.message)
    }

    /// Reads a digital output using the configured addressing scheme.
    ///
    /// # Errors
    ///
    /// Returns `UnconfiguredOutput` if no output kind is configured; this is
    /// checked before the connection.
    pub fn get_digital_output(&mut self, index: u32) -> Result<bool> {
        let kind = self.output_kind()?;
        self.read_output(kind, index)
    }

    /// Writes a digital output using the configured addressing scheme.
    ///
    /// # Errors
    ///
    /// Returns `UnconfiguredOutput` if no output kind is configured; this is
    /// checked before the connection.
    pub fn set_digital_output(
        &mut self,
        index: u32,
        value: bool,
        continue_on_error: bool,
    ) -> Result<Response> {
        let kind = self.output_kind()?;
        self.write_output(kind, index, value, continue_on_error)
    }

    /// Reads an output of an explicit kind, whatever the end effector uses.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mappdk::{ClientConfig, OutputKind, Robot};
    ///
    /// let mut robot = Robot::new(
    ///     ClientConfig::new("Fanuc", "192.168.1.100").with_end_effector(OutputKind::Rdo, 7),
    /// );
    /// robot.connect()?;
    /// let conveyor_running = robot.read_output(OutputKind::Do, 12)?;
    /// # Ok::<(), mappdk::RobotError>(())
    /// ```
    pub fn read_output(&mut self, kind: OutputKind, index: u32) -> Result<bool> {
        let command = GetOutputCommand::new(kind, index)?;
        let response = self.send_command(&command.to_line(), false)?;
        parse_output_state(&response.message)
    }

    /// Writes an output of an explicit kind, whatever the end effector uses.
    pub fn write_output(
        &mut self,
        kind: OutputKind,
        index: u32,
        value: bool,
        continue_on_error: bool,
    ) -> Result<Response> {
        let command = SetOutputCommand::new(kind, index, value, self.config.revision)?;
        self.send_command(&command.to_line(), continue_on_error)
    }

    /// Switches the configured end-effector output.
    ///
    /// # Errors
    ///
    /// Returns `UnconfiguredOutput` if the output kind or index is missing.
    pub fn toggle_end_effector_output(
        &mut self,
        value: bool,
        continue_on_error: bool,
    ) -> Result<Response> {
        let kind = self.output_kind()?;
        let index = self.config.end_effector_output_index.ok_or_else(|| {
            RobotError::unconfigured_output("end-effector output index is not set")
        })?;
        self.write_output(kind, index, value, continue_on_error)
    }

    /// Opens (`true`) or closes (`false`) the gripper.
    ///
    /// Shorthand for [`toggle_end_effector_output`](Robot::toggle_end_effector_output)
    /// without `continue_on_error`.
    pub fn gripper(&mut self, value: bool) -> Result<Response> {
        self.toggle_end_effector_output(value, false)
    }

    /// Sets a boolean system variable.
    pub fn set_system_variable(
        &mut self,
        name: &str,
        value: bool,
        continue_on_error: bool,
    ) -> Result<Response> {
        let command = SetSysVarCommand::new(name, value)?;
        self.send_command(&command.to_line(), continue_on_error)
    }

    fn output_kind(&self) -> Result<OutputKind> {
        self.config
            .end_effector_output_kind
            .ok_or_else(|| RobotError::unconfigured_output("output kind is not set"))
    }
}

/// Writes one command and reads its reply.
fn exchange<T: Transport>(
    transport: &mut T,
    body: &str,
    continue_on_error: bool,
) -> Result<Response> {
    debug!(command = %body, "sending command");
    transport.send_line(&format!("{}\n", body))?;

    let reply = transport.recv_line()?;
    debug!(response = %reply, "received response");

    let response = Response::classify(&reply, continue_on_error)?;
    if !response.is_success() {
        warn!(command = %body, message = %response.message, "controller reported an error");
    }
    Ok(response)
}

impl<T: Transport> std::fmt::Debug for Robot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot")
            .field("robot_model", &self.config.robot_model)
            .field("address", &self.config.address())
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ProtocolRevision;
    use crate::response::ResponseCode;
    use std::collections::VecDeque;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct MockTransport {
        replies: VecDeque<String>,
        sent: Vec<String>,
        closed: bool,
    }

    impl MockTransport {
        fn with_replies(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl Transport for MockTransport {
        fn send_line(&mut self, line: &str) -> Result<()> {
            self.sent.push(line.to_string());
            Ok(())
        }

        fn recv_line(&mut self) -> Result<String> {
            self.replies.pop_front().ok_or(RobotError::Timeout)
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn rdo_config() -> ClientConfig {
        ClientConfig::new("Fanuc", "127.0.0.1").with_end_effector(OutputKind::Rdo, 7)
    }

    fn connected(config: ClientConfig, replies: &[&str]) -> Robot<MockTransport> {
        let mut all = vec!["0:ready"];
        all.extend_from_slice(replies);
        let mut robot = Robot::with_config(config);
        robot
            .connect_with(MockTransport::with_replies(&all))
            .unwrap();
        robot
    }

    fn sent(robot: &Robot<MockTransport>) -> &[String] {
        &robot.transport().unwrap().sent
    }

    #[test]
    fn test_connect_reads_handshake() {
        let mut robot = Robot::with_config(rdo_config());
        let response = robot
            .connect_with(MockTransport::with_replies(&["0:MAPPDK ready"]))
            .unwrap();

        assert!(robot.is_connected());
        assert_eq!(response.code, ResponseCode::Success);
        assert_eq!(response.message, "MAPPDK ready");
        assert!(sent(&robot).is_empty());
    }

    #[test]
    fn test_connect_twice() {
        let mut robot = connected(rdo_config(), &[]);
        let result = robot.connect_with(MockTransport::with_replies(&["0:ready"]));
        assert!(matches!(result, Err(RobotError::AlreadyConnected)));
    }

    #[test]
    fn test_connect_handshake_timeout() {
        let mut robot: Robot<MockTransport> = Robot::with_config(rdo_config());
        let result = robot.connect_with(MockTransport::default());
        assert!(matches!(result, Err(RobotError::Connection { .. })));
        assert!(!robot.is_connected());
    }

    #[test]
    fn test_connect_handshake_error() {
        let mut robot = Robot::with_config(rdo_config());
        let result = robot.connect_with(MockTransport::with_replies(&["1:Controller busy"]));
        assert!(matches!(result, Err(RobotError::Protocol { ref message }) if message == "Controller busy"));
        assert!(!robot.is_connected());
    }

    #[test]
    fn test_disconnect() {
        let mut robot = connected(rdo_config(), &[]);
        robot.disconnect().unwrap();
        assert!(!robot.is_connected());
        assert!(matches!(robot.disconnect(), Err(RobotError::NotConnected)));
    }

    #[test]
    fn test_disconnect_without_connect() {
        let mut robot: Robot<MockTransport> = Robot::with_config(rdo_config());
        assert!(matches!(robot.disconnect(), Err(RobotError::NotConnected)));
    }

    #[test]
    fn test_send_command_not_connected() {
        let mut robot: Robot<MockTransport> = Robot::with_config(rdo_config());
        assert!(matches!(
            robot.send_command("curpos", false),
            Err(RobotError::NotConnected)
        ));
    }

    #[test]
    fn test_send_command_appends_newline_once() {
        let mut robot = connected(rdo_config(), &["0:a", "0:b"]);
        robot.send_command("curpos", false).unwrap();
        robot.send_command("curjpos\n", false).unwrap();
        assert_eq!(sent(&robot), ["curpos\n", "curjpos\n"]);
    }

    #[test]
    fn test_send_command_trims_whitespace() {
        let mut robot = connected(rdo_config(), &["0:a", "0:b", "0:c"]);
        robot.send_command("curpos\r\n", false).unwrap();
        robot.send_command("curpos ", false).unwrap();
        robot.send_command("  ins_pwr\n", false).unwrap();
        assert_eq!(sent(&robot), ["curpos\n", "curpos\n", "ins_pwr\n"]);
    }

    #[test]
    fn test_send_command_rejects_interior_newline() {
        let mut robot = connected(rdo_config(), &["0:a"]);
        let result = robot.send_command("curpos\ncurjpos", false);
        assert!(matches!(result, Err(RobotError::InvalidArgument { .. })));
        assert!(sent(&robot).is_empty());
    }

    #[test]
    fn test_send_command_timeout() {
        let mut robot = connected(rdo_config(), &[]);
        assert!(matches!(
            robot.send_command("curpos", false),
            Err(RobotError::Timeout)
        ));
    }

    #[test]
    fn test_timeout_closes_connection() {
        let mut robot = connected(rdo_config(), &[]);
        assert!(matches!(robot.send_command("curpos", false), Err(RobotError::Timeout)));
        assert!(!robot.is_connected());
        assert!(matches!(
            robot.send_command("ins_pwr", false),
            Err(RobotError::NotConnected)
        ));
    }

    #[test]
    fn test_unknown_response_closes_connection() {
        let mut robot = connected(rdo_config(), &["y=2.0", "0:late"]);
        assert!(matches!(
            robot.send_command("curpos", true),
            Err(RobotError::UnknownResponse { .. })
        ));
        assert!(!robot.is_connected());
    }

    #[test]
    fn test_controller_error_keeps_connection() {
        let mut robot = connected(rdo_config(), &["1:Position not reachable", "0:ok"]);
        assert!(robot.send_command("movej", false).is_err());
        assert!(robot.is_connected());
        assert!(robot.send_command("curpos", false).is_ok());
    }

    #[test]
    fn test_reconnect_after_lost_sync() {
        let mut robot = connected(rdo_config(), &[]);
        assert!(robot.send_command("curpos", false).is_err());
        robot
            .connect_with(MockTransport::with_replies(&["0:ready", "0:1.0"]))
            .unwrap();
        assert_eq!(robot.get_instantaneous_power().unwrap(), 1000.0);
    }

    #[test]
    fn test_error_code_raises_with_message() {
        let mut robot = connected(rdo_config(), &["1:Position not reachable"]);
        let err = robot.send_command("movej", false).unwrap_err();
        assert!(matches!(err, RobotError::Protocol { ref message } if message == "Position not reachable"));
    }

    #[test]
    fn test_error_code_continue_on_error() {
        let mut robot = connected(rdo_config(), &["1:Position not reachable"]);
        let response = robot.send_command("movej", true).unwrap();
        assert_eq!(response.code, ResponseCode::Error);
        assert_eq!(response.message, "Position not reachable");
    }

    #[test]
    fn test_unknown_code_never_swallowed() {
        for continue_on_error in [false, true] {
            let mut robot = connected(rdo_config(), &["2:???"]);
            let result = robot.send_command("curpos", continue_on_error);
            assert!(matches!(result, Err(RobotError::UnknownResponse { .. })));
        }
    }

    #[test]
    fn test_move_sends_encoded_line() {
        let mut robot = connected(rdo_config(), &["0:done"]);
        let command = MoveCommand::pose(vec![350.0, 0.0, 280.0, -15.0, -90.0, -160.0])
            .with_velocity(100)
            .with_acceleration(100)
            .with_linear(true);
        robot.move_robot(&command, false).unwrap();
        assert_eq!(
            sent(&robot),
            ["movep:0100:0100:000:1:6:+000350.000000:+000000.000000:+000280.000000\
              :-000015.000000:-000090.000000:-000160.000000\n"]
        );
    }

    #[test]
    fn test_move_legacy_revision() {
        let config = rdo_config().with_revision(ProtocolRevision::Legacy);
        let mut robot = connected(config, &["0:done"]);
        robot.move_robot(&MoveCommand::joint(vec![-1.0]), false).unwrap();
        assert_eq!(sent(&robot), ["movej:0025:0100:000:0:1:-0000000001.000000\n"]);
    }

    #[test]
    fn test_move_invalid_blend_writes_nothing() {
        let mut robot = connected(rdo_config(), &["0:done"]);
        let command = MoveCommand::joint(vec![0.0; 6]).with_blend(150);
        let result = robot.move_robot(&command, false);
        assert!(matches!(result, Err(RobotError::InvalidArgument { .. })));
        assert!(sent(&robot).is_empty());
    }

    #[test]
    fn test_get_current_pose() {
        let mut robot = connected(
            rdo_config(),
            &["0:x=1.000,y=2.000,z=3.000,w=0.000,p=0.000,r=0.000"],
        );
        let pose = robot.get_current_pose().unwrap();
        assert_eq!(pose, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_eq!(sent(&robot), ["curpos\n"]);
    }

    #[test]
    fn test_get_current_joint_position_skips_absent() {
        let mut robot = connected(
            rdo_config(),
            &["0:j=19.000,j=66.000,j=-33.000,j=18.000,j=-30.000,j=-33.000,j=none"],
        );
        let joints = robot.get_current_joint_position().unwrap();
        assert_eq!(joints, vec![19.0, 66.0, -33.0, 18.0, -30.0, -33.0]);
        assert_eq!(sent(&robot), ["curjpos\n"]);
    }

    #[test]
    fn test_get_instantaneous_power() {
        let mut robot = connected(rdo_config(), &["0:1.5"]);
        assert_eq!(robot.get_instantaneous_power().unwrap(), 1500.0);
        assert_eq!(sent(&robot), ["ins_pwr\n"]);
    }

    #[test]
    fn test_call_program() {
        let mut robot = connected(rdo_config(), &["0:started"]);
        robot.call_program("PICK_PART").unwrap();
        assert_eq!(sent(&robot), ["mappdkcall:PICK_PART\n"]);
    }

    #[test]
    fn test_gripper_rdo() {
        let mut robot = connected(rdo_config(), &["0:ok", "0:ok"]);
        robot.gripper(true).unwrap();
        robot.gripper(false).unwrap();
        assert_eq!(sent(&robot), ["setrdo:7:true\n", "setrdo:7:false\n"]);
    }

    #[test]
    fn test_gripper_do() {
        let config = ClientConfig::new("Kuka", "127.0.0.1").with_end_effector(OutputKind::Do, 7);
        let mut robot = connected(config, &["0:ok"]);
        robot.gripper(true).unwrap();
        assert_eq!(sent(&robot), ["setdout:00007:true\n"]);
    }

    #[test]
    fn test_digital_output_read_write() {
        let mut robot = connected(rdo_config(), &["0:1", "0:ok"]);
        assert!(robot.get_digital_output(3).unwrap());
        robot.set_digital_output(3, false, false).unwrap();
        assert_eq!(sent(&robot), ["getrdo:3\n", "setrdo:3:false\n"]);
    }

    #[test]
    fn test_explicit_output_kind() {
        let mut robot = connected(rdo_config(), &["0:0", "0:ok"]);
        assert!(!robot.read_output(OutputKind::Do, 12).unwrap());
        robot.write_output(OutputKind::Do, 12, true, false).unwrap();
        assert_eq!(sent(&robot), ["getdout:00012\n", "setdout:00012:true\n"]);
    }

    #[test]
    fn test_explicit_output_kind_without_end_effector() {
        let mut robot = connected(ClientConfig::new("Fanuc", "127.0.0.1"), &["0:1"]);
        assert!(robot.read_output(OutputKind::Rdo, 4).unwrap());
        assert!(matches!(
            robot.get_digital_output(4),
            Err(RobotError::UnconfiguredOutput { .. })
        ));
        assert_eq!(sent(&robot), ["getrdo:4\n"]);
    }

    #[test]
    fn test_unconfigured_output_writes_nothing() {
        let mut robot = connected(ClientConfig::new("Fanuc", "127.0.0.1"), &["0:ok"]);

        assert!(matches!(robot.gripper(true), Err(RobotError::UnconfiguredOutput { .. })));
        assert!(matches!(
            robot.toggle_end_effector_output(false, true),
            Err(RobotError::UnconfiguredOutput { .. })
        ));
        assert!(matches!(
            robot.get_digital_output(1),
            Err(RobotError::UnconfiguredOutput { .. })
        ));
        assert!(matches!(
            robot.set_digital_output(1, true, false),
            Err(RobotError::UnconfiguredOutput { .. })
        ));
        assert!(sent(&robot).is_empty());
    }

    #[test]
    fn test_unconfigured_output_checked_before_connection() {
        let mut robot: Robot<MockTransport> =
            Robot::with_config(ClientConfig::new("Fanuc", "127.0.0.1"));
        assert!(matches!(robot.gripper(true), Err(RobotError::UnconfiguredOutput { .. })));
    }

    #[test]
    fn test_missing_index_is_unconfigured() {
        let mut config = ClientConfig::new("Fanuc", "127.0.0.1");
        config.end_effector_output_kind = Some(OutputKind::Rdo);
        let mut robot = connected(config, &["0:ok"]);
        assert!(matches!(robot.gripper(true), Err(RobotError::UnconfiguredOutput { .. })));
        // The kind alone is enough for indexed access.
        robot.set_digital_output(2, true, false).unwrap();
        assert_eq!(sent(&robot), ["setrdo:2:true\n"]);
    }

    #[test]
    fn test_set_system_variable() {
        let mut robot = connected(rdo_config(), &["0:ok"]);
        robot.set_system_variable("$RMT_MASTER", true, false).unwrap();
        assert_eq!(sent(&robot), ["setsysvar:$RMT_MASTER:T\n"]);
    }

    #[test]
    fn test_client_debug() {
        let robot = connected(rdo_config(), &[]);
        let debug_str = format!("{:?}", robot);
        assert!(debug_str.contains("Robot"));
        assert!(debug_str.contains("127.0.0.1:18735"));
    }

    #[test]
    fn test_tcp_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let controller = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"0:Connected\n").unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line, "ins_pwr\n");
            stream.write_all(b"0:0.5\n").unwrap();
        });

        let config = ClientConfig::new("Fanuc", "127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let mut robot = Robot::new(config);
        let handshake = robot.connect().unwrap();
        assert_eq!(handshake.message, "Connected");
        assert_eq!(robot.get_instantaneous_power().unwrap(), 500.0);
        robot.disconnect().unwrap();
        controller.join().unwrap();
    }

    #[test]
    fn test_tcp_late_reply_not_matched_to_next_command() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let controller = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"0:Connected\n").unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line, "curpos\n");
            thread::sleep(Duration::from_millis(400));
            // The client has given up by now; the write may fail.
            let _ = stream.write_all(b"0:reply-to-curpos\n");
        });

        let config = ClientConfig::new("Fanuc", "127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_millis(150));
        let mut robot = Robot::new(config);
        robot.connect().unwrap();

        assert!(matches!(robot.send_command("curpos", false), Err(RobotError::Timeout)));
        assert!(!robot.is_connected());
        assert!(matches!(
            robot.send_command("ins_pwr", false),
            Err(RobotError::NotConnected)
        ));
        controller.join().unwrap();
    }

    #[test]
    fn test_tcp_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new("Fanuc", "127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_millis(500));
        let mut robot = Robot::new(config);
        assert!(matches!(robot.connect(), Err(RobotError::Connection { .. })));
        assert!(!robot.is_connected());
    }
}
