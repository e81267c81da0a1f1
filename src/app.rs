//! Run harness for robot applications.
//!
//! [`run`] invokes an operation and folds every outcome, including errors
//! and panics, into a [`RunOutcome`]. It never returns an error and never
//! unwinds into its caller; callers inspect the outcome instead.
//!
//! Applications implement [`RobotApp`] and get [`RobotApp::run`] for free.
//!
//! # Example
//!
//! ```
//! use mappdk::app::run;
//!
//! let outcome = run(|n: u32| Ok(n * 2), 21);
//! assert!(outcome.success);
//! assert_eq!(outcome.message, "success");
//! assert_eq!(outcome.value, Some(42));
//!
//! let outcome = run(|_: ()| -> anyhow::Result<()> { anyhow::bail!("gripper jammed") }, ());
//! assert!(!outcome.success);
//! assert!(outcome.message.contains("gripper jammed"));
//! assert_eq!(outcome.value, None);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

/// Message carried by a successful [`RunOutcome`].
pub const SUCCESS_MESSAGE: &str = "success";

/// Normalized result of a harness run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    /// Whether the operation completed.
    pub success: bool,
    /// `"success"`, or the full diagnostic of the failure.
    pub message: String,
    /// The operation's return value; `None` on failure.
    pub value: Option<T>,
}

impl<T> RunOutcome<T> {
    fn succeeded(value: T) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            value: Some(value),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            value: None,
        }
    }

    /// Converts the outcome back into a `Result`, with the diagnostic as the error.
    pub fn into_result(self) -> Result<T, String> {
        match self.value {
            Some(value) if self.success => Ok(value),
            _ => Err(self.message),
        }
    }
}

/// Runs `operation(arguments)` and normalizes its outcome.
///
/// Errors are rendered with their full cause chain (and backtrace, when one
/// was captured). Panics are caught and reported with their payload.
pub fn run<A, T, F>(operation: F, arguments: A) -> RunOutcome<T>
where
    F: FnOnce(A) -> anyhow::Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(move || operation(arguments))) {
        Ok(Ok(value)) => {
            debug!("operation completed");
            RunOutcome::succeeded(value)
        }
        Ok(Err(err)) => {
            let message = format!("{:?}", err);
            error!(error = %err, "operation failed");
            RunOutcome::failed(message)
        }
        Err(payload) => {
            let message = format!("operation panicked: {}", panic_message(payload.as_ref()));
            error!("{}", message);
            RunOutcome::failed(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// An application the harness can drive.
///
/// Implementors prepare themselves in [`configure`](RobotApp::configure) and
/// do their work in [`run_main`](RobotApp::run_main), returning errors freely;
/// [`run`](RobotApp::run) absorbs them.
pub trait RobotApp {
    /// Arguments passed to each run.
    type Args;
    /// Value produced by a successful run.
    type Output;

    /// One-time preparation.
    fn configure(&mut self) -> anyhow::Result<()>;

    /// The application's work.
    fn run_main(&mut self, args: Self::Args) -> anyhow::Result<Self::Output>;

    /// Runs [`run_main`](RobotApp::run_main) through the harness.
    fn run(&mut self, args: Self::Args) -> RunOutcome<Self::Output>
    where
        Self: Sized,
    {
        run(|args| self.run_main(args), args)
    }
}
