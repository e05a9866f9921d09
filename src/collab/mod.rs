//! Narrow interfaces to the external systems the engine drives.
//!
//! Concrete implementations (device wire protocol, HTTP/auth plumbing)
//! live in the host process and are injected into the agent.

pub mod device;
pub mod payroll;

pub use device::PunchClock;
pub use payroll::PayrollApi;
