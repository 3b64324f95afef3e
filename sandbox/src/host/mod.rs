//! The host function catalog.
//!
//! One plain function per entry of [`HostFunction`](crate::imports::HostFunction).
//! Each takes the execution context, the caller's linear memory when it
//! needs one, and the raw integer arguments, and returns a
//! [`HostResult`](crate::outcome::HostResult). Wiring them into the
//! interpreter is the linker's job.

pub mod debug;
pub mod ethereum;
