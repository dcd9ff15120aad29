//! Driven adapters — implementations of the port traits.
//!
//! [`clock`] and [`log_sink`] are pure std and always available.  The
//! Raspberry Pi GPIO adapter only exists with the `rpi` feature, keeping
//! the default build (and the whole test suite) hardware-free.

pub mod clock;
pub mod log_sink;

#[cfg(feature = "rpi")]
pub mod rpi;
