//! phsense library.
//!
//! Acquisition-and-classification engine for a TCS3200 frequency-output
//! colour sensor, used to estimate the pH of a sample from its colour
//! signature.  All domain logic is hardware-free and host-testable; the
//! Raspberry Pi GPIO bindings live behind the `rpi` cargo feature.

#![deny(unused_must_use)]

pub mod app;
pub mod buttons;
pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod pins;
pub mod reference;
pub mod sensor;

pub mod adapters;
