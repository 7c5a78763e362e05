//! Platform-specific backends.
//!
//! Only Windows is implemented; elsewhere the endpoint core is usable with
//! any other implementation of the `audio::native` traits.

#[cfg(target_os = "windows")]
pub mod wasapi;
