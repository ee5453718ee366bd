//! # Spec Module
//!
//! Route declarations and their registration.
//!
//! Routes, parameters, enums and models are declared as data (a [`Manifest`],
//! read from YAML/JSON or assembled with the builder methods) and compiled
//! once by [`build_routes`] into an immutable [`RouteTable`]. Registration is
//! where every configuration fault surfaces: malformed templates, unknown
//! types, bad patterns and impossible parameter origins all fail here, never
//! per request.

mod build;
mod error;
mod load;
mod manifest;
mod types;

pub use build::*;
pub use error::RegistrationError;
pub use load::*;
pub use manifest::*;
pub use types::*;
