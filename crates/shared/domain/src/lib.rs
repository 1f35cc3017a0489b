//! # Domain Models
//!
//! Pure hub types with minimal dependencies (`serde`, `bitflags`): module names, verb and
//! noun identifiers, infrastructure descriptors, field type tags and lookup criteria.
//! Keep it lean: no I/O, networking, or heavy logic; just data and simple helpers.

pub mod config;
pub mod constants;
pub mod fields;
pub mod lookup;
pub mod modules;
