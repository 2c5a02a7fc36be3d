//! Rerig Core
//!
//! Foundational types shared by every retargeting crate:
//!
//! - [`Transform`]: translation / rotation / non-uniform scale value type
//! - [`math`]: tolerances and scalar helpers
//! - [`errors`]: the [`RetargetError`] taxonomy
//! - [`diagnostics`]: the structured [`RetargetLog`]

pub mod diagnostics;
pub mod errors;
pub mod math;
pub mod transform;

pub use diagnostics::{LogCode, LogEntry, RetargetLog};
pub use errors::{Result, RetargetError};
pub use transform::Transform;

pub use glam::{Quat, Vec3};
