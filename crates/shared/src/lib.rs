//! Types shared by the controller, the surface and the optimization service.

pub mod domain;
pub mod error;
pub mod protocol;
