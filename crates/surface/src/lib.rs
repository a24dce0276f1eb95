//! Presentation-surface side of the optimization workflow: session state, reducer-like
//! transitions, result rendering, the line diff and dispatch onto the controller queue.

pub mod diff;
pub mod events;
pub mod orchestration;
pub mod render;
pub mod state;

pub use diff::{line_diff, render_diff, DiffLine};
pub use events::{SurfaceEvent, UserAction};
pub use orchestration::{dispatch_surface_message, SurfaceDriver};
pub use state::{SurfaceState, Transition};
