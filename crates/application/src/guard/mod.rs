//! Route guards.
//!
//! A guard wraps a protected view and renders it only while the visitor
//! holds a session for the guard's role. Buyers are trusted from the
//! store; vendors additionally pass a soft-verify call to the profile
//! endpoint before anything renders.

mod handle;
mod route_guard;
mod spec;
mod view;

pub use handle::GuardHandle;
pub use route_guard::{GuardContext, RouteGuard, guard};
pub use spec::{GuardSpec, Verification};
pub use view::ProtectedView;
