//! Domain value types

pub mod calls;
pub mod session;

pub use calls::RecentCall;
pub use session::{SessionState, TokenPair};
