//! Core bot functionality: the event router and the runtime loop.

pub mod router;
pub mod runtime;

pub use router::{fire_on_load, Router};
pub use runtime::{build_from_config, build_router, run};
