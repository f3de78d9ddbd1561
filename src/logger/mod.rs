//! Tracing bootstrap with a reloadable filter; the effective filter string
//! comes from settings once they are parsed.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
