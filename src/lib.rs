// Library exports for the binary and integration tests
pub mod clipboard;
pub mod config;
pub mod dom;
pub mod feedback;
pub mod i18n;
pub mod interactions;
pub mod reveal;
pub mod site;
pub mod storage;
pub mod timers;
pub mod util;

pub use site::{Dispatch, Event, EventKind, Site};
