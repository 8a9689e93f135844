mod authentication;
mod session;
mod presentation;
mod sample_events;
mod calendar_views;
mod dialogs;

pub use authentication::connect;
pub use session::{SessionOptions, run_tui};
