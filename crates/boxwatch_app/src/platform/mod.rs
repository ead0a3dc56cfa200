mod app;
mod effects;
mod keys;
mod logging;
mod persistence;
mod ui;

pub use app::{run_app, AppOptions};
