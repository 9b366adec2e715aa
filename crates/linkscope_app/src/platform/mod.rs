mod app;
mod effects;
pub(crate) mod logging;
mod ui;

pub(crate) use app::{agent_settings, run_app};
