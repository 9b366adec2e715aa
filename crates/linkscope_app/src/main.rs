mod platform;

use crate::platform::logging::{self, LogDestination};

fn main() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);
    let settings = platform::agent_settings()?;
    platform::run_app(settings)
}
