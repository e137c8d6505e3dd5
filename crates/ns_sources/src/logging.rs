use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Map a `-v` count to a max level: 0 info, 1 debug, 2+ trace.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global fmt subscriber. Later calls, or a subscriber set by
/// someone else, leave the existing one in place.
pub fn init_logging(verbosity: u8) {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level_for(verbosity))
                .with_target(false)
                .init();
        });
    }
}
