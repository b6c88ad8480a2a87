use std::sync::Once;

use tracing::level_filters::LevelFilter;

static LOGGING: Once = Once::new();

/// Route codec traces to the test harness output.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(LevelFilter::TRACE)
            .with_ansi(false)
            .with_target(false)
            .try_init();
    });
}
