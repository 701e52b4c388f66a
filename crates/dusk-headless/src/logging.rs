use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global logger once; later calls are ignored.
///
/// `filter` uses the `env_logger` syntax (e.g. "info",
/// "dusk_render=debug"). Without one, `RUST_LOG` is honoured, then `info`.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        // Tests may have installed a logger already.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
