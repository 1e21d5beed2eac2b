//! This module provides observability and diagnostics for the class pipeline.
//!
//! Building a class runs four stages (validate, collect coordinates,
//! synthesize constructors, relocate methods). The `log_metric!` macro emits
//! one structured key-value line per stage through the `log` facade, so the
//! pipeline's decisions show up in whatever logger the host installs.
//! `enable_verbose_logging` installs `env_logger` for hosts that have none.

use log::LevelFilter;
use std::sync::Once;

/// Logs a structured key-value metric line at `debug` level.
///
/// # Example
/// ```
/// use arrayclass::log_metric;
/// let coords = 2;
/// log_metric!("event"="collect_coordinates", "class"="Image", "count"=&coords);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::log::log_enabled!($crate::log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            $crate::log::debug!("ARRAYCLASS_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `level`, once per process. Later calls are
/// no-ops, as is the first call when another logger is already installed.
pub fn enable_verbose_logging(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        let _ = builder.try_init();
    });
}
