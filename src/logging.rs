use tracing_subscriber::EnvFilter;

use crate::state::settings::Settings;

/// Crates that log every frame at `debug`
const NOISY_CRATES: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "iced_wgpu"];

/// Filter directive for the saved settings.
///
/// Debug logging raises this crate to `debug` and dependencies to `info`,
/// with the GPU stack held at `warn`. Otherwise only our `info` and other
/// crates' warnings get through.
pub fn directive(settings: &Settings) -> String {
    if !settings.debug_logging {
        return "warn,lesion_map=info".to_string();
    }

    let mut directive = "info,lesion_map=debug".to_string();
    for name in NOISY_CRATES {
        directive.push_str(&format!(",{}=warn", name));
    }
    directive
}

/// Install the global subscriber. `RUST_LOG` is only honoured while debug
/// logging is switched on in the settings.
pub fn init(settings: &Settings) {
    let directive = directive(settings);

    let filter = if settings.debug_logging {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    } else {
        EnvFilter::new(&directive)
    };

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("Logging with '{}'", directive);
    }
}
