//! Tracing subscriber setup
//!
//! The subscriber is installed before configuration is read, at the default
//! level, so config loading is logged. The configured level is applied
//! afterwards through [`LogLevelHandle`].

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Build the default filter directive for the harvesting crates at `level`
pub fn default_directive(level: &str) -> String {
    format!("etd_harvest={level},etd_common={level}")
}

/// Adjusts the installed filter once the configured level is known
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set and keeps priority
    env_override: bool,
}

impl LogLevelHandle {
    /// Switch the ETD crates to `level`; a no-op when `RUST_LOG` is set
    pub fn set_level(&self, level: &str) -> anyhow::Result<()> {
        if self.env_override {
            return Ok(());
        }
        let filter = EnvFilter::try_new(default_directive(level))?;
        self.handle.reload(filter)?;
        Ok(())
    }
}

fn reloadable_filter(
    default_level: &str,
) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directive(default_level)), false),
    };
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogLevelHandle { handle, env_override })
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes priority; otherwise `default_level` applies to the ETD
/// crates until [`LogLevelHandle::set_level`] is called.
pub fn init_logging(default_level: &str) -> anyhow::Result<LogLevelHandle> {
    let (filter, handle) = reloadable_filter(default_level);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_directive_covers_both_crates() {
        assert_eq!(
            default_directive("debug"),
            "etd_harvest=debug,etd_common=debug"
        );
    }

    #[test]
    #[serial]
    fn test_set_level_replaces_startup_filter() {
        std::env::remove_var("RUST_LOG");
        let (layer, handle) = reloadable_filter("info");
        let _subscriber = tracing_subscriber::registry().with(layer);

        handle.set_level("debug").unwrap();

        let current = handle.handle.with_current(|f| f.to_string()).unwrap();
        assert!(current.contains("etd_harvest=debug"));
        assert!(current.contains("etd_common=debug"));
    }

    #[test]
    #[serial]
    fn test_rust_log_keeps_priority() {
        std::env::set_var("RUST_LOG", "etd_harvest=trace");
        let (layer, handle) = reloadable_filter("info");
        let _subscriber = tracing_subscriber::registry().with(layer);
        std::env::remove_var("RUST_LOG");

        handle.set_level("warn").unwrap();

        let current = handle.handle.with_current(|f| f.to_string()).unwrap();
        assert!(current.contains("etd_harvest=trace"));
        assert!(!current.contains("warn"));
    }

    #[test]
    #[serial]
    fn test_invalid_level_is_an_error() {
        std::env::remove_var("RUST_LOG");
        let (layer, handle) = reloadable_filter("info");
        let _subscriber = tracing_subscriber::registry().with(layer);

        assert!(handle.set_level("not a level!").is_err());
    }
}
