use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the expansion log filter, e.g.
/// `WARDEN_LOG=warden_weave=trace`.
pub const ENV: &str = "WARDEN_LOG";

static INIT: Once = Once::new();

/// Installs a stderr subscriber the first time a macro expands, when
/// [`ENV`] is set. Does nothing if the host already installed one.
pub fn init() {
    INIT.call_once(|| {
        if std::env::var_os(ENV).is_none() {
            return;
        }
        let filter = match EnvFilter::try_from_env(ENV) {
            Ok(filter) => filter,
            Err(err) => {
                // No subscriber exists yet, so stderr is the only channel.
                eprintln!("warden: ignoring invalid {ENV}: {err}");
                return;
            }
        };

        if let Err(err) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .without_time()
            .try_init()
        {
            tracing::debug!(error = %err, "keeping the subscriber installed by the host");
        }
    });
}
