use std::sync::OnceLock;

use tracing::debug;

/// Install the process-wide rustls crypto provider once.
///
/// `reqwest` is built without a bundled provider, so this must run before the
/// first client is built.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}
