use rustls::crypto::aws_lc_rs;

pub fn setup_crypto_provider() {
    static DONE: std::sync::OnceLock<()> = std::sync::OnceLock::new();
    DONE.get_or_init(|| {
        if rustls::crypto::CryptoProvider::get_default().is_none() {
            let _ = aws_lc_rs::default_provider().install_default();
        }
    });
}

pub fn setup_http_client() -> reqwest::Client {
    setup_crypto_provider();
    reqwest::Client::new()
}
