use errtree::{Error, Kv, sentinel};
use tracing_subscriber::EnvFilter;

sentinel!(#[allow(dead_code)] pub ERR_TEST = "test");
sentinel!(#[allow(dead_code)] pub ERR_OTHER = "other");

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn io_error(msg: &str) -> Error {
    Error::external(std::io::Error::other(msg.to_string()))
}

#[allow(dead_code)]
pub fn has_kv(kvs: &[Kv], key: &str, check: impl Fn(&errtree::Value) -> bool) -> bool {
    kvs.iter().any(|kv| kv.key() == key && check(kv.value()))
}
