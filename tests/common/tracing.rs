use tracing::Level;

pub fn init_subscriber() {
    // Called by every test. Only the first call installs the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
