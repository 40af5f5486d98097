use std::sync::Arc;

use admitron::config::{load_config, print_schema};
use admitron::startup;
use admitron::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    // `--schema` prints the config JSON schema and exits, for tooling.
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = Arc::new(load_config());
    init_logging(&config.logging);

    startup::run(config).await.expect("Server failed to start");
}
