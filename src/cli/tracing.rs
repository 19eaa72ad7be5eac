use tracing::Level;
use tracing_subscriber::prelude::*;

pub(crate) fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = tracing_subscriber::filter::Targets::new()
        .with_target("octocrab", level)
        .with_target("tokio_nsq", Level::INFO)
        .with_target("hyper", Level::INFO)
        .with_default(level);

    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .init();
}
