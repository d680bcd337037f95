mod cli;

const LOG_FILTER_ENV: &str = "RANDBLEM_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::get_args();
    setup_logger(cmd.verbose());
    log::trace!("Args: {:?}", cmd);
    match cmd.preferences() {
        Some(path) => log::debug!("{} using preferences at {}", cmd.name(), path.display()),
        None => log::debug!("{} using the default preferences location", cmd.name()),
    }

    cmd.run().await.map_err(|error| {
        log::error!("{:?}", error);
        anyhow::anyhow!("{} {} failed", clap::crate_name!(), cmd.name())
    })
}

pub(crate) fn setup_logger(level: u8) {
    let mut builder = pretty_env_logger::formatted_timed_builder();

    let log_level = match level {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    builder.filter_level(log_level);
    // http stack stays at warn unless RANDBLEM_LOG overrides it
    for module in ["hyper", "hyper_util", "reqwest", "rustls"] {
        builder.filter_module(module, log_level.min(log::LevelFilter::Warn));
    }
    if let Ok(filters) = std::env::var(LOG_FILTER_ENV) {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp_millis();
    builder.init();
}
