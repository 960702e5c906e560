use clap::Parser;
use intune_device_export::session::GraphSession;
use intune_device_export::{api, logger, settings};
use std::process::ExitCode;
use std::time::Duration;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let settings = match settings::read_settings(
        &settings::program_dir(),
        cli.config.as_deref(),
        &cli.overrides(),
    ) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = logger::init(&settings.log_path) {
        eprintln!("{}", e);
        return ExitCode::from(e.exit_code());
    }
    log::debug!("{:?}", settings);

    let api = api::api(
        settings.authority_url.to_owned(),
        settings.graph_url.to_owned(),
        Duration::from_secs(settings.request_timeout_secs),
    );
    let mut session = GraphSession::new(api);

    match intune_device_export::run(&mut session, &settings).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}
