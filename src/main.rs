use log::info;
use std::time::Instant;
use tokio::net::TcpListener;
use water_forecast::configuration::get_configuration;
use water_forecast::{run, AppContext};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let start = Instant::now();
    let configuration = get_configuration().expect("Failed to read configuration.");
    info!(
        "Loaded {} configuration",
        configuration.environment.as_str()
    );
    let context = AppContext::build(&configuration).expect("Failed to build the weather client.");

    let listener = TcpListener::bind(configuration.application.address()).await?;
    info!("Started in {:?}", start.elapsed());

    run(listener, context).await
}
