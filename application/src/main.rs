use std::future::IntoFuture as _;

use application::{logging, router, Args, Config};
use futures::{future, TryFutureExt as _};
use service::{
    infra::{Postgres, Scraper},
    Service,
};
use tokio::net::TcpListener;
use tracing as log;

#[tokio::main]
async fn main() {
    logging::init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    if !logging::set_level(log.level.into()) {
        log::warn!("log level is already set");
    }

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    let applied = postgres.migrate().await.map_err(|e| {
        log::error!("failed to run database migrations: {e}");
    })?;
    log::info!("applied {applied} database migrations");

    let scraper = Scraper::new(&(&service.image).into()).map_err(|e| {
        log::error!("failed to initialize `Scraper`: {e}");
    })?;

    let (service, background) =
        Service::new((&service).into(), postgres, scraper);
    log::info!("spawned {} background tasks", background.len());

    let app = router(service, &server.cors.origins).map_err(|e| {
        log::error!("failed to build HTTP router: {e}");
    })?;

    let listener = TcpListener::bind((server.host.as_str(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;
    log::info!("listening on `{}:{}`", server.host, server.port);

    future::try_join(
        axum::serve(listener, app)
            .into_future()
            .map_err(|e| log::error!("webserver failed: {e}")),
        background.into_future().map_err(|e| {
            log::error!(task = e.task(), "background task failed: {e}");
        }),
    )
    .await
    .map(drop)
}
