use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use portal::config::{Cli, Command};
use portal::services::hosts::allowed_hosts;
use portal::services::notification::Notifier;
use portal::store::Store;
use portal::{configure, seed, AppState};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    let config = cli.config;

    let store = Store::open(&config.database).map_err(io::Error::other)?;

    if cli.command == Some(Command::Seed) {
        return match seed::run(&store) {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Seeding failed: {}", e);
                Err(io::Error::other(e.to_string()))
            }
        };
    }

    std::fs::create_dir_all(&config.media_root)?;
    let notifier = Notifier::from_config(&config);
    let (host, port) = (config.host.clone(), config.port);
    if config.admin_token().is_none() {
        info!("No admin token configured; /api/admin is disabled");
    }

    let state = web::Data::new(AppState::new(config, store, notifier).map_err(io::Error::other)?);

    info!("Server running at http://{}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(allowed_hosts))
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
