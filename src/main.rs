// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

use flashdeck::app_state::AppState;
use flashdeck::bootstrap;
use flashdeck::db::Database;
use flashdeck::users::middleware::SessionAuthMiddlewareFactory;
use flashdeck::{admin, catalog, pages, users};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let runtime_root = match parse_args() {
        Ok(root) => root,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    let bootstrap = match bootstrap::bootstrap_runtime(&runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };
    if bootstrap.created_config {
        eprintln!(
            "[bootstrap] created {}",
            bootstrap.runtime_paths.config_file.display()
        );
    }

    init_logging(&bootstrap.validated_config.logging.level);

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

fn parse_args() -> Result<PathBuf, String> {
    let mut root = PathBuf::from(".");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-C" => match args.next() {
                Some(value) => root = PathBuf::from(value),
                None => return Err("-C requires a directory argument".to_string()),
            },
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(root)
}

fn init_logging(level: &str) {
    let filter = match level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

async fn run_server(bootstrap: bootstrap::BootstrapResult) -> std::io::Result<()> {
    let config = bootstrap.validated_config;
    let runtime_paths = bootstrap.runtime_paths;

    let db = Database::open(&runtime_paths.db_file).map_err(|err| {
        std::io::Error::other(format!(
            "Failed to open database {}: {}",
            runtime_paths.db_file.display(),
            err
        ))
    })?;
    bootstrap::seed_default_categories(&db)
        .map_err(|err| std::io::Error::other(format!("Failed to seed categories: {}", err)))?;

    let state = web::Data::new(AppState::new(&config));
    let db = web::Data::new(db);
    let config_data = web::Data::new(config.clone());

    log::info!(
        "Starting {} on {}:{}",
        config.app.name,
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(db.clone())
            .app_data(config_data.clone())
            .wrap(Logger::default())
            .wrap(SessionAuthMiddlewareFactory)
            .configure(pages::configure)
            .configure(catalog::configure)
            .configure(users::configure)
            .configure(admin::configure)
            .default_service(web::route().to(pages::not_found))
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
