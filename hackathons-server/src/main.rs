use hackathons_common::db::create_db_async_pool;
use hackathons_common::store::{InMemoryStore, PostgresStore, Store};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

mod env;
mod handlers;
mod middleware;
mod services;

use middleware::cors::CorsMiddleware;
use middleware::throttle::Throttle;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let mut conf = match env::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let _logger = Logger::try_with_str(&conf.log_level)
        .expect(
            "Invalid log level. Options: ERROR, WARN, INFO, DEBUG, TRACE. \
             Example: `info, my::critical::module=trace`",
        )
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = conf.actix_worker_count;

    let store: Store = if conf.in_memory_store {
        log::info!("Using in-memory store. Signups will not persist across restarts.");
        Arc::new(InMemoryStore::new())
    } else {
        log::info!("Connecting to database...");

        // To prevent resource starvation, max connections must be at least as large as the
        // number of actix workers
        let db_max_connections = conf.db_max_connections.max(actix_workers as u32);

        let db_uri = Zeroizing::new(conf.database_uri());
        let db_async_pool =
            match create_db_async_pool(&db_uri, db_max_connections, conf.db_idle_timeout).await {
                Ok(p) => p,
                Err(e) => {
                    log::error!("{e}");
                    eprintln!("ERROR: Failed to connect to database");
                    std::process::exit(1);
                }
            };

        log::info!("Successfully connected to database");

        Arc::new(PostgresStore::new(&db_async_pool))
    };

    let throttle = Throttle::new(conf.rate_limit_max_requests, conf.rate_limit_window);
    let cors_allowed_origins = conf.cors_allowed_origins.clone();

    // Credentials are no longer needed once the pool is built
    conf.zeroize();

    let base_addr = format!("127.0.0.1:{}", &port);
    log::info!("Listening on {base_addr} with {actix_workers} workers");

    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(Arc::clone(&store)))
            .app_data(Data::new(throttle))
            .configure(services::api::configure)
            .wrap(CorsMiddleware::new(cors_allowed_origins.clone()))
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    Ok(())
}
