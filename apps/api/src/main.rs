mod env;

use std::net::SocketAddr;

use axum::Router;
use tower_http::{
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::prelude::*;

use huddle_api_bot::{BotApiConfig, Launcher};

use env::env;

fn app() -> Router {
    let env = env();

    let launcher = match &env.bot_program {
        Some(program) => Launcher::Spawn {
            program: program.clone(),
            args: env.bot_args.clone(),
        },
        None => Launcher::Manual,
    };

    let config = BotApiConfig::new(&env.transcripts_dir).with_launcher(launcher);

    Router::new()
        .nest("/api", huddle_api_bot::router(config))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
        )
}

#[tokio::main]
async fn main() {
    let env = env();

    let _sentry_guard = env.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tokio::fs::create_dir_all(&env.transcripts_dir)
        .await
        .expect("Failed to create transcripts directory");

    let addr = SocketAddr::from(([0, 0, 0, 0], env.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("Server error");
}
