use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use cloudsky::CloudEngine;
use cloudsky::config::Settings;
use cloudsky::render;

const MAX_DIM: usize = 4096;

#[derive(Deserialize)]
struct FrameRequest {
    width: Option<usize>,
    height: Option<usize>,
    elapsed_ms: Option<f64>,
    #[serde(default)]
    settings: Settings,
}

#[derive(Serialize)]
struct FrameResponse {
    data_url: String,
    timings: Vec<TimingEntry>,
    width: usize,
    height: usize,
    frame_interval_ms: u64,
    settings: Settings,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .context("PNG encode failed")?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

async fn frame_handler(Json(req): Json<FrameRequest>) -> Result<Json<FrameResponse>, ApiError> {
    let width = req.width.unwrap_or(540).clamp(1, MAX_DIM);
    let height = req.height.unwrap_or(960).clamp(1, MAX_DIM);
    let elapsed_ms = req.elapsed_ms.unwrap_or(0.0);
    let settings = req.settings;
    let sky = settings
        .sky()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let response = tokio::task::spawn_blocking(move || -> Result<FrameResponse> {
        let mut engine = CloudEngine::new(&settings);
        engine.on_resize(width, height);
        let timings = engine.render_timed(elapsed_ms);
        let frame = render::composite_over_sky(engine.field(), sky);

        let timing_entries = timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect();

        Ok(FrameResponse {
            data_url: encode_png(&frame, width, height)?,
            timings: timing_entries,
            width,
            height,
            frame_interval_ms: settings.frame_interval_ms(),
            settings,
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    Ok(Json(response))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/frame", post(frame_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("cloudsky preview at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
