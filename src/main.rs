use crate::config::{Cli, Config};
use crate::console::{
    parse_command, Command, ConsoleDrawingTool, ConsoleSurface, SurfacePointer, HELP,
};
use crate::domain::Coordinate;
use crate::query::{HttpTransport, PropertyQuery, SpatialQueryClient};
use crate::sync::{ControllerHandle, MapSyncController};
use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod console;
mod domain;
mod errors;
mod query;
mod store;
mod sync;
mod templates;


// Roughly the middle of the contiguous US
const START_CENTER: Coordinate = Coordinate {
    lon: -98.58,
    lat: 39.83,
};

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .try_init();

    // 1️⃣ Configuration problems stop us before anything is fetched
    let config = match Config::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // 2️⃣ Backend client
    let transport = HttpTransport::new(config.backend_url.clone(), config.request_timeout)?;
    info!(backend = %transport.base_url(), "using property backend");
    let query: Arc<dyn PropertyQuery> = Arc::new(SpatialQueryClient::new(transport));

    // 3️⃣ Map surface and drawing tool, handed to the controller for its lifetime
    let surface = ConsoleSurface::new(START_CENTER, config.initial_zoom);
    let pointer = surface.pointer();
    let drawing = ConsoleDrawingTool::new();
    let pen = drawing.clone();

    let mut controller = MapSyncController::mount(query, surface, drawing, config.stale_policy);
    let handle = controller.handle();
    pointer.mark_loaded();

    println!("{HELP}");

    // 4️⃣ Prompt runs on its own thread; everything else happens here
    thread::spawn(move || read_commands(handle, pointer, pen));
    controller.run();

    let (surface, _) = controller.teardown();
    let (center, zoom) = surface.viewport();
    println!(
        "Map closed at ({:.5}, {:.5}) zoom {} with {} points displayed.",
        center.lon,
        center.lat,
        zoom,
        surface.point_count()
    );
    Ok(())
}

fn read_commands(handle: ControllerHandle, pointer: SurfacePointer, pen: ConsoleDrawingTool) {
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("⚠️ {msg}");
                continue;
            }
        };

        let delivered = match command {
            Command::Draw(vertices) => {
                pen.draw_polygon(vertices);
                println!("✏️  {} shape(s) drawn", pen.shape_count());
                true
            }
            Command::Search => handle.request_search(),
            Command::Clear => handle.request_clear(),
            Command::Status => handle.request_status(),
            Command::Click(at) => {
                pointer.click(at);
                true
            }
            Command::Zoom(zoom) => {
                pointer.set_zoom(zoom);
                true
            }
            Command::List => {
                println!("{}", pointer.describe());
                true
            }
            Command::Help => {
                println!("{HELP}");
                true
            }
            Command::Quit => break,
        };

        if !delivered {
            break;
        }
    }

    handle.shutdown();
}
