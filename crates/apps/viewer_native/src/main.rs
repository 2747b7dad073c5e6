use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::time::Time;
use scene::MemoryScene;
use streaming::{HttpTransport, NamedProperties, RendererType};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use viewer::{
    Component, DataRequest, GestureConfig, HeadlessSurface, HtmlRequest, InfoRequest, MemorySvg,
    Session, StaticStyle, StreamConfig, TrackState, ViewerConfig, ViewerEvent, ViewerWidget,
};

type NativeWidget = ViewerWidget<HeadlessSurface, MemorySvg, MemoryScene>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless client for the visualization server")]
struct Args {
    /// Server endpoint (default: $AVS_URL or the local demo server)
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a scene, replay gestures against it and print every event
    Scene {
        #[arg(long)]
        name: String,

        /// IMAGE, IMAGEURL, SVG or THREEJS
        #[arg(long, default_value = "THREEJS", value_parser = parse_renderer)]
        renderer: RendererType,

        #[arg(long, default_value_t = 400.0)]
        width: f64,

        #[arg(long, default_value_t = 300.0)]
        height: f64,

        /// Widget configuration JSON; flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Request the 3D scene in chunks
        #[arg(long)]
        stream: bool,

        /// Tap at x,y once the scene is loaded
        #[arg(long, value_parser = parse_pair)]
        tap: Option<(f64, f64)>,

        /// Drag from x,y to x,y once the scene is loaded: x0,y0,x1,y1
        #[arg(long, value_parser = parse_quad)]
        track: Option<(f64, f64, f64, f64)>,

        /// Resize the display to w,h once the scene is loaded
        #[arg(long, value_parser = parse_pair)]
        resize: Option<(f64, f64)>,
    },

    /// Send an info request
    Info {
        #[arg(long)]
        name: String,

        #[arg(long)]
        data_source: Option<String>,
    },

    /// Send a data request
    Data {
        #[arg(long)]
        name: String,
    },

    /// Request an HTML fragment
    Html {
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let url = args.url.unwrap_or_else(|| {
        env::var("AVS_URL").unwrap_or_else(|_| "http://127.0.0.1:9200/avs".to_string())
    });
    let session = Session::new(HttpTransport::new());

    match args.command {
        Command::Scene {
            name,
            renderer,
            width,
            height,
            config,
            stream,
            tap,
            track,
            resize,
        } => {
            let mut cfg = match config {
                Some(path) => ViewerConfig::from_json(&std::fs::read_to_string(path)?)?,
                None => ViewerConfig::default(),
            };
            cfg.url = Some(url);
            cfg.scene_name = Some(name);
            cfg.renderer = renderer;
            if stream {
                cfg.stream = StreamConfig {
                    enable: true,
                    ..cfg.stream
                };
            }
            if tap.is_some() && cfg.tap.is_none() {
                cfg.tap = Some(GestureConfig::default());
            }
            if track.is_some() && cfg.track.is_none() {
                cfg.track = Some(GestureConfig::default());
            }
            run_scene(&session, cfg, (width, height), tap, track, resize).await?;
        }
        Command::Info { name, data_source } => {
            let component = InfoRequest {
                url: Some(url),
                info: NamedProperties::new(name),
                data_source: data_source.map(NamedProperties::new),
            };
            run_component(&session, &component).await?;
        }
        Command::Data { name } => {
            let component = DataRequest {
                url: Some(url),
                request: NamedProperties::new(name),
                data: None,
            };
            run_component(&session, &component).await?;
        }
        Command::Html { name } => {
            let component = HtmlRequest {
                url: Some(url),
                request: NamedProperties::new(name),
                data: None,
            };
            run_component(&session, &component).await?;
        }
    }

    Ok(())
}

async fn run_scene(
    session: &Session<HttpTransport>,
    config: ViewerConfig,
    (width, height): (f64, f64),
    tap: Option<(f64, f64)>,
    track: Option<(f64, f64, f64, f64)>,
    resize: Option<(f64, f64)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut widget: NativeWidget = ViewerWidget::new(
        config,
        HeadlessSurface::new(width, height),
        MemorySvg::new(),
        Box::new(StaticStyle::new()),
        Box::new(MemoryScene::new),
    );

    let first = widget.attach(Time(0.0));
    let trips = session.drive(&mut widget, first).await;
    info!(trips, "scene loaded");
    print_events(&mut widget)?;

    if let Some((x, y)) = tap {
        let pending = widget.tap(x, y);
        session.drive(&mut widget, pending).await;
        print_events(&mut widget)?;
    }

    if let Some((x0, y0, x1, y1)) = track {
        let (dx, dy) = (x1 - x0, y1 - y0);
        widget.track(TrackState::Start, x0, y0, 0.0, 0.0);
        widget.track(TrackState::Track, x1, y1, dx, dy);
        let pending = widget.track(TrackState::End, x1, y1, dx, dy);
        session.drive(&mut widget, pending).await;
        print_events(&mut widget)?;
    }

    if let Some((w, h)) = resize {
        widget.surface_mut().set_size(w, h);
        let pending = widget.on_resize();
        if pending.is_none() {
            info!(width = w, height = h, "resize handled locally");
        }
        session.drive(&mut widget, pending).await;
        print_events(&mut widget)?;
    }

    if let Some(scene) = widget.scene() {
        info!(
            nodes = scene.node_count(),
            cells = scene.cell_count(),
            chunks = scene.chunks_merged(),
            "scene graph"
        );
    }
    Ok(())
}

async fn run_component<C: Component>(
    session: &Session<HttpTransport>,
    component: &C,
) -> Result<(), Box<dyn std::error::Error>> {
    match session.run_component(component).await {
        Some(event) => print_event(&event)?,
        None => warn!("response carried nothing for this request"),
    }
    Ok(())
}

fn print_events(widget: &mut NativeWidget) -> Result<(), serde_json::Error> {
    for event in widget.drain_events() {
        print_event(&event)?;
    }
    Ok(())
}

fn print_event(event: &ViewerEvent) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn parse_renderer(s: &str) -> Result<RendererType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
        .map_err(|_| format!("unknown renderer '{s}'"))
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != count {
        return Err(format!("expected {count} comma-separated numbers, got '{s}'"));
    }
    Ok(values)
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let v = parse_numbers(s, 2)?;
    Ok((v[0], v[1]))
}

fn parse_quad(s: &str) -> Result<(f64, f64, f64, f64), String> {
    let v = parse_numbers(s, 4)?;
    Ok((v[0], v[1], v[2], v[3]))
}
