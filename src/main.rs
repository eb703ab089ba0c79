mod app;
mod market;
mod util;

use std::path::PathBuf;

use clap::Parser;
use log::info;

use app::{GraphExplorerApp, LaunchSettings, SimParams};
use market::{GraphSource, SignFilter};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// HTTP endpoint serving the graph document.
    #[arg(long, default_value = "http://localhost:8000/test")]
    endpoint: String,
    /// Read the graph document from a JSON file instead of the endpoint.
    #[arg(long)]
    graph_file: Option<PathBuf>,
    #[arg(long)]
    charge: Option<f32>,
    #[arg(long)]
    link_distance: Option<f32>,
    #[arg(long)]
    link_strength: Option<f32>,
    /// Pull toward both midlines; `--gravity-x`/`--gravity-y` override one axis.
    #[arg(long)]
    gravity: Option<f32>,
    #[arg(long)]
    gravity_x: Option<f32>,
    #[arg(long)]
    gravity_y: Option<f32>,
    #[arg(long)]
    alpha_decay: Option<f32>,
    /// Start with negative-weight edges visible instead of positive ones.
    #[arg(long)]
    negative: bool,
}

impl Args {
    fn source(&self) -> GraphSource {
        match &self.graph_file {
            Some(path) => GraphSource::File(path.clone()),
            None => GraphSource::Endpoint(self.endpoint.clone()),
        }
    }

    fn launch_settings(&self) -> LaunchSettings {
        let defaults = SimParams::default();
        let mut params = SimParams {
            charge: self.charge.unwrap_or(defaults.charge),
            link_distance: self.link_distance.unwrap_or(defaults.link_distance),
            link_strength_scale: self.link_strength.unwrap_or(defaults.link_strength_scale),
            alpha_decay: self.alpha_decay.unwrap_or(defaults.alpha_decay),
            ..defaults
        };
        if let Some(gravity) = self.gravity {
            params.set_gravity(gravity);
        }
        params.gravity_x = self.gravity_x.unwrap_or(params.gravity_x);
        params.gravity_y = self.gravity_y.unwrap_or(params.gravity_y);
        let params = params.clamped();
        let sign_filter = if self.negative {
            SignFilter::Negative
        } else {
            SignFilter::Positive
        };
        LaunchSettings {
            params,
            sign_filter,
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let source = args.source();
    let launch = args.launch_settings();
    info!("starting with {launch:?}");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "keyword-graph",
        options,
        Box::new(move |cc| Ok(Box::new(GraphExplorerApp::new(cc, source, launch)))),
    )
}
