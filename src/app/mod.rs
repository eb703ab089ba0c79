use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use log::{error, info};

use crate::market::{AdaptedGraph, GraphDocument, GraphSource, SignFilter, load_graph_document};

mod graph;
mod physics;
mod render_utils;
mod state;
mod ui;
mod viewport;

pub(crate) use physics::SimParams;

use graph::{DragMachine, Scene};
use physics::SimulationDriver;
use viewport::Viewport;

type LoadResult = Result<GraphDocument, String>;

/// Startup choices that seed every freshly loaded view.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LaunchSettings {
    pub(crate) params: SimParams,
    pub(crate) sign_filter: SignFilter,
}

pub(crate) struct GraphExplorerApp {
    source: GraphSource,
    launch: LaunchSettings,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    document: GraphDocument,
    adapted: AdaptedGraph,
    params: SimParams,
    sign_filter: SignFilter,
    visible_edges: Vec<usize>,
    driver: SimulationDriver,
    scene: Scene,
    viewport: Viewport,
    drag: DragMachine,
    panning: bool,
    selected: Option<String>,
    show_controls: bool,
}

impl GraphExplorerApp {
    pub(crate) fn new(
        _cc: &eframe::CreationContext<'_>,
        source: GraphSource,
        launch: LaunchSettings,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            launch,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: GraphSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_graph_document(&source).map_err(|error| {
                error!("graph load failed: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: GraphSource) -> AppState {
        info!("loading graph from {}", source.describe());
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, document: GraphDocument, ctx: &Context) -> AppState {
        let mut scheduler = ctx.clone();
        AppState::Ready(Box::new(ViewModel::new(
            document,
            self.launch.params,
            self.launch.sign_filter,
            &mut scheduler,
        )))
    }
}

impl eframe::App for GraphExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(document)) => transition = Some(Ok(document)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading company/keyword graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!("reloading graph from {}", self.source.describe());
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(document)) => {
                            let mut scheduler = ctx.clone();
                            model.replace_document(document, &mut scheduler);
                        }
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.source.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(document) => self.ready(document, ctx),
                Err(message) => AppState::Error(message),
            };
        }
    }
}
