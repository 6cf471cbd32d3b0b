// src/bin/stock_tracker.rs

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use eframe::egui;
use egui::{Align2, Color32, RichText};
use egui_plot::{GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoints, VLine};
use log::{error, info};
use std::ops::RangeInclusive;
use std::sync::Arc;

use stock_tracker::config::{Args, GRID_COLS, GRID_ROWS, WINDOW_SIZE, WINDOW_TITLE};
use stock_tracker::stocks::StockUniverse;
use stock_tracker::{
    ChartPanel, Controller, FetchWorker, MarketDataProvider, SyntheticProvider, ViewState,
    YahooProvider, format_date_tick,
};

const SHOW_GREEN: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);
const REFRESH_BLUE: Color32 = Color32::from_rgb(0x00, 0x8C, 0xBA);
const BUTTON_SIZE: egui::Vec2 = egui::vec2(180.0, 28.0);
const GRID_GRAY: u8 = 128;
const MIN_CELL_HEIGHT: f32 = 80.0;

struct StockTrackerApp {
    ticker_input: String,
    controller: Controller,
    worker: FetchWorker,
}

impl eframe::App for StockTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply whatever the worker finished since the last frame.
        while let Some(report) = self.worker.try_recv() {
            let _ = self.controller.complete(report);
        }
        let alert_open = self.controller.alert().is_some();

        egui::TopBottomPanel::top("input_panel").show(ctx, |ui| {
            ui.add_enabled_ui(!alert_open, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(15.0);
                    ui.label(RichText::new("Enter Stock Symbol").size(18.0).strong());
                    ui.add_space(10.0);

                    let input = ui.add(
                        egui::TextEdit::singleline(&mut self.ticker_input).desired_width(200.0),
                    );
                    let entered =
                        input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    ui.add_space(10.0);

                    let show = ui
                        .add(
                            egui::Button::new(RichText::new("Show Price").color(Color32::WHITE))
                                .fill(SHOW_GREEN)
                                .min_size(BUTTON_SIZE),
                        )
                        .clicked();
                    ui.add_space(5.0);
                    // Refresh has no behaviour yet.
                    ui.add(
                        egui::Button::new(RichText::new("Refresh").color(Color32::WHITE))
                            .fill(REFRESH_BLUE)
                            .min_size(BUTTON_SIZE),
                    );
                    if show || entered {
                        self.submit();
                    }

                    ui.add_space(10.0);
                    ui.label(RichText::new(self.controller.price_text()).size(16.0));
                    if self.controller.is_fetching() {
                        ui.spinner();
                    }
                    ui.add_space(10.0);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!alert_open, |ui| {
                draw_chart_grid(ui, self.controller.view());
            });
        });

        self.show_alert(ctx);
    }
}

impl StockTrackerApp {
    fn new(worker: FetchWorker) -> Self {
        Self {
            ticker_input: String::new(),
            controller: Controller::new(),
            worker,
        }
    }

    fn submit(&mut self) {
        // Rejections are already turned into an alert by the controller.
        let _ = self.controller.dispatch(&self.worker, &self.ticker_input);
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.controller.alert().cloned() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(alert.title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(alert.message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.dismiss_alert();
        }
    }
}

/// Equal cells, `GRID_ROWS` x `GRID_COLS`, filling the remaining space.
fn draw_chart_grid(ui: &mut egui::Ui, view: &ViewState) {
    if view.is_empty() {
        return;
    }
    let spacing = ui.spacing().item_spacing.y * (GRID_ROWS as f32 - 1.0);
    let cell_height = ((ui.available_height() - spacing) / GRID_ROWS as f32).max(MIN_CELL_HEIGHT);

    for row in 0..GRID_ROWS {
        ui.columns(GRID_COLS, |columns| {
            for (col, column_ui) in columns.iter_mut().enumerate() {
                let mounted = view
                    .panels()
                    .iter()
                    .find(|m| m.panel.row == row && m.panel.col == col);
                if let Some(mounted) = mounted {
                    draw_panel(column_ui, mounted.id, &mounted.panel, cell_height);
                }
            }
        });
    }
}

fn draw_panel(ui: &mut egui::Ui, id: u64, panel: &ChartPanel, height: f32) {
    let [r, g, b] = panel.color;
    let color = Color32::from_rgb(r, g, b);
    let grid_color = Color32::from_gray(GRID_GRAY).gamma_multiply(panel.grid.alpha);
    let grid_style = if panel.grid.dashed {
        LineStyle::dashed_loose()
    } else {
        LineStyle::Solid
    };

    // Built-in grid is solid, so it is replaced by dashed rules at the panel's ticks.
    Plot::new(("chart_panel", id))
        .height(height)
        .legend(Legend::default())
        .x_axis_label(panel.x_label)
        .y_axis_label(panel.y_label)
        .show_grid(false)
        .x_axis_formatter(|mark: GridMark, _max_chars: usize, _range: &RangeInclusive<f64>| {
            format_date_tick(mark.value)
        })
        .show(ui, |plot_ui| {
            for x in &panel.x_ticks {
                plot_ui.vline(VLine::new(*x).color(grid_color).style(grid_style));
            }
            for y in &panel.y_ticks {
                plot_ui.hline(HLine::new(*y).color(grid_color).style(grid_style));
            }
            plot_ui.line(
                Line::new(PlotPoints::new(panel.points.clone()))
                    .color(color)
                    .width(panel.line_width)
                    .name(panel.label),
            );
        });
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), eframe::Error> {
    init_logger();
    let args = Args::parse();
    let window = match args.window() {
        Ok(window) => window,
        Err(msg) => Args::command().error(ErrorKind::ValueValidation, msg).exit(),
    };

    let provider: Arc<dyn MarketDataProvider> = if args.offline {
        info!("offline mode, serving generated prices for {window}");
        Arc::new(SyntheticProvider::new(StockUniverse::default(), window))
    } else {
        match YahooProvider::new(args.base_url.as_str(), args.timeout()) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                error!("could not build HTTP client: {e}");
                std::process::exit(1);
            }
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let worker = FetchWorker::spawn(provider, window, move || ctx.request_repaint());
            Box::new(StockTrackerApp::new(worker))
        }),
    )
}
