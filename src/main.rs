use egui_plot::{Line, Plot};
use nalgebra as na;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use windtunnel::analysis::{self, SurfacePoint};
use windtunnel::config::{SimulationConfig, DEFAULT_CONFIG_FILE};
use windtunnel::outline;
use windtunnel::{FrameStats, RenderedParticle, Simulation};

const SURFACE_SAMPLES: usize = 120;
const SMOKE_RADIUS: f32 = 5.0;

#[derive(Debug)]
struct Controls {
    freestream: f64,
    center_x: f64,
    center_y: f64,
    angle_of_attack_deg: f64,
}

#[derive(Debug)]
struct PerformanceMetrics {
    cl: f64,
    lift_per_span: f64,
    circulation: f64,
}

struct WindTunnel {
    simulation: Simulation,
    controls: Controls,
    parameter_error: Option<String>,
    started: Instant,
    last_tick: Option<f64>,
    pointer_held: bool,
    outline: Vec<egui::Pos2>,
    fill: egui::Mesh,
    smoke: Vec<RenderedParticle>,
    stats: FrameStats,
    show_pressure: bool,
    surface: Vec<SurfacePoint>,
    performance_metrics: PerformanceMetrics,
}

impl WindTunnel {
    fn new(_cc: &eframe::CreationContext<'_>, simulation: Simulation) -> Self {
        let params = simulation.parameters();
        let controls = Controls {
            freestream: params.freestream(),
            center_x: params.center().re,
            center_y: params.center().im,
            angle_of_attack_deg: params.angle_of_attack().to_degrees(),
        };

        let mut tunnel = Self {
            simulation,
            controls,
            parameter_error: None,
            started: Instant::now(),
            last_tick: None,
            pointer_held: false,
            outline: Vec::new(),
            fill: egui::Mesh::default(),
            smoke: Vec::new(),
            stats: FrameStats::default(),
            show_pressure: true,
            surface: Vec::new(),
            performance_metrics: PerformanceMetrics {
                cl: 0.0,
                lift_per_span: 0.0,
                circulation: 0.0,
            },
        };
        tunnel.refresh_analysis();
        tunnel
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn apply_controls(&mut self) {
        let result = self.simulation.set_parameters(
            self.controls.freestream,
            self.controls.center_x,
            self.controls.center_y,
            self.controls.angle_of_attack_deg.to_radians(),
        );
        match result {
            Ok(()) => {
                self.parameter_error = None;
                self.refresh_analysis();
            }
            Err(err) => self.parameter_error = Some(err.to_string()),
        }
    }

    fn refresh_analysis(&mut self) {
        let params = self.simulation.parameters();
        self.surface = analysis::surface_pressure(params, SURFACE_SAMPLES);
        self.performance_metrics = PerformanceMetrics {
            cl: analysis::lift_coefficient(params),
            lift_per_span: analysis::lift_per_span(params, self.simulation.config().density),
            circulation: windtunnel::flow::circulation(params),
        };
    }

    fn tick(&mut self, rect: egui::Rect) {
        let now = self.now_ms();
        let interval = self.simulation.config().frame_interval_ms;
        if self.last_tick.is_some_and(|last| now - last < interval) {
            return;
        }
        self.last_tick = Some(now);

        let frame = self
            .simulation
            .tick(now, rect.width() as f64, rect.height() as f64);
        let to_screen = |p: &na::Point2<f64>| rect.min + egui::vec2(p.x as f32, p.y as f32);
        let outline: Vec<egui::Pos2> = frame.outline.iter().map(to_screen).collect();
        if outline != self.outline {
            let fill = egui::Color32::from_gray(0xCC);
            let mut mesh = egui::Mesh::default();
            for triangle in outline::fill_triangles(frame.outline) {
                let base = mesh.vertices.len() as u32;
                for p in &triangle {
                    mesh.colored_vertex(to_screen(p), fill);
                }
                mesh.add_triangle(base, base + 1, base + 2);
            }
            self.fill = mesh;
            self.outline = outline;
        }
        self.smoke = frame.particles;
        self.stats = frame.stats;
    }

    fn handle_pointer(&mut self, response: &egui::Response) {
        let rect = response.rect;
        if response.is_pointer_button_down_on() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                if self.pointer_held {
                    self.simulation.pointer_move(local.x as f64, local.y as f64);
                } else {
                    self.simulation.pointer_down(local.x as f64, local.y as f64);
                    self.pointer_held = true;
                }
            }
        } else if self.pointer_held {
            self.simulation.pointer_up();
            self.pointer_held = false;
        }
    }

    fn draw_airfoil(&self, painter: &egui::Painter) {
        if self.outline.len() < 3 {
            return;
        }
        painter.add(egui::Shape::mesh(self.fill.clone()));
        painter.add(egui::Shape::closed_line(
            self.outline.clone(),
            egui::Stroke::new(1.0, egui::Color32::WHITE),
        ));
    }

    fn draw_smoke(&self, painter: &egui::Painter, rect: egui::Rect) {
        for particle in &self.smoke {
            let [r, g, b] = particle.color;
            let center = rect.min + egui::vec2(particle.position.x as f32, particle.position.y as f32);
            painter.circle_filled(center, SMOKE_RADIUS, egui::Color32::from_rgb(r, g, b));
        }
    }

    fn plot_pressure_distribution(&self, plot_ui: &mut egui_plot::PlotUi) {
        let mut upper: Vec<[f64; 2]> = self
            .surface
            .iter()
            .filter(|p| p.is_upper())
            .map(|p| [p.x, -p.cp])
            .collect();
        let mut lower: Vec<[f64; 2]> = self
            .surface
            .iter()
            .filter(|p| !p.is_upper())
            .map(|p| [p.x, -p.cp])
            .collect();
        upper.sort_by(|a, b| a[0].total_cmp(&b[0]));
        lower.sort_by(|a, b| a[0].total_cmp(&b[0]));

        plot_ui.line(
            Line::new(upper)
                .color(egui::Color32::from_rgb(255, 100, 100))
                .width(2.0)
                .name("Upper Surface -Cp"),
        );
        plot_ui.line(
            Line::new(lower)
                .color(egui::Color32::from_rgb(100, 100, 255))
                .width(2.0)
                .name("Lower Surface -Cp"),
        );
    }

    fn show_performance_metrics(&self, ui: &mut egui::Ui) {
        let metrics = &self.performance_metrics;
        ui.heading("Performance Metrics");

        egui::Frame::none()
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(format!("Lift Coefficient (CL): {:.3}", metrics.cl));
                    ui.label(format!("Circulation (Γ): {:.3}", metrics.circulation));
                    ui.label(format!("Lift per span (L'): {:.3}", metrics.lift_per_span));
                    ui.label(format!("Radius: {:.3}", self.simulation.parameters().radius()));
                });
            });
    }
}

impl eframe::App for WindTunnel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Tunnel Controls");

            let mut changed = false;
            changed |= ui
                .add(egui::Slider::new(&mut self.controls.freestream, 0.05..=1.5).text("Freestream"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.controls.center_x, -0.3..=0.0).text("Center x"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.controls.center_y, -0.3..=0.3).text("Center y"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut self.controls.angle_of_attack_deg, -20.0..=20.0).text("Angle of Attack (°)"))
                .changed();
            if changed {
                self.apply_controls();
            }
            if let Some(err) = &self.parameter_error {
                ui.colored_label(egui::Color32::RED, err.as_str());
            }

            ui.horizontal(|ui| {
                if ui.button("Smoke line").clicked() {
                    self.simulation.emit_smoke_line();
                }
                if ui.button("Clear").clicked() {
                    self.simulation.clear_smoke();
                    self.smoke.clear();
                }
            });

            ui.label(format!(
                "Particles: {} / {}",
                self.stats.live,
                self.simulation.particles().capacity()
            ));
            if self.stats.degenerate > 0 || self.stats.singular > 0 {
                ui.label(format!(
                    "Irregular samples: {} degenerate, {} singular",
                    self.stats.degenerate, self.stats.singular
                ));
            }

            ui.separator();
            self.show_performance_metrics(ui);

            ui.separator();
            ui.checkbox(&mut self.show_pressure, "Show Pressure");
            if self.show_pressure {
                Plot::new("pressure_plot")
                    .height(240.0)
                    .show(ui, |plot_ui| self.plot_pressure_distribution(plot_ui));
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;

                self.handle_pointer(&response);
                self.tick(rect);

                painter.rect_filled(rect, 0.0, egui::Color32::BLACK);
                self.draw_airfoil(&painter);
                self.draw_smoke(&painter, rect);
            });

        let interval = self.simulation.config().frame_interval_ms;
        ctx.request_repaint_after(Duration::from_secs_f64(interval / 1000.0));
    }
}

fn load_config() -> (SimulationConfig, Option<String>) {
    match SimulationConfig::load(DEFAULT_CONFIG_FILE) {
        Ok(config) => (config, None),
        Err(err) => (SimulationConfig::default(), Some(err.to_string())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_error) = load_config();

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Wind tunnel v{}", env!("CARGO_PKG_VERSION"));
    if let Some(err) = config_error {
        warn!("Using default configuration ({}): {}", DEFAULT_CONFIG_FILE, err);
    }

    let simulation = Simulation::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wind Tunnel",
        options,
        Box::new(move |cc| Box::new(WindTunnel::new(cc, simulation))),
    )?;
    Ok(())
}
