use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use eframe::egui;
use egui::{Color32, RichText};
use tracing::{error, info};

use crate::api::ScheduleClient;
use crate::config::Config;
use crate::schedule::{
    CalendarWindow, CarouselPaginator, DayLayout, FeedStatus, PageUnit, RenderMapper, ScheduleFeed,
    TimeGrid,
};
use super::views;

pub struct ScheduleApp {
    config: Config,
    state: AppState,

    // Calendar + the two independent swipe paginators sharing its selection
    window: CalendarWindow,
    week_pager: CarouselPaginator,
    day_pager: CarouselPaginator,
    grid: TimeGrid,
    mapper: RenderMapper,

    // Placed jobs for the selected day, rebuilt when the feed or date changes
    day_layout: DayLayout,
    layout_key: Option<(u64, NaiveDate)>,

    // Month picker dropdown
    show_month_picker: bool,

    // Settings dialog
    show_settings: bool,
    settings_base_url: String,
    settings_poll_secs: String,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)

    // Async communication
    feed: Option<ScheduleFeed<ScheduleClient>>,
    runtime: tokio::runtime::Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppState {
    Setup,
    Main,
}

impl ScheduleApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            error!(error = %e, "could not load config, using defaults");
            Config::default()
        });
        super::theme::setup_fonts(&cc.egui_ctx);
        super::theme::setup_theme(&cc.egui_ctx);

        let state = if config.is_configured() {
            AppState::Main
        } else {
            AppState::Setup
        };

        let runtime = tokio::runtime::Runtime::new()?;
        let today = Local::now().date_naive();

        let mut app = Self {
            settings_base_url: config.api_base_url.clone(),
            settings_poll_secs: config.poll_interval_secs.to_string(),
            grid: config.time_grid(),
            mapper: config.render_mapper(),
            config,
            state,
            window: CalendarWindow::new(today, today),
            week_pager: CarouselPaginator::new(PageUnit::Week),
            day_pager: CarouselPaginator::new(PageUnit::Day),
            day_layout: DayLayout::default(),
            layout_key: None,
            show_month_picker: false,
            show_settings: false,
            status_message: None,
            feed: None,
            runtime,
        };

        if state == AppState::Main {
            app.connect();
        }

        Ok(app)
    }

    /// (Re)create the feed from the current config and load the selected day
    fn connect(&mut self) {
        match ScheduleClient::new(&self.config) {
            Ok(client) => {
                let mut feed = ScheduleFeed::new(
                    client,
                    self.runtime.handle().clone(),
                    self.config.poll_interval(),
                );
                feed.request(self.window.selected());
                self.feed = Some(feed);
                self.layout_key = None;
                self.status_message = None;
            }
            Err(e) => {
                self.feed = None;
                self.status_message = Some((e.to_string(), true));
            }
        }
    }

    fn select_date(&mut self, date: NaiveDate) {
        if self.window.select(date) {
            info!(%date, "selected date");
            if let Some(feed) = self.feed.as_mut() {
                feed.request(date);
            }
        }
    }

    /// Drain fetch results, fire polls and apply finished page turns
    fn advance(&mut self, now: Instant) {
        self.window.set_today(Local::now().date_naive());

        if let Some(feed) = self.feed.as_mut() {
            feed.drain();
            feed.tick(now);
        }

        for turn in [self.week_pager.poll(now), self.day_pager.poll(now)].into_iter().flatten() {
            let date = self.window.turn(turn);
            if let Some(feed) = self.feed.as_mut() {
                feed.request(date);
            }
        }
    }

    fn refresh_layout(&mut self) {
        let Some(feed) = self.feed.as_ref() else {
            return;
        };
        let selected = self.window.selected();
        let key = (feed.revision(), selected);
        if self.layout_key == Some(key) {
            return;
        }

        self.day_layout = match feed.status() {
            FeedStatus::Loaded(jobs) if feed.date() == Some(selected) => {
                DayLayout::build(jobs, &self.grid, &self.mapper)
            }
            _ => DayLayout::default(),
        };
        self.layout_key = Some(key);
    }

    /// Next moment something changes without user input
    fn next_wakeup(&self, now: Instant) -> Duration {
        let settle = [self.week_pager.settle_remaining(now), self.day_pager.settle_remaining(now)]
            .into_iter()
            .flatten()
            .min();
        let poll = self.feed.as_ref().and_then(|f| f.until_next_poll(now));
        let loading = self.feed.as_ref().is_some_and(|f| f.in_flight() > 0);

        match (settle, loading) {
            (Some(remaining), _) => remaining,
            (None, true) => Duration::from_millis(100),
            (None, false) => poll.unwrap_or(Duration::from_secs(1)),
        }
    }

    fn save_settings(&mut self) {
        let base_url = self.settings_base_url.trim().to_string();
        if base_url.is_empty() {
            self.status_message = Some(("Enter the schedule server address".to_string(), true));
            return;
        }
        let poll_secs = match self.settings_poll_secs.trim().parse::<u64>() {
            Ok(secs) if secs >= 5 => secs,
            _ => {
                self.status_message = Some(("Refresh interval must be at least 5 seconds".to_string(), true));
                return;
            }
        };

        self.config.api_base_url = base_url;
        self.config.poll_interval_secs = poll_secs;

        if let Err(e) = self.config.save() {
            error!(error = %e, "failed to save config");
            self.status_message = Some((format!("Failed to save settings: {}", e), true));
            return;
        }

        self.state = AppState::Main;
        self.show_settings = false;
        self.connect();
    }

    fn render_setup(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Schedule setup");
            ui.add_space(20.0);
            ui.label("Enter the address of the operations console serving the schedule.");
            ui.add_space(20.0);
        });

        egui::Grid::new("setup_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Server:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_base_url)
                        .hint_text("ops.example.com")
                        .desired_width(350.0),
                );
                ui.end_row();
            });

        ui.add_space(20.0);

        if ui.button("Save and connect").clicked() {
            self.save_settings();
        }

        if let Some((msg, true)) = &self.status_message {
            ui.colored_label(Color32::from_rgb(0xef, 0x44, 0x44), msg);
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.horizontal(|ui| {
            let title = self.window.selected().format("%B %Y").to_string();
            let caret = if self.show_month_picker {
                egui_phosphor::regular::CARET_UP
            } else {
                egui_phosphor::regular::CARET_DOWN
            };
            let header_button = ui.add(
                egui::Button::new(
                    RichText::new(format!("{} {}", title, caret))
                        .size(18.0)
                        .color(super::theme::header_title_color()),
                )
                .fill(Color32::TRANSPARENT),
            );
            if header_button.clicked() {
                self.show_month_picker = !self.show_month_picker;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(RichText::new(egui_phosphor::regular::GEAR).size(18.0)).fill(Color32::TRANSPARENT))
                    .on_hover_text("Settings")
                    .clicked()
                {
                    self.show_settings = true;
                }
                if ui
                    .add(egui::Button::new(RichText::new(egui_phosphor::regular::ARROW_CLOCKWISE).size(18.0)).fill(Color32::TRANSPARENT))
                    .on_hover_text("Refresh")
                    .clicked()
                {
                    if let Some(feed) = self.feed.as_mut() {
                        feed.retry();
                    }
                }
            });

            if self.show_month_picker {
                let picker_pos = header_button.rect.left_bottom() + egui::vec2(0.0, 6.0);
                let (content_bg, frame_color, _) = super::theme::dialog_colors();
                let mut picked = None;
                egui::Area::new(egui::Id::new("month_picker"))
                    .order(egui::Order::Foreground)
                    .fixed_pos(picker_pos)
                    .show(ui.ctx(), |ui| {
                        egui::Frame::popup(ui.style())
                            .fill(content_bg)
                            .stroke(egui::Stroke::new(1.0, frame_color))
                            .show(ui, |ui| {
                                ui.set_min_width(260.0);
                                picked = views::render_month_picker(ui, &self.window);
                            });
                    });
                if let Some(date) = picked {
                    self.show_month_picker = false;
                    self.select_date(date);
                }
            }
        });

        if let Some(day) = views::render_week_strip(ui, &self.window, &mut self.week_pager, now) {
            self.select_date(day);
        }
    }

    fn render_body(&mut self, ui: &mut egui::Ui, now: Instant) {
        self.refresh_layout();

        let Some(feed) = self.feed.as_ref() else {
            if let Some((msg, _)) = &self.status_message {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(Color32::from_rgb(0xef, 0x44, 0x44), msg);
                });
            }
            return;
        };

        let result = views::render_day_body(
            ui,
            &self.window,
            &mut self.day_pager,
            feed.status(),
            &self.day_layout,
            &self.grid,
            &self.mapper,
            now,
        );

        if result.retry {
            if let Some(feed) = self.feed.as_mut() {
                feed.retry();
            }
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save_clicked = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Server");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_base_url)
                                .hint_text("ops.example.com")
                                .desired_width(300.0),
                        );
                        ui.end_row();

                        ui.label("Refresh every (s)");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings_poll_secs)
                                .desired_width(80.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(12.0);
                if let Some((msg, true)) = &self.status_message {
                    ui.colored_label(Color32::from_rgb(0xef, 0x44, 0x44), msg);
                }
                if ui.button("Save").clicked() {
                    save_clicked = true;
                }
            });

        self.show_settings = open;
        if save_clicked {
            self.save_settings();
        }
    }
}

impl eframe::App for ScheduleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle pinch-to-zoom (trackpad pinch or Ctrl+scroll)
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = (self.config.font_scale * zoom_delta).clamp(0.75, 2.5);
            if (zoom_delta - 1.0).abs() > 0.01 {
                if let Err(e) = self.config.save() {
                    error!(error = %e, "failed to save zoom level");
                }
            }
        }
        ctx.set_pixels_per_point(self.config.font_scale);

        let now = Instant::now();
        self.advance(now);

        if self.state == AppState::Setup {
            egui::CentralPanel::default().show(ctx, |ui| self.render_setup(ui));
            return;
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(Color32::from_rgb(0x37, 0x41, 0x51)).inner_margin(egui::Margin::symmetric(12.0, 8.0)))
            .show(ctx, |ui| self.render_header(ui, now));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| self.render_body(ui, now));

        if self.show_settings {
            self.render_settings(ctx);
        }

        ctx.request_repaint_after(self.next_wakeup(now));
    }
}
