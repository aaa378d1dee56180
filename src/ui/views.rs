use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use egui::{Color32, Rect, Ui};

use crate::api::Job;
use crate::schedule::carousel::SETTLE_DURATION;
use crate::schedule::{
    is_horizontal_swipe, CalendarWindow, CarouselPaginator, DayLayout, FeedStatus, GestureState,
    PlacedJob, RenderMapper, TimeGrid,
};
use super::theme::{grid_colors, job_card_colors, tag_colors, week_day_colors};

const WEEK_STRIP_HEIGHT: f32 = 64.0;
const WEEK_STRIP_PADDING: f32 = 8.0;
const HOUR_GUTTER: f32 = 64.0;
const JOBS_RIGHT_MARGIN: f32 = 8.0;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Result from day body interactions
#[derive(Default)]
pub struct DayBodyResult {
    pub retry: bool,
}

/// Feed pointer drags on `response` into the paginator. Taps are left to the
/// caller through `response.clicked()`. A drag that starts out mostly
/// vertical never reaches the paginator; with `scroll_vertical` it pans the
/// enclosing scroll area instead.
fn track_swipe(
    ui: &Ui,
    response: &egui::Response,
    pager: &mut CarouselPaginator,
    width: f32,
    scroll_vertical: bool,
    now: Instant,
) {
    if response.drag_started() {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let (Some(origin), Some(pos)) = (origin, response.interact_pointer_pos()) {
            let moved = pos - origin;
            if is_horizontal_swipe(moved.x, moved.y) {
                pager.touch_start(origin.x);
            }
        }
    }
    if response.dragged() {
        if matches!(pager.state(), GestureState::Dragging { .. }) {
            if let Some(pos) = response.interact_pointer_pos() {
                pager.touch_move(pos.x);
            }
        } else if scroll_vertical {
            ui.scroll_with_delta(egui::vec2(0.0, response.drag_delta().y));
        }
    }
    if response.drag_stopped() {
        pager.touch_end(width, now);
    } else if !response.dragged() && matches!(pager.state(), GestureState::Dragging { .. }) {
        // pointer lost without a release (window unfocused, etc.)
        pager.touch_cancel(now);
    }
}

/// Offset to draw this frame: eased while settling, raw while dragging and on
/// the reset frame after a committed turn
fn shown_offset(ui: &Ui, id: egui::Id, pager: &CarouselPaginator) -> f32 {
    let seconds = if pager.animates() { SETTLE_DURATION.as_secs_f32() } else { 0.0 };
    ui.ctx().animate_value_with_time(id, pager.offset(), seconds)
}

/// Render the three-week strip. Returns the day that was tapped, if any.
pub fn render_week_strip(
    ui: &mut Ui,
    window: &CalendarWindow,
    pager: &mut CarouselPaginator,
    now: Instant,
) -> Option<NaiveDate> {
    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(width, WEEK_STRIP_HEIGHT),
        egui::Sense::click_and_drag(),
    );

    track_swipe(ui, &response, pager, width, false, now);

    let offset = shown_offset(ui, ui.id().with("week_strip_offset"), pager);
    let strip_x = rect.min.x - width + offset;
    let cell_width = (width - WEEK_STRIP_PADDING * 2.0) / 7.0;

    let painter = ui.painter_at(rect);
    for (panel, week) in window.weeks.iter().enumerate() {
        let panel_x = strip_x + panel as f32 * width;
        if panel_x + width < rect.min.x || panel_x > rect.max.x {
            continue;
        }

        for (i, day) in week.days.iter().enumerate() {
            let cell = Rect::from_min_size(
                egui::pos2(panel_x + WEEK_STRIP_PADDING + i as f32 * cell_width, rect.min.y),
                egui::vec2(cell_width, WEEK_STRIP_HEIGHT),
            );
            let is_selected = day.date == window.selected();
            let (name_color, number_color, chip_fill) = week_day_colors(is_selected, day.is_today);

            if is_selected {
                painter.rect_filled(cell.shrink2(egui::vec2(4.0, 2.0)), 8.0, chip_fill);
            }

            painter.text(
                egui::pos2(cell.center().x, cell.min.y + 16.0),
                egui::Align2::CENTER_CENTER,
                day.day_name,
                egui::FontId::proportional(12.0),
                name_color,
            );
            painter.text(
                egui::pos2(cell.center().x, cell.min.y + 40.0),
                egui::Align2::CENTER_CENTER,
                day.day_number.to_string(),
                egui::FontId::proportional(18.0),
                number_color,
            );
        }
    }

    if !response.clicked() {
        return None;
    }

    // Tap: map the pointer back to a day cell
    let pos = response.interact_pointer_pos()?;
    let panel = ((pos.x - strip_x) / width).floor().clamp(0.0, 2.0) as usize;
    let panel_x = strip_x + panel as f32 * width;
    let index = ((pos.x - panel_x - WEEK_STRIP_PADDING) / cell_width).floor().clamp(0.0, 6.0) as usize;
    Some(window.weeks[panel].days[index].date)
}

/// Render the swipeable day body for the selected date and its neighbours.
/// `layout` holds the selected day's jobs, already placed.
#[allow(clippy::too_many_arguments)]
pub fn render_day_body(
    ui: &mut Ui,
    window: &CalendarWindow,
    pager: &mut CarouselPaginator,
    status: &FeedStatus,
    layout: &DayLayout,
    grid: &TimeGrid,
    mapper: &RenderMapper,
    now: Instant,
) -> DayBodyResult {
    let mut result = DayBodyResult::default();
    let width = ui.available_width();

    // Jobs whose start is outside the visible hours are listed, not drawn
    let outside: Vec<&PlacedJob> = layout.outside_grid().collect();
    if !outside.is_empty() {
        render_outside_grid(ui, &outside);
    }

    let offset = shown_offset(ui, ui.id().with("day_body_offset"), pager);

    egui::ScrollArea::vertical()
        .drag_to_scroll(false)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let body_height = layout.body_height(grid, mapper);
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(width, body_height),
                egui::Sense::click_and_drag(),
            );

            track_swipe(ui, &response, pager, width, true, now);

            let strip_x = rect.min.x - width + offset;
            for (panel, date) in window.days.iter().enumerate() {
                let panel_rect = Rect::from_min_size(
                    egui::pos2(strip_x + panel as f32 * width, rect.min.y),
                    egui::vec2(width, body_height),
                );
                if !panel_rect.intersects(rect) {
                    continue;
                }
                let painter = ui.painter_at(rect.intersect(panel_rect));
                paint_hour_grid(&painter, panel_rect, grid, mapper);

                if *date != window.selected() {
                    continue;
                }

                match status {
                    FeedStatus::Idle | FeedStatus::Loading => {
                        let spinner_rect = Rect::from_center_size(
                            egui::pos2(panel_rect.center().x, panel_rect.min.y + 128.0),
                            egui::vec2(32.0, 32.0),
                        );
                        ui.put(spinner_rect, egui::Spinner::new().size(32.0));
                    }
                    FeedStatus::Failed(message) => {
                        painter.text(
                            egui::pos2(panel_rect.center().x, panel_rect.min.y + 100.0),
                            egui::Align2::CENTER_CENTER,
                            message,
                            egui::FontId::proportional(14.0),
                            Color32::from_rgb(0xef, 0x44, 0x44),
                        );
                        let button_rect = Rect::from_center_size(
                            egui::pos2(panel_rect.center().x, panel_rect.min.y + 140.0),
                            egui::vec2(120.0, 32.0),
                        );
                        if ui.put(button_rect, egui::Button::new("Try again")).clicked() {
                            result.retry = true;
                        }
                    }
                    FeedStatus::Loaded(_) => {
                        let jobs_left = panel_rect.min.x + HOUR_GUTTER;
                        let jobs_width = panel_rect.width() - HOUR_GUTTER - JOBS_RIGHT_MARGIN;

                        for placed in layout.in_grid() {
                            let (x, w) = placed.block.resolve(jobs_width);
                            let block_rect = Rect::from_min_size(
                                egui::pos2(jobs_left + x, panel_rect.min.y + placed.block.top),
                                egui::vec2(w, placed.block.height),
                            );
                            paint_job_block(&painter, block_rect, &placed.job);
                        }

                        if layout.is_empty() {
                            painter.text(
                                egui::pos2(panel_rect.center().x, panel_rect.min.y + 128.0),
                                egui::Align2::CENTER_CENTER,
                                "No jobs scheduled for this day",
                                egui::FontId::proportional(14.0),
                                Color32::from_rgb(0x6b, 0x72, 0x80),
                            );
                        }
                    }
                }
            }
        });

    result
}

/// White body, hour rules and "6 am" style labels
fn paint_hour_grid(painter: &egui::Painter, rect: Rect, grid: &TimeGrid, mapper: &RenderMapper) {
    let (body_bg, line_color, label_color) = grid_colors();
    painter.rect_filled(rect, 0.0, body_bg);

    for (row, hour) in grid.hours().enumerate() {
        let y = rect.min.y + row as f32 * mapper.px_per_hour;
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(1.0, line_color),
        );
        painter.text(
            egui::pos2(rect.min.x + 8.0, y + 4.0),
            egui::Align2::LEFT_TOP,
            TimeGrid::hour_label(hour),
            egui::FontId::proportional(11.0),
            label_color,
        );
    }
}

/// Paint one job card: title, tag/type line, address and tag pills as space allows
fn paint_job_block(painter: &egui::Painter, rect: Rect, job: &Job) {
    let (fill, stripe, title_color, secondary) = job_card_colors();
    let corner_radius = 6.0;
    painter.rect_filled(rect, corner_radius, fill);

    // Left accent stripe
    let stripe_rect = Rect::from_min_size(rect.min, egui::vec2(4.0, rect.height()));
    painter.rect_filled(
        stripe_rect,
        egui::Rounding { nw: corner_radius, sw: corner_radius, ne: 0.0, se: 0.0 },
        stripe,
    );

    let painter = painter.with_clip_rect(painter.clip_rect().intersect(rect.shrink(1.0)));
    let text_left = rect.min.x + 10.0;
    let text_width = (rect.width() - 14.0).max(0.0);
    let mut y = rect.min.y + 6.0;

    let title = painter.layout_no_wrap(
        job.title(),
        egui::FontId::proportional(12.0),
        title_color,
    );
    let line_height = title.size().y + 2.0;
    painter.galley(egui::pos2(text_left, y), title, title_color);
    y += line_height;

    let tags = job.tags();
    let mut summary = String::new();
    if !tags.is_empty() {
        summary.push_str(&tags.iter().take(2).cloned().collect::<Vec<_>>().join(", "));
        if tags.len() > 2 {
            summary.push_str("...");
        }
    }
    if let Some(job_type) = job.text("jobType") {
        if !summary.is_empty() {
            summary.push_str(" | ");
        }
        summary.push_str(job_type);
    }
    if !summary.is_empty() && y + line_height <= rect.max.y {
        painter.text(
            egui::pos2(text_left, y),
            egui::Align2::LEFT_TOP,
            summary,
            egui::FontId::proportional(12.0),
            secondary,
        );
        y += line_height;
    }

    if let Some(address) = job.text("fullAddress") {
        if y + line_height <= rect.max.y {
            let line = match job.text("serialId") {
                Some(serial) => format!("{} - {}", serial, address),
                None => address.to_string(),
            };
            let galley = painter.layout(line, egui::FontId::proportional(12.0), secondary, text_width);
            let height = galley.size().y;
            painter.galley(egui::pos2(text_left, y), galley, secondary);
            y += height + 4.0;
        }
    }

    // Tag pills, wrapping within the card
    let mut x = text_left;
    let pill_height = 18.0;
    for tag in &tags {
        let (bg, fg) = tag_colors(tag);
        let galley = painter.layout_no_wrap(tag.clone(), egui::FontId::proportional(11.0), fg);
        let pill_width = galley.size().x + 12.0;
        if x + pill_width > rect.max.x - 4.0 && x > text_left {
            x = text_left;
            y += pill_height + 4.0;
        }
        if y + pill_height > rect.max.y {
            break;
        }
        let pill = Rect::from_min_size(egui::pos2(x, y), egui::vec2(pill_width, pill_height));
        painter.rect_filled(pill, 4.0, bg);
        painter.galley(
            egui::pos2(pill.min.x + 6.0, pill.center().y - galley.size().y / 2.0),
            galley,
            fg,
        );
        x += pill_width + 6.0;
    }
}

/// Compact list of jobs that start before or after the visible hours
fn render_outside_grid(ui: &mut Ui, outside: &[&PlacedJob]) {
    egui::Frame::none()
        .fill(Color32::from_rgb(0xfe, 0xf3, 0xc7))
        .inner_margin(egui::Margin::symmetric(12.0, 6.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new("Outside grid hours")
                    .size(12.0)
                    .color(Color32::from_rgb(0x92, 0x40, 0x0e)),
            );
            for placed in outside {
                let time = placed.job.start_time.as_deref().unwrap_or("no start time");
                ui.label(
                    egui::RichText::new(format!("{}  {}", time, placed.job.title()))
                        .size(12.0)
                        .color(Color32::from_rgb(0x1f, 0x29, 0x37)),
                );
            }
        });
}

/// Month grid with year arrows and a Today button. Returns the date to jump to.
pub fn render_month_picker(ui: &mut Ui, window: &CalendarWindow) -> Option<NaiveDate> {
    let mut picked = None;
    let selected = window.selected();

    ui.horizontal(|ui| {
        if ui.button(egui_phosphor::regular::CARET_LEFT).clicked() {
            picked = Some(window.month_start(-12));
        }
        ui.label(egui::RichText::new(selected.year().to_string()).strong());
        if ui.button(egui_phosphor::regular::CARET_RIGHT).clicked() {
            picked = Some(window.month_start(12));
        }
    });

    egui::Grid::new("month_picker_grid")
        .num_columns(3)
        .spacing(egui::vec2(8.0, 8.0))
        .show(ui, |ui| {
            for (idx, name) in MONTHS.iter().enumerate() {
                let is_current = selected.month0() as usize == idx;
                if ui.selectable_label(is_current, *name).clicked() {
                    picked = NaiveDate::from_ymd_opt(selected.year(), idx as u32 + 1, 1);
                }
                if idx % 3 == 2 {
                    ui.end_row();
                }
            }
        });

    if ui.add_sized([ui.available_width(), 28.0], egui::Button::new("Today")).clicked() {
        picked = Some(window.today());
    }

    picked
}
