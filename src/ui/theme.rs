use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Add Phosphor Regular icons as fallback in Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as a separate family, with the default font as fallback
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    let mut fill_family = vec!["phosphor-fill".to_owned()];
    if let Some(proportional) = fonts.families.get(&FontFamily::Proportional) {
        fill_family.extend(proportional.iter().cloned());
    }
    fonts.families.insert(phosphor_fill_family(), fill_family);

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    // Dark header, warm grays, blue accents
    let mut visuals = Visuals::dark();

    let bg = Color32::from_rgb(0x1f, 0x24, 0x2d);
    visuals.panel_fill = bg;
    visuals.window_fill = bg;
    visuals.faint_bg_color = Color32::from_rgb(0x26, 0x2c, 0x36);
    visuals.extreme_bg_color = Color32::from_rgb(0x17, 0x1b, 0x22);

    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(0x37, 0x41, 0x51);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(0xd1, 0xd5, 0xdb));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(0x4b, 0x55, 0x63);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(0xe5, 0xe7, 0xeb));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(0x6b, 0x72, 0x80);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    let accent = accent_color();
    visuals.widgets.active.bg_fill = accent;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = accent;

    // Rounded corners
    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(20.0);

    ctx.set_style(style);
}

pub fn accent_color() -> Color32 {
    Color32::from_rgb(0x3b, 0x82, 0xf6)
}

/// Month/year label in the header
pub fn header_title_color() -> Color32 {
    Color32::from_rgb(0xfa, 0xcc, 0x15)
}

/// Returns (day_name_color, number_color, chip_fill) for a week strip day
pub fn week_day_colors(is_selected: bool, is_today: bool) -> (Color32, Color32, Color32) {
    let today_yellow = Color32::from_rgb(0xfa, 0xcc, 0x15);
    let name = if is_today { today_yellow } else { Color32::from_rgb(0x9c, 0xa3, 0xaf) };
    if is_selected {
        (name, Color32::WHITE, Color32::from_rgb(0x4b, 0x55, 0x63))
    } else if is_today {
        (name, today_yellow, Color32::TRANSPARENT)
    } else {
        (name, Color32::WHITE, Color32::TRANSPARENT)
    }
}

/// Returns (body_bg, hour_line, hour_label) for the day grid
pub fn grid_colors() -> (Color32, Color32, Color32) {
    (
        Color32::WHITE,
        Color32::from_rgb(0xe5, 0xe7, 0xeb),
        Color32::from_rgb(0x6b, 0x72, 0x80),
    )
}

/// Returns (fill, accent_stripe, title, secondary_text) for job cards
pub fn job_card_colors() -> (Color32, Color32, Color32, Color32) {
    (
        Color32::from_rgb(0xdb, 0xea, 0xfe),
        Color32::from_rgb(0x3b, 0x82, 0xf6),
        Color32::from_rgb(0x1f, 0x29, 0x37),
        Color32::from_rgb(0x4b, 0x55, 0x63),
    )
}

/// Returns (bg, text) for a tag pill, grouped by tag family
pub fn tag_colors(tag: &str) -> (Color32, Color32) {
    let t = tag.trim().to_uppercase();
    let bg = match t.as_str() {
        // out of town, cat, rush, early start
        "OOT" | "CAT" | "RN" | "ET" => Color32::from_rgb(0xef, 0x44, 0x44),
        // crew sizes
        "2" | "3" | "4" | "5" | "6" | "6+" | "7" | "8" => Color32::from_rgb(0x22, 0xc5, 0x5e),
        "MOVE" | "WT" | "MOVING" => Color32::from_rgb(0x3b, 0x82, 0xf6),
        "TRK" | "LBR" | "TRUCK" | "LABOR" => Color32::from_rgb(0xa8, 0x55, 0xf7),
        "PM" | "AFTERNOON" => Color32::from_rgb(0xea, 0xb3, 0x08),
        // team names
        _ if t.contains("CHERI") || t.contains("TRAVIS") => Color32::from_rgb(0xea, 0xb3, 0x08),
        _ => Color32::from_rgb(0x6b, 0x72, 0x80),
    };
    (bg, Color32::WHITE)
}

/// Returns (content_bg, frame_color, frame_text) for dialogs
pub fn dialog_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(0x1f, 0x24, 0x2d),
        Color32::from_rgb(0x37, 0x41, 0x51),
        Color32::from_rgb(0xd1, 0xd5, 0xdb),
    )
}
