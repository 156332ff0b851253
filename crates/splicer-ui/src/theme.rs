// crates/splicer-ui/src/theme.rs
use egui::style::WidgetVisuals;
use egui::{Color32, Context, CornerRadius, Stroke, Style, TextStyle, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb( 90, 160, 255);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb( 40,  90, 170);
pub const ACCENT_HOVER:  Color32 = Color32::from_rgb(130, 185, 255);

pub const DARK_BG_0:     Color32 = Color32::from_rgb( 13,  15,  19);
pub const DARK_BG_1:     Color32 = Color32::from_rgb( 19,  22,  28);
pub const DARK_BG_2:     Color32 = Color32::from_rgb( 26,  30,  38);
pub const DARK_BG_3:     Color32 = Color32::from_rgb( 33,  38,  48);
pub const DARK_BG_4:     Color32 = Color32::from_rgb( 46,  53,  66);

pub const DARK_TEXT:     Color32 = Color32::from_rgb(216, 222, 233);
pub const DARK_TEXT_DIM: Color32 = Color32::from_rgb(118, 128, 146);
pub const DARK_BORDER:   Color32 = Color32::from_rgb( 52,  60,  76);

/// Fill for selected clip rows.
pub const ROW_SELECTED:  Color32 = Color32::from_rgb( 34,  58,  96);
/// Detail text of a clip that failed to probe.
pub const ERROR_TEXT:    Color32 = Color32::from_rgb(220,  90,  90);

const RADIUS: CornerRadius = CornerRadius::same(4);

/// Fill, border and text colour for one interaction state.
fn paint(w: &mut WidgetVisuals, fill: Color32, border: Color32, text: Color32, text_width: f32) {
    w.bg_fill       = fill;
    w.weak_bg_fill  = fill;
    w.bg_stroke     = Stroke::new(1.0, border);
    w.fg_stroke     = Stroke::new(text_width, text);
    w.corner_radius = RADIUS;
}

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 4.0);
    style.spacing.window_margin    = egui::Margin::same(10);
    style.spacing.button_padding   = egui::vec2(12.0, 5.0);
    style.spacing.interact_size.y  = 24.0;
    style.spacing.scroll.bar_width = 8.0;

    if let Some(font) = style.text_styles.get_mut(&TextStyle::Button) {
        font.size = 13.0;
    }

    let mut v = Visuals::dark();
    v.panel_fill       = DARK_BG_1;
    v.window_fill      = DARK_BG_2;
    v.faint_bg_color   = DARK_BG_2;
    v.extreme_bg_color = DARK_BG_0;
    v.window_stroke    = Stroke::new(1.0, DARK_BORDER);
    v.window_corner_radius = RADIUS;
    v.menu_corner_radius   = RADIUS;

    // Checkbox ticks and the progress bar fill come from the selection colours.
    v.selection.bg_fill = ACCENT_DIM;
    v.selection.stroke  = Stroke::new(1.0, ACCENT_HOVER);

    paint(&mut v.widgets.noninteractive, DARK_BG_2,  DARK_BORDER, DARK_TEXT_DIM, 1.0);
    paint(&mut v.widgets.inactive,       DARK_BG_3,  DARK_BORDER, DARK_TEXT,     1.0);
    paint(&mut v.widgets.hovered,        DARK_BG_4,  ACCENT_DIM,  ACCENT_HOVER,  1.5);
    paint(&mut v.widgets.active,         ACCENT_DIM, ACCENT,      Color32::WHITE, 2.0);
    paint(&mut v.widgets.open,           DARK_BG_4,  ACCENT_DIM,  ACCENT_HOVER,  1.5);

    v.override_text_color = Some(DARK_TEXT);

    style.visuals = v;
    ctx.set_style_of(egui::Theme::Dark, style);
}
