//! Fixed 240×320 portrait layout and RGB565 palette.

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict interior hit test: the border pixels themselves do not count.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px > self.x && px < self.x + self.w as i32 && py > self.y && py < self.y + self.h as i32
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w as i32 / 2, self.y + self.h as i32 / 2)
    }
}

/// Font sizes available to widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Small,
    Medium,
    Large,
}

/// Text rendering style: font plus foreground colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub font: Font,
    pub color: u16,
}

impl TextStyle {
    pub const fn new(font: Font, color: u16) -> Self {
        Self { font, color }
    }
}

// ── Screen ────────────────────────────────────────────────────

pub const SCREEN_WIDTH: u16 = 240;
pub const SCREEN_HEIGHT: u16 = 320;

// ── Palette (RGB565) ──────────────────────────────────────────

pub const COLOR_BACKGROUND: u16 = 0x0842;
pub const COLOR_CARD: u16 = 0x10A4;
pub const COLOR_ACCENT: u16 = 0x03EF;
pub const COLOR_BUTTON_ON: u16 = 0x2661;
pub const COLOR_BUTTON_OFF: u16 = 0x114F;
pub const COLOR_TEXT: u16 = 0xFFFF;
pub const COLOR_SUBTEXT: u16 = 0xAD75;
pub const COLOR_BLACK: u16 = 0x0000;
pub const COLOR_MARKER: u16 = 0xF800;

// ── Header ────────────────────────────────────────────────────

pub const HEADER: Rect = Rect::new(0, 0, 240, 40);
pub const TITLE_POS: (i32, i32) = (100, 20);

/// Top-right status region.  Touching it always toggles the radio.
pub const STATUS_REGION: Rect = Rect::new(180, -1, 61, 41);
pub const WIRELESS_INDICATOR: Rect = Rect::new(190, 5, 45, 30);
pub const WIRELESS_LABEL_POS: (i32, i32) = (212, 20);

// ── Cards ─────────────────────────────────────────────────────

pub const CARD_RADIUS: u16 = 8;
pub const SENSOR_CARDS: [Rect; 2] = [Rect::new(10, 55, 105, 85), Rect::new(125, 55, 105, 85)];
pub const RELAY_CARDS: [Rect; 2] = [Rect::new(10, 150, 105, 85), Rect::new(125, 150, 105, 85)];

pub const SENSOR_LABEL_Y: i32 = 70;
pub const TEMPERATURE_Y: i32 = 105;
pub const RELAY_LABEL_Y: i32 = 165;
pub const RELAY_STATUS_Y: i32 = 195;

/// Area repainted before a temperature value is redrawn.
pub const fn temperature_field(card: Rect) -> Rect {
    Rect::new(card.x + 4, TEMPERATURE_Y - 14, card.w - 8, 28)
}

/// Area repainted before a relay status line is redrawn.
pub const fn relay_status_field(card: Rect) -> Rect {
    Rect::new(card.x + 4, RELAY_STATUS_Y - 10, card.w - 8, 20)
}

// ── Buttons ───────────────────────────────────────────────────

/// Left button: toggles the logical output.
pub const OUTPUT_BUTTON: Rect = Rect::new(10, 250, 105, 60);
/// Right button: sleeps the display, and doubles as the wake region.
pub const SLEEP_BUTTON: Rect = Rect::new(125, 250, 105, 60);
pub const BUTTON_RADIUS: u16 = 8;
