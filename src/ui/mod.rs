//! Panel widgets.
//!
//! [`Screen`] draws the fixed layout through a [`DisplayPort`] and remembers
//! what each dynamic field last showed.  A field is repainted only when
//! its text changes; [`Screen::redraw_all`] clears that memory first.

pub mod layout;

use core::fmt::Write;

use crate::app::ports::DisplayPort;
use crate::app::state::{RelayOutputs, SystemState};
use crate::sensors::{SensorReading, SensorReadings, CHANNEL_COUNT};

use layout::*;

/// Rendered text of one dynamic field.
pub type FieldText = heapless::String<16>;

/// Screen text for a temperature field.
pub fn temperature_text(reading: SensorReading) -> FieldText {
    let mut s = FieldText::new();
    match reading {
        SensorReading::Celsius(c) => {
            let _ = write!(s, "{:.1} C", c);
        }
        SensorReading::Disconnected => {
            let _ = s.push_str("--.- C");
        }
    }
    s
}

pub fn relay_status_text(energised: bool) -> &'static str {
    if energised { " STATE: ON " } else { " STATE: OFF" }
}

#[derive(Debug, Default)]
pub struct Screen {
    temperatures: [Option<FieldText>; CHANNEL_COUNT],
    relays: [Option<bool>; 2],
    output: Option<bool>,
    wireless: Option<bool>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every cached field so the next draw repaints it.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Everything at once: static frame, then every dynamic field.
    pub fn redraw_all<D: DisplayPort>(
        &mut self,
        d: &mut D,
        state: &SystemState,
        readings: &SensorReadings,
    ) {
        self.invalidate();
        self.draw_base(d);
        self.draw_wireless_indicator(d, state.wireless_enabled);
        self.draw_temperatures(d, readings);
        self.draw_relay_status(d, state.relay_outputs());
        self.draw_output_button(d, state.touch_output_enabled);
        self.draw_sleep_button(d);
    }

    /// Background, header band and card frames with their labels.
    pub fn draw_base<D: DisplayPort>(&mut self, d: &mut D) {
        d.fill_screen(COLOR_BACKGROUND);

        d.fill_rect(HEADER, COLOR_CARD);
        d.fill_rect(Rect::new(0, HEADER.h as i32, u32::from(SCREEN_WIDTH), 1), COLOR_ACCENT);
        d.draw_text(
            "CONTROL PANEL",
            TITLE_POS.0,
            TITLE_POS.1,
            TextStyle::new(Font::Medium, COLOR_TEXT),
        );

        let label = TextStyle::new(Font::Small, COLOR_SUBTEXT);
        for (i, card) in SENSOR_CARDS.iter().enumerate() {
            Self::draw_card(d, *card);
            let mut text = FieldText::new();
            let _ = write!(text, "Sensor {}", i + 1);
            d.draw_text(&text, card.center().0, SENSOR_LABEL_Y, label);
        }
        for (i, card) in RELAY_CARDS.iter().enumerate() {
            Self::draw_card(d, *card);
            let mut text = FieldText::new();
            let _ = write!(text, "Relay {}", i + 1);
            d.draw_text(&text, card.center().0, RELAY_LABEL_Y, label);
        }
    }

    fn draw_card<D: DisplayPort>(d: &mut D, card: Rect) {
        d.fill_round_rect(card, CARD_RADIUS, COLOR_CARD);
        d.draw_round_rect(card, CARD_RADIUS, COLOR_TEXT);
    }

    pub fn draw_wireless_indicator<D: DisplayPort>(&mut self, d: &mut D, enabled: bool) {
        if self.wireless == Some(enabled) {
            return;
        }
        let fill = if enabled { COLOR_ACCENT } else { COLOR_CARD };
        d.fill_rect(WIRELESS_INDICATOR, fill);
        d.draw_text(
            if enabled { "BT ON" } else { "BT OFF" },
            WIRELESS_LABEL_POS.0,
            WIRELESS_LABEL_POS.1,
            TextStyle::new(Font::Small, COLOR_TEXT),
        );
        self.wireless = Some(enabled);
    }

    pub fn draw_temperatures<D: DisplayPort>(&mut self, d: &mut D, readings: &SensorReadings) {
        let style = TextStyle::new(Font::Large, COLOR_TEXT);
        for (i, card) in SENSOR_CARDS.iter().enumerate() {
            let text = temperature_text(readings.channels[i]);
            if self.temperatures[i].as_ref() == Some(&text) {
                continue;
            }
            d.fill_rect(temperature_field(*card), COLOR_CARD);
            d.draw_text(&text, card.center().0, TEMPERATURE_Y, style);
            self.temperatures[i] = Some(text);
        }
    }

    pub fn draw_relay_status<D: DisplayPort>(&mut self, d: &mut D, outputs: RelayOutputs) {
        for (i, (card, on)) in RELAY_CARDS
            .iter()
            .zip([outputs.relay1, outputs.relay2])
            .enumerate()
        {
            if self.relays[i] == Some(on) {
                continue;
            }
            let color = if on { COLOR_BUTTON_ON } else { COLOR_SUBTEXT };
            d.fill_rect(relay_status_field(*card), COLOR_CARD);
            d.draw_text(
                relay_status_text(on),
                card.center().0,
                RELAY_STATUS_Y,
                TextStyle::new(Font::Medium, color),
            );
            self.relays[i] = Some(on);
        }
    }

    pub fn draw_output_button<D: DisplayPort>(&mut self, d: &mut D, enabled: bool) {
        if self.output == Some(enabled) {
            return;
        }
        let fill = if enabled { COLOR_BUTTON_ON } else { COLOR_BUTTON_OFF };
        d.fill_round_rect(OUTPUT_BUTTON, BUTTON_RADIUS, fill);
        d.draw_round_rect(OUTPUT_BUTTON, BUTTON_RADIUS, COLOR_ACCENT);
        let (cx, cy) = OUTPUT_BUTTON.center();
        d.draw_text(
            if enabled { "OUTPUT ON" } else { "OUTPUT OFF" },
            cx,
            cy,
            TextStyle::new(Font::Medium, COLOR_TEXT),
        );
        self.output = Some(enabled);
    }

    /// Static; only painted as part of a full redraw.
    pub fn draw_sleep_button<D: DisplayPort>(&mut self, d: &mut D) {
        d.fill_round_rect(SLEEP_BUTTON, BUTTON_RADIUS, COLOR_CARD);
        d.draw_round_rect(SLEEP_BUTTON, BUTTON_RADIUS, COLOR_ACCENT);
        let (cx, cy) = SLEEP_BUTTON.center();
        d.draw_text("SLEEP", cx, cy, TextStyle::new(Font::Medium, COLOR_TEXT));
    }
}
