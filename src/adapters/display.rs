//! TFT panel adapter: any RGB565 [`DrawTarget`] plus a touch controller.
//!
//! Widgets arrive through [`DisplayPort`] as raw RGB565 words and layout
//! rectangles; this module turns them into embedded-graphics primitives.
//! The panel itself only has to implement [`PanelPower`] on top of
//! `DrawTarget`.  On the board that is the `mipidsi` ILI9341 driver; host
//! tests use an in-memory frame buffer.
//!
//! Draw errors are logged and dropped.  A glitched frame is repainted on
//! the next differential redraw.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_8X13, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::{debug, warn};

use crate::app::ports::{DisplayPort, TouchCalibrationPort};
use crate::drivers::hw_init;
use crate::drivers::xpt2046::TouchController;
use crate::pins;
use crate::touch::TouchPoint;
use crate::touch::calibration::{RawPoint, TouchCalibration};
use crate::ui::layout::{Font, Rect, SCREEN_HEIGHT, SCREEN_WIDTH, TextStyle};

/// Panel sleep-in / sleep-out control.
pub trait PanelPower {
    fn set_panel_awake(&mut self, awake: bool);
}

#[cfg(target_os = "espidf")]
impl<DI, M, RST> PanelPower for mipidsi::Display<DI, M, RST>
where
    DI: mipidsi::interface::Interface,
    M: mipidsi::models::Model,
    M::ColorFormat: mipidsi::interface::InterfacePixelFormat<DI::Word>,
    RST: embedded_hal::digital::OutputPin,
{
    fn set_panel_awake(&mut self, awake: bool) {
        let mut delay = esp_idf_svc::hal::delay::Ets;
        let ok = if awake {
            self.wake(&mut delay).is_ok()
        } else {
            self.sleep(&mut delay).is_ok()
        };
        if !ok {
            warn!("display: sleep {} command failed", if awake { "out" } else { "in" });
        }
    }
}

fn color(raw: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(raw))
}

fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &FONT_6X10,
        Font::Medium => &FONT_8X13,
        Font::Large => &FONT_10X20,
    }
}

fn to_rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(Point::new(rect.x, rect.y), Size::new(rect.w, rect.h))
}

pub struct GraphicsPanel<D, T> {
    display: D,
    touch: T,
    calibration: Option<TouchCalibration>,
    backlight_active_high: bool,
}

impl<D, T> GraphicsPanel<D, T>
where
    D: DrawTarget<Color = Rgb565> + PanelPower,
    T: TouchController,
{
    pub fn new(display: D, touch: T, backlight_active_high: bool) -> Self {
        Self {
            display,
            touch,
            calibration: None,
            backlight_active_high,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn check<R, E>(result: Result<R, E>, what: &str) {
        if result.is_err() {
            warn!("display: {} failed", what);
        }
    }
}

impl<D, T> DisplayPort for GraphicsPanel<D, T>
where
    D: DrawTarget<Color = Rgb565> + PanelPower,
    T: TouchController,
{
    fn fill_screen(&mut self, c: u16) {
        Self::check(self.display.clear(color(c)), "clear");
    }

    fn fill_rect(&mut self, rect: Rect, c: u16) {
        let r = to_rectangle(rect)
            .into_styled(PrimitiveStyle::with_fill(color(c)))
            .draw(&mut self.display);
        Self::check(r, "fill_rect");
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: u16, c: u16) {
        let r = RoundedRectangle::with_equal_corners(
            to_rectangle(rect),
            Size::new(u32::from(radius), u32::from(radius)),
        )
        .into_styled(PrimitiveStyle::with_fill(color(c)))
        .draw(&mut self.display);
        Self::check(r, "fill_round_rect");
    }

    fn draw_round_rect(&mut self, rect: Rect, radius: u16, c: u16) {
        let r = RoundedRectangle::with_equal_corners(
            to_rectangle(rect),
            Size::new(u32::from(radius), u32::from(radius)),
        )
        .into_styled(PrimitiveStyle::with_stroke(color(c), 1))
        .draw(&mut self.display);
        Self::check(r, "draw_round_rect");
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle) {
        let character_style = MonoTextStyle::new(mono_font(style.font), color(style.color));
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        let r = Text::with_text_style(text, Point::new(x, y), character_style, text_style)
            .draw(&mut self.display);
        Self::check(r, "draw_text");
    }

    fn poll_touch(&mut self, timeout_ms: u32) -> Option<TouchPoint> {
        let cal = self.calibration?;
        let raw = self.touch.read_raw(timeout_ms)?;
        let point = cal.map(raw, SCREEN_WIDTH, SCREEN_HEIGHT);
        debug!("display: touch raw=({}, {}) -> ({}, {})", raw.x, raw.y, point.x, point.y);
        Some(point)
    }

    fn set_power_state(&mut self, awake: bool) {
        self.display.set_panel_awake(awake);
    }

    fn set_backlight(&mut self, on: bool) {
        hw_init::gpio_write(pins::TFT_BACKLIGHT_GPIO, on == self.backlight_active_high);
    }
}

impl<D, T> TouchCalibrationPort for GraphicsPanel<D, T>
where
    D: DrawTarget<Color = Rgb565> + PanelPower,
    T: TouchController,
{
    fn read_raw_touch(&mut self, timeout_ms: u32) -> Option<RawPoint> {
        self.touch.read_raw(timeout_ms)
    }

    fn apply_calibration(&mut self, calibration: &TouchCalibration) {
        self.calibration = Some(*calibration);
    }
}
