//! Touch calibration: raw controller coordinates to screen pixels.
//!
//! Five 16-bit coefficients describe the mapping:
//!
//! | Index | Meaning                                             |
//! |-------|-----------------------------------------------------|
//! | 0     | raw value at screen X = 0 (before inversion)        |
//! | 1     | raw span across the full screen width               |
//! | 2     | raw value at screen Y = 0 (before inversion)        |
//! | 3     | raw span across the full screen height              |
//! | 4     | flags: bit0 axes swapped, bit1 X inverted, bit2 Y inverted |
//!
//! They persist as a 14-byte blob: the coefficients little-endian in bytes
//! 0..10, bytes 10..14 reserved and written as zero.

use log::info;

use crate::app::ports::{DisplayPort, PlatformPort, TouchCalibrationPort};
use crate::error::CalibrationError;
use crate::touch::TouchPoint;
use crate::ui::layout::{
    COLOR_BLACK, COLOR_MARKER, COLOR_TEXT, Font, Rect, SCREEN_HEIGHT, SCREEN_WIDTH, TextStyle,
};

pub const CALIBRATION_BLOB_LEN: usize = 14;

/// Corner markers are inset this many pixels from the screen edge.
pub const MARKER_INSET: u16 = 15;

const FLAG_SWAP_XY: u16 = 0b001;
const FLAG_INVERT_X: u16 = 0b010;
const FLAG_INVERT_Y: u16 = 0b100;

/// Samples averaged per corner while the stylus is held.
const SAMPLES_PER_CORNER: u32 = 8;
const RAW_POLL_INTERVAL_MS: u32 = 10;

/// Uncalibrated XPT2046 reading (12-bit per axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPoint {
    pub x: u16,
    pub y: u16,
}

// ── Persisted blob ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationBlob([u8; CALIBRATION_BLOB_LEN]);

impl CalibrationBlob {
    /// Accepts exactly [`CALIBRATION_BLOB_LEN`] bytes; any other size is
    /// [`CalibrationError::Corrupt`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CalibrationError> {
        let arr: [u8; CALIBRATION_BLOB_LEN] = bytes
            .try_into()
            .map_err(|_| CalibrationError::Corrupt { len: bytes.len() })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn coefficients(&self) -> [u16; 5] {
        let mut out = [0u16; 5];
        for (i, c) in out.iter_mut().enumerate() {
            *c = u16::from_le_bytes([self.0[i * 2], self.0[i * 2 + 1]]);
        }
        out
    }
}

impl From<&TouchCalibration> for CalibrationBlob {
    fn from(cal: &TouchCalibration) -> Self {
        let mut bytes = [0u8; CALIBRATION_BLOB_LEN];
        for (i, c) in cal.coefficients().iter().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&c.to_le_bytes());
        }
        Self(bytes)
    }
}

// ── Mapping ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchCalibration {
    x_origin: u16,
    x_span: u16,
    y_origin: u16,
    y_span: u16,
    flags: u16,
}

impl TouchCalibration {
    pub fn from_coefficients(c: [u16; 5]) -> Self {
        Self {
            x_origin: c[0],
            x_span: c[1],
            y_origin: c[2],
            y_span: c[3],
            flags: c[4],
        }
    }

    pub fn coefficients(&self) -> [u16; 5] {
        [self.x_origin, self.x_span, self.y_origin, self.y_span, self.flags]
    }

    /// Derive coefficients from averaged raw samples taken at the four
    /// inset markers, in order top-left, bottom-left, top-right, bottom-right.
    pub fn from_corners(corners: [RawPoint; 4], width: u16, height: u16) -> Self {
        let [tl, bl, tr, br] = corners.map(|p| (i32::from(p.x), i32::from(p.y)));
        let avg = |a: i32, b: i32| (a + b) / 2;

        // Moving down the left edge changes raw X more than raw Y: the
        // controller axes are swapped relative to the panel.
        let swapped = (tl.0 - bl.0).abs() > (tl.1 - bl.1).abs();

        let (left, right, top, bottom) = if swapped {
            (avg(tl.1, bl.1), avg(tr.1, br.1), avg(tl.0, tr.0), avg(bl.0, br.0))
        } else {
            (avg(tl.0, bl.0), avg(tr.0, br.0), avg(tl.1, tr.1), avg(bl.1, br.1))
        };

        let (x_origin, x_span, invert_x) = axis_fit(left, right, width);
        let (y_origin, y_span, invert_y) = axis_fit(top, bottom, height);

        let mut flags = 0;
        if swapped {
            flags |= FLAG_SWAP_XY;
        }
        if invert_x {
            flags |= FLAG_INVERT_X;
        }
        if invert_y {
            flags |= FLAG_INVERT_Y;
        }

        Self {
            x_origin,
            x_span,
            y_origin,
            y_span,
            flags,
        }
    }

    /// Map a raw sample onto a `width`×`height` screen, clamped to the panel.
    pub fn map(&self, raw: RawPoint, width: u16, height: u16) -> TouchPoint {
        let (rx, ry) = if self.flags & FLAG_SWAP_XY != 0 {
            (raw.y, raw.x)
        } else {
            (raw.x, raw.y)
        };
        let x = axis_map(rx, self.x_origin, self.x_span, width, self.flags & FLAG_INVERT_X != 0);
        let y = axis_map(ry, self.y_origin, self.y_span, height, self.flags & FLAG_INVERT_Y != 0);
        TouchPoint { x, y }
    }
}

impl From<&CalibrationBlob> for TouchCalibration {
    fn from(blob: &CalibrationBlob) -> Self {
        Self::from_coefficients(blob.coefficients())
    }
}

/// Extrapolate the marker readings `a` (near edge) and `b` (far edge) out
/// to the full screen extent.  Returns origin, span and inversion.
fn axis_fit(a: i32, b: i32, extent: u16) -> (u16, u16, bool) {
    let invert = a > b;
    let inset = i32::from(MARKER_INSET);
    let between = (i32::from(extent) - 2 * inset - 1).max(1);
    let d = (a - b).abs().max(1);

    // Raw reading that maps to pixel 0 before inversion is applied.
    let origin = if invert {
        a - d * (i32::from(extent) - inset) / between
    } else {
        a - d * inset / between
    };
    let span = d * i32::from(extent) / between;
    (
        origin.clamp(0, i32::from(u16::MAX)) as u16,
        span.clamp(1, i32::from(u16::MAX)) as u16,
        invert,
    )
}

fn axis_map(raw: u16, origin: u16, span: u16, extent: u16, invert: bool) -> u16 {
    let extent = i32::from(extent);
    let mut v = (i32::from(raw) - i32::from(origin)) * extent / i32::from(span.max(1));
    if invert {
        v = extent - v;
    }
    v.clamp(0, extent - 1) as u16
}

// ── Interactive acquisition ───────────────────────────────────

/// Walk the user through the four corner markers and derive a calibration.
///
/// Blocks until all four corners have been touched.  Only runs at boot,
/// before the control loop exists.
pub fn acquire<H>(hw: &mut H, sample_timeout_ms: u32) -> TouchCalibration
where
    H: DisplayPort + TouchCalibrationPort + PlatformPort,
{
    let w = SCREEN_WIDTH;
    let h = SCREEN_HEIGHT;
    let near = i32::from(MARKER_INSET);
    let far_x = i32::from(w) - near - 1;
    let far_y = i32::from(h) - near - 1;
    let markers = [(near, near), (near, far_y), (far_x, near), (far_x, far_y)];

    info!("calibration: interactive acquisition started");
    hw.fill_screen(COLOR_BLACK);
    hw.draw_text(
        "Touch the corners",
        i32::from(w) / 2,
        i32::from(h) / 2 - 10,
        TextStyle::new(Font::Medium, COLOR_TEXT),
    );
    hw.draw_text(
        "as indicated",
        i32::from(w) / 2,
        i32::from(h) / 2 + 10,
        TextStyle::new(Font::Medium, COLOR_TEXT),
    );

    let mut corners = [RawPoint { x: 0, y: 0 }; 4];
    for (i, &(mx, my)) in markers.iter().enumerate() {
        draw_marker(hw, mx, my, COLOR_MARKER);
        corners[i] = sample_corner(hw, sample_timeout_ms);
        draw_marker(hw, mx, my, COLOR_BLACK);
        info!("calibration: corner {} raw=({}, {})", i, corners[i].x, corners[i].y);
    }

    let cal = TouchCalibration::from_corners(corners, w, h);
    hw.fill_screen(COLOR_BLACK);
    info!("calibration: acquired {:?}", cal.coefficients());
    cal
}

fn draw_marker<H: DisplayPort>(hw: &mut H, x: i32, y: i32, color: u16) {
    let arm = i32::from(MARKER_INSET);
    hw.fill_rect(Rect::new(x - arm, y, (2 * arm + 1) as u32, 1), color);
    hw.fill_rect(Rect::new(x, y - arm, 1, (2 * arm + 1) as u32), color);
}

/// Wait for contact, average while held, then wait for release.
fn sample_corner<H>(hw: &mut H, timeout_ms: u32) -> RawPoint
where
    H: TouchCalibrationPort + PlatformPort,
{
    let first = loop {
        if let Some(p) = hw.read_raw_touch(timeout_ms) {
            break p;
        }
        hw.delay_ms(RAW_POLL_INTERVAL_MS);
    };

    let (mut sx, mut sy, mut n) = (u32::from(first.x), u32::from(first.y), 1u32);
    while n < SAMPLES_PER_CORNER {
        match hw.read_raw_touch(timeout_ms) {
            Some(p) => {
                sx += u32::from(p.x);
                sy += u32::from(p.y);
                n += 1;
            }
            None => break,
        }
    }

    while hw.read_raw_touch(timeout_ms).is_some() {
        hw.delay_ms(RAW_POLL_INTERVAL_MS);
    }

    RawPoint {
        x: (sx / n) as u16,
        y: (sy / n) as u16,
    }
}
