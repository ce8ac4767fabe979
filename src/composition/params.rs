use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompositionError;

/// Offset sliders run 0..=200 pixels
pub const OFFSET_RANGE: (i32, i32) = (0, 200);

/// Zoom slider runs 0.05..=3.0 in steps of 0.05
pub const SCALE_RANGE: (f32, f32) = (0.05, 3.0);

/// Fixed-aspect frame presets
///
/// Each preset maps to an exact pixel size; the frame dimensions are derived
/// from the variant and never stored separately, so changing the aspect can
/// never leave a half-updated width/height pair behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPreset {
    /// 1:1, 300x300
    Square,
    /// 3:4, 225x300
    ThreeFour,
    /// 2:3, 200x300
    TwoThree,
}

impl AspectPreset {
    /// Frame size in pixels for this preset
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectPreset::Square => (300, 300),
            AspectPreset::ThreeFour => (225, 300),
            AspectPreset::TwoThree => (200, 300),
        }
    }

    /// All presets, in the order the original UI lists them
    pub fn all() -> [AspectPreset; 3] {
        [
            AspectPreset::Square,
            AspectPreset::ThreeFour,
            AspectPreset::TwoThree,
        ]
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            AspectPreset::Square => "1:1",
            AspectPreset::ThreeFour => "3:4",
            AspectPreset::TwoThree => "2:3",
        };
        write!(f, "{}", token)
    }
}

impl FromStr for AspectPreset {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1:1" => Ok(AspectPreset::Square),
            "3:4" => Ok(AspectPreset::ThreeFour),
            "2:3" => Ok(AspectPreset::TwoThree),
            other => Err(CompositionError::InvalidAspect {
                token: other.to_string(),
            }),
        }
    }
}

/// Solid background colors offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundColor {
    White,
    Blue,
    Red,
}

impl BackgroundColor {
    /// sRGB value, taken from the original editor's palette
    pub fn rgb(self) -> [u8; 3] {
        match self {
            BackgroundColor::White => [0xff, 0xff, 0xff],
            BackgroundColor::Blue => [0x25, 0x63, 0xeb],
            BackgroundColor::Red => [0xdc, 0x26, 0x26],
        }
    }

    pub fn all() -> [BackgroundColor; 3] {
        [
            BackgroundColor::White,
            BackgroundColor::Blue,
            BackgroundColor::Red,
        ]
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            BackgroundColor::White => "white",
            BackgroundColor::Blue => "blue",
            BackgroundColor::Red => "red",
        };
        write!(f, "{}", token)
    }
}

impl FromStr for BackgroundColor {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(BackgroundColor::White),
            "blue" => Ok(BackgroundColor::Blue),
            "red" => Ok(BackgroundColor::Red),
            other => Err(CompositionError::InvalidBackground {
                token: other.to_string(),
            }),
        }
    }
}

/// Placement of the subject inside the frame
///
/// Offsets are pixels from the frame's top-left; `scale` multiplies the
/// frame width to give the rendered subject width (height follows the
/// subject's own aspect ratio).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionParams {
    pub aspect: AspectPreset,
    pub offset_x: i32,
    pub offset_y: i32,
    pub scale: f32,
    pub background: BackgroundColor,
}

impl Default for CompositionParams {
    fn default() -> Self {
        Self {
            aspect: AspectPreset::Square,
            offset_x: 0,
            offset_y: 0,
            scale: 1.0,
            background: BackgroundColor::White,
        }
    }
}

impl CompositionParams {
    /// Clamp an offset into the slider range
    pub fn clamp_offset(value: i32) -> i32 {
        value.clamp(OFFSET_RANGE.0, OFFSET_RANGE.1)
    }

    /// Clamp a zoom factor into the slider range
    pub fn clamp_scale(value: f32) -> f32 {
        value.clamp(SCALE_RANGE.0, SCALE_RANGE.1)
    }
}
