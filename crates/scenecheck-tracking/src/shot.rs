//! Shot metadata

use crate::source::Fields;
use serde::Serialize;

/// Fields requested for a shot lookup
pub const SHOT_FIELDS: [&str; 5] = ["code", "sg_head_in", "sg_tail_out", "sg_cut_in", "sg_cut_out"];

/// Frame information of a shot. Missing or non-numeric fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotInfo {
    pub code: Option<String>,
    pub head_in: Option<f64>,
    pub tail_out: Option<f64>,
    pub cut_in: Option<f64>,
    pub cut_out: Option<f64>,
}

impl ShotInfo {
    pub fn from_fields(fields: &Fields) -> Self {
        let number = |name: &str| fields.get(name).and_then(|v| v.as_f64());
        Self {
            code: fields
                .get("code")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            head_in: number("sg_head_in"),
            tail_out: number("sg_tail_out"),
            cut_in: number("sg_cut_in"),
            cut_out: number("sg_cut_out"),
        }
    }

    /// Head-in and tail-out, when both are set
    pub fn frame_range(&self) -> Option<(f64, f64)> {
        Some((self.head_in?, self.tail_out?))
    }
}
