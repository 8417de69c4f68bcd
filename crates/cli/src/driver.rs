//! Headless host: feeds synthetic input into a render loop and pumps frames.

use glam::DVec2;
use glyphfield_core::{InputEvent, QueuedScheduler, RenderLoop, Scene};
use serde_json::Value;
use std::f64::consts::TAU;
use std::str::FromStr;

/// A surface resize scheduled before a given frame, parsed from `WxH@FRAME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeAt {
    pub width: usize,
    pub height: usize,
    pub frame: u64,
}

impl FromStr for ResizeAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("expected WIDTHxHEIGHT@FRAME, got '{s}'");
        let (size, frame) = s.split_once('@').ok_or_else(bad)?;
        let (w, h) = size.split_once('x').ok_or_else(bad)?;
        Ok(Self {
            width: w.trim().parse().map_err(|_| bad())?,
            height: h.trim().parse().map_err(|_| bad())?,
            frame: frame.trim().parse().map_err(|_| bad())?,
        })
    }
}

/// Synthetic pointer motion in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PointerPath {
    /// No pointer for the whole run.
    None,
    /// Left to right across the vertical middle, leaving on the last frame.
    Sweep,
    /// A circle of a quarter of the short side around the center.
    Orbit,
}

impl PointerPath {
    /// Pointer position for `frame` of `frames`, or `None` when absent.
    pub fn position(self, frame: u64, frames: u64, width: usize, height: usize) -> Option<DVec2> {
        let (w, h) = (width as f64, height as f64);
        let t = if frames > 1 {
            frame as f64 / (frames - 1) as f64
        } else {
            0.0
        };
        match self {
            PointerPath::None => None,
            PointerPath::Sweep if frame + 1 >= frames => None,
            PointerPath::Sweep => Some(DVec2::new(t * w, h / 2.0)),
            PointerPath::Orbit => {
                let radius = w.min(h) / 4.0;
                Some(DVec2::new(w, h) / 2.0 + DVec2::from_angle(t * TAU) * radius)
            }
        }
    }
}

/// What the headless host does over a run.
#[derive(Debug, Clone, Copy)]
pub struct DrivePlan {
    pub frames: u64,
    pub width: usize,
    pub height: usize,
    pub pointer: PointerPath,
    pub resize_at: Option<ResizeAt>,
}

/// Outcome of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub particles: usize,
    pub width: usize,
    pub height: usize,
}

/// Starts the loop, pumps `plan.frames` frames with synthetic input and
/// leaves the loop running so the caller can snapshot before stopping.
pub fn drive<S: Scene>(lp: &mut RenderLoop<S, QueuedScheduler>, plan: &DrivePlan) -> RunSummary {
    let (mut width, mut height) = (plan.width, plan.height);
    lp.start(width, height);
    for frame in 0..plan.frames {
        if let Some(resize) = plan.resize_at.filter(|r| r.frame == frame) {
            width = resize.width;
            height = resize.height;
            lp.handle(InputEvent::Resize { width, height });
        }
        let event = match plan.pointer.position(frame, plan.frames, width, height) {
            Some(p) => InputEvent::PointerMove {
                client_x: p.x,
                client_y: p.y,
            },
            None => InputEvent::PointerLeave,
        };
        lp.handle(event);
        let Some(token) = lp.scheduler_mut().next_due() else {
            break;
        };
        lp.on_frame(token);
    }
    RunSummary {
        frames: lp.frames(),
        particles: lp.scene().particle_count(),
        width,
        height,
    }
}

/// Shallow-merges `overlay` into `base`; non-object values replace `base` outright.
pub fn merge_params(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            base.extend(overlay);
            Value::Object(base)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
