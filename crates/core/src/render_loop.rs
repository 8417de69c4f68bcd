//! Frame loop driving a [`Scene`] through a host [`FrameScheduler`].
//!
//! Lifecycle: `start` builds the field, attaches input listeners and requests
//! the first frame; each delivered frame clears, ticks, draws and requests
//! the next; `stop` cancels the pending frame, detaches listeners and
//! disposes the scene. Stopping twice is a no-op and dropping a running loop
//! stops it.

use crate::input::{FieldInput, InputEvent, InteractionSource};
use crate::scene::Scene;
use crate::schedule::{FrameScheduler, FrameToken};
use glam::DVec2;
use tracing::{debug, info};

/// Where a [`RenderLoop`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

pub struct RenderLoop<S: Scene, F: FrameScheduler> {
    scene: S,
    scheduler: F,
    input: InteractionSource,
    pending: Option<FrameToken>,
    state: LoopState,
    frames: u64,
}

impl<S: Scene, F: FrameScheduler> RenderLoop<S, F> {
    pub fn new(scene: S, scheduler: F) -> Self {
        Self {
            scene,
            scheduler,
            input: InteractionSource::default(),
            pending: None,
            state: LoopState::Idle,
            frames: 0,
        }
    }

    /// Sets the surface's client-rect origin used to localize pointer events.
    pub fn with_rect_origin(mut self, origin: DVec2) -> Self {
        self.input.set_rect_origin(origin);
        self
    }

    /// Builds the field at `width` x `height` and schedules the first frame.
    ///
    /// Only an idle loop starts; a running or stopped loop ignores the call.
    pub fn start(&mut self, width: usize, height: usize) {
        if self.state != LoopState::Idle {
            return;
        }
        self.scene.rebuild(width, height);
        self.input.attach();
        self.pending = Some(self.scheduler.request_frame());
        self.state = LoopState::Running;
        info!(
            width,
            height,
            particles = self.scene.particle_count(),
            "render loop started"
        );
    }

    /// Runs one frame if `token` is the one this loop is waiting on.
    ///
    /// Returns `false` for stale or foreign tokens and after `stop`.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.state != LoopState::Running || self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.scene.clear();
        self.scene.tick();
        self.scene.draw();
        self.frames += 1;
        self.pending = Some(self.scheduler.request_frame());
        true
    }

    /// Feeds a host event through the interaction source.
    pub fn handle(&mut self, event: InputEvent) {
        match self.input.translate(event) {
            Some(FieldInput::Pointer(pointer)) => self.scene.set_pointer(pointer),
            Some(FieldInput::Resize { width, height }) => self.resize(width, height),
            None => {}
        }
    }

    /// Rebuilds the field at the new size without restarting the loop.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.state != LoopState::Running {
            return;
        }
        debug!(width, height, "surface resized");
        self.scene.rebuild(width, height);
    }

    /// Cancels the pending frame, detaches listeners and disposes the scene.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        let detached = self.input.detach();
        self.scene.dispose();
        self.state = LoopState::Stopped;
        info!(frames = self.frames, listeners = detached, "render loop stopped");
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn input(&self) -> &InteractionSource {
        &self.input
    }
}

impl<S: Scene, F: FrameScheduler> Drop for RenderLoop<S, F> {
    fn drop(&mut self) {
        self.stop();
    }
}
