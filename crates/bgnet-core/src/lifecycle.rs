//! Pause bookkeeping for the frame loop.
//!
//! The loop runs only while no pause reason is active. At most one frame
//! request is pending at any time; activating a reason cancels it at once.

use fnv::FnvHashSet;
use std::fmt;
use std::str::FromStr;

/// Independent condition that halts the loop while active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PauseReason {
    /// Public `pause()`/`resume()` control.
    Manual,
    /// Small viewport or coarse pointer.
    LowPower,
    ReducedMotion,
    SaveData,
    /// Page hidden.
    Visibility,
}

impl PauseReason {
    pub const ALL: [PauseReason; 5] = [
        PauseReason::Manual,
        PauseReason::LowPower,
        PauseReason::ReducedMotion,
        PauseReason::SaveData,
        PauseReason::Visibility,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PauseReason::Manual => "manual",
            PauseReason::LowPower => "low-power",
            PauseReason::ReducedMotion => "reduced-motion",
            PauseReason::SaveData => "save-data",
            PauseReason::Visibility => "visibility",
        }
    }
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PauseReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| format!("unknown pause reason `{s}`"))
    }
}

/// Source of frame callbacks (`requestAnimationFrame` in the browser).
pub trait FrameScheduler {
    type Handle;
    fn request(&mut self) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

pub struct Lifecycle<S: FrameScheduler> {
    scheduler: S,
    reasons: FnvHashSet<PauseReason>,
    pending: Option<S::Handle>,
    started: bool,
}

impl<S: FrameScheduler> Lifecycle<S> {
    /// Starts idle. Reasons may be toggled freely before
    /// [`Lifecycle::start`]; no frame is requested until then.
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            reasons: FnvHashSet::default(),
            pending: None,
            started: false,
        }
    }

    pub fn start(&mut self) {
        self.started = true;
        self.update_loop();
    }

    pub fn set_paused(&mut self, reason: PauseReason, paused: bool) {
        let changed = if paused {
            self.reasons.insert(reason)
        } else {
            self.reasons.remove(&reason)
        };
        if changed {
            log::debug!("[lifecycle] {} {}", reason, if paused { "on" } else { "off" });
        }
        self.update_loop();
    }

    pub fn is_paused_by(&self, reason: PauseReason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn active_reasons(&self) -> impl Iterator<Item = PauseReason> + '_ {
        self.reasons.iter().copied()
    }

    /// No reason active and a frame is scheduled.
    pub fn is_running(&self) -> bool {
        self.reasons.is_empty() && self.pending.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Call first thing in a frame callback; `false` means skip the frame.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.reasons.is_empty()
    }

    /// Call after a frame was drawn to schedule the next one.
    pub fn end_frame(&mut self) {
        self.update_loop();
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn update_loop(&mut self) {
        if !self.reasons.is_empty() {
            if let Some(handle) = self.pending.take() {
                self.scheduler.cancel(handle);
            }
        } else if self.started && self.pending.is_none() {
            self.pending = Some(self.scheduler.request());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Counting {
        next: u32,
        requested: u32,
        cancelled: Vec<u32>,
    }

    impl FrameScheduler for Counting {
        type Handle = u32;
        fn request(&mut self) -> u32 {
            self.next += 1;
            self.requested += 1;
            self.next
        }
        fn cancel(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    fn started() -> Lifecycle<Counting> {
        let mut lc = Lifecycle::new(Counting::default());
        lc.start();
        lc
    }

    #[test]
    fn start_arms_exactly_one_frame() {
        let mut lc = started();
        lc.start();
        lc.set_paused(PauseReason::Manual, false);
        assert_eq!(lc.scheduler().requested, 1);
        assert!(lc.is_running());
    }

    #[test]
    fn signals_before_start_request_nothing() {
        let mut lc = Lifecycle::new(Counting::default());
        lc.set_paused(PauseReason::LowPower, false);
        lc.set_paused(PauseReason::SaveData, true);
        lc.set_paused(PauseReason::SaveData, false);
        lc.set_paused(PauseReason::Visibility, false);
        assert_eq!(lc.scheduler().requested, 0);
        assert!(!lc.has_pending());
        assert!(!lc.is_running());

        lc.start();
        assert_eq!(lc.scheduler().requested, 1);
        assert!(lc.scheduler().cancelled.is_empty());
        assert!(lc.is_running());
    }

    #[test]
    fn start_while_paused_waits_for_the_last_reason() {
        let mut lc = Lifecycle::new(Counting::default());
        lc.set_paused(PauseReason::ReducedMotion, true);
        lc.start();
        assert_eq!(lc.scheduler().requested, 0);
        lc.set_paused(PauseReason::ReducedMotion, false);
        assert_eq!(lc.scheduler().requested, 1);
    }

    #[test]
    fn manual_pause_then_resume_restarts() {
        let mut lc = started();
        lc.set_paused(PauseReason::Manual, true);
        assert!(!lc.is_running());
        assert_eq!(lc.scheduler().cancelled, vec![1]);
        lc.set_paused(PauseReason::Manual, false);
        assert!(lc.is_running());
        assert_eq!(lc.scheduler().requested, 2);
    }

    #[test]
    fn no_requests_while_any_reason_is_active() {
        let mut lc = started();
        lc.set_paused(PauseReason::Visibility, true);
        lc.set_paused(PauseReason::SaveData, true);
        let before = lc.scheduler().requested;
        lc.set_paused(PauseReason::Visibility, false);
        lc.set_paused(PauseReason::Visibility, true);
        lc.set_paused(PauseReason::Visibility, false);
        assert!(!lc.begin_frame());
        lc.end_frame();
        assert_eq!(lc.scheduler().requested, before);
        assert!(!lc.is_running());

        lc.set_paused(PauseReason::SaveData, false);
        assert_eq!(lc.scheduler().requested, before + 1);
        assert!(lc.is_running());
    }

    #[test]
    fn frame_callbacks_rearm_once() {
        let mut lc = started();
        for _ in 0..5 {
            assert!(lc.begin_frame());
            assert!(!lc.has_pending());
            lc.end_frame();
            lc.end_frame();
        }
        assert_eq!(lc.scheduler().requested, 6);
    }

    #[test]
    fn reasons_are_independent() {
        let mut lc = started();
        lc.set_paused(PauseReason::LowPower, true);
        lc.set_paused(PauseReason::ReducedMotion, true);
        lc.set_paused(PauseReason::LowPower, false);
        assert!(lc.is_paused_by(PauseReason::ReducedMotion));
        assert!(!lc.is_paused_by(PauseReason::LowPower));
        assert_eq!(lc.active_reasons().count(), 1);
        assert!(!lc.is_running());
    }

    #[test]
    fn reason_keys_parse_back() {
        for r in PauseReason::ALL {
            assert_eq!(r.key().parse::<PauseReason>(), Ok(r));
        }
        assert!("battery".parse::<PauseReason>().is_err());
    }
}
