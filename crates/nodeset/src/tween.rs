//! Tweens and the animation-frame scheduler
//!
//! A [`Tween`] turns host timestamps into clamped progress values. The
//! [`FrameScheduler`] is a host-driven `requestAnimationFrame`: nothing runs
//! until the host calls `run_frame(now)`.

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// What a frame callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStep {
    /// Run again on the next frame
    Continue,
    /// Done; drop the callback
    Finished,
}

/// Time-bounded interpolation driven by frame timestamps
pub struct Tween {
    start: Option<f64>,
    duration_ms: f64,
    progress: f64,
    on_progress: Box<dyn FnMut(f64)>,
    on_complete: Option<Box<dyn FnOnce()>>,
    completed: bool,
}

impl Tween {
    pub fn new(duration_ms: f64, on_progress: impl FnMut(f64) + 'static) -> Self {
        Self {
            start: None,
            duration_ms,
            progress: 0.0,
            on_progress: Box::new(on_progress),
            on_complete: None,
            completed: false,
        }
    }

    /// Run `on_complete` once when progress reaches 1
    pub fn on_complete(mut self, on_complete: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Advance to timestamp `now`, running `on_complete` when progress
    /// first reaches 1.
    pub fn frame(&mut self, now: f64) -> TweenStep {
        let step = self.step(now);
        if let Some(on_complete) = self.take_completion() {
            on_complete();
        }
        step
    }

    /// Advance to timestamp `now` without running `on_complete`.
    ///
    /// The first timestamp seen becomes the start. Progress never decreases,
    /// even if the host clock does.
    fn step(&mut self, now: f64) -> TweenStep {
        let start = *self.start.get_or_insert(now);
        let raw = if self.duration_ms > 0.0 {
            ((now - start) / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.progress = self.progress.max(raw);

        (self.on_progress)(self.progress);

        if self.progress < 1.0 {
            return TweenStep::Continue;
        }
        self.completed = true;
        TweenStep::Finished
    }

    /// The completion callback, once progress has reached 1
    fn take_completion(&mut self) -> Option<Box<dyn FnOnce()>> {
        if self.completed {
            self.on_complete.take()
        } else {
            None
        }
    }

    /// Last progress value reported
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("start", &self.start)
            .field("duration_ms", &self.duration_ms)
            .field("progress", &self.progress)
            .field("completed", &self.completed)
            .finish()
    }
}

/// Build a tween reporting progress over `duration_ms`
pub fn animate_over_time(
    duration_ms: f64,
    on_progress: impl FnMut(f64) + 'static,
    on_complete: Option<Box<dyn FnOnce()>>,
) -> Tween {
    let mut tween = Tween::new(duration_ms, on_progress);
    tween.on_complete = on_complete;
    tween
}

/// Handle returned by `FrameScheduler::request`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Callback run on each animation frame with the host timestamp
pub type FrameCallback = Box<dyn FnMut(f64) -> TweenStep>;

/// Host-driven animation frame queue.
///
/// A callback keeps its `FrameId` while it re-queues itself, so one id
/// cancels a whole multi-frame animation.
#[derive(Default)]
pub struct FrameScheduler {
    next_id: u64,
    queue: Vec<(FrameId, FrameCallback)>,
    in_flight: HashSet<FrameId>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `callback` for the next frame
    pub fn request(&mut self, callback: impl FnMut(f64) -> TweenStep + 'static) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.queue.push((id, Box::new(callback)));
        id
    }

    /// Cancel a queued or currently running callback
    pub fn cancel(&mut self, id: FrameId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|(queued, _)| *queued != id);
        self.queue.len() != before || self.in_flight.remove(&id)
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty()
    }

    /// Take the callbacks queued so far. Requests made while the batch runs
    /// wait for the following frame.
    pub fn take_batch(&mut self) -> Vec<(FrameId, FrameCallback)> {
        let batch = std::mem::take(&mut self.queue);
        self.in_flight.extend(batch.iter().map(|(id, _)| *id));
        batch
    }

    /// Whether a taken callback is still live (not cancelled mid-batch)
    pub fn is_live(&self, id: FrameId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Return a callback after it ran; re-queued on `Continue`
    pub fn finish(&mut self, id: FrameId, callback: FrameCallback, step: TweenStep) {
        if self.in_flight.remove(&id) && step == TweenStep::Continue {
            self.queue.push((id, callback));
        }
    }

    /// Run one frame. Callbacks cannot reach the scheduler while it runs;
    /// `Page::run_frame` releases it between callbacks instead.
    pub fn run_frame(&mut self, now: f64) -> usize {
        let mut ran = 0;
        for (id, mut callback) in self.take_batch() {
            if !self.is_live(id) {
                continue;
            }
            let step = callback(now);
            ran += 1;
            self.finish(id, callback, step);
        }
        ran
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.queue.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

/// Animation play state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Scheduled, no frame seen yet
    #[default]
    Idle,
    Running,
    Completed,
    /// Superseded by a newer animation on the same target
    Cancelled,
}

/// Property an animation writes; one live animation per node and property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    Opacity,
    Named(String),
}

/// Shared view of one scheduled animation
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    state: Rc<Cell<PlayState>>,
    frame: FrameId,
}

impl AnimationHandle {
    pub(crate) fn new(state: Rc<Cell<PlayState>>, frame: FrameId) -> Self {
        Self { state, frame }
    }

    pub fn state(&self) -> PlayState {
        self.state.get()
    }

    /// Idle or running
    pub fn is_active(&self) -> bool {
        matches!(self.state.get(), PlayState::Idle | PlayState::Running)
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub(crate) fn mark_cancelled(&self) {
        self.state.set(PlayState::Cancelled);
    }
}

/// Wrap a tween as a frame callback that keeps `state` current.
///
/// The state reads `Completed` before `on_complete` runs, so a completion
/// callback that starts the next animation on the same target does not
/// cancel this one.
pub(crate) fn drive(mut tween: Tween, state: Rc<Cell<PlayState>>) -> impl FnMut(f64) -> TweenStep {
    move |now| {
        if state.get() == PlayState::Cancelled {
            return TweenStep::Finished;
        }
        state.set(PlayState::Running);
        let step = tween.step(now);
        if step == TweenStep::Finished && state.get() == PlayState::Running {
            state.set(PlayState::Completed);
        }
        if let Some(on_complete) = tween.take_completion() {
            on_complete();
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording_tween(duration: f64) -> (Tween, Rc<RefCell<Vec<f64>>>, Rc<Cell<u32>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0));
        let log = Rc::clone(&seen);
        let done = Rc::clone(&completions);
        let tween = Tween::new(duration, move |p| log.borrow_mut().push(p))
            .on_complete(move || done.set(done.get() + 1));
        (tween, seen, completions)
    }

    #[test]
    fn test_progress_clamped_and_completes_once() {
        let (mut tween, seen, completions) = recording_tween(1000.0);

        assert_eq!(tween.frame(0.0), TweenStep::Continue);
        assert_eq!(tween.frame(250.0), TweenStep::Continue);
        assert_eq!(tween.frame(500.0), TweenStep::Continue);
        assert_eq!(completions.get(), 0);
        assert_eq!(tween.frame(1000.0), TweenStep::Finished);
        assert_eq!(completions.get(), 1);
        assert_eq!(tween.frame(1200.0), TweenStep::Finished);
        assert_eq!(completions.get(), 1);
        assert!(tween.is_completed());
        assert_eq!(tween.progress(), 1.0);
        assert_eq!(tween.duration_ms(), 1000.0);

        assert_eq!(*seen.borrow(), vec![0.0, 0.25, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_first_timestamp_is_start() {
        let (mut tween, seen, _) = recording_tween(100.0);
        tween.frame(5000.0);
        tween.frame(5050.0);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let (mut tween, seen, completions) = recording_tween(0.0);
        assert_eq!(tween.frame(42.0), TweenStep::Finished);
        assert_eq!(*seen.borrow(), vec![1.0]);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_clock_going_backwards_does_not_regress() {
        let (mut tween, seen, _) = recording_tween(100.0);
        tween.frame(0.0);
        tween.frame(60.0);
        tween.frame(30.0);
        assert_eq!(*seen.borrow(), vec![0.0, 0.6, 0.6]);
    }

    #[test]
    fn test_scheduler_requeues_until_finished() {
        let mut scheduler = FrameScheduler::new();
        let (tween, seen, _) = recording_tween(32.0);
        let state = Rc::new(Cell::new(PlayState::Idle));
        scheduler.request(drive(tween, Rc::clone(&state)));

        assert_eq!(scheduler.run_frame(0.0), 1);
        assert_eq!(state.get(), PlayState::Running);
        assert_eq!(scheduler.run_frame(16.0), 1);
        assert_eq!(scheduler.run_frame(32.0), 1);
        assert_eq!(state.get(), PlayState::Completed);
        assert_eq!(scheduler.run_frame(48.0), 0);
        assert!(scheduler.is_idle());
        assert_eq!(*seen.borrow(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_cancel_keeps_id_across_frames() {
        let mut scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let id = scheduler.request(move |_| {
            counter.set(counter.get() + 1);
            TweenStep::Continue
        });

        scheduler.run_frame(0.0);
        scheduler.run_frame(16.0);
        assert!(scheduler.cancel(id));
        scheduler.run_frame(32.0);

        assert_eq!(count.get(), 2);
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_state_completed_before_on_complete() {
        let state = Rc::new(Cell::new(PlayState::Idle));
        let seen = Rc::new(Cell::new(PlayState::Idle));
        let current = Rc::clone(&state);
        let observed = Rc::clone(&seen);
        let tween = Tween::new(10.0, |_| {}).on_complete(move || observed.set(current.get()));
        let mut callback = drive(tween, Rc::clone(&state));

        assert_eq!(callback(0.0), TweenStep::Continue);
        assert_eq!(seen.get(), PlayState::Idle);
        assert_eq!(callback(10.0), TweenStep::Finished);
        assert_eq!(seen.get(), PlayState::Completed);
        assert_eq!(state.get(), PlayState::Completed);
    }

    #[test]
    fn test_cancelled_state_skips_tween() {
        let (tween, seen, completions) = recording_tween(10.0);
        let state = Rc::new(Cell::new(PlayState::Idle));
        let mut callback = drive(tween, Rc::clone(&state));
        state.set(PlayState::Cancelled);

        assert_eq!(callback(0.0), TweenStep::Finished);
        assert!(seen.borrow().is_empty());
        assert_eq!(completions.get(), 0);
    }
}
