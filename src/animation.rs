//! Time-driven sprite frame progression.
//!
//! Every animated thing in the mini-games (scroller entities, the player,
//! whack cells, the hammer) owns a [`FrameTimer`] and calls
//! [`FrameTimer::tick`] once per frame with the current timestamp and the
//! length of its sprite sheet.
//!
//! Two flavours exist:
//! - [`FrameTimer::looping`]: advance one frame whenever more than `cadence`
//!   ms have passed since the last change, wrapping at the end of the sheet.
//! - [`FrameTimer::sequence`]: spread a fixed duration evenly over the sheet
//!   and walk it once, forwards or backwards. Frame `k` is due once the
//!   elapsed time since the anchor exceeds `(k + 1) * duration / frames`, so
//!   slow ticks never stretch the total duration.

/// What happens after the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Wrap around to the first frame.
    Loop,
    /// Stop on the last frame and report [`FrameStep::Finished`].
    Once,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Result of one [`FrameTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// Not due yet.
    Held,
    /// Moved to another frame.
    Advanced,
    /// A `Once` timer reached the end of its sheet. Reported on the tick the
    /// end is reached and on every tick after.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cadence {
    /// Milliseconds between frame changes, measured from the last change.
    Fixed(u64),
    /// Total duration spread over however many frames the sheet has.
    Spread(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameTimer {
    frame: usize,
    anchor_ms: u64,
    steps: u64,
    cadence: Cadence,
    playback: Playback,
    direction: Direction,
    finished: bool,
}

impl FrameTimer {
    /// A wrapping animation that changes frame every `cadence_ms`.
    pub fn looping(cadence_ms: u64, now_ms: u64) -> Self {
        Self {
            frame: 0,
            anchor_ms: now_ms,
            steps: 0,
            cadence: Cadence::Fixed(cadence_ms),
            playback: Playback::Loop,
            direction: Direction::Forward,
            finished: false,
        }
    }

    /// A one-shot walk over a sheet of `frame_count` frames lasting
    /// `duration_ms`, starting at `start_ms`. Backward sequences start on
    /// the last frame.
    pub fn sequence(
        duration_ms: u64,
        frame_count: usize,
        direction: Direction,
        start_ms: u64,
    ) -> Self {
        let frame = match direction {
            Direction::Forward => 0,
            Direction::Backward => frame_count.saturating_sub(1),
        };
        Self {
            frame,
            anchor_ms: start_ms,
            steps: 0,
            cadence: Cadence::Spread(duration_ms),
            playback: Playback::Once,
            direction,
            finished: false,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance at most one frame if due.
    pub fn tick(&mut self, now_ms: u64, frame_count: usize) -> FrameStep {
        if self.finished {
            return FrameStep::Finished;
        }
        if frame_count == 0 {
            return match self.playback {
                Playback::Loop => FrameStep::Held,
                Playback::Once => {
                    self.finished = true;
                    FrameStep::Finished
                }
            };
        }

        let elapsed = now_ms.saturating_sub(self.anchor_ms) as f64;
        let due = match self.cadence {
            Cadence::Fixed(ms) => elapsed > ms as f64,
            Cadence::Spread(duration) => {
                let per_frame = duration as f64 / frame_count as f64;
                elapsed > per_frame * (self.steps + 1) as f64
            }
        };
        if !due {
            return FrameStep::Held;
        }

        self.steps += 1;
        if let Cadence::Fixed(_) = self.cadence {
            self.anchor_ms = now_ms;
        }

        let last = frame_count - 1;
        match (self.playback, self.direction) {
            (Playback::Loop, Direction::Forward) => {
                self.frame = (self.frame + 1) % frame_count;
                FrameStep::Advanced
            }
            (Playback::Loop, Direction::Backward) => {
                self.frame = (self.frame + frame_count - 1) % frame_count;
                FrameStep::Advanced
            }
            (Playback::Once, Direction::Forward) => {
                if self.frame + 1 >= last {
                    self.frame = last;
                    self.finished = true;
                    FrameStep::Finished
                } else {
                    self.frame += 1;
                    FrameStep::Advanced
                }
            }
            (Playback::Once, Direction::Backward) => {
                if self.frame <= 1 {
                    self.frame = 0;
                    self.finished = true;
                    FrameStep::Finished
                } else {
                    self.frame -= 1;
                    FrameStep::Advanced
                }
            }
        }
    }
}
