//! Point-by-point replay of loaded strokes.

use lazyink_core::scheduler::Scheduler;
use lazyink_core::shapes::Stroke;
use std::time::Duration;

/// One deferred paint step of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// Paint the first `upto` points of a stroke on the in-progress layer.
    Progress { line: usize, upto: usize },
    /// Paint a whole stroke on the drawing layer and clear the in-progress layer.
    Commit { line: usize },
}

/// Strokes being replayed and the steps still pending for them.
#[derive(Debug, Default)]
pub struct Replay {
    lines: Vec<Stroke>,
    scheduler: Scheduler<ReplayStep>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `lines` for replay, one step every `offset`.
    ///
    /// Each stroke of `n` points gets `n - 1` progress steps followed by a
    /// commit step. Returns the number of steps queued.
    pub fn start(&mut self, lines: Vec<Stroke>, offset: Duration) -> usize {
        self.cancel();
        let mut delay = Duration::ZERO;
        let mut queued = 0;
        for (line, stroke) in lines.iter().enumerate() {
            for upto in 2..=stroke.points.len() {
                delay += offset;
                if self.scheduler.schedule(delay, ReplayStep::Progress { line, upto }) {
                    queued += 1;
                }
            }
            delay += offset;
            if self.scheduler.schedule(delay, ReplayStep::Commit { line }) {
                queued += 1;
            }
        }
        self.lines = lines;
        queued
    }

    /// Steps that became due at `now`.
    pub fn advance(&mut self, now: Duration) -> Vec<ReplayStep> {
        let due = self.scheduler.advance(now);
        if self.scheduler.is_idle() && due.is_empty() {
            self.lines.clear();
        }
        due
    }

    /// Stroke referenced by a step.
    pub fn line(&self, line: usize) -> Option<&Stroke> {
        self.lines.get(line)
    }

    /// Drop every pending step.
    pub fn cancel(&mut self) {
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            log::debug!("Cancelled {dropped} pending replay steps");
        }
        self.lines.clear();
    }

    /// Drop everything and refuse further replays.
    pub fn close(&mut self) {
        self.scheduler.close();
        self.lines.clear();
    }

    /// Number of steps still pending.
    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_active(&self) -> bool {
        !self.scheduler.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn line(n: usize) -> Stroke {
        let points = (0..n).map(|i| Point::new(i as f64, 0.0)).collect();
        Stroke::new(points, "#444", 2.0)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_steps_are_spaced_by_offset() {
        let mut replay = Replay::new();
        assert_eq!(replay.start(vec![line(3), line(2)], ms(5)), 5);

        assert_eq!(replay.advance(ms(4)), vec![]);
        assert_eq!(replay.advance(ms(5)), vec![ReplayStep::Progress { line: 0, upto: 2 }]);
        assert_eq!(
            replay.advance(ms(15)),
            vec![
                ReplayStep::Progress { line: 0, upto: 3 },
                ReplayStep::Commit { line: 0 }
            ]
        );
        assert_eq!(
            replay.advance(ms(100)),
            vec![
                ReplayStep::Progress { line: 1, upto: 2 },
                ReplayStep::Commit { line: 1 }
            ]
        );
        assert!(!replay.is_active());
    }

    #[test]
    fn test_lines_stay_readable_until_idle() {
        let mut replay = Replay::new();
        replay.start(vec![line(2)], ms(1));

        let due = replay.advance(ms(10));
        assert_eq!(due.len(), 2);
        assert!(replay.line(0).is_some());

        assert!(replay.advance(ms(11)).is_empty());
        assert!(replay.line(0).is_none());
    }

    #[test]
    fn test_cancel_and_close() {
        let mut replay = Replay::new();
        replay.start(vec![line(4)], ms(1));
        replay.cancel();
        assert_eq!(replay.pending(), 0);
        assert!(replay.line(0).is_none());

        replay.close();
        assert_eq!(replay.start(vec![line(4)], ms(1)), 0);
    }
}
