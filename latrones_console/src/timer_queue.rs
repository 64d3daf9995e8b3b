// Executes `TimerCommand`s for the terminal client. The event loop waits until `next_deadline`
// and then fires whatever is due.

use std::time::{Duration, Instant};

use latrones_client::timer::{TimerCommand, TimerHandle};


struct ScheduledTimer {
    handle: TimerHandle,
    deadline: Instant,
    period: Option<Duration>,
}

pub struct TimerQueue {
    timers: Vec<ScheduledTimer>,
    timeout_override: Option<Duration>,
}

impl TimerQueue {
    pub fn new(timeout_override: Option<Duration>) -> Self {
        TimerQueue { timers: Vec::new(), timeout_override }
    }

    pub fn is_empty(&self) -> bool { self.timers.is_empty() }

    pub fn apply(&mut self, command: TimerCommand, now: Instant) {
        match command {
            TimerCommand::StartInterval { handle, period } => self.timers.push(ScheduledTimer {
                handle,
                deadline: now + period,
                period: Some(period),
            }),
            TimerCommand::StartTimeout { handle, delay } => {
                let delay = self.timeout_override.unwrap_or(delay);
                self.timers.push(ScheduledTimer { handle, deadline: now + delay, period: None });
            }
            TimerCommand::Cancel { handle } => self.timers.retain(|t| t.handle != handle),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> { self.timers.iter().map(|t| t.deadline).min() }

    // Intervals that fell behind fire once per missed period.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut due = Vec::new();
        for timer in self.timers.iter_mut() {
            while timer.deadline <= now {
                due.push((timer.deadline, timer.handle));
                match timer.period {
                    Some(period) => timer.deadline += period,
                    None => break,
                }
            }
        }
        self.timers.retain(|t| t.period.is_some() || t.deadline > now);
        due.sort_by_key(|&(deadline, _)| deadline);
        due.into_iter().map(|(_, handle)| handle).collect()
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn interval_catches_up() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(None);
        queue.apply(
            TimerCommand::StartInterval { handle: TimerHandle(1), period: Duration::from_secs(1) },
            start,
        );
        assert_eq!(queue.next_deadline(), Some(start + Duration::from_secs(1)));
        assert!(queue.pop_due(start).is_empty());
        assert_eq!(queue.pop_due(start + Duration::from_millis(2500)), vec![
            TimerHandle(1),
            TimerHandle(1)
        ]);
        assert_eq!(queue.next_deadline(), Some(start + Duration::from_secs(3)));
    }

    #[test]
    fn timeout_fires_once() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(None);
        queue.apply(
            TimerCommand::StartTimeout { handle: TimerHandle(2), delay: Duration::from_millis(300) },
            start,
        );
        assert_eq!(queue.pop_due(start + Duration::from_secs(1)), vec![TimerHandle(2)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_and_override() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(Some(Duration::ZERO));
        queue.apply(
            TimerCommand::StartTimeout { handle: TimerHandle(3), delay: Duration::from_secs(5) },
            start,
        );
        assert_eq!(queue.next_deadline(), Some(start));
        queue.apply(TimerCommand::Cancel { handle: TimerHandle(3) }, start);
        assert!(queue.pop_due(start).is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
