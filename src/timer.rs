use std::sync::mpsc;
use std::time::Duration;

use serde::{Deserialize, Serialize};


pub const CLOCK_TICK_PERIOD: Duration = Duration::from_secs(1);
// Time the glide animation gets before the new board replaces the old one.
pub const BOARD_SWAP_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

// What the host should do with its timers. The host calls back `GameController::on_timer`
// with the handle every time a timer fires.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerCommand {
    StartInterval {
        handle: TimerHandle,
        #[serde(with = "millis")]
        period: Duration,
    },
    StartTimeout {
        handle: TimerHandle,
        #[serde(with = "millis")]
        delay: Duration,
    },
    Cancel {
        handle: TimerHandle,
    },
}

// Allocates handles and forwards commands to the host. Handles are never reused, so a callback
// for a cancelled timer that was already in flight can always be told apart.
pub struct Timers {
    commands_tx: mpsc::Sender<TimerCommand>,
    next_handle: u64,
}

impl Timers {
    pub fn new(commands_tx: mpsc::Sender<TimerCommand>) -> Self {
        Timers { commands_tx, next_handle: 1 }
    }

    pub fn start_interval(&mut self, period: Duration) -> TimerHandle {
        let handle = self.allocate();
        self.send(TimerCommand::StartInterval { handle, period });
        handle
    }

    pub fn start_timeout(&mut self, delay: Duration) -> TimerHandle {
        let handle = self.allocate();
        self.send(TimerCommand::StartTimeout { handle, delay });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) { self.send(TimerCommand::Cancel { handle }); }

    fn allocate(&mut self) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn send(&self, command: TimerCommand) {
        // The host owning the receiver may already be shutting down; nothing to do then.
        if self.commands_tx.send(command).is_err() {
            log::debug!("Timer command dropped: host is gone");
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let (tx, rx) = mpsc::channel();
        let mut timers = Timers::new(tx);
        let a = timers.start_interval(CLOCK_TICK_PERIOD);
        let b = timers.start_timeout(BOARD_SWAP_DELAY);
        timers.cancel(a);
        assert_ne!(a, b);
        let commands: Vec<_> = rx.try_iter().collect();
        assert_eq!(commands, vec![
            TimerCommand::StartInterval { handle: a, period: CLOCK_TICK_PERIOD },
            TimerCommand::StartTimeout { handle: b, delay: BOARD_SWAP_DELAY },
            TimerCommand::Cancel { handle: a },
        ]);
    }

    #[test]
    fn json_for_host() {
        let command = TimerCommand::StartTimeout { handle: TimerHandle(7), delay: BOARD_SWAP_DELAY };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"kind":"start_timeout","handle":7,"delay":300}"#
        );
    }
}
