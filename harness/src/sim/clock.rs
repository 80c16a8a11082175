use thiserror::Error;

use crate::network::BlockInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("cannot move the clock backwards by {0}s")]
    Backwards(i64),
    #[error("clock overflow")]
    Overflow,
}

/// Programmable chain clock.
///
/// Time advances are buffered and only land in the next mined block; contract
/// calls always see the head block's timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    head: BlockInfo,
    pending: i64,
}

impl SimClock {
    pub fn starting_at(unix_timestamp: i64) -> Self {
        Self {
            head: BlockInfo {
                slot: 0,
                unix_timestamp,
            },
            pending: 0,
        }
    }

    pub fn head(&self) -> BlockInfo {
        self.head
    }

    /// Timestamp observed by contract calls
    pub fn now(&self) -> i64 {
        self.head.unix_timestamp
    }

    /// Seconds that the next block will add to the head timestamp
    pub fn pending(&self) -> i64 {
        self.pending
    }

    /// Buffers `seconds` for the next block and returns the new pending total.
    pub fn increase_time(&mut self, seconds: i64) -> Result<i64, ClockError> {
        if seconds < 0 {
            return Err(ClockError::Backwards(seconds));
        }
        self.pending = self
            .pending
            .checked_add(seconds)
            .ok_or(ClockError::Overflow)?;
        Ok(self.pending)
    }

    /// Produces the next block, applying any pending advance.
    pub fn mine(&mut self) -> Result<BlockInfo, ClockError> {
        let unix_timestamp = self
            .head
            .unix_timestamp
            .checked_add(self.pending)
            .ok_or(ClockError::Overflow)?;
        let slot = self.head.slot.checked_add(1).ok_or(ClockError::Overflow)?;

        self.head = BlockInfo {
            slot,
            unix_timestamp,
        };
        self.pending = 0;
        Ok(self.head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_invisible_until_mined() {
        let mut clock = SimClock::starting_at(1_000);
        assert_eq!(clock.increase_time(5).unwrap(), 5);
        assert_eq!(clock.increase_time(2).unwrap(), 7);
        assert_eq!(clock.now(), 1_000);

        let head = clock.mine().unwrap();
        assert_eq!(head, BlockInfo { slot: 1, unix_timestamp: 1_007 });
        assert_eq!(clock.now(), 1_007);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn mining_without_advance_keeps_timestamp() {
        let mut clock = SimClock::starting_at(42);
        let head = clock.mine().unwrap();
        assert_eq!(head.slot, 1);
        assert_eq!(head.unix_timestamp, 42);
    }

    #[test]
    fn rejects_backwards_and_overflow() {
        let mut clock = SimClock::starting_at(i64::MAX - 1);
        assert_eq!(clock.increase_time(-1), Err(ClockError::Backwards(-1)));
        clock.increase_time(10).unwrap();
        assert_eq!(clock.mine(), Err(ClockError::Overflow));
        assert_eq!(clock.head().slot, 0);
    }
}
