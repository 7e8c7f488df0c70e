/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat scheduling.
//!
//! Tracks the time of the last outbound send and reports when the session
//! has been idle for a full interval. The caller is responsible for sending
//! the heartbeat and reporting it back through
//! [`HeartbeatScheduler::on_message_sent`].

use std::time::{Duration, Instant};

/// Default idle interval before a heartbeat is due.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Outbound idle timer.
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler {
    /// Idle interval.
    interval: Duration,
    /// Time of last message sent.
    last_sent: Instant,
    /// Heartbeats sent since creation or the last reset.
    sent_count: u64,
}

impl HeartbeatScheduler {
    /// Creates a new scheduler.
    ///
    /// # Arguments
    /// * `interval` - Idle time after which a heartbeat is due
    /// * `now` - Current time, taken as the last send
    #[must_use]
    pub const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_sent: now,
            sent_count: 0,
        }
    }

    /// Records that a message was sent.
    #[inline]
    pub fn on_message_sent(&mut self, now: Instant) {
        self.last_sent = now;
    }

    /// Records that a heartbeat was sent.
    #[inline]
    pub fn on_heartbeat_sent(&mut self, now: Instant) {
        self.on_message_sent(now);
        self.sent_count += 1;
    }

    /// Returns true once a full interval has passed since the last send.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_sent) >= self.interval
    }

    /// Returns the time left until a heartbeat is due.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_sent))
    }

    /// Returns the time of the last send.
    #[must_use]
    pub const fn last_sent(&self) -> Instant {
        self.last_sent
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of heartbeats sent.
    #[must_use]
    pub const fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// Resets the scheduler as if a message had just been sent.
    pub fn reset(&mut self, now: Instant) {
        self.last_sent = now;
        self.sent_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_interval() {
        let start = Instant::now();
        let hb = HeartbeatScheduler::new(Duration::from_secs(5), start);
        assert!(!hb.is_due(start));
        assert!(!hb.is_due(start + Duration::from_millis(4999)));
        assert!(hb.is_due(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_send_resets_idle_timer() {
        let start = Instant::now();
        let mut hb = HeartbeatScheduler::new(Duration::from_secs(5), start);
        hb.on_message_sent(start + Duration::from_secs(4));
        assert!(!hb.is_due(start + Duration::from_secs(6)));
        assert!(hb.is_due(start + Duration::from_secs(9)));
    }

    #[test]
    fn test_time_until_due() {
        let start = Instant::now();
        let hb = HeartbeatScheduler::new(Duration::from_secs(5), start);
        assert_eq!(
            hb.time_until_due(start + Duration::from_secs(2)),
            Duration::from_secs(3)
        );
        assert_eq!(
            hb.time_until_due(start + Duration::from_secs(7)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_heartbeat_count_and_reset() {
        let start = Instant::now();
        let mut hb = HeartbeatScheduler::new(DEFAULT_HEARTBEAT_INTERVAL, start);
        hb.on_heartbeat_sent(start + Duration::from_secs(5));
        hb.on_heartbeat_sent(start + Duration::from_secs(10));
        assert_eq!(hb.sent_count(), 2);
        assert_eq!(hb.last_sent(), start + Duration::from_secs(10));

        hb.reset(start + Duration::from_secs(11));
        assert_eq!(hb.sent_count(), 0);
        assert!(!hb.is_due(start + Duration::from_secs(15)));
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let start = Instant::now() + Duration::from_secs(60);
        let hb = HeartbeatScheduler::new(Duration::from_secs(5), start);
        assert!(!hb.is_due(start - Duration::from_secs(30)));
    }
}
