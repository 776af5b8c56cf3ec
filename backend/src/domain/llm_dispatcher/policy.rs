//! Credential pool state: slot selection, cooldown tracking, and the
//! round-robin cursor described in §4.1 steps 2 and 5.

use chrono::{DateTime, Utc};
use zeroize::Zeroize;

use crate::domain::types::SlotIndex;

/// Per-slot lifecycle state. A slot returns to [`SlotState::Healthy`] either
/// when its cooldown elapses (observed lazily on the next selection scan) or
/// immediately after a successful call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Healthy,
    Cooling { cooldown_until: DateTime<Utc> },
}

/// One entry in the pool. The credential token is held in memory only; it is
/// never logged and never appears in an error message or metric label.
#[derive(Debug, Clone)]
struct CredentialSlot {
    credential: String,
    state: SlotState,
    call_count: u64,
    last_call_at: Option<DateTime<Utc>>,
}

impl Drop for CredentialSlot {
    fn drop(&mut self) {
        self.credential.zeroize();
    }
}

/// Outcome of a selection scan over the pool.
pub enum SlotSelection {
    /// `idx` is Healthy (or just transitioned from an elapsed cooldown) and
    /// may be invoked immediately.
    Ready(SlotIndex),
    /// Every slot is cooling; the caller should wait until `until` and retry
    /// the scan.
    AllCooling { until: DateTime<Utc> },
}

/// The credential pool: an ordered, fixed-size set of slots plus a
/// round-robin cursor. Created once at dispatcher construction; slots are
/// never added or removed at runtime (§3 CredentialSlot lifecycle).
pub struct CredentialPool {
    slots: Vec<CredentialSlot>,
    cursor: usize,
}

impl CredentialPool {
    pub fn new(credentials: Vec<String>) -> Self {
        let slots = credentials
            .into_iter()
            .map(|credential| CredentialSlot {
                credential,
                state: SlotState::Healthy,
                call_count: 0,
                last_call_at: None,
            })
            .collect();
        Self { slots, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn credential(&self, idx: SlotIndex) -> &str {
        self.slots
            .get(idx.0)
            .map_or("", |slot| slot.credential.as_str())
    }

    /// Scan starting at the cursor for the first slot that is Healthy, or
    /// whose cooldown has elapsed (reset to Healthy in place). Does not
    /// advance the cursor; that only happens on success or rate-limit
    /// (§4.1 steps 4–5).
    pub fn select(&mut self, now: DateTime<Utc>) -> SlotSelection {
        let len = self.slots.len();
        let mut earliest_cooldown: Option<DateTime<Utc>> = None;

        for offset in 0..len {
            #[expect(
                clippy::integer_division_remainder_used,
                reason = "round-robin wraparound over a non-empty pool"
            )]
            let idx = (self.cursor + offset) % len;
            let Some(slot) = self.slots.get_mut(idx) else {
                continue;
            };
            match slot.state {
                SlotState::Healthy => return SlotSelection::Ready(SlotIndex(idx)),
                SlotState::Cooling { cooldown_until } if cooldown_until <= now => {
                    slot.state = SlotState::Healthy;
                    return SlotSelection::Ready(SlotIndex(idx));
                }
                SlotState::Cooling { cooldown_until } => {
                    earliest_cooldown = Some(match earliest_cooldown {
                        Some(current) => current.min(cooldown_until),
                        None => cooldown_until,
                    });
                }
            }
        }

        SlotSelection::AllCooling {
            until: earliest_cooldown.unwrap_or(now),
        }
    }

    /// Mark `idx` as rate-limited and advance the cursor to the next slot
    /// (§4.1 step 4).
    pub fn mark_rate_limited(&mut self, idx: SlotIndex, now: DateTime<Utc>, cooldown: chrono::Duration) {
        let len = self.slots.len();
        if let Some(slot) = self.slots.get_mut(idx.0) {
            slot.state = SlotState::Cooling {
                cooldown_until: now + cooldown,
            };
        }
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "round-robin wraparound over a non-empty pool"
        )]
        {
            self.cursor = (idx.0 + 1) % len;
        }
    }

    /// Record a successful call against `idx` and advance the cursor by one
    /// for round-robin fairness (§4.1 step 5).
    pub fn mark_success(&mut self, idx: SlotIndex, now: DateTime<Utc>) {
        let len = self.slots.len();
        if let Some(slot) = self.slots.get_mut(idx.0) {
            slot.call_count += 1;
            slot.last_call_at = Some(now);
        }
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "round-robin wraparound over a non-empty pool"
        )]
        {
            self.cursor = (idx.0 + 1) % len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn selects_first_healthy_slot_from_cursor() {
        let mut pool = CredentialPool::new(vec!["a".into(), "b".into()]);
        match pool.select(at(0)) {
            SlotSelection::Ready(idx) => assert_eq!(idx, SlotIndex(0)),
            SlotSelection::AllCooling { .. } => panic!("expected a ready slot"),
        }
    }

    #[test]
    fn rate_limit_advances_cursor_and_cools_slot() {
        let mut pool = CredentialPool::new(vec!["a".into(), "b".into()]);
        pool.mark_rate_limited(SlotIndex(0), at(0), chrono::Duration::seconds(60));
        match pool.select(at(1)) {
            SlotSelection::Ready(idx) => assert_eq!(idx, SlotIndex(1)),
            SlotSelection::AllCooling { .. } => panic!("slot 1 should be healthy"),
        }
    }

    #[test]
    fn all_cooling_reports_earliest_deadline() {
        let mut pool = CredentialPool::new(vec!["a".into(), "b".into()]);
        pool.mark_rate_limited(SlotIndex(0), at(0), chrono::Duration::seconds(30));
        pool.mark_rate_limited(SlotIndex(1), at(0), chrono::Duration::seconds(10));
        match pool.select(at(1)) {
            SlotSelection::AllCooling { until } => assert_eq!(until, at(10)),
            SlotSelection::Ready(_) => panic!("both slots should be cooling"),
        }
    }

    #[test]
    fn cooldown_elapsed_returns_slot_to_healthy() {
        let mut pool = CredentialPool::new(vec!["a".into()]);
        pool.mark_rate_limited(SlotIndex(0), at(0), chrono::Duration::seconds(10));
        match pool.select(at(11)) {
            SlotSelection::Ready(idx) => assert_eq!(idx, SlotIndex(0)),
            SlotSelection::AllCooling { .. } => panic!("cooldown elapsed"),
        }
    }
}
