use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{ready, Context, Poll};

use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use crate::models::LedgerError;
use crate::repository::AppointmentLedger;

type SlotKey = (Uuid, NaiveDate);
type SlotLocks = Arc<Mutex<HashMap<SlotKey, Arc<tokio::sync::Mutex<()>>>>>;

/// Serializes token allocation per (doctor, date).
///
/// Holding a [`SlotGuard`] across "read max token, insert" keeps two bookings
/// in this process from computing the same token. Across processes the
/// ledger's unique index still rejects the loser, which the booking service
/// retries. Unrelated doctor-days never contend.
#[derive(Default, Clone)]
pub struct TokenAllocator {
    locks: SlotLocks,
}

/// Forgets a doctor-day's lock once nobody holds or awaits it.
#[derive(Debug)]
struct SlotLease {
    key: SlotKey,
    locks: SlotLocks,
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        let idle = locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&self.key);
        }
    }
}

/// Exclusive hold on one doctor-day. Dropping it releases the slot and
/// forgets the lock once nobody else is waiting on it.
#[derive(Debug)]
pub struct SlotGuard {
    // Field order is drop order: the mutex handle goes before the lease checks it.
    _guard: OwnedMutexGuard<()>,
    _lease: SlotLease,
}

/// A booking queued on a doctor-day. Dropping it before the lock is granted
/// (a disconnected client, a timeout) still prunes the entry.
struct SlotWait {
    acquire: Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>,
    lease: SlotLease,
}

impl Future for SlotWait {
    type Output = SlotGuard;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SlotGuard> {
        let this = self.get_mut();
        let guard = ready!(this.acquire.as_mut().poll(cx));
        debug!("Acquired token slot for doctor {} on {}", this.lease.key.0, this.lease.key.1);

        Poll::Ready(SlotGuard {
            _guard: guard,
            _lease: SlotLease {
                key: this.lease.key,
                locks: this.lease.locks.clone(),
            },
        })
    }
}

impl TokenAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self, doctor_id: Uuid, date: NaiveDate) -> impl Future<Output = SlotGuard> + Send {
        let key = (doctor_id, date);
        let slot = {
            let mut locks = match self.locks.lock() {
                Ok(locks) => locks,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks.entry(key).or_default().clone()
        };

        SlotWait {
            acquire: Box::pin(slot.lock_owned()),
            lease: SlotLease {
                key,
                locks: self.locks.clone(),
            },
        }
    }

    /// Next token for the doctor-day: one past the highest ever issued,
    /// cancelled rows included, so numbers are never reused.
    pub async fn next_token(
        &self,
        _slot: &SlotGuard,
        ledger: &dyn AppointmentLedger,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<i32, LedgerError> {
        let max = ledger.max_token(doctor_id, date).await?;
        Ok(max.map_or(1, |token| token + 1))
    }

    /// Number of doctor-days with a live lock.
    pub fn tracked_keys(&self) -> usize {
        match self.locks.lock() {
            Ok(locks) => locks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::repository::InMemoryAppointmentLedger;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn first_token_of_the_day_is_one() {
        let allocator = TokenAllocator::new();
        let ledger = InMemoryAppointmentLedger::new();
        let doctor = Uuid::new_v4();

        let slot = allocator.lock(doctor, day()).await;
        let token = allocator.next_token(&slot, &ledger, doctor, day()).await.unwrap();

        assert_eq!(token, 1);
    }

    #[tokio::test]
    async fn locks_are_released_and_forgotten() {
        let allocator = TokenAllocator::new();
        let doctor = Uuid::new_v4();

        {
            let _slot = allocator.lock(doctor, day()).await;
            assert_eq!(allocator.tracked_keys(), 1);
        }

        assert_eq!(allocator.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn same_slot_is_exclusive() {
        let allocator = TokenAllocator::new();
        let doctor = Uuid::new_v4();

        let held = allocator.lock(doctor, day()).await;

        let contender = allocator.clone();
        let waiting = tokio::spawn(async move {
            let _slot = contender.lock(doctor, day()).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .expect("second lock should be granted after release")
            .unwrap();
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_leak_its_entry() {
        let allocator = TokenAllocator::new();
        let doctor = Uuid::new_v4();

        let held = allocator.lock(doctor, day()).await;
        let mut waiter = tokio_test::task::spawn(allocator.lock(doctor, day()));
        tokio_test::assert_pending!(waiter.poll());

        drop(held);
        assert_eq!(allocator.tracked_keys(), 1);

        drop(waiter);
        assert_eq!(allocator.tracked_keys(), 0);

        let _again = allocator.lock(doctor, day()).await;
        assert_eq!(allocator.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn different_days_do_not_contend() {
        let allocator = TokenAllocator::new();
        let doctor = Uuid::new_v4();
        let tomorrow = day().succ_opt().unwrap();

        let _today = allocator.lock(doctor, day()).await;
        let other = tokio::time::timeout(Duration::from_millis(200), allocator.lock(doctor, tomorrow)).await;

        assert!(other.is_ok());
        assert_eq!(allocator.tracked_keys(), 2);
    }
}
