//! Timer scheduling behind the timed sources.
//!
//! `interval`, `timer` and anything built on them never touch host timer
//! primitives directly; they go through the [`Scheduler`] trait so a test
//! can swap in the deterministic [`TestScheduler`] virtual clock while
//! production code drives a `futures` local executor.
//!
//! [`TestScheduler`]: test_scheduler::TestScheduler

use std::{cell::Cell, rc::Rc};

use futures::{executor::LocalSpawner, task::LocalSpawnExt};

use crate::subscription::SubscriptionLike;

pub mod test_scheduler;

pub use std::time::Duration;

/// Orders tasks for delayed or periodic execution.
pub trait Scheduler: Clone {
  /// Run `task` once after `delay`.
  fn schedule_once(
    &self,
    delay: Duration,
    task: impl FnOnce() + 'static,
  ) -> TaskHandle;

  /// Run `task` every `period`, passing the tick sequence number
  /// `0, 1, 2, ...`. The task returns `false` to stop the schedule from
  /// the inside (e.g. its observer is gone).
  fn schedule_repeating(
    &self,
    period: Duration,
    task: impl FnMut(usize) -> bool + 'static,
  ) -> TaskHandle;
}

/// Cancellation flag shared with a scheduled task.
///
/// The flag is checked immediately before every delivery, which closes
/// the race between an already-queued tick and `unsubscribe`.
#[derive(Clone, Default)]
pub struct TaskHandle {
  cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  #[inline]
  pub fn cancel(&self) { self.cancelled.set(true) }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.cancelled.get() }
}

impl SubscriptionLike for TaskHandle {
  #[inline]
  fn unsubscribe(&mut self) { self.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() }
}

/// Wall-clock scheduler on a single-threaded `futures` executor.
///
/// Obtain the spawner from a `LocalPool` and drive the pool to make
/// timers fire:
///
/// ```
/// use futures::executor::LocalPool;
/// use rivulet::prelude::*;
///
/// let mut pool = LocalPool::new();
/// observable::timer(7, Duration::from_millis(1), pool.spawner())
///   .subscribe(|v| assert_eq!(v, 7));
/// pool.run();
/// ```
impl Scheduler for LocalSpawner {
  fn schedule_once(
    &self,
    delay: Duration,
    task: impl FnOnce() + 'static,
  ) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    self
      .spawn_local(async move {
        if !delay.is_zero() {
          futures_time::task::sleep(delay.into()).await;
        }
        if !h.is_cancelled() {
          task()
        }
      })
      .expect("spawn timer task on a live executor");
    handle
  }

  fn schedule_repeating(
    &self,
    period: Duration,
    mut task: impl FnMut(usize) -> bool + 'static,
  ) -> TaskHandle {
    let handle = TaskHandle::new();
    let h = handle.clone();
    self
      .spawn_local(async move {
        let mut seq = 0;
        loop {
          futures_time::task::sleep(period.into()).await;
          if h.is_cancelled() || !task(seq) {
            break;
          }
          seq += 1;
        }
      })
      .expect("spawn timer task on a live executor");
    handle
  }
}
