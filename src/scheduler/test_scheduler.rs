//! Deterministic virtual-clock scheduler for tests.

use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  rc::Rc,
};

use super::{Duration, Scheduler, TaskHandle};

/// A [`Scheduler`] driven by an explicit virtual clock.
///
/// Nothing runs until [`advance`](TestScheduler::advance) (or
/// [`advance_to`](TestScheduler::advance_to)) moves the clock; due tasks
/// then run synchronously in due-time order, FIFO among ties. Cancelled
/// tasks are skipped even when already queued, matching the delivery
/// guarantee of the wall-clock scheduler.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let ticks = Rc::new(RefCell::new(Vec::new()));
/// let t = ticks.clone();
/// observable::interval(Duration::from_secs(1), scheduler.clone())
///   .subscribe(move |n| t.borrow_mut().push(n));
///
/// scheduler.advance(Duration::from_millis(3500));
/// assert_eq!(*ticks.borrow(), vec![0, 1, 2]);
/// ```
#[derive(Clone, Default)]
pub struct TestScheduler {
  core: Rc<RefCell<Core>>,
}

#[derive(Default)]
struct Core {
  now: Duration,
  sequence: u64,
  queue: BinaryHeap<Entry>,
}

struct Entry {
  due: Duration,
  order: u64,
  handle: TaskHandle,
  kind: TaskKind,
}

enum TaskKind {
  Once(Box<dyn FnOnce()>),
  Repeating {
    period: Duration,
    seq: usize,
    task: Box<dyn FnMut(usize) -> bool>,
  },
}

impl PartialEq for Entry {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.order == other.order
  }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Entry {
  // BinaryHeap is a max-heap; invert so the earliest due time (then the
  // earliest insertion) pops first.
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.order.cmp(&self.order))
  }
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Current virtual time since the scheduler was created.
  pub fn now(&self) -> Duration { self.core.borrow().now }

  /// Move the clock forward by `by`, running every task that comes due.
  pub fn advance(&self, by: Duration) {
    let target = self.core.borrow().now + by;
    self.advance_to(target);
  }

  /// Move the clock to the absolute virtual time `target`.
  ///
  /// Tasks run outside the internal borrow, so they may schedule further
  /// tasks or cancel handles; newly due work is picked up within the
  /// same call.
  pub fn advance_to(&self, target: Duration) {
    loop {
      let entry = {
        let mut core = self.core.borrow_mut();
        match core.queue.pop() {
          Some(entry) if entry.due <= target => {
            core.now = entry.due;
            entry
          }
          Some(entry) => {
            core.queue.push(entry);
            break;
          }
          None => break,
        }
      };
      self.run_entry(entry);
    }
    self.core.borrow_mut().now = target;
  }

  fn run_entry(&self, entry: Entry) {
    if entry.handle.is_cancelled() {
      return;
    }
    match entry.kind {
      TaskKind::Once(task) => task(),
      TaskKind::Repeating { period, seq, mut task } => {
        if !task(seq) || entry.handle.is_cancelled() {
          return;
        }
        let mut core = self.core.borrow_mut();
        let order = core.sequence;
        core.sequence += 1;
        core.queue.push(Entry {
          due: entry.due + period,
          order,
          handle: entry.handle,
          kind: TaskKind::Repeating { period, seq: seq + 1, task },
        });
      }
    }
  }

  fn push(&self, due: Duration, handle: TaskHandle, kind: TaskKind) {
    let mut core = self.core.borrow_mut();
    let order = core.sequence;
    core.sequence += 1;
    core.queue.push(Entry { due, order, handle, kind });
  }
}

impl Scheduler for TestScheduler {
  fn schedule_once(
    &self,
    delay: Duration,
    task: impl FnOnce() + 'static,
  ) -> TaskHandle {
    let handle = TaskHandle::new();
    let due = self.core.borrow().now + delay;
    self.push(due, handle.clone(), TaskKind::Once(Box::new(task)));
    handle
  }

  fn schedule_repeating(
    &self,
    period: Duration,
    task: impl FnMut(usize) -> bool + 'static,
  ) -> TaskHandle {
    let handle = TaskHandle::new();
    // A zero period degenerates to the clock's smallest step; otherwise
    // `advance` would never get past the same instant.
    let period = period.max(Duration::from_nanos(1));
    let due = self.core.borrow().now + period;
    self.push(
      due,
      handle.clone(),
      TaskKind::Repeating { period, seq: 0, task: Box::new(task) },
    );
    handle
  }
}
