//! Multicast relay: both an [`Observer`] (sink) and an [`Observable`]
//! (source).
//!
//! Observers live in a slot arena indexed by registration order; an
//! unsubscribe marks the slot's shared cancelled flag instead of mutating
//! the list, so removal during fan-out never invalidates the iteration.
//! Once a terminal event is recorded the subject is dead: late
//! subscribers are notified immediately and never added.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use crate::{
  observable::Observable,
  observer::Observer,
  subscription::Subscription,
};

pub struct Subject<Item, Err> {
  core: Rc<SubjectCore<Item, Err>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { core: self.core.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Subject {
      core: Rc::new(SubjectCore {
        slots: RefCell::new(Vec::new()),
        terminal: RefCell::new(None),
        queue: RefCell::new(VecDeque::new()),
        delivering: Cell::new(false),
      }),
    }
  }
}

struct SubjectCore<Item, Err> {
  slots: RefCell<Vec<Slot<Item, Err>>>,
  terminal: RefCell<Option<Terminal<Err>>>,
  // values pushed while a fan-out is already running
  queue: RefCell<VecDeque<Item>>,
  delivering: Cell<bool>,
}

struct Slot<Item, Err> {
  observer: Option<Box<dyn Observer<Item, Err>>>,
  cancelled: Rc<Cell<bool>>,
}

#[derive(Clone)]
enum Terminal<Err> {
  Completed,
  Error(Err),
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// `true` once `error` or `complete` was recorded.
  pub fn is_terminated(&self) -> bool {
    self.core.terminal.borrow().is_some()
  }

  /// Number of live (not yet cancelled) subscribers.
  pub fn subscriber_count(&self) -> usize {
    self
      .core
      .slots
      .borrow()
      .iter()
      .filter(|s| !s.cancelled.get() && s.observer.is_some())
      .count()
  }

  /// Take the observer out of slot `index` if it is still deliverable.
  ///
  /// Fan-out removes the observer, releases the list borrow, invokes the
  /// callback, then restores the slot. A reentrant subscribe or
  /// unsubscribe from inside the callback therefore sees a consistent
  /// list, never a half-iterated one.
  fn take_slot(&self, index: usize) -> Option<TakenSlot<Item, Err>> {
    let mut slots = self.core.slots.borrow_mut();
    let slot = slots.get_mut(index)?;
    if slot.cancelled.get() {
      slot.observer = None;
      return None;
    }
    slot
      .observer
      .take()
      .map(|observer| TakenSlot { observer, cancelled: slot.cancelled.clone() })
  }

}

impl<Item, Err: Clone> Subject<Item, Err> {
  fn restore_slot(&self, index: usize, mut taken: TakenSlot<Item, Err>) {
    if taken.cancelled.get() || taken.observer.is_closed() {
      return;
    }
    // A terminal raised from inside this observer's own callback ran its
    // fan-out while the slot was empty; hand the event over now instead
    // of re-inserting into the cleared list.
    let terminal = self.core.terminal.borrow().clone();
    if let Some(terminal) = terminal {
      match terminal {
        Terminal::Completed => taken.observer.complete(),
        Terminal::Error(err) => taken.observer.error(err),
      }
      return;
    }
    let mut slots = self.core.slots.borrow_mut();
    if let Some(slot) = slots.get_mut(index) {
      slot.observer = Some(taken.observer);
    }
  }
}

struct TakenSlot<Item, Err> {
  observer: Box<dyn Observer<Item, Err>>,
  cancelled: Rc<Cell<bool>>,
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  fn next(&mut self, value: Item) {
    if self.is_terminated() {
      return;
    }
    // Reentrant calls land on the queue and are drained by the fan-out
    // already on the stack, so a subscriber whose slot is taken out for
    // delivery still receives values it pushes from inside its callback.
    self.core.queue.borrow_mut().push_back(value);
    if self.core.delivering.get() {
      return;
    }
    self.core.delivering.set(true);
    loop {
      let value = self.core.queue.borrow_mut().pop_front();
      let Some(value) = value else { break };
      if self.is_terminated() {
        self.core.queue.borrow_mut().clear();
        break;
      }
      // Snapshot the length: slots added during fan-out only receive
      // subsequent events.
      let len = self.core.slots.borrow().len();
      for i in 0..len {
        if let Some(mut taken) = self.take_slot(i) {
          taken.observer.next(value.clone());
          self.restore_slot(i, taken);
        }
      }
    }
    self.core.delivering.set(false);
  }

  fn error(&mut self, err: Err) {
    if self.is_terminated() {
      return;
    }
    *self.core.terminal.borrow_mut() = Some(Terminal::Error(err.clone()));
    let len = self.core.slots.borrow().len();
    for i in 0..len {
      if let Some(mut taken) = self.take_slot(i) {
        taken.observer.error(err.clone());
      }
    }
    self.core.slots.borrow_mut().clear();
  }

  fn complete(&mut self) {
    if self.is_terminated() {
      return;
    }
    *self.core.terminal.borrow_mut() = Some(Terminal::Completed);
    let len = self.core.slots.borrow().len();
    for i in 0..len {
      if let Some(mut taken) = self.take_slot(i) {
        taken.observer.complete();
      }
    }
    self.core.slots.borrow_mut().clear();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_terminated() }
}

impl<Item, Err> Observable<Item, Err> for Subject<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let terminal = self.core.terminal.borrow().clone();
    if let Some(terminal) = terminal {
      let mut observer = observer;
      match terminal {
        Terminal::Completed => observer.complete(),
        Terminal::Error(err) => observer.error(err),
      }
      return Subscription::closed();
    }

    let cancelled = Rc::new(Cell::new(false));
    self.core.slots.borrow_mut().push(Slot {
      observer: Some(Box::new(observer)),
      cancelled: cancelled.clone(),
    });
    let subscription = Subscription::new();
    subscription.add(move || cancelled.set(true));
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::prelude::*;

  fn record(
    subject: &Subject<i32, &'static str>,
    log: &Rc<RefCell<Vec<String>>>,
    tag: &'static str,
  ) -> Subscription {
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    subject.clone().subscribe_all(
      move |v| l1.borrow_mut().push(format!("{tag} next {v}")),
      move |e| l2.borrow_mut().push(format!("{tag} error {e}")),
      move || l3.borrow_mut().push(format!("{tag} complete")),
    )
  }

  #[test]
  fn fans_out_to_every_live_subscriber() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&subject, &log, "a");
    record(&subject, &log, "b");

    subject.clone().next(1);
    assert_eq!(*log.borrow(), vec!["a next 1", "b next 1"]);
  }

  #[test]
  fn unsubscribed_slot_stops_receiving() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut first = record(&subject, &log, "a");
    record(&subject, &log, "b");

    subject.clone().next(1);
    first.unsubscribe();
    subject.clone().next(2);

    assert_eq!(
      *log.borrow(),
      vec!["a next 1", "b next 1", "b next 2"]
    );
  }

  #[test]
  fn terminal_is_recorded_once_and_replayed_to_late_subscribers() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&subject, &log, "early");

    subject.clone().error("boom");
    subject.clone().next(7);
    subject.clone().complete();

    let late = record(&subject, &log, "late");
    assert!(late.is_closed());
    assert_eq!(*log.borrow(), vec!["early error boom", "late error boom"]);
  }

  #[test]
  fn subscriber_count_tracks_cancellation() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut a = record(&subject, &log, "a");
    record(&subject, &log, "b");
    assert_eq!(subject.subscriber_count(), 2);

    a.unsubscribe();
    // Cancellation is lazy; delivery skips and clears the dead slot.
    subject.clone().next(0);
    assert_eq!(subject.subscriber_count(), 1);
  }

  #[test]
  fn terminal_raised_inside_a_callback_reaches_the_raising_subscriber() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let trigger = subject.clone();
    let l = log.clone();
    let l2 = log.clone();
    subject.clone().subscribe_all(
      move |v| {
        l.borrow_mut().push(format!("a next {v}"));
        trigger.clone().complete();
      },
      |_| {},
      move || l2.borrow_mut().push("a complete".to_string()),
    );
    record(&subject, &log, "b");

    subject.clone().next(1);
    assert_eq!(
      *log.borrow(),
      vec!["a next 1", "b complete", "a complete"]
    );
  }

  #[test]
  fn reentrant_next_is_queued_until_the_current_fanout_finishes() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let feedback = subject.clone();
    let l = log.clone();
    subject.clone().subscribe_err(
      move |v| {
        l.borrow_mut().push(v);
        if v < 3 {
          feedback.clone().next(v + 1);
        }
      },
      |_| {},
    );

    subject.clone().next(1);
    assert_eq!(*log.borrow(), vec![1, 2, 3]);
  }

  #[test]
  fn reentrant_subscribe_during_fanout_misses_the_current_value() {
    let subject: Subject<i32, &str> = Subject::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let inner = subject.clone();
    let l = log.clone();
    let outer_log = log.clone();
    subject.clone().subscribe_err(
      move |v| {
        outer_log.borrow_mut().push(format!("outer next {v}"));
        if v == 1 {
          let l = l.clone();
          inner.clone().subscribe_err(
            move |v| l.borrow_mut().push(format!("inner next {v}")),
            |_| {},
          );
        }
      },
      |_| {},
    );

    subject.clone().next(1);
    subject.clone().next(2);
    assert_eq!(
      *log.borrow(),
      vec!["outer next 1", "outer next 2", "inner next 2"]
    );
  }
}
