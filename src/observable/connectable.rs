use std::{cell::RefCell, rc::Rc};

use crate::{prelude::*, subject::Subject};

/// A hot, shared wrapper around a cold source.
///
/// Subscribers register with the internal [`Subject`]; nothing flows
/// until [`connect`](Connectable::connect) subscribes the subject to the
/// source, exactly once. Late subscribers receive only events emitted
/// after they attached; there is no replay.
///
/// State machine: Idle (source present, no connection) → Connected
/// (source consumed, upstream subscription held) → Terminated (subject
/// saw a terminal event; `connect` is inert).
pub struct Connectable<S, Item, Err> {
  source: Rc<RefCell<Option<S>>>,
  subject: Subject<Item, Err>,
  connection: Rc<RefCell<Option<Subscription>>>,
}

impl<S, Item, Err> Clone for Connectable<S, Item, Err> {
  fn clone(&self) -> Self {
    Connectable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, Item, Err> Connectable<S, Item, Err> {
  pub fn new(source: S) -> Self {
    Connectable {
      source: Rc::new(RefCell::new(Some(source))),
      subject: Subject::new(),
      connection: Rc::new(RefCell::new(None)),
    }
  }

  /// `true` once the upstream delivered `error` or `complete`.
  pub fn is_terminated(&self) -> bool { self.subject.is_terminated() }
}

impl<S, Item, Err> Connectable<S, Item, Err>
where
  S: Observable<Item, Err> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  /// Subscribe the internal subject to the source.
  ///
  /// Idempotent: the first call performs the upstream subscription and
  /// every later call returns a clone of the same handle. After the
  /// upstream terminated, returns an already-closed handle.
  ///
  /// Unsubscribing the returned handle tears down the upstream link
  /// only; observers registered with the subject stay attached and
  /// simply receive nothing further.
  pub fn connect(&self) -> Subscription {
    if self.subject.is_terminated() {
      return Subscription::closed();
    }
    let existing = self.connection.borrow().clone();
    if let Some(connection) = existing {
      return connection;
    }
    match self.source.borrow_mut().take() {
      Some(source) => {
        let connection = source.actual_subscribe(self.subject.clone());
        *self.connection.borrow_mut() = Some(connection.clone());
        connection
      }
      None => Subscription::closed(),
    }
  }
}

impl<S, Item, Err> Observable<Item, Err> for Connectable<S, Item, Err>
where
  S: Observable<Item, Err>,
  Item: 'static,
  Err: Clone + 'static,
{
  /// Register with the subject; no upstream work happens here.
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}
