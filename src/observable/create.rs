use std::marker::PhantomData;

use crate::prelude::*;

/// Builds an observable from a raw producer closure.
///
/// The closure runs once per subscriber and pushes events through the
/// [`Emitter`] it receives. The bridge behind the emitter suppresses
/// every call after the first terminal event, so a sloppy producer can
/// never violate terminal-once downstream.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use rivulet::prelude::*;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let s = seen.clone();
/// observable::create(|emitter: &mut dyn Emitter<i32, &str>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// })
/// .subscribe_err(move |v| s.borrow_mut().push(v), |_| {});
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub fn create<Item, Err, F>(producer: F) -> CreateObservable<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>),
{
  CreateObservable { producer, _marker: PhantomData }
}

/// Push interface handed to [`create`] producers.
///
/// Mirrors [`Observer`] through `&mut` receivers so the producer does not
/// need to know the concrete observer type behind it.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);

  /// `true` once a terminal event was pushed; producers emitting loops
  /// should poll this to stop early.
  fn is_closed(&self) -> bool;
}

pub struct CreateObservable<F, Item, Err> {
  producer: F,
  _marker: PhantomData<(Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for CreateObservable<F, Item, Err> {
  fn clone(&self) -> Self {
    CreateObservable { producer: self.producer.clone(), _marker: PhantomData }
  }
}

impl<Item, Err, F> Observable<Item, Err> for CreateObservable<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>),
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let mut bridge = EmitterBridge { observer, closed: false };
    (self.producer)(&mut bridge);
    Subscription::closed()
  }
}

struct EmitterBridge<O> {
  observer: O,
  closed: bool,
}

impl<Item, Err, O> Emitter<Item, Err> for EmitterBridge<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.closed {
      self.observer.next(value)
    }
  }

  fn error(&mut self, err: Err) {
    if !self.closed {
      self.closed = true;
      self.observer.error(err)
    }
  }

  fn complete(&mut self) {
    if !self.closed {
      self.closed = true;
      self.observer.complete()
    }
  }

  fn is_closed(&self) -> bool { self.closed || self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn emissions_after_a_terminal_event_are_suppressed() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());
    create(|emitter: &mut dyn Emitter<i32, &str>| {
      emitter.next(1);
      emitter.complete();
      // A buggy producer keeps going; nothing below may reach the
      // observer.
      emitter.next(2);
      emitter.error("late");
      emitter.complete();
    })
    .subscribe_all(
      move |v| e1.borrow_mut().push(format!("next {v}")),
      move |e| e2.borrow_mut().push(format!("error {e}")),
      move || e3.borrow_mut().push("complete".to_string()),
    );

    assert_eq!(*events.borrow(), vec!["next 1", "complete"]);
  }

  #[test]
  fn producer_reruns_per_subscription() {
    let attempts = Rc::new(RefCell::new(0));
    let a = attempts.clone();
    let source = create(move |emitter: &mut dyn Emitter<i32, &str>| {
      *a.borrow_mut() += 1;
      emitter.next(*a.borrow());
      emitter.complete();
    });

    let seen = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..2 {
      let s = seen.clone();
      source
        .clone()
        .subscribe_err(move |v| s.borrow_mut().push(v), |_| {});
    }

    assert_eq!(*attempts.borrow(), 2);
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }
}
