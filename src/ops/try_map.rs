use std::marker::PhantomData;

use crate::prelude::*;

pub trait TryMap<Item> {
  /// Like `map`, but a failed conversion errors the stream and tears the
  /// upstream producer down.
  fn try_map<B, Err, F>(self, f: F) -> TryMapOp<Self, F, Item, Err>
  where
    Self: Sized,
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp { source: self, func: f, _marker: PhantomData }
  }
}

impl<S, Item> TryMap<Item> for S {}

pub struct TryMapOp<S, F, Item, Err> {
  source: S,
  func: F,
  _marker: PhantomData<(Item, Err)>,
}

impl<S: Clone, F: Clone, Item, Err> Clone for TryMapOp<S, F, Item, Err> {
  fn clone(&self) -> Self {
    TryMapOp {
      source: self.source.clone(),
      func: self.func.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, B, Err, S, F> Observable<B, Err> for TryMapOp<S, F, Item, Err>
where
  S: Observable<Item, Err>,
  F: FnMut(Item) -> Result<B, Err> + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<B, Err> + 'static,
  {
    let subscription = Subscription::new();
    let upstream = self.source.actual_subscribe(TryMapObserver {
      observer,
      func: self.func,
      subscription: subscription.clone(),
      errored: false,
    });
    subscription.add_child(upstream);
    subscription
  }
}

pub struct TryMapObserver<O, F> {
  observer: O,
  func: F,
  subscription: Subscription,
  errored: bool,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.errored {
      return;
    }
    match (self.func)(value) {
      Ok(mapped) => self.observer.next(mapped),
      Err(err) => {
        self.errored = true;
        self.observer.error(err);
        let mut subscription = self.subscription.clone();
        subscription.unsubscribe();
      }
    }
  }

  fn error(&mut self, err: Err) {
    if !self.errored {
      self.errored = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.errored {
      self.observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.errored || self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn successful_conversions_flow_downstream() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    from_iter(vec!["1", "2", "3"])
      .try_map(|v: &str| v.parse::<i32>().map_err(|_| "bad number"))
      .subscribe_err(move |v| s.borrow_mut().push(v), |_: &str| {});

    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
  }

  #[test]
  fn a_failure_errors_the_stream_and_stops_emission() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let errors = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let e = errors.clone();
    from_iter(vec!["1", "x", "3"])
      .try_map(|v: &str| v.parse::<i32>().map_err(|_| "bad number"))
      .subscribe_err(
        move |v| s.borrow_mut().push(v),
        move |err| e.borrow_mut().push(err),
      );

    // "3" is never parsed, the chain closed on "x".
    assert_eq!(*seen.borrow(), vec![1]);
    assert_eq!(*errors.borrow(), vec!["bad number"]);
  }

  #[test]
  fn a_failure_tears_the_upstream_producer_down() {
    let scheduler = TestScheduler::default();
    let hits = Rc::new(RefCell::new(Vec::new()));
    let h = hits.clone();
    interval(Duration::from_millis(10), scheduler.clone())
      .try_map(|n: usize| if n < 2 { Ok(n) } else { Err("too big") })
      .subscribe_err(move |v| h.borrow_mut().push(v), |_| {});

    scheduler.advance(Duration::from_millis(100));
    assert_eq!(*hits.borrow(), vec![0, 1]);
  }
}
