use std::marker::PhantomData;

use crate::prelude::*;

pub trait CatchError<Err> {
  /// Swaps an erroring source for the fallback observable the handler
  /// builds from the error value.
  fn catch_error<F, C>(self, handler: F) -> CatchErrorOp<Self, F, Err>
  where
    Self: Sized,
    F: FnOnce(Err) -> C,
  {
    CatchErrorOp { source: self, handler, _marker: PhantomData }
  }
}

impl<S, Err> CatchError<Err> for S {}

pub struct CatchErrorOp<S, F, ErrIn> {
  source: S,
  handler: F,
  _marker: PhantomData<ErrIn>,
}

impl<S: Clone, F: Clone, ErrIn> Clone for CatchErrorOp<S, F, ErrIn> {
  fn clone(&self) -> Self {
    CatchErrorOp {
      source: self.source.clone(),
      handler: self.handler.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, ErrIn, Err, S, F, C> Observable<Item, Err> for CatchErrorOp<S, F, ErrIn>
where
  S: Observable<Item, ErrIn>,
  F: FnOnce(ErrIn) -> C + 'static,
  C: Observable<Item, Err> + 'static,
  Item: 'static,
  ErrIn: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let subscription = Subscription::new();
    let upstream = self.source.actual_subscribe(CatchErrorObserver {
      observer: Some(observer),
      handler: Some(self.handler),
      subscription: subscription.clone(),
      _marker: PhantomData::<Err>,
    });
    subscription.add_child(upstream);
    subscription
  }
}

pub struct CatchErrorObserver<O, F, Err> {
  observer: Option<O>,
  handler: Option<F>,
  subscription: Subscription,
  _marker: PhantomData<Err>,
}

impl<Item, ErrIn, Err, O, F, C> Observer<Item, ErrIn>
  for CatchErrorObserver<O, F, Err>
where
  O: Observer<Item, Err> + 'static,
  F: FnOnce(ErrIn) -> C,
  C: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: ErrIn) {
    let taken = (self.handler.take(), self.observer.take());
    if let (Some(handler), Some(observer)) = taken {
      let fallback = handler(err);
      let sub = fallback.actual_subscribe(observer);
      self.subscription.add_child(sub);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool {
    self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn replaces_an_error_with_the_fallback_stream() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    throw(404)
      .catch_error(|code: i32| of(format!("caught:{code}")))
      .subscribe_err(move |v| s.borrow_mut().push(v), |_: &str| {});

    assert_eq!(*seen.borrow(), vec!["caught:404"]);
  }

  #[test]
  fn a_clean_source_never_invokes_the_handler() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    from_iter(1..=3)
      .catch_error(|_: &str| of(99))
      .subscribe_err(move |v| s.borrow_mut().push(v), |_: &str| {});

    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
  }

  #[test]
  fn values_before_the_error_still_flow() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    create(|emitter: &mut dyn Emitter<i32, &str>| {
      emitter.next(1);
      emitter.error("late failure");
    })
    .catch_error(|_| from_iter(vec![8, 9]))
    .subscribe_err(move |v| s.borrow_mut().push(v), |_: &str| {});

    assert_eq!(*seen.borrow(), vec![1, 8, 9]);
  }

  #[test]
  fn the_fallback_can_change_the_error_type() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let e = errors.clone();
    throw::<i32, _>("text error")
      .catch_error(|_: &str| throw::<i32, _>(500u16))
      .subscribe_err(|_| {}, move |code| e.borrow_mut().push(code));

    assert_eq!(*errors.borrow(), vec![500u16]);
  }
}
