use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use crate::prelude::*;

pub trait Retry {
  /// Resubscribes a cloneable source up to `count` extra times when it
  /// errors, forwarding the last error once the budget is spent.
  fn retry(self, count: usize) -> RetryOp<Self>
  where
    Self: Sized + Clone,
  {
    RetryOp { source: self, count }
  }
}

impl<S> Retry for S {}

#[derive(Clone)]
pub struct RetryOp<S> {
  source: S,
  count: usize,
}

impl<Item, Err, S> Observable<Item, Err> for RetryOp<S>
where
  S: Observable<Item, Err> + Clone + 'static,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static,
  {
    let subscription = Subscription::new();
    let closed = Rc::new(Cell::new(false));
    {
      let closed = closed.clone();
      subscription.add(move || closed.set(true));
    }
    let ctx = Rc::new(RetryCtx {
      source: self.source,
      observer: RefCell::new(observer),
      subscription: subscription.clone(),
      retries_left: Cell::new(self.count),
      closed,
    });
    let first = ctx
      .source
      .clone()
      .actual_subscribe(RetryObserver { ctx: ctx.clone() });
    subscription.add_child(first);
    subscription
  }
}

struct RetryCtx<S, O> {
  source: S,
  observer: RefCell<O>,
  subscription: Subscription,
  retries_left: Cell<usize>,
  closed: Rc<Cell<bool>>,
}

struct RetryObserver<S, O> {
  ctx: Rc<RetryCtx<S, O>>,
}

impl<Item, Err, S, O> Observer<Item, Err> for RetryObserver<S, O>
where
  S: Observable<Item, Err> + Clone + 'static,
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    if !self.ctx.closed.get() {
      self.ctx.observer.borrow_mut().next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if self.ctx.closed.get() {
      return;
    }
    if self.ctx.retries_left.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().error(err);
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    } else {
      self.ctx.retries_left.set(self.ctx.retries_left.get() - 1);
      let again = self
        .ctx
        .source
        .clone()
        .actual_subscribe(RetryObserver { ctx: self.ctx.clone() });
      self.ctx.subscription.add_child(again);
    }
  }

  fn complete(&mut self) {
    if self.ctx.closed.get() {
      return;
    }
    self.ctx.closed.set(true);
    self.ctx.observer.borrow_mut().complete();
    let mut subscription = self.ctx.subscription.clone();
    subscription.unsubscribe();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() }
}
