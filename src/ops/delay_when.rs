use std::{
  cell::{Cell, RefCell},
  marker::PhantomData,
  rc::Rc,
};

use crate::prelude::*;

pub trait DelayWhen<Item, Err> {
  /// Holds each value until the duration observable built for it emits,
  /// then releases it. Values are delivered in release order, which may
  /// differ from arrival order.
  fn delay_when<F, D, B>(self, selector: F) -> DelayWhenOp<Self, F, Item, Err, B>
  where
    Self: Sized,
    F: FnMut(&Item) -> D,
    D: Observable<B, Err>,
  {
    DelayWhenOp { source: self, selector, _marker: PhantomData }
  }
}

impl<S, Item, Err> DelayWhen<Item, Err> for S {}

pub struct DelayWhenOp<S, F, Item, Err, B> {
  source: S,
  selector: F,
  _marker: PhantomData<(Item, Err, B)>,
}

impl<S: Clone, F: Clone, Item, Err, B> Clone for DelayWhenOp<S, F, Item, Err, B> {
  fn clone(&self) -> Self {
    DelayWhenOp {
      source: self.source.clone(),
      selector: self.selector.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, B, Err, S, F, D> Observable<Item, Err> for DelayWhenOp<S, F, Item, Err, B>
where
  S: Observable<Item, Err>,
  F: FnMut(&Item) -> D + 'static,
  D: Observable<B, Err> + 'static,
  Item: 'static,
  B: 'static,
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
    let ctx = Rc::new(DelayCtx {
      observer: RefCell::new(observer),
      subscription: subscription.clone(),
      pending: Cell::new(0),
      outer_done: Cell::new(false),
      closed,
    });
    let upstream = self.source.actual_subscribe(OuterObserver {
      ctx,
      selector: self.selector,
      _marker: PhantomData::<B>,
    });
    subscription.add_child(upstream);
    subscription
  }
}

struct DelayCtx<O> {
  observer: RefCell<O>,
  subscription: Subscription,
  // values held back, waiting on their duration stream
  pending: Cell<usize>,
  outer_done: Cell<bool>,
  closed: Rc<Cell<bool>>,
}

struct OuterObserver<O, F, B> {
  ctx: Rc<DelayCtx<O>>,
  selector: F,
  _marker: PhantomData<B>,
}

impl<Item, B, Err, O, F, D> Observer<Item, Err> for OuterObserver<O, F, B>
where
  O: Observer<Item, Err> + 'static,
  F: FnMut(&Item) -> D + 'static,
  D: Observable<B, Err> + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    if self.ctx.closed.get() {
      return;
    }
    let duration = (self.selector)(&value);
    self.ctx.pending.set(self.ctx.pending.get() + 1);
    let inner = Rc::new(RefCell::new(None));
    let sub = duration.actual_subscribe(ReleaseObserver {
      ctx: self.ctx.clone(),
      value: Some(value),
      settled: false,
      inner: inner.clone(),
      _marker: PhantomData::<B>,
    });
    // slot stays empty when the duration finished synchronously
    *inner.borrow_mut() = Some(sub.clone());
    self.ctx.subscription.add_child(sub);
  }

  fn error(&mut self, err: Err) {
    if self.ctx.closed.get() {
      return;
    }
    self.ctx.closed.set(true);
    self.ctx.observer.borrow_mut().error(err);
    let mut subscription = self.ctx.subscription.clone();
    subscription.unsubscribe();
  }

  fn complete(&mut self) {
    if self.ctx.closed.get() {
      return;
    }
    self.ctx.outer_done.set(true);
    if self.ctx.pending.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().complete();
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() }
}

struct ReleaseObserver<O, Item, B> {
  ctx: Rc<DelayCtx<O>>,
  value: Option<Item>,
  settled: bool,
  inner: Rc<RefCell<Option<Subscription>>>,
  _marker: PhantomData<B>,
}

impl<Item, B, Err, O> Observer<B, Err> for ReleaseObserver<O, Item, B>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn next(&mut self, _trigger: B) {
    if self.ctx.closed.get() || self.settled {
      return;
    }
    self.settled = true;
    let value = match self.value.take() {
      Some(value) => value,
      None => return,
    };
    self.ctx.pending.set(self.ctx.pending.get() - 1);
    self.ctx.observer.borrow_mut().next(value);
    if let Some(mut sub) = self.inner.borrow_mut().take() {
      sub.unsubscribe();
    }
    if self.ctx.outer_done.get() && self.ctx.pending.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().complete();
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    }
  }

  fn error(&mut self, err: Err) {
    if self.ctx.closed.get() || self.settled {
      return;
    }
    self.settled = true;
    self.ctx.closed.set(true);
    self.ctx.observer.borrow_mut().error(err);
    let mut subscription = self.ctx.subscription.clone();
    subscription.unsubscribe();
  }

  fn complete(&mut self) {
    // a duration that completes without emitting drops its value
    if self.ctx.closed.get() || self.settled {
      return;
    }
    self.settled = true;
    self.value = None;
    self.ctx.pending.set(self.ctx.pending.get() - 1);
    if self.ctx.outer_done.get() && self.ctx.pending.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().complete();
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() || self.settled }
}
