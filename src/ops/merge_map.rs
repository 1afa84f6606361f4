use std::{
  cell::{Cell, RefCell},
  marker::PhantomData,
  rc::Rc,
};

use crate::prelude::*;

pub trait MergeMap<Item, Err> {
  /// Maps each value to an inner observable and interleaves every inner
  /// emission downstream. Completes once the outer source and all inner
  /// streams have completed; the first error wins and closes everything.
  fn merge_map<B, F, Inner>(self, f: F) -> MergeMapOp<Self, F, Item, Err>
  where
    Self: Sized,
    F: FnMut(Item) -> Inner,
    Inner: Observable<B, Err>,
  {
    MergeMapOp { source: self, func: f, _marker: PhantomData }
  }
}

impl<S, Item, Err> MergeMap<Item, Err> for S {}

pub struct MergeMapOp<S, F, Item, Err> {
  source: S,
  func: F,
  _marker: PhantomData<(Item, Err)>,
}

impl<S: Clone, F: Clone, Item, Err> Clone for MergeMapOp<S, F, Item, Err> {
  fn clone(&self) -> Self {
    MergeMapOp {
      source: self.source.clone(),
      func: self.func.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, B, Err, S, F, Inner> Observable<B, Err> for MergeMapOp<S, F, Item, Err>
where
  S: Observable<Item, Err>,
  F: FnMut(Item) -> Inner + 'static,
  Inner: Observable<B, Err> + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<B, Err> + 'static,
  {
    let subscription = Subscription::new();
    let closed = Rc::new(Cell::new(false));
    {
      let closed = closed.clone();
      subscription.add(move || closed.set(true));
    }
    let ctx = Rc::new(MergeCtx {
      observer: RefCell::new(observer),
      subscription: subscription.clone(),
      active: Cell::new(0),
      outer_done: Cell::new(false),
      closed,
    });
    let upstream = self.source.actual_subscribe(OuterObserver {
      ctx,
      func: self.func,
      _marker: PhantomData::<B>,
    });
    subscription.add_child(upstream);
    subscription
  }
}

struct MergeCtx<O> {
  observer: RefCell<O>,
  subscription: Subscription,
  // inner streams subscribed but not yet complete
  active: Cell<usize>,
  outer_done: Cell<bool>,
  closed: Rc<Cell<bool>>,
}

struct OuterObserver<O, F, B> {
  ctx: Rc<MergeCtx<O>>,
  func: F,
  _marker: PhantomData<B>,
}

impl<Item, B, Err, O, F, Inner> Observer<Item, Err> for OuterObserver<O, F, B>
where
  O: Observer<B, Err> + 'static,
  F: FnMut(Item) -> Inner + 'static,
  Inner: Observable<B, Err> + 'static,
  Item: 'static,
  B: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    if self.ctx.closed.get() {
      return;
    }
    let inner = (self.func)(value);
    self.ctx.active.set(self.ctx.active.get() + 1);
    let sub = inner.actual_subscribe(InnerObserver {
      ctx: self.ctx.clone(),
      _marker: PhantomData::<B>,
    });
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
    if self.ctx.active.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().complete();
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() }
}

struct InnerObserver<O, B> {
  ctx: Rc<MergeCtx<O>>,
  _marker: PhantomData<B>,
}

impl<B, Err, O> Observer<B, Err> for InnerObserver<O, B>
where
  O: Observer<B, Err> + 'static,
  B: 'static,
  Err: 'static,
{
  fn next(&mut self, value: B) {
    if !self.ctx.closed.get() {
      self.ctx.observer.borrow_mut().next(value);
    }
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
    self.ctx.active.set(self.ctx.active.get() - 1);
    if self.ctx.outer_done.get() && self.ctx.active.get() == 0 {
      self.ctx.closed.set(true);
      self.ctx.observer.borrow_mut().complete();
      let mut subscription = self.ctx.subscription.clone();
      subscription.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() }
}
