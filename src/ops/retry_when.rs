use std::{
  cell::{Cell, RefCell},
  marker::PhantomData,
  rc::Rc,
};

use crate::{prelude::*, subject::Subject};

pub trait RetryWhen<Err> {
  /// Routes upstream errors into a [`Subject`] handed to `handler`. Each
  /// value the returned notifier emits triggers one resubscription of the
  /// source; a notifier error or completion terminates downstream.
  fn retry_when<F, N, B>(self, handler: F) -> RetryWhenOp<Self, F, Err, B>
  where
    Self: Sized + Clone,
    F: FnOnce(Subject<Err, Err>) -> N,
  {
    RetryWhenOp { source: self, handler, _marker: PhantomData }
  }
}

impl<S, Err> RetryWhen<Err> for S {}

pub struct RetryWhenOp<S, F, Err, B> {
  source: S,
  handler: F,
  _marker: PhantomData<(Err, B)>,
}

impl<S: Clone, F: Clone, Err, B> Clone for RetryWhenOp<S, F, Err, B> {
  fn clone(&self) -> Self {
    RetryWhenOp {
      source: self.source.clone(),
      handler: self.handler.clone(),
      _marker: PhantomData,
    }
  }
}

impl<Item, Err, B, S, F, N> Observable<Item, Err> for RetryWhenOp<S, F, Err, B>
where
  S: Observable<Item, Err> + Clone + 'static,
  F: FnOnce(Subject<Err, Err>) -> N,
  N: Observable<B, Err> + 'static,
  Item: 'static,
  Err: Clone + 'static,
  B: 'static,
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
    let errors = Subject::new();
    let notifier = (self.handler)(errors.clone());
    let ctx = Rc::new(RetryWhenCtx {
      source: self.source,
      errors,
      notifier: RefCell::new(Some(notifier)),
      observer: RefCell::new(observer),
      subscription: subscription.clone(),
      closed,
    });
    let first = ctx.source.clone().actual_subscribe(SourceObserver {
      ctx: ctx.clone(),
      _marker: PhantomData::<B>,
    });
    subscription.add_child(first);
    subscription
  }
}

struct RetryWhenCtx<S, N, O, Err> {
  source: S,
  errors: Subject<Err, Err>,
  // consumed on the first upstream error
  notifier: RefCell<Option<N>>,
  observer: RefCell<O>,
  subscription: Subscription,
  closed: Rc<Cell<bool>>,
}

struct SourceObserver<S, N, O, Err, B> {
  ctx: Rc<RetryWhenCtx<S, N, O, Err>>,
  _marker: PhantomData<B>,
}

impl<Item, Err, B, S, N, O> Observer<Item, Err> for SourceObserver<S, N, O, Err, B>
where
  S: Observable<Item, Err> + Clone + 'static,
  N: Observable<B, Err> + 'static,
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: Clone + 'static,
  B: 'static,
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
    let notifier = self.ctx.notifier.borrow_mut().take();
    if let Some(notifier) = notifier {
      // the notifier must be listening before the first error is routed
      let sub = notifier.actual_subscribe(TriggerObserver {
        ctx: self.ctx.clone(),
        _marker: PhantomData::<(Item, B)>,
      });
      self.ctx.subscription.add_child(sub);
    }
    self.ctx.errors.clone().next(err);
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

struct TriggerObserver<S, N, O, Err, Item, B> {
  ctx: Rc<RetryWhenCtx<S, N, O, Err>>,
  _marker: PhantomData<(Item, B)>,
}

impl<Item, Err, B, S, N, O> Observer<B, Err>
  for TriggerObserver<S, N, O, Err, Item, B>
where
  S: Observable<Item, Err> + Clone + 'static,
  N: Observable<B, Err> + 'static,
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: Clone + 'static,
  B: 'static,
{
  fn next(&mut self, _trigger: B) {
    if self.ctx.closed.get() {
      return;
    }
    let again = self.ctx.source.clone().actual_subscribe(SourceObserver {
      ctx: self.ctx.clone(),
      _marker: PhantomData::<B>,
    });
    self.ctx.subscription.add_child(again);
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
    self.ctx.closed.set(true);
    self.ctx.observer.borrow_mut().complete();
    let mut subscription = self.ctx.subscription.clone();
    subscription.unsubscribe();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.ctx.closed.get() }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  fn failing_then_ok(
    attempts: Rc<Cell<usize>>,
    succeed_on: usize,
  ) -> impl Observable<usize, &'static str> + Clone {
    create(move |emitter: &mut dyn Emitter<usize, &'static str>| {
      let attempt = attempts.get() + 1;
      attempts.set(attempt);
      if attempt < succeed_on {
        emitter.error("try again");
      } else {
        emitter.next(attempt);
        emitter.complete();
      }
    })
  }

  #[test]
  fn each_notifier_value_triggers_one_resubscription() {
    let attempts = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    failing_then_ok(attempts.clone(), 3)
      .retry_when(|errors: Subject<&str, &str>| errors)
      .subscribe_err(move |v| s.borrow_mut().push(v), |_| {});

    assert_eq!(attempts.get(), 3);
    assert_eq!(*seen.borrow(), vec![3]);
  }

  #[test]
  fn delayed_notifier_spaces_the_retries_out() {
    let scheduler = TestScheduler::default();
    let attempts = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    failing_then_ok(attempts.clone(), 2)
      .retry_when({
        let scheduler = scheduler.clone();
        move |errors: Subject<&str, &str>| {
          errors
            .delay_when(move |_| timer((), Duration::from_secs(1), scheduler.clone()))
        }
      })
      .subscribe_err(move |v| s.borrow_mut().push(v), |_| {});

    // the first attempt failed, the retry is parked behind the timer
    assert_eq!(attempts.get(), 1);
    assert!(seen.borrow().is_empty());

    scheduler.advance(Duration::from_secs(1));
    assert_eq!(attempts.get(), 2);
    assert_eq!(*seen.borrow(), vec![2]);
  }

  #[test]
  fn a_notifier_error_terminates_downstream() {
    let attempts = Rc::new(Cell::new(0));
    let errors_seen = Rc::new(RefCell::new(Vec::new()));
    let e = errors_seen.clone();
    let tries = Rc::new(Cell::new(0));
    failing_then_ok(attempts.clone(), 10)
      .retry_when({
        let tries = tries.clone();
        move |errors: Subject<&str, &str>| {
          errors.try_map(move |err| {
            tries.set(tries.get() + 1);
            if tries.get() > 2 {
              Err("gave up")
            } else {
              Ok(err)
            }
          })
        }
      })
      .subscribe_err(|_| {}, move |err| e.borrow_mut().push(err));

    // two retries, then the notifier gives up
    assert_eq!(attempts.get(), 3);
    assert_eq!(*errors_seen.borrow(), vec!["gave up"]);
  }
}
