//! Subscription handles returned from `Observable::actual_subscribe`.
//!
//! A [`Subscription`] owns the teardown logic of one active
//! observer-to-producer link: timer cancellations, inner subscriptions
//! spawned by operators, subject slot removals. Unsubscribing is
//! idempotent and tears children down in reverse registration order.

use std::{cell::RefCell, fmt, mem, rc::Rc};

use smallvec::SmallVec;

/// Anything that can be cancelled exactly once.
pub trait SubscriptionLike {
  /// Cancel the link. Calling this more than once is a no-op.
  fn unsubscribe(&mut self);

  /// `true` once [`unsubscribe`](SubscriptionLike::unsubscribe) has run or
  /// the producer reached a terminal event.
  fn is_closed(&self) -> bool;
}

/// Shared, clonable subscription handle.
///
/// Every clone refers to the same teardown list; unsubscribing any clone
/// closes them all. Children added after the handle is closed are torn
/// down immediately.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner>>);

struct Inner {
  closed: bool,
  teardown: SmallVec<[Box<dyn SubscriptionLike>; 1]>,
}

impl Default for Inner {
  fn default() -> Self { Inner { closed: false, teardown: SmallVec::new() } }
}

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A handle that is already closed; returned by synchronous sources
  /// whose producer finished inside the subscribe call.
  pub fn closed() -> Self {
    Subscription(Rc::new(RefCell::new(Inner {
      closed: true,
      teardown: SmallVec::new(),
    })))
  }

  /// Register a cleanup closure. Runs exactly once: either when this
  /// subscription is unsubscribed (in reverse registration order), or
  /// immediately if it is already closed.
  pub fn add(&self, teardown: impl FnOnce() + 'static) {
    self.add_child(TeardownFn::new(teardown));
  }

  /// Register a child subscription to be cancelled with this one.
  pub fn add_child(&self, mut child: impl SubscriptionLike + 'static) {
    if child.is_closed() {
      return;
    }
    let closed = self.0.borrow().closed;
    if closed {
      child.unsubscribe();
    } else {
      let mut inner = self.0.borrow_mut();
      inner.teardown.retain(|t| !t.is_closed());
      inner.teardown.push(Box::new(child));
    }
  }
}

impl SubscriptionLike for Subscription {
  fn unsubscribe(&mut self) {
    // Drain under the borrow, run outside it: a teardown may re-enter
    // this same handle through an operator's shared state.
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      mem::take(&mut inner.teardown)
    };
    for mut t in teardown.into_iter().rev() {
      t.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// Adapter turning a cleanup closure into a [`SubscriptionLike`].
pub struct TeardownFn<F>(Option<F>);

impl<F> TeardownFn<F> {
  pub fn new(f: F) -> Self { TeardownFn(Some(f)) }
}

impl<F: FnOnce()> SubscriptionLike for TeardownFn<F> {
  fn unsubscribe(&mut self) {
    if let Some(f) = self.0.take() {
      f();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_none() }
}
