//! The producer side of a stream.
//!
//! An observable is an immutable, re-runnable description of how to feed
//! values to an observer. Constructing one never starts work; work starts
//! in [`actual_subscribe`](Observable::actual_subscribe), and every
//! subscribe call runs the producer fresh (cold) unless the observable is
//! a [`Connectable`].

use crate::{observer::Observer, subscription::Subscription};

pub mod boxed;
pub mod connectable;
pub mod create;
pub mod from_iter;
pub mod interval;
pub mod of;
pub mod throw;
pub mod timer;

pub use boxed::BoxedObservable;
pub use connectable::Connectable;
pub use create::{create, CreateObservable, Emitter};
pub use from_iter::{from_iter, FromIterObservable};
pub use interval::{interval, IntervalObservable};
pub use of::{of, of_fn, OfFnObservable, OfObservable};
pub use throw::{throw, ThrowObservable};
pub use timer::{timer, TimerObservable};

/// Core stream trait.
///
/// `Item` and `Err` are trait parameters rather than associated types so
/// a source can stay generic over the error type (`of`, `from_iter`,
/// `interval`, `timer`) or the item type (`throw`) and let the chain it
/// is composed into pin the other side by inference.
pub trait Observable<Item, Err>: Sized {
  /// Run the producer against `observer`.
  ///
  /// Consumes `self`; subscribing a cold observable twice means cloning
  /// it first, and the two runs share no state. The returned
  /// [`Subscription`] cancels the producer and, transitively, every
  /// resource the chain holds.
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + 'static;
}
