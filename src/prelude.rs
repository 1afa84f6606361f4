pub use crate::observable;
pub use crate::observable::{
  create, from_iter, interval, of, of_fn, throw, timer, BoxedObservable,
  Connectable, CreateObservable, Emitter, FromIterObservable,
  IntervalObservable, Observable, OfFnObservable, OfObservable,
  ThrowObservable, TimerObservable,
};
pub use crate::observer::{Observer, ObserverAll};
pub use crate::ops::{
  BoxIt, CatchError, DelayWhen, Map, MergeMap, Publish, Retry, RetryWhen,
  Tap, TryMap,
};
pub use crate::scheduler::{
  test_scheduler::TestScheduler, Duration, Scheduler, TaskHandle,
};
pub use crate::subject::Subject;
pub use crate::subscribable::{SubscribeAll, SubscribeErr, SubscribePure};
pub use crate::subscription::{Subscription, SubscriptionLike};
