//! Operators, each behind a blanket extension trait so any observable
//! picks them up from the prelude.

pub mod box_it;
pub mod catch_error;
pub mod delay_when;
pub mod map;
pub mod merge_map;
pub mod publish;
pub mod retry;
pub mod retry_when;
pub mod tap;
pub mod try_map;

pub use box_it::BoxIt;
pub use catch_error::{CatchError, CatchErrorOp};
pub use delay_when::{DelayWhen, DelayWhenOp};
pub use map::{Map, MapOp};
pub use merge_map::{MergeMap, MergeMapOp};
pub use publish::Publish;
pub use retry::{Retry, RetryOp};
pub use retry_when::{RetryWhen, RetryWhenOp};
pub use tap::{Tap, TapOp};
pub use try_map::{TryMap, TryMapOp};
