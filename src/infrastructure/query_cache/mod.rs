//! Query cache infrastructure - keyed result cache and observers

mod cache;
mod observer;

pub use cache::{KeySubscription, QueryCache, QueryCacheConfig, QueryEvent, QueryEventKind};
pub use observer::QueryObserver;
