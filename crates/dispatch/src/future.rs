use std::future::Future;
use std::pin::Pin;

/// Boxed `Send` future returned by async update actions.
pub type BoxFutureSend<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
