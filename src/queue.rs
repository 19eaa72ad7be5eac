use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::Instrument;

mod nsq;

pub(crate) use nsq::NsqSource;

/// A message handed out by the queue, to be finished or requeued exactly once.
pub(crate) trait Delivery: Send + 'static {
    fn body(&self) -> &[u8];
    /// 1 on first delivery
    fn attempt(&self) -> u16;
    fn finish(self) -> impl Future<Output = ()> + Send;
    fn requeue(self) -> impl Future<Output = ()> + Send;
}

pub(crate) trait MessageSource: Send + 'static {
    type Delivery: Delivery;
    /// Next message, or `None` once the subscription is gone.
    fn next(&mut self) -> impl Future<Output = Option<Self::Delivery>> + Send;
}

pub(crate) trait Handler: Send + Sync + 'static {
    fn handle(&self, body: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ConsumerOptions {
    /// Messages processed concurrently
    pub workers: NonZeroUsize,
    /// Finish instead of requeue after this many failed attempts (0: never give up)
    pub max_attempts: u16,
}

/// Feed messages from `source` to `handler` until the source is exhausted.
///
/// A message is finished when handling succeeds and requeued when it fails,
/// so side effects of a partially handled message may be repeated on redelivery.
pub(crate) async fn consume<S, H>(source: S, handler: Arc<H>, options: ConsumerOptions) -> Result<()>
where
    S: MessageSource,
    H: Handler,
{
    let source = Arc::new(Mutex::new(source));
    let mut set = JoinSet::new();
    for worker in 0..options.workers.get() {
        let source = Arc::clone(&source);
        let handler = Arc::clone(&handler);
        set.spawn(
            async move {
                loop {
                    // lock is only held while waiting for the next message
                    let next = source.lock().await.next().await;
                    let Some(delivery) = next else { break };
                    process(&*handler, delivery, options.max_attempts).await;
                }
            }
            .instrument(tracing::info_span!("worker", worker)),
        );
    }
    while let Some(res) = set.join_next().await {
        res?;
    }
    Ok(())
}

async fn process<H, D>(handler: &H, delivery: D, max_attempts: u16)
where
    H: Handler,
    D: Delivery,
{
    let attempt = delivery.attempt();
    let result = AssertUnwindSafe(handler.handle(delivery.body()))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(anyhow!("message handler panicked")));
    match result {
        Ok(()) => delivery.finish().await,
        Err(error) if max_attempts != 0 && attempt >= max_attempts => {
            tracing::error!("Giving up on message after {attempt} attempts: {error:#}");
            delivery.finish().await;
        }
        Err(error) => {
            tracing::error!("Requeueing message (attempt {attempt}): {error:#}");
            delivery.requeue().await;
        }
    }
}
