use std::collections::HashSet;
use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use tokio_nsq::{
    NSQChannel, NSQConsumer, NSQConsumerConfig, NSQConsumerConfigSources,
    NSQConsumerLookupConfig, NSQMessage, NSQRequeueDelay, NSQTopic,
};

use super::{Delivery, MessageSource};

/// Subscription to an NSQ topic/channel discovered through nsqlookupd.
pub(crate) struct NsqSource {
    consumer: NSQConsumer,
}

impl NsqSource {
    pub(crate) fn connect(
        lookupd_addr: &str,
        topic: &str,
        channel: &str,
        max_in_flight: NonZeroUsize,
    ) -> Result<Self> {
        let topic = NSQTopic::new(topic).with_context(|| format!("invalid NSQ topic {topic:?}"))?;
        let channel =
            NSQChannel::new(channel).with_context(|| format!("invalid NSQ channel {channel:?}"))?;
        let lookup = NSQConsumerLookupConfig::new()
            .set_addresses(HashSet::from([lookupd_url(lookupd_addr)]));
        let consumer = NSQConsumerConfig::new(topic, channel)
            .set_max_in_flight(u32::try_from(max_in_flight.get()).unwrap_or(u32::MAX))
            .set_sources(NSQConsumerConfigSources::Lookup(lookup))
            .build();
        Ok(Self { consumer })
    }
}

/// nsqlookupd is queried over HTTP; accept bare `host:port` like the nsq tools do.
fn lookupd_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_owned()
    } else {
        format!("http://{addr}")
    }
}

pub(crate) struct NsqDelivery(NSQMessage);

impl Delivery for NsqDelivery {
    fn body(&self) -> &[u8] {
        &self.0.body
    }

    fn attempt(&self) -> u16 {
        self.0.attempt
    }

    async fn finish(self) {
        self.0.finish().await;
    }

    async fn requeue(self) {
        self.0.requeue(NSQRequeueDelay::DefaultDelay).await;
    }
}

impl MessageSource for NsqSource {
    type Delivery = NsqDelivery;

    async fn next(&mut self) -> Option<NsqDelivery> {
        self.consumer.consume_filtered().await.map(NsqDelivery)
    }
}
