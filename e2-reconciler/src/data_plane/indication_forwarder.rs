/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Worker that moves queued indications to the downstream [`IndicationSink`].

use crate::data_plane::indication_listener::IndicationEvent;
use crate::engine::IndicationSink;
use crate::observability::events;
use crate::runtime::worker_runtime::spawn_forwarding_loop;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const COMPONENT: &str = "indication_forwarder";

pub(crate) struct IndicationForwarder {
    cancel: CancellationToken,
    task: JoinHandle<u64>,
}

impl IndicationForwarder {
    pub(crate) fn start(sink: Arc<dyn IndicationSink>, receiver: Receiver<IndicationEvent>) -> Self {
        let cancel = CancellationToken::new();
        let task = spawn_forwarding_loop(sink, receiver, cancel.clone(), Self::forwarding_loop);
        Self { cancel, task }
    }

    /// Forwards events until cancelled or every sender is gone, then flushes what is already
    /// queued. Returns the number of events handed to the sink.
    pub(crate) async fn forwarding_loop(
        sink: Arc<dyn IndicationSink>,
        mut receiver: Receiver<IndicationEvent>,
        cancel: CancellationToken,
    ) -> u64 {
        let mut forwarded = 0u64;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = receiver.recv() => match event {
                    Some(event) => {
                        sink.on_indication(event).await;
                        forwarded += 1;
                    }
                    None => break,
                },
            }
        }

        receiver.close();
        while let Ok(event) = receiver.try_recv() {
            sink.on_indication(event).await;
            forwarded += 1;
        }

        info!(
            event = events::FORWARDER_STOPPED,
            component = COMPONENT,
            forwarded,
            "indication forwarder stopped"
        );
        forwarded
    }

    /// Stops the worker and waits for the flush to finish.
    pub(crate) async fn stop(self) -> Result<u64, tokio::task::JoinError> {
        debug!(component = COMPONENT, "stopping indication forwarder");
        self.cancel.cancel();
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::IndicationForwarder;
    use crate::control_plane::subscription_key::SubscriptionKey;
    use crate::data_plane::indication_listener::{Indication, IndicationEvent};
    use crate::node_id::{NodeId, RanType};
    use crate::service_model::ServiceModel;
    use crate::test_support::CollectingSink;
    use std::sync::Arc;

    fn event(timestamp_us: i64) -> IndicationEvent {
        let node = NodeId::new("001", "01", 1, RanType::Gnb);
        IndicationEvent {
            key: SubscriptionKey::new(node.clone(), ServiceModel::Mac),
            indication: Indication {
                node,
                service_model: ServiceModel::Mac,
                timestamp_us,
                payload: Vec::new(),
            },
            received_at_us: timestamp_us + 10,
        }
    }

    #[tokio::test]
    async fn stop_flushes_events_already_queued() {
        let sink = Arc::new(CollectingSink::default());
        let (tx, rx) = tokio::sync::mpsc::channel(8);

        for timestamp in 0..3 {
            tx.try_send(event(timestamp)).unwrap();
        }

        let forwarder = IndicationForwarder::start(sink.clone(), rx);
        let forwarded = forwarder.stop().await.unwrap();

        assert_eq!(forwarded, 3);
        let timestamps: Vec<i64> = sink
            .events()
            .await
            .iter()
            .map(|event| event.indication.timestamp_us)
            .collect();
        assert_eq!(timestamps, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn loop_ends_when_all_senders_are_dropped() {
        let sink = Arc::new(CollectingSink::default());
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tx.try_send(event(5)).unwrap();
        drop(tx);

        let forwarded = IndicationForwarder::forwarding_loop(
            sink.clone(),
            rx,
            tokio_util::sync::CancellationToken::new(),
        )
        .await;

        assert_eq!(forwarded, 1);
        assert_eq!(sink.events().await.len(), 1);
    }
}
