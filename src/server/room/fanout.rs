//! Delivery of room events to member connections.
//!
//! The fanout only knows how to reach a connection; who is a member is decided
//! by the caller, inside the same room operation that produced the event.

use std::collections::HashMap;

use actix::Recipient;
use log::debug;

use crate::server::gateway::messages::ServerEvent;
use crate::space::types::ConnectionId;

#[derive(Default)]
pub struct Fanout {
    recipients: HashMap<ConnectionId, Recipient<ServerEvent>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, connection_id: ConnectionId, recipient: Recipient<ServerEvent>) {
        self.recipients.insert(connection_id, recipient);
    }

    pub fn unsubscribe(&mut self, connection_id: &ConnectionId) -> bool {
        self.recipients.remove(connection_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Connections whose session actor has gone away.
    pub fn disconnected(&self) -> Vec<ConnectionId> {
        self.recipients
            .iter()
            .filter(|(_, recipient)| !recipient.connected())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Queue `event` on one connection. Returns false if it cannot be reached.
    pub fn send_to(&self, connection_id: &ConnectionId, event: ServerEvent) -> bool {
        match self.recipients.get(connection_id) {
            Some(recipient) if recipient.connected() => {
                recipient.do_send(event);
                true
            }
            _ => {
                debug!("[Fanout] Dropped event for unreachable connection {}", connection_id);
                false
            }
        }
    }

    /// Queue `event` on every member except `exclude`. Each recipient's mailbox
    /// is FIFO, so one connection sees events in broadcast order.
    /// Returns how many connections the event was queued for.
    pub fn broadcast<'a>(
        &self,
        members: impl IntoIterator<Item = &'a ConnectionId>,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        members
            .into_iter()
            .filter(|id| Some(*id) != exclude)
            .filter(|id| self.send_to(id, event.clone()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, StopProbe};

    #[actix_web::test]
    async fn broadcast_skips_the_excluded_member() {
        let (a, mut rx_a) = Probe::spawn();
        let (b, mut rx_b) = Probe::spawn();
        let mut fanout = Fanout::new();
        fanout.subscribe(a.connection_id, a.probe.clone().recipient());
        fanout.subscribe(b.connection_id, b.probe.clone().recipient());

        let event = ServerEvent::UserLeft { user_id: "carol".into() };
        let members = [a.connection_id, b.connection_id];
        assert_eq!(fanout.broadcast(&members, &event, Some(&a.connection_id)), 1);
        assert_eq!(rx_b.next_event().await, Some(event));
        rx_a.assert_silent().await;
    }

    #[actix_web::test]
    async fn only_listed_members_receive() {
        let (a, mut rx_a) = Probe::spawn();
        let mut fanout = Fanout::new();
        fanout.subscribe(a.connection_id, a.probe.clone().recipient());

        assert_eq!(fanout.broadcast(&[] as &[ConnectionId], &ServerEvent::UserLeft { user_id: "x".into() }, None), 0);
        rx_a.assert_silent().await;
        assert!(fanout.unsubscribe(&a.connection_id));
        assert!(!fanout.unsubscribe(&a.connection_id));
        assert!(fanout.is_empty());
    }

    #[actix_web::test]
    async fn stopped_sessions_are_reported_disconnected() {
        let (a, _rx_a) = Probe::spawn();
        let (b, _rx_b) = Probe::spawn();
        let mut fanout = Fanout::new();
        fanout.subscribe(a.connection_id, a.probe.clone().recipient());
        fanout.subscribe(b.connection_id, b.probe.clone().recipient());

        a.probe.send(StopProbe).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(fanout.disconnected(), vec![a.connection_id]);
        assert!(!fanout.send_to(&a.connection_id, ServerEvent::UserLeft { user_id: "x".into() }));
        assert_eq!(fanout.len(), 2);
    }
}
