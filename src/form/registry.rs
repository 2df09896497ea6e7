use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, Weak};

use super::controller::{FormError, FormResult, read_lock, write_lock};
use crate::id::{ChannelKey, SubscriberHandle};

pub(super) type SubscriberFn = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Default)]
struct RegistryState {
    channels: BTreeMap<ChannelKey, BTreeMap<SubscriberHandle, SubscriberFn>>,
    claimed: BTreeSet<ChannelKey>,
    next_handle: u64,
}

impl RegistryState {
    fn allocate_handle(&mut self, channel: &ChannelKey) -> SubscriberHandle {
        loop {
            self.next_handle = self.next_handle.wrapping_add(1);
            let handle = SubscriberHandle(self.next_handle);
            let taken = self
                .channels
                .get(channel)
                .is_some_and(|subscribers| subscribers.contains_key(&handle));
            if !taken {
                return handle;
            }
        }
    }

    fn remove(&mut self, channel: &ChannelKey, handle: SubscriberHandle) -> bool {
        let Some(subscribers) = self.channels.get_mut(channel) else {
            return false;
        };
        let removed = subscribers.remove(&handle).is_some();
        if subscribers.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }
}

/// Channel-keyed rendezvous between fields and the form that submits them.
///
/// Clones share the same underlying state, so one registry is created by the
/// application and handed to every form it mounts.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &self,
        channel: impl Into<ChannelKey>,
        subscriber: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Subscription {
        let channel = channel.into();
        let handle = {
            let mut state = write_lock(&self.state);
            let handle = state.allocate_handle(&channel);
            state
                .channels
                .entry(channel.clone())
                .or_default()
                .insert(handle, Arc::new(subscriber));
            handle
        };
        tracing::trace!(channel = %channel, handle = ?handle, "subscriber bound");
        Subscription {
            state: Arc::downgrade(&self.state),
            channel,
            handle,
            active: true,
        }
    }

    /// Runs every subscriber on `channel` and ANDs their results.
    ///
    /// All subscribers run even after one fails. A channel with no
    /// subscribers passes.
    pub fn emit(&self, channel: impl Into<ChannelKey>) -> bool {
        let channel = channel.into();
        let subscribers = {
            let state = read_lock(&self.state);
            state
                .channels
                .get(&channel)
                .map(|subscribers| subscribers.values().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        };

        let mut valid = true;
        for subscriber in &subscribers {
            if !subscriber() {
                valid = false;
            }
        }
        tracing::trace!(
            channel = %channel,
            subscribers = subscribers.len(),
            valid,
            "channel emitted"
        );
        valid
    }

    pub fn subscriber_count(&self, channel: impl Into<ChannelKey>) -> usize {
        let channel = channel.into();
        read_lock(&self.state)
            .channels
            .get(&channel)
            .map_or(0, BTreeMap::len)
    }

    pub fn has_subscribers(&self, channel: impl Into<ChannelKey>) -> bool {
        self.subscriber_count(channel) > 0
    }

    /// Reserves `channel` for a single owner until the returned claim drops.
    pub fn claim(&self, channel: impl Into<ChannelKey>) -> FormResult<ChannelClaim> {
        let channel = channel.into();
        let mut state = write_lock(&self.state);
        if !state.claimed.insert(channel.clone()) {
            return Err(FormError::DuplicateFormId(channel.to_string()));
        }
        Ok(ChannelClaim {
            state: Arc::downgrade(&self.state),
            channel,
        })
    }
}

#[must_use = "dropping a Subscription unbinds it; call `detach` to keep it bound"]
pub struct Subscription {
    state: Weak<RwLock<RegistryState>>,
    channel: ChannelKey,
    handle: SubscriberHandle,
    active: bool,
}

impl Subscription {
    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }

    pub fn handle(&self) -> SubscriberHandle {
        self.handle
    }

    /// Removes exactly this subscriber. Returns whether it was still bound.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// Leaves the subscriber bound for as long as the registry lives.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return false;
        }
        let Some(state) = self.state.upgrade() else {
            return false;
        };
        let removed = write_lock(&state).remove(&self.channel, self.handle);
        if removed {
            tracing::trace!(channel = %self.channel, handle = ?self.handle, "subscriber unbound");
        } else {
            tracing::warn!(
                channel = %self.channel,
                handle = ?self.handle,
                "subscriber was already removed from its channel"
            );
        }
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("handle", &self.handle)
            .field("active", &self.active)
            .finish()
    }
}

pub struct ChannelClaim {
    state: Weak<RwLock<RegistryState>>,
    channel: ChannelKey,
}

impl ChannelClaim {
    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }
}

impl Drop for ChannelClaim {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            write_lock(&state).claimed.remove(&self.channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(result: bool) -> (Arc<AtomicUsize>, impl Fn() -> bool + Send + Sync + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        (calls, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn emit_without_subscribers_passes() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.emit("NOTHING"));
        assert!(!registry.has_subscribers("NOTHING"));
    }

    #[test]
    fn emit_runs_every_subscriber_when_all_pass() {
        let registry = SubscriptionRegistry::new();
        let (first, first_fn) = counting(true);
        let (second, second_fn) = counting(true);
        let _a = registry.bind("RETURN_TRUE", first_fn);
        let _b = registry.bind("RETURN_TRUE", second_fn);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert!(registry.emit("RETURN_TRUE"));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn one_failure_fails_emit_without_short_circuit() {
        let registry = SubscriptionRegistry::new();
        let (first, first_fn) = counting(false);
        let (second, second_fn) = counting(true);
        let (third, third_fn) = counting(false);
        let _a = registry.bind("MIXED", first_fn);
        let _b = registry.bind("MIXED", second_fn);
        let _c = registry.bind("MIXED", third_fn);

        assert!(!registry.emit("MIXED"));
        for calls in [first, second, third] {
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn unsubscribed_subscriber_is_never_invoked_again() {
        let registry = SubscriptionRegistry::new();
        let (calls, subscriber) = counting(false);
        let subscription = registry.bind("ONCE", subscriber);

        assert!(!registry.emit("ONCE"));
        assert!(subscription.unsubscribe());
        assert!(registry.emit("ONCE"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count("ONCE"), 0);
    }

    #[test]
    fn dropping_subscription_unbinds_and_detach_keeps_it() {
        let registry = SubscriptionRegistry::new();
        drop(registry.bind("DROPPED", || false));
        assert!(registry.emit("DROPPED"));

        registry.bind("DETACHED", || false).detach();
        assert!(!registry.emit("DETACHED"));
        assert_eq!(registry.subscriber_count("DETACHED"), 1);
    }

    #[test]
    fn channels_are_isolated() {
        let registry = SubscriptionRegistry::new();
        let (calls, subscriber) = counting(false);
        let _a = registry.bind("FORM_a_SUBMISSION_ATTEMPT", subscriber);

        assert!(registry.emit("FORM_b_SUBMISSION_ATTEMPT"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handles_are_unique_within_a_channel() {
        let registry = SubscriptionRegistry::new();
        let subscriptions = (0..64)
            .map(|_| registry.bind("MANY", || true))
            .collect::<Vec<_>>();
        let handles = subscriptions
            .iter()
            .map(Subscription::handle)
            .collect::<BTreeSet<_>>();
        assert_eq!(handles.len(), 64);
        assert_eq!(registry.subscriber_count("MANY"), 64);
    }

    #[test]
    fn subscriber_may_unbind_itself_during_emit() {
        let registry = SubscriptionRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let (other, other_fn) = counting(true);

        let self_slot = slot.clone();
        let subscription = registry.bind("REENTRANT", move || {
            if let Some(subscription) = self_slot.lock().expect("slot lock").take() {
                subscription.unsubscribe();
            }
            true
        });
        *slot.lock().expect("slot lock") = Some(subscription);
        let _other = registry.bind("REENTRANT", other_fn);

        assert!(registry.emit("REENTRANT"));
        assert_eq!(other.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count("REENTRANT"), 1);
    }

    #[test]
    fn subscriber_may_bind_during_emit() {
        let registry = SubscriptionRegistry::new();
        let inner = registry.clone();
        let late = Arc::new(Mutex::new(Vec::new()));
        let late_sink = late.clone();
        let _outer = registry.bind("GROWING", move || {
            late_sink
                .lock()
                .expect("late lock")
                .push(inner.bind("GROWING", || false));
            true
        });

        assert!(registry.emit("GROWING"));
        assert_eq!(registry.subscriber_count("GROWING"), 2);
        assert!(!registry.emit("GROWING"));
    }

    #[test]
    fn claims_are_exclusive_until_dropped() {
        let registry = SubscriptionRegistry::new();
        let claim = registry.claim("FORM_x_SUBMISSION_ATTEMPT").expect("first claim");
        assert!(matches!(
            registry.claim("FORM_x_SUBMISSION_ATTEMPT"),
            Err(FormError::DuplicateFormId(_))
        ));
        drop(claim);
        assert!(registry.claim("FORM_x_SUBMISSION_ATTEMPT").is_ok());
    }

    #[tracing_test::traced_test]
    #[test]
    fn removing_a_vanished_subscriber_warns() {
        let registry = SubscriptionRegistry::new();
        let subscription = registry.bind("GONE", || true);
        write_lock(&registry.state).channels.clear();

        assert!(!subscription.unsubscribe());
        assert!(logs_contain("subscriber was already removed"));
    }

    proptest! {
        #[test]
        fn emit_is_and_of_every_result(results in proptest::collection::vec(any::<bool>(), 0..24)) {
            let registry = SubscriptionRegistry::new();
            let mut counters = Vec::new();
            let mut subscriptions = Vec::new();
            for result in &results {
                let (calls, subscriber) = counting(*result);
                counters.push(calls);
                subscriptions.push(registry.bind("PROP", subscriber));
            }

            prop_assert_eq!(registry.emit("PROP"), results.iter().all(|r| *r));
            for calls in &counters {
                prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            }
            prop_assert_eq!(registry.emit("PROP"), results.iter().all(|r| *r));
        }
    }
}
