//! Sound lifecycle events
//!
//! Four event kinds per playback request:
//! - `PlaySoundDependencyAsset` while dependencies load
//! - exactly one of `PlaySoundSuccess` / `PlaySoundFailure`
//! - `PlaySoundUpdate` once per tick while the sound is audible
//!
//! Events are queued as they happen and handed to listeners at the end of
//! `SoundManager::update`, in the order they were produced. Listeners run
//! synchronously in registration order.

use crate::audio::{PlaybackState, PlaySoundErrorCode, SerialId};
use std::cell::Cell;
use std::rc::Rc;

/// A sound started playing on an agent
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySoundSuccessEventArgs<U> {
    /// Request serial id
    pub serial_id: SerialId,
    /// Group that played the sound
    pub sound_group_name: String,
    /// Asset that was played
    pub sound_asset_name: String,
    /// Index of the agent within its group
    pub agent_index: usize,
    /// Seconds between the request and the start of playback
    pub duration: f32,
    /// Caller data attached to the request
    pub user_data: Option<U>,
}

/// A request ended without playing
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySoundFailureEventArgs<U> {
    /// Request serial id
    pub serial_id: SerialId,
    /// Group the request targeted
    pub sound_group_name: String,
    /// Asset that was requested
    pub sound_asset_name: String,
    /// Why the request failed
    pub error_code: PlaySoundErrorCode,
    /// Human-readable reason
    pub error_message: String,
    /// Caller data attached to the request
    pub user_data: Option<U>,
}

/// Per-tick progress of an audible sound
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySoundUpdateEventArgs<U> {
    /// Request serial id
    pub serial_id: SerialId,
    /// Group playing the sound
    pub sound_group_name: String,
    /// Asset being played
    pub sound_asset_name: String,
    /// Agent state this tick
    pub state: PlaybackState,
    /// Playback position in seconds
    pub time: f32,
    /// Clip length in seconds, when known
    pub length: Option<f32>,
    /// Volume currently sent to the backend
    pub effective_volume: f32,
    /// Caller data attached to the request
    pub user_data: Option<U>,
}

/// A dependency of the requested asset finished loading
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySoundDependencyAssetEventArgs<U> {
    /// Request serial id
    pub serial_id: SerialId,
    /// Group the request targets
    pub sound_group_name: String,
    /// Asset being loaded
    pub sound_asset_name: String,
    /// Dependency that just loaded
    pub dependency_asset_name: String,
    /// Dependencies loaded so far
    pub loaded_count: usize,
    /// Total dependencies
    pub total_count: usize,
    /// Caller data attached to the request
    pub user_data: Option<U>,
}

/// Queued event awaiting dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum SoundEvent<U> {
    /// See `PlaySoundSuccessEventArgs`
    Success(PlaySoundSuccessEventArgs<U>),
    /// See `PlaySoundFailureEventArgs`
    Failure(PlaySoundFailureEventArgs<U>),
    /// See `PlaySoundUpdateEventArgs`
    Update(PlaySoundUpdateEventArgs<U>),
    /// See `PlaySoundDependencyAssetEventArgs`
    DependencyAsset(PlaySoundDependencyAssetEventArgs<U>),
}

impl<U> SoundEvent<U> {
    /// Serial id the event reports on
    pub fn serial_id(&self) -> SerialId {
        match self {
            Self::Success(args) => args.serial_id,
            Self::Failure(args) => args.serial_id,
            Self::Update(args) => args.serial_id,
            Self::DependencyAsset(args) => args.serial_id,
        }
    }

    /// Event name as listeners know it
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "PlaySoundSuccess",
            Self::Failure(_) => "PlaySoundFailure",
            Self::Update(_) => "PlaySoundUpdate",
            Self::DependencyAsset(_) => "PlaySoundDependencyAsset",
        }
    }
}

/// Handle returned when a listener is registered
///
/// Cancelling is safe from inside the listener itself: the listener finishes
/// its current call and is purged once the dispatch loop completes.
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Stop receiving events
    pub fn cancel(&self) {
        self.active.set(false);
    }

    /// Whether the listener still receives events
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

struct Listener<E> {
    active: Rc<Cell<bool>>,
    callback: Box<dyn FnMut(&E)>,
}

/// Listener registry for one event kind
pub struct EventHandlers<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> EventHandlers<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.listeners.push(Listener {
            active: Rc::clone(&active),
            callback: Box::new(callback),
        });
        Subscription { active }
    }

    /// Call every active listener in registration order
    pub fn fire(&mut self, event: &E) {
        for listener in &mut self.listeners {
            if listener.active.get() {
                (listener.callback)(event);
            }
        }
        self.listeners.retain(|listener| listener.active.get());
    }

    /// Number of active listeners
    pub fn len(&self) -> usize {
        self.listeners.iter().filter(|listener| listener.active.get()).count()
    }

    /// True when nobody is listening
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for EventHandlers<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four registries owned by a sound manager
pub struct SoundEventHandlers<U> {
    /// `PlaySoundSuccess` listeners
    pub success: EventHandlers<PlaySoundSuccessEventArgs<U>>,
    /// `PlaySoundFailure` listeners
    pub failure: EventHandlers<PlaySoundFailureEventArgs<U>>,
    /// `PlaySoundUpdate` listeners
    pub update: EventHandlers<PlaySoundUpdateEventArgs<U>>,
    /// `PlaySoundDependencyAsset` listeners
    pub dependency_asset: EventHandlers<PlaySoundDependencyAssetEventArgs<U>>,
}

impl<U> SoundEventHandlers<U> {
    /// Create empty registries
    pub fn new() -> Self {
        Self {
            success: EventHandlers::new(),
            failure: EventHandlers::new(),
            update: EventHandlers::new(),
            dependency_asset: EventHandlers::new(),
        }
    }

    /// Route a queued event to its registry
    pub fn dispatch(&mut self, event: &SoundEvent<U>) {
        match event {
            SoundEvent::Success(args) => self.success.fire(args),
            SoundEvent::Failure(args) => self.failure.fire(args),
            SoundEvent::Update(args) => self.update.fire(args),
            SoundEvent::DependencyAsset(args) => self.dependency_asset.fire(args),
        }
    }
}

impl<U> Default for SoundEventHandlers<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let mut handlers = EventHandlers::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        handlers.subscribe(move |value| first.borrow_mut().push(("first", *value)));
        let second = Rc::clone(&seen);
        handlers.subscribe(move |value| second.borrow_mut().push(("second", *value)));

        handlers.fire(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_cancel_from_inside_listener() {
        let mut handlers = EventHandlers::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let counter = Rc::clone(&calls);
        let own = Rc::clone(&slot);
        let subscription = handlers.subscribe(move |_| {
            counter.set(counter.get() + 1);
            if let Some(subscription) = own.borrow().as_ref() {
                subscription.cancel();
            }
        });
        *slot.borrow_mut() = Some(subscription);

        handlers.fire(&1);
        handlers.fire(&2);
        assert_eq!(calls.get(), 1);
        assert!(handlers.is_empty());
    }

    #[test]
    fn test_cancelled_listener_skipped() {
        let mut handlers = EventHandlers::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let subscription = handlers.subscribe(move |_| counter.set(counter.get() + 1));

        subscription.cancel();
        handlers.fire(&1);
        assert_eq!(calls.get(), 0);
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_queued_event_routes_by_kind() {
        let mut handlers = SoundEventHandlers::<()>::new();
        let failures = Rc::new(Cell::new(0));
        let counter = Rc::clone(&failures);
        let _subscription = handlers.failure.subscribe(move |_| counter.set(counter.get() + 1));

        let event = SoundEvent::Failure(PlaySoundFailureEventArgs {
            serial_id: SerialId::new(9),
            sound_group_name: "ui".to_string(),
            sound_asset_name: "click".to_string(),
            error_code: PlaySoundErrorCode::LoadAssetFailure,
            error_message: "missing".to_string(),
            user_data: None,
        });
        assert_eq!(event.serial_id(), SerialId::new(9));
        assert_eq!(event.kind(), "PlaySoundFailure");

        handlers.dispatch(&event);
        assert_eq!(failures.get(), 1);
        assert!(handlers.success.is_empty());
    }
}
