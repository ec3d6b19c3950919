//! Typed workspace events with buffered delivery.
//!
//! The workspace records events while it mutates its state and delivers them
//! in one batch once the operation has finished. Events are kept in a single
//! chronological [`EventBuffer`]. The bus never evicts: when the buffer is
//! full, [`EventBus::emit`] delivers what is pending before buffering the new
//! event, so the capacity bounds memory and a long pass reaches subscribers
//! in several batches.
//!
//! # Badge checks
//!
//! Every production raises [`Event::BadgesEvaluated`] after the badge policy
//! has run, whether or not anything unlocked. Unlocks follow as
//! [`Event::BadgeUnlocked`].
//!
//! # Subscribers
//!
//! Subscribers are passive: they receive `&Event` and cannot reach back into
//! the workspace. UI refreshes, sound effects, analytics and lesson tracking
//! all hang off this interface; the engine never waits on them.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]. Suppressed
//! events are dropped at emit time and never buffered.

use crate::id::*;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// One compound unit created by a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedUnit {
    pub item: ItemId,
    pub compound: CompoundId,
    pub formula: String,
}

/// A workspace event. All events carry the workspace revision of the
/// operation that raised them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Placement --
    ItemPlaced {
        item: ItemId,
        symbol: String,
        revision: u64,
    },
    ItemRemoved {
        item: ItemId,
        revision: u64,
    },

    // -- Reactions --
    ReactionApplied {
        reaction: ReactionId,
        factor: u32,
        revision: u64,
    },
    ItemsConsumed {
        reaction: ReactionId,
        items: Vec<ItemId>,
        revision: u64,
    },
    ItemsProduced {
        reaction: ReactionId,
        units: Vec<ProducedUnit>,
        revision: u64,
    },
    CompoundBroken {
        item: ItemId,
        restored: Vec<ItemId>,
        revision: u64,
    },

    // -- Gamification --
    CompoundDiscovered {
        compound: CompoundId,
        formula: String,
        revision: u64,
    },
    /// Badge rules were checked after producing `compound`.
    BadgesEvaluated {
        compound: CompoundId,
        unlocked: usize,
        revision: u64,
    },
    BadgeUnlocked {
        badge: String,
        revision: u64,
    },
}

/// Discriminant tag for event types, used for suppression and subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ItemPlaced,
    ItemRemoved,
    ReactionApplied,
    ItemsConsumed,
    ItemsProduced,
    CompoundBroken,
    CompoundDiscovered,
    BadgesEvaluated,
    BadgeUnlocked,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 9;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ItemPlaced { .. } => EventKind::ItemPlaced,
            Event::ItemRemoved { .. } => EventKind::ItemRemoved,
            Event::ReactionApplied { .. } => EventKind::ReactionApplied,
            Event::ItemsConsumed { .. } => EventKind::ItemsConsumed,
            Event::ItemsProduced { .. } => EventKind::ItemsProduced,
            Event::CompoundBroken { .. } => EventKind::CompoundBroken,
            Event::CompoundDiscovered { .. } => EventKind::CompoundDiscovered,
            Event::BadgesEvaluated { .. } => EventKind::BadgesEvaluated,
            Event::BadgeUnlocked { .. } => EventKind::BadgeUnlocked,
        }
    }

    /// The workspace revision this event belongs to.
    pub fn revision(&self) -> u64 {
        match self {
            Event::ItemPlaced { revision, .. }
            | Event::ItemRemoved { revision, .. }
            | Event::ReactionApplied { revision, .. }
            | Event::ItemsConsumed { revision, .. }
            | Event::ItemsProduced { revision, .. }
            | Event::CompoundBroken { revision, .. }
            | Event::CompoundDiscovered { revision, .. }
            | Event::BadgesEvaluated { revision, .. }
            | Event::BadgeUnlocked { revision, .. } => *revision,
        }
    }
}

impl EventKind {
    /// Convert to usize index for array lookups.
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// Bounded chronological queue of undelivered events. When full, pushing
/// evicts the oldest event.
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<Event>,
    capacity: usize,
    /// Events ever pushed, evicted ones included.
    total_written: u64,
    dropped: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events evicted because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// Remove and return all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// A listener receives events read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Optional predicate that filters events for a subscriber.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

/// Priority level for event subscribers. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriberPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct SubscriberEntry {
    listener: Listener,
    priority: SubscriberPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("priority", &self.priority)
            .field(
                "filter",
                &if self.filter.is_some() {
                    "Some(<fn>)"
                } else {
                    "None"
                },
            )
            .field("insertion_order", &self.insertion_order)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The workspace event bus: one chronological buffer, per-kind subscriber
/// lists and suppression flags.
pub struct EventBus {
    buffer: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
    /// Events emitted per kind since creation.
    emitted: [u64; EVENT_KIND_COUNT],
    subscribers: [Vec<SubscriberEntry>; EVENT_KIND_COUNT],
    /// Set when a subscriber is added; subscriber lists are re-sorted on the
    /// next delivery.
    needs_sort: bool,
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffer", &self.buffer)
            .field("suppressed", &self.suppressed)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events between deliveries.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity),
            suppressed: [false; EVENT_KIND_COUNT],
            emitted: [0; EVENT_KIND_COUNT],
            subscribers: Default::default(),
            needs_sort: false,
            next_insertion_order: 0,
        }
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. No-ops if its kind is
    /// suppressed. A full buffer is delivered first, so nothing is evicted.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        self.emitted[idx] += 1;
        if self.buffer.len() >= self.buffer.capacity() {
            self.deliver();
        }
        self.buffer.push(event);
    }

    /// Register a listener with Normal priority and no filter.
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) {
        self.subscribe_filtered(kind, SubscriberPriority::Normal, None, listener);
    }

    /// Register a listener with explicit priority and optional filter.
    pub fn subscribe_filtered(
        &mut self,
        kind: EventKind,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: Listener,
    ) {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.subscribers[kind.index()].push(SubscriberEntry {
            listener,
            priority,
            filter,
            insertion_order: order,
        });
        self.needs_sort = true;
    }

    /// Deliver all buffered events, oldest first. For each event, its kind's
    /// subscribers run in `(priority, insertion order)`; a subscriber whose
    /// filter rejects the event is skipped. The buffer is empty afterwards.
    pub fn deliver(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        if self.needs_sort {
            for list in &mut self.subscribers {
                list.sort_by_key(|entry| (entry.priority as u8, entry.insertion_order));
            }
            self.needs_sort = false;
        }

        let events = self.buffer.drain();
        for event in &events {
            for entry in &mut self.subscribers[event.kind().index()] {
                if let Some(ref filter) = entry.filter
                    && !filter(event)
                {
                    continue;
                }
                (entry.listener)(event);
            }
        }
    }

    /// Read-only view of undelivered events.
    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    /// Count of undelivered events of one kind.
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffer.iter().filter(|e| e.kind() == kind).count()
    }

    /// Total events ever emitted for a kind, excluding suppressed ones.
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.emitted[kind.index()]
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers[kind.index()].len()
    }

    /// Drop undelivered events. Subscribers and suppression stay.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
