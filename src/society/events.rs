//! Notable social events

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Tick};

/// Combined social influence above which a meeting is notable
pub const NOTABLE_INFLUENCE: f32 = 150.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SocialEventKind {
    /// Two highly influential agents interacted
    InfluentialMeeting { combined_influence: f32, alignment: f32 },
    /// An agent accepted a promotion
    Promotion { from: String, to: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialEvent {
    pub tick: Tick,
    pub participants: Vec<AgentId>,
    pub kind: SocialEventKind,
}

/// Bounded event history, oldest evicted first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialEventLog {
    events: VecDeque<SocialEvent>,
    capacity: usize,
    /// Events ever recorded, including evicted ones
    total: u64,
}

impl SocialEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            total: 0,
        }
    }

    pub fn record(&mut self, event: SocialEvent) {
        self.total += 1;
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = &SocialEvent> {
        self.events.iter()
    }
}
