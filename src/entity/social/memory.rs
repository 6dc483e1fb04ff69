//! Bounded personal memory

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::career::catalog::CareerId;
use crate::core::types::{AgentId, Tick};
use crate::economy::catalog::ResourceType;
use crate::entity::needs::NeedType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemoryKind {
    Interaction { peer: AgentId },
    Consumption { need: NeedType },
    HomeMeal,
    Promotion { from: Option<CareerId>, to: CareerId },
    Trade { peer: AgentId, resource: ResourceType, amount: f32, sold: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub tick: Tick,
    pub kind: MemoryKind,
}

/// Fixed-capacity memory, oldest entries evicted first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLog {
    entries: VecDeque<Memory>,
    capacity: usize,
}

impl MemoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(128)),
            capacity,
        }
    }

    pub fn push(&mut self, tick: Tick, kind: MemoryKind) {
        self.entries.push_back(Memory { tick, kind });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Memory> {
        self.entries.back()
    }
}
