//! Read-only conflict snapshots handed to the engine each decision cycle.
//!
//! All distances are measured along the ego's path from its front.  The
//! snapshot is captured once per cycle by whatever perceives the network and
//! is never mutated by the engine.

use std::fmt;
use std::str::FromStr;

use mts_core::{Acceleration, AgentId, ConflictId, Length, Speed, StopLineId};

use crate::ConflictError;

/// Geometry of a conflict between two streams.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictType {
    Merge,
    Crossing,
    Split,
}

/// Right-of-way at a conflict, seen from the ego's stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictRule {
    /// The ego has right of way.
    Priority,
    /// The ego must yield.
    GiveWay,
    /// The ego must halt at the stop line, then yield.
    Stop,
    /// Every approach must halt; first come, first served.
    AllStop,
}

impl ConflictRule {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictRule::Priority => "priority",
            ConflictRule::GiveWay  => "give_way",
            ConflictRule::Stop     => "stop",
            ConflictRule::AllStop  => "all_stop",
        }
    }
}

impl fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictRule {
    type Err = ConflictError;

    /// Parse a rule name from configuration.  Unknown names are rejected
    /// rather than mapped to a default behaviour.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "priority"             => Ok(ConflictRule::Priority),
            "give_way" | "yield"   => Ok(ConflictRule::GiveWay),
            "stop"                 => Ok(ConflictRule::Stop),
            "all_stop"             => Ok(ConflictRule::AllStop),
            _                      => Err(ConflictError::UnsupportedRule(s.to_owned())),
        }
    }
}

/// Where a conflicting agent is relative to the conflict area.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictOverlap {
    /// Entirely downstream of the conflict; `distance` runs from the conflict
    /// end to the agent's rear.
    Ahead,
    /// Entirely upstream; `distance` runs from the agent's front to the
    /// conflict start.
    Behind,
    /// On the conflict.  `front` and `rear` are the offsets of the agent's
    /// front beyond the conflict end and of its rear beyond the conflict
    /// start (negative when inside); `overlap` is the length on the
    /// conflict.
    Parallel { front: Length, rear: Length, overlap: Length },
}

/// Another agent in a conflicting stream.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConflictingAgent {
    pub id:           AgentId,
    pub distance:     Length,
    pub length:       Length,
    pub speed:        Speed,
    pub acceleration: Acceleration,
    pub overlap:      ConflictOverlap,
}

impl ConflictingAgent {
    #[inline]
    pub fn is_ahead(&self) -> bool {
        matches!(self.overlap, ConflictOverlap::Ahead)
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        matches!(self.overlap, ConflictOverlap::Parallel { .. })
    }
}

/// A downstream agent in the ego's own lane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leader {
    pub id:           AgentId,
    /// Ego front to leader rear.
    pub distance:     Length,
    pub length:       Length,
    pub speed:        Speed,
    pub acceleration: Acceleration,
}

/// One upcoming conflict as perceived by the ego.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    pub id:                      ConflictId,
    /// Ego front to conflict start; negative once the ego is on it.
    pub distance:                Length,
    pub length:                  Length,
    pub conflict_type:           ConflictType,
    pub rule:                    ConflictRule,
    pub stop_line:               Option<StopLineId>,
    /// Conflicting agents approaching the conflict, nearest first.
    pub upstream:                Vec<ConflictingAgent>,
    /// Conflicting agents on or past the conflict, nearest first.
    pub downstream:              Vec<ConflictingAgent>,
    /// How far up the conflicting stream the ego can see.
    pub conflicting_visibility:  Length,
    pub conflicting_speed_limit: Speed,
    /// Whether the conflict is on the ego's current lane.  Merges with
    /// priority on an adjacent lane get a plain arrival-gap check instead of
    /// the rule logic.
    pub on_current_lane:         bool,
}

impl Conflict {
    /// A conflict on the current lane with no conflicting traffic in sight.
    pub fn new(
        id:            ConflictId,
        distance:      Length,
        length:        Length,
        conflict_type: ConflictType,
        rule:          ConflictRule,
    ) -> Self {
        Self {
            id,
            distance,
            length,
            conflict_type,
            rule,
            stop_line:               None,
            upstream:                Vec::new(),
            downstream:              Vec::new(),
            conflicting_visibility:  Length(200.0),
            conflicting_speed_limit: Speed(50.0 / 3.6),
            on_current_lane:         true,
        }
    }

    #[inline]
    pub fn is_merge(&self) -> bool {
        self.conflict_type == ConflictType::Merge
    }

    #[inline]
    pub fn is_crossing(&self) -> bool {
        self.conflict_type == ConflictType::Crossing
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        self.conflict_type == ConflictType::Split
    }

    /// Distance to the conflict end.
    #[inline]
    pub fn end(&self) -> Length {
        self.distance + self.length
    }

    /// Headway to `agent` as if it drove in the ego's own lane.
    pub fn virtual_distance(&self, agent: &ConflictingAgent) -> Length {
        match agent.overlap {
            ConflictOverlap::Ahead => self.end() + agent.distance,
            ConflictOverlap::Behind => self.distance - agent.distance - agent.length,
            ConflictOverlap::Parallel { rear, .. } => self.distance + rear,
        }
    }
}
