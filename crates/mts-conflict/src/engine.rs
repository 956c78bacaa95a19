//! `ConflictApproachEngine`: the per-agent conflict decision.
//!
//! # Algorithm
//!
//! Each cycle, for one agent:
//!
//! 1. Purge yield plans and stop phases that were not reaffirmed last cycle.
//! 2. Walk the conflicts nearest first.  For each one:
//!    - bound the acceleration to avoid hitting agents already on it
//!      (closed-form deceleration on crossings, car-following on merges and
//!      splits);
//!    - skip conflicts the ego is already on, noting whether it is blocking
//!      a crossing it has no priority on;
//!    - ask the priority rule whether the ego must stop.
//! 3. On the first conflict that requires a stop, search upstream for the
//!    nearest crossing that leaves room to stand clear of it, target a stop
//!    there, and ignore every conflict further along.
//!
//! The engine reads the snapshot and writes only the caller's
//! [`ConflictPlans`].

use mts_core::{
    Acceleration, ConflictId, Duration, Length, ParameterLookup, ParameterOverride, ParameterType, Speed,
    StopLineId, Time,
};
use mts_plan::segments::DRIFTING_SPEED_SI;

use crate::anticipation::{
    AnticipationInfo, anticipate_movement, anticipate_movement_free_acceleration,
};
use crate::car_following::{self, CarFollowingModel, Idm};
use crate::conflict::{Conflict, ConflictOverlap, ConflictRule, ConflictingAgent, Leader};
use crate::yield_plans::{ConflictPlans, StopPhase};
use crate::{ConflictError, ConflictResult};

/// Integration step for free-acceleration anticipation.
const DEFAULT_TIME_STEP: Duration = Duration(0.5);

/// Arrival gap required ahead of traffic on a priority merge evaluated from
/// an adjacent lane.
const ADJACENT_MERGE_GAP: Duration = Duration(3.0);

/// Decelerations stronger than this (m/s²) while moving are logged.
const STRONG_DECELERATION_SI: f64 = -6.0;

/// Speed (m/s) above which strong decelerations are logged.
const STRONG_DECELERATION_MIN_SPEED_SI: f64 = 5.0 / 3.6;

/// Kinematic state of the agent deciding.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EgoState {
    pub time:        Time,
    pub speed:       Speed,
    pub length:      Length,
    pub speed_limit: Speed,
}

/// Result of one approach evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApproachDecision {
    /// Upper bound on the ego's acceleration; [`Acceleration::MAX`] when no
    /// conflict constrains it.
    pub acceleration: Acceleration,
    /// Conflict the ego stops in front of, if any.
    pub stop_for:     Option<ConflictId>,
}

impl ApproachDecision {
    #[inline]
    pub fn is_constrained(&self) -> bool {
        self.acceleration < Acceleration::MAX
    }
}

/// Colour of a traffic light ahead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrafficLightColor {
    Green,
    Yellow,
    Red,
}

/// Parameters read once per evaluation.
struct Limits {
    b:      Acceleration,
    b_crit: Acceleration,
    s0:     Length,
    s0conf: Length,
}

impl Limits {
    fn read(params: &dyn ParameterLookup) -> ConflictResult<Self> {
        Ok(Self {
            b:      params.acceleration(ParameterType::ComfortDeceleration)?,
            b_crit: params.acceleration(ParameterType::CriticalDeceleration)?,
            s0:     params.length(ParameterType::StopDistance)?,
            s0conf: params.length(ParameterType::ConflictStopDistance)?,
        })
    }

    /// Room one agent needs to stand clear between two conflicts.
    fn passable(&self, vehicle_length: Length) -> Length {
        self.s0 + vehicle_length
    }
}

/// Decides how hard an agent must brake for the conflicts ahead.
///
/// Stateless apart from configuration: one engine is shared by all agents,
/// each of which brings its own parameters and [`ConflictPlans`].
#[derive(Clone, Debug)]
pub struct ConflictApproachEngine<M: CarFollowingModel = Idm> {
    model:     M,
    time_step: Duration,
}

impl Default for ConflictApproachEngine<Idm> {
    fn default() -> Self {
        Self::new(Idm)
    }
}

impl<M: CarFollowingModel> ConflictApproachEngine<M> {
    pub fn new(model: M) -> Self {
        Self { model, time_step: DEFAULT_TIME_STEP }
    }

    /// Override the free-acceleration integration step.
    pub fn with_time_step(mut self, time_step: Duration) -> Self {
        self.time_step = time_step;
        self
    }

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Evaluate `conflicts` (nearest first) and return the most restrictive
    /// acceleration.
    ///
    /// `leaders` are the agents ahead in the ego's own lane, nearest first.
    ///
    /// # Errors
    ///
    /// - `ConflictError::UnsortedSnapshot` if either list is out of order.
    /// - `ConflictError::Parameter` if a required parameter is undefined.
    /// - `ConflictError::MissingStopLine` for a stop-controlled conflict
    ///   without a stop line.
    /// - `ConflictError::NoConvergence` if an anticipation diverges.
    pub fn approach_conflicts(
        &self,
        params:    &dyn ParameterLookup,
        ego:       &EgoState,
        conflicts: &[Conflict],
        leaders:   &[Leader],
        plans:     &mut ConflictPlans,
    ) -> ConflictResult<ApproachDecision> {
        plans.clean();
        if conflicts.windows(2).any(|w| w[1].distance < w[0].distance)
            || leaders.windows(2).any(|w| w[1].distance < w[0].distance)
        {
            return Err(ConflictError::UnsortedSnapshot);
        }

        let limits = Limits::read(params)?;
        let passable = limits.passable(ego.length);
        let mut a = Acceleration::MAX;
        let mut stop_for = None;
        let mut blocking = false;

        // crossings passed so far this cycle, to keep them clear when stopping
        let mut prev_starts: Vec<Length> = Vec::new();
        let mut prev_ends: Vec<Length> = Vec::new();
        let mut prev_ids: Vec<ConflictId> = Vec::new();

        for conflict in conflicts {
            if conflict.is_crossing() {
                a = a.min(self.avoid_crossing_collision(params, ego, conflict)?);
            } else {
                if conflict.is_merge() && !conflict.on_current_lane && conflict.rule == ConflictRule::Priority {
                    a = a.min(self.avoid_merge_collision(params, ego, conflict)?);
                }
                a = a.min(self.follow_conflicting_leader(params, ego, conflict, limits.s0conf)?);
            }

            if conflict.on_current_lane && conflict.distance.is_negative() {
                if conflict.is_crossing() && conflict.rule != ConflictRule::Priority {
                    blocking = true;
                }
                continue;
            }
            if conflict.is_split() {
                continue;
            }

            let b = if blocking { limits.b_crit } else { limits.b };
            let stop = match conflict.rule {
                ConflictRule::Priority => self.stop_for_priority(ego, conflict, leaders, &limits, plans),
                ConflictRule::GiveWay => self.stop_for_give_way(params, ego, conflict, leaders, b, passable)?,
                ConflictRule::Stop => self.stop_for_stop(params, ego, conflict, leaders, b, passable, plans)?,
                ConflictRule::AllStop => self.stop_for_all_stop(params, ego, conflict, plans)?,
            };
            tracing::trace!(conflict = %conflict.id, rule = %conflict.rule, distance = %conflict.distance, stop, "conflict evaluated");

            if stop {
                prev_starts.push(conflict.distance);
                prev_ids.push(conflict.id);

                // nearest upstream gap that fits the ego; prev_starts holds one
                // more entry than prev_ends here
                let mut j = (0..prev_ends.len())
                    .rev()
                    .find(|&i| prev_starts[i + 1] - prev_ends[i] > passable)
                    .map_or(0, |i| i + 1);
                if blocking && j == 0 {
                    // never back off behind the conflict forcing the stop
                    j = prev_starts.len() - 1;
                }

                let conf_params =
                    ParameterOverride::new(params, ParameterType::StopDistance, limits.s0conf.si());
                let b_crit = -limits.b_crit;
                let mut a_conflict = Acceleration(-f64::MAX);
                let mut target = j;
                while a_conflict < b_crit && j < prev_starts.len() {
                    let a_stop = if prev_starts[j] < limits.s0conf {
                        // too close for the car-following model to stay sane
                        b_crit
                    } else {
                        car_following::stop(&self.model, &conf_params, ego.speed, ego.speed_limit, prev_starts[j])?
                    };
                    if a_stop > a_conflict {
                        a_conflict = a_stop;
                        target = j;
                    }
                    j += 1;
                }
                tracing::debug!(
                    blocked = %conflict.id,
                    target = %prev_ids[target],
                    distance = %prev_starts[target],
                    acceleration = %a_conflict,
                    "stopping for conflict"
                );
                a = a.min(a_conflict);
                stop_for = Some(prev_ids[target]);
                break;
            }

            if conflict.is_crossing() {
                prev_starts.push(conflict.distance);
                prev_ends.push(conflict.end());
                prev_ids.push(conflict.id);
            }
        }
        plans.set_blocking(blocking);

        if a.si() < STRONG_DECELERATION_SI && ego.speed.si() > STRONG_DECELERATION_MIN_SPEED_SI {
            tracing::warn!(acceleration = %a, speed = %ego.speed, "conflict deceleration stronger than 6 m/s²");
        }
        Ok(ApproachDecision { acceleration: a, stop_for })
    }

    /// Bound the acceleration for a traffic light `distance` ahead.
    ///
    /// Red always stops.  Yellow stops only if that takes no more than the
    /// yellow-light deceleration; otherwise the ego drives on.
    pub fn approach_traffic_light(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        distance: Length,
        color:    TrafficLightColor,
    ) -> ConflictResult<Acceleration> {
        if distance.is_negative() {
            return Ok(Acceleration::MAX);
        }
        let stop = match color {
            TrafficLightColor::Green => false,
            TrafficLightColor::Red => true,
            TrafficLightColor::Yellow => {
                let b_yellow = params.acceleration(ParameterType::YellowDeceleration)?;
                required_deceleration(ego.speed, distance) <= b_yellow
            }
        };
        if !stop {
            return Ok(Acceleration::MAX);
        }
        Ok(car_following::stop(&self.model, params, ego.speed, ego.speed_limit, distance)?)
    }

    // ── Collision avoidance ───────────────────────────────────────────────

    /// Decelerate so the ego does not enter a crossing before the agents on
    /// or about to enter it have cleared.
    fn avoid_crossing_collision(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
    ) -> ConflictResult<Acceleration> {
        let first_upstream = conflict
            .upstream
            .first()
            .filter(|c| c.distance <= conflict.conflicting_visibility);
        let on_conflict = conflict.downstream.iter().take_while(|c| c.is_parallel());
        let relevant: Vec<&ConflictingAgent> = first_upstream.into_iter().chain(on_conflict).collect();
        if relevant.is_empty() {
            return Ok(Acceleration::MAX);
        }

        // time till the ego enters, driving freely
        let tte_o = anticipate_movement_free_acceleration(
            conflict.distance,
            ego.speed,
            params,
            &self.model,
            ego.speed_limit,
            self.time_step,
        )?;

        let mut a = Acceleration::MAX;
        for c in relevant {
            let (tte_c, clear_distance) = match c.overlap {
                ConflictOverlap::Parallel { front, rear, overlap } => (
                    AnticipationInfo::new(Duration::ZERO, c.speed),
                    rear.abs() + overlap + (-front).max(Length::ZERO),
                ),
                _ => (
                    anticipate_movement(c.distance, c.speed, Acceleration::ZERO),
                    c.distance + conflict.length + c.length,
                ),
            };
            let ttc_c = anticipate_movement(clear_distance, c.speed, Acceleration::ZERO);

            // would enter after it enters but before it has cleared
            if tte_c.duration < tte_o.duration && tte_o.duration < ttc_c.duration && c.speed.is_positive() {
                let t = ttc_c.duration.si();
                let v = ego.speed.si();
                // s = v·t + ½·a·t²  →  arrive exactly as it clears
                let acc = 2.0 * (conflict.distance.si() - v * t) / (t * t);
                if acc >= 0.0 || v / -acc > t {
                    a = a.min(Acceleration(acc));
                } else {
                    // would come to a halt first
                    a = a.min(car_following::stop(&self.model, params, ego.speed, ego.speed_limit, conflict.distance)?);
                }
            }
        }
        Ok(a)
    }

    /// Arrival-gap check for a priority merge on an adjacent lane.
    fn avoid_merge_collision(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
    ) -> ConflictResult<Acceleration> {
        let Some(c) = conflict.upstream.first().filter(|c| !c.is_parallel()) else {
            return Ok(Acceleration::MAX);
        };
        let tte_c = time_at_constant_speed(c.distance, c.speed);
        let tte_o = time_at_constant_speed(conflict.distance, ego.speed);
        if tte_c < tte_o + ADJACENT_MERGE_GAP {
            return Ok(car_following::stop(&self.model, params, ego.speed, ego.speed_limit, conflict.distance)?);
        }
        Ok(Acceleration::MAX)
    }

    /// Follow the first conflicting agent on a merge or split as if it were
    /// in the ego's lane.
    fn follow_conflicting_leader(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
        s0conf:   Length,
    ) -> ConflictResult<Acceleration> {
        let Some(first) = conflict.downstream.first() else {
            return Ok(Acceleration::MAX);
        };
        if first.is_ahead() {
            // plain car-following territory
            return Ok(Acceleration::MAX);
        }
        let found = if conflict.distance.is_positive() {
            Some((first, conflict.virtual_distance(first)))
        } else {
            // ego is on the conflict: first agent still in front of it
            conflict
                .downstream
                .iter()
                .take_while(|c| !c.is_ahead())
                .map(|c| (c, conflict.virtual_distance(c)))
                .find(|(_, d)| d.is_positive())
        };
        let Some((c, virtual_distance)) = found else {
            return Ok(Acceleration::MAX);
        };

        let mut a = car_following::follow_single_leader(
            &self.model,
            params,
            ego.speed,
            ego.speed_limit,
            virtual_distance,
            c.speed,
        )?;
        if conflict.is_merge() && virtual_distance < conflict.distance {
            // its tail is still upstream of the merge: stop at the merge instead
            let conf_params = ParameterOverride::new(params, ParameterType::StopDistance, s0conf.si());
            let a_stop = car_following::stop(&self.model, &conf_params, ego.speed, ego.speed_limit, conflict.distance)?;
            a = a.max(a_stop);
        }
        Ok(a)
    }

    // ── Priority rules ────────────────────────────────────────────────────

    /// Yield on a priority conflict only when a queue ahead would leave the
    /// ego standing on the conflict in the way of the nearest conflicting
    /// agent.
    fn stop_for_priority(
        &self,
        ego:      &EgoState,
        conflict: &Conflict,
        leaders:  &[Leader],
        limits:   &Limits,
        plans:    &mut ConflictPlans,
    ) -> bool {
        let (Some(leader), Some(upstream)) = (leaders.first(), conflict.upstream.first()) else {
            return false;
        };

        // time till the ego clears: a merge at its start, a crossing at its end
        let mut distance = conflict.distance + ego.length;
        if conflict.is_crossing() {
            distance += conflict.length;
        }
        let ttc_o = anticipate_movement(distance, ego.speed, Acceleration::ZERO);
        // time till the leader leaves room beyond the conflict
        let room = distance - leader.distance - ego.length + limits.s0;
        let ttp_d = anticipate_movement(room, leader.speed, Acceleration::ZERO);
        if ttp_d.duration < ttc_o.duration {
            // not blocked; an existing plan lapses at the next clean
            return false;
        }

        // the agent yielded to may have become the leader on a merge
        if plans.is_yield_plan(conflict.id, leader.id) {
            return false;
        }
        if !plans.is_yield_plan(conflict.id, upstream.id)
            && required_deceleration(ego.speed, conflict.distance) > limits.b
        {
            // too late to stop comfortably; do not start a plan
            return false;
        }
        plans.set_yield_plan(conflict.id, upstream.id);
        true
    }

    /// Stop unless the ego can enter and clear before each conflicting agent
    /// arrives, with a safety margin.
    #[allow(clippy::too_many_arguments)]
    fn stop_for_give_way(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
        leaders:  &[Leader],
        b:        Acceleration,
        passable: Length,
    ) -> ConflictResult<bool> {
        let b = -b;
        let f = params.factor(ParameterType::TimeFactor)?;
        let gap = params.duration(ParameterType::MinGap)?;
        let margin = |t: Duration| t * f + gap;

        let mut distance = conflict.distance + ego.length;
        if conflict.is_crossing() {
            distance += conflict.length;
        }
        // time till the ego clears, driving freely
        let ttc_o = anticipate_movement_free_acceleration(
            distance,
            ego.speed,
            params,
            &self.model,
            ego.speed_limit,
            self.time_step,
        )?;

        // time till the leader leaves room beyond a crossing, at constant
        // speed and when braking
        let (ttp_dz, ttp_ds) = match leaders.first() {
            Some(leader) if conflict.is_crossing() => {
                let room = conflict.distance - leader.distance + conflict.length + passable;
                (
                    anticipate_movement(room, leader.speed, Acceleration::ZERO),
                    anticipate_movement(room, leader.speed, b),
                )
            }
            _ => {
                let now = AnticipationInfo::new(Duration::ZERO, Speed::ZERO);
                (now, now)
            }
        };

        // assume an agent just out of sight at the speed limit if none is seen
        let assumed = [(conflict.conflicting_visibility, conflict.conflicting_speed_limit, Acceleration::ZERO)];
        let seen: Vec<(Length, Speed, Acceleration)> =
            conflict.upstream.iter().map(|c| (c.distance, c.speed, c.acceleration)).collect();
        let conflicting = if seen.is_empty() { &assumed[..] } else { &seen[..] };

        for &(d_c, v_c, a_c) in conflicting {
            // time till it enters, as is and when braking
            let tte_cc = anticipate_movement(d_c, v_c, a_c);
            let tte_cs = anticipate_movement(d_c, v_c, b);

            let stop = if conflict.is_merge() {
                // it ends up behind the ego and must shed the speed difference
                let v_conflicting = v_c + b * ttc_o.duration;
                let speed_diff = (v_conflicting - ttc_o.end_speed).max(Speed::ZERO);
                let catch_up = speed_diff / -b;
                margin(ttc_o.duration) > tte_cc.duration
                    || margin(ttc_o.duration + catch_up) > tte_cs.duration
            } else {
                // leader makes room, ego clears, and it can still brake in time
                margin(ttp_dz.duration) > tte_cc.duration
                    || margin(ttc_o.duration) > tte_cc.duration
                    || margin(ttp_ds.duration) > tte_cs.duration
            };
            if stop {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// A stop sign: halt within the stop area first, then give way.  The
    /// give-way check applies to every conflict behind the line, also once
    /// the line is in `Run`.
    #[allow(clippy::too_many_arguments)]
    fn stop_for_stop(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
        leaders:  &[Leader],
        b:        Acceleration,
        passable: Length,
        plans:    &mut ConflictPlans,
    ) -> ConflictResult<bool> {
        let line = stop_line(conflict)?;
        match self.advance_stop_phase(params, ego, conflict, line, plans)? {
            StopPhase::Approach => Ok(true),
            phase => {
                if self.stop_for_give_way(params, ego, conflict, leaders, b, passable)? {
                    return Ok(true);
                }
                if phase == StopPhase::Yield {
                    plans.set_stop_phase_run(line)?;
                }
                Ok(false)
            }
        }
    }

    /// All-way stop: halt within the stop area, then go once no other
    /// conflicting agent is waiting there.
    fn stop_for_all_stop(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
        plans:    &mut ConflictPlans,
    ) -> ConflictResult<bool> {
        let line = stop_line(conflict)?;
        match self.advance_stop_phase(params, ego, conflict, line, plans)? {
            StopPhase::Approach => Ok(true),
            StopPhase::Yield => {
                let stop_area = params.length(ParameterType::StopArea)?;
                let others_waiting = conflict.upstream.iter().any(|c| {
                    matches!(c.overlap, ConflictOverlap::Behind)
                        && c.distance <= stop_area
                        && c.speed.si() < DRIFTING_SPEED_SI
                });
                if others_waiting {
                    return Ok(true);
                }
                plans.set_stop_phase_run(line)?;
                Ok(false)
            }
            StopPhase::Run => Ok(false),
        }
    }

    /// Record the approach (which also keeps a later phase alive this cycle)
    /// and move to `Yield` once halted within the stop area.
    fn advance_stop_phase(
        &self,
        params:   &dyn ParameterLookup,
        ego:      &EgoState,
        conflict: &Conflict,
        line:     StopLineId,
        plans:    &mut ConflictPlans,
    ) -> ConflictResult<StopPhase> {
        plans.set_stop_phase_approach(line);
        let phase = plans.stop_phase(line).unwrap_or(StopPhase::Approach);
        if phase == StopPhase::Approach {
            let stop_area = params.length(ParameterType::StopArea)?;
            if ego.speed.si() < DRIFTING_SPEED_SI && conflict.distance <= stop_area {
                plans.set_stop_phase_yield(line, ego.time)?;
                return Ok(StopPhase::Yield);
            }
        }
        Ok(phase)
    }
}

fn stop_line(conflict: &Conflict) -> ConflictResult<StopLineId> {
    conflict
        .stop_line
        .ok_or(ConflictError::MissingStopLine(conflict.id))
}

/// Deceleration to stop from `speed` within `distance`.
fn required_deceleration(speed: Speed, distance: Length) -> Acceleration {
    if speed.is_zero() {
        return Acceleration::ZERO;
    }
    if !distance.is_positive() {
        return Acceleration(f64::INFINITY);
    }
    Acceleration(0.5 * speed.si() * speed.si() / distance.si())
}

fn time_at_constant_speed(distance: Length, speed: Speed) -> Duration {
    if speed.is_positive() { distance / speed } else { Duration::INFINITE }
}
