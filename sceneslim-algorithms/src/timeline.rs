//! Timeline reduction
//!
//! Removes key values that cannot change what the animation shows, and
//! keyframes left empty by that, without touching keyframes that carry a
//! completion callback. Per animated property the key values are scanned in
//! time order; a value is redundant when it sits between two equal
//! neighbours, when it is the property's first key value, equals the
//! property's current value, and is followed by the same value, or when it
//! trails a run of the same value and at least two key values remain.
//!
//! Reduction also produces the set of *bound* transforms, the transforms whose
//! properties the timeline drives, which the scene pruner needs before it may
//! drop any transform.

use sceneslim_core::{
    same_bits, Interpolation, KeyValue, PropertyLookup, PropertyTarget, Result, Timeline, TransformId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Knobs for [`reduce_timeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOptions {
    /// Rewrite every surviving key value to discrete interpolation.
    pub downgrade_to_discrete: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            downgrade_to_discrete: true,
        }
    }
}

/// Counts describing a timeline reduction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStats {
    pub key_frames_before: usize,
    pub key_frames_removed: usize,
    /// Keyframes left without values but kept for their callback.
    pub callback_frames_kept: usize,
    pub key_values_before: usize,
    pub key_values_removed: usize,
    /// Surviving key values switched from continuous to discrete.
    pub key_values_discretized: usize,
    /// Distinct animated properties.
    pub targets: usize,
}

/// Outcome of [`reduce_timeline`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineReduction {
    /// Transforms owning at least one animated property.
    pub bound: HashSet<TransformId>,
    pub stats: TimelineStats,
}

/// Position of a key value: keyframe index and index within the keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KvRef {
    frame: usize,
    slot: usize,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: KvRef,
    value: f64,
}

/// Scan state for one animated property.
///
/// `prev` and `prev_prev` are the two most recent *surviving* key values: a
/// value marked for removal is replaced by its successor and `prev_prev`
/// stays put.
#[derive(Debug)]
struct Track {
    first: KvRef,
    live: f64,
    prev: Sample,
    prev_prev: Option<Sample>,
    survivors: usize,
}

impl Track {
    fn new(first: Sample, live: f64) -> Self {
        Self {
            first: first.at,
            live,
            prev: first,
            prev_prev: None,
            survivors: 1,
        }
    }

    /// Feed the next key value; returns a key value made redundant by it.
    fn push(&mut self, next: Sample) -> Option<KvRef> {
        if same_bits(next.value, self.prev.value) {
            let redundant = match self.prev_prev {
                Some(pp) => same_bits(pp.value, next.value),
                None => self.prev.at == self.first && same_bits(self.prev.value, self.live),
            };
            if redundant {
                let removed = self.prev.at;
                self.prev = next;
                return Some(removed);
            }
        }
        self.prev_prev = Some(self.prev);
        self.prev = next;
        self.survivors += 1;
        None
    }

    /// Re-test the last surviving key value once the scan is over.
    ///
    /// A trailing value equal to `prev_prev` only holds what is already held,
    /// unless removing it would leave a single key value. A lone first key
    /// value is redundant when it restates the property's current value.
    fn finish(&self) -> Option<KvRef> {
        let redundant = match self.prev_prev {
            Some(pp) => self.survivors > 2 && same_bits(pp.value, self.prev.value),
            None => self.prev.at == self.first && same_bits(self.prev.value, self.live),
        };
        redundant.then_some(self.prev.at)
    }
}

/// Resolve every target and collect the transforms they belong to, along
/// with each target's live value.
///
/// Fails on the first target that is not a property of a transform in the
/// scene; nothing is modified in that case.
pub fn bound_transforms(
    timeline: &Timeline,
    lookup: &impl PropertyLookup,
) -> Result<(HashSet<TransformId>, HashMap<PropertyTarget, f64>)> {
    let mut bound = HashSet::new();
    let mut live = HashMap::new();
    for kv in timeline.key_frames.iter().flat_map(|kf| &kf.values) {
        if live.contains_key(&kv.target) {
            continue;
        }
        let value = lookup.live_value(&kv.target)?;
        if let Some(id) = kv.target.transform_id() {
            bound.insert(id);
        }
        live.insert(kv.target.clone(), value);
    }
    Ok((bound, live))
}

/// Find redundant key values without modifying the timeline
fn find_redundant(timeline: &Timeline, live: &HashMap<PropertyTarget, f64>) -> HashSet<KvRef> {
    let mut tracks: HashMap<&PropertyTarget, Track> = HashMap::new();
    let mut redundant = HashSet::new();

    for frame in timeline.sorted_indices() {
        for (slot, kv) in timeline.key_frames[frame].values.iter().enumerate() {
            let sample = Sample {
                at: KvRef { frame, slot },
                value: kv.end_value,
            };
            match tracks.get_mut(&kv.target) {
                Some(track) => {
                    if let Some(removed) = track.push(sample) {
                        redundant.insert(removed);
                    }
                }
                None => {
                    let current = live.get(&kv.target).copied().unwrap_or(f64::NAN);
                    tracks.insert(&kv.target, Track::new(sample, current));
                }
            }
        }
    }

    redundant.extend(tracks.values().filter_map(Track::finish));
    redundant
}

/// Reduce `timeline` in place.
///
/// `lookup` supplies the current value of each animated property. A target
/// that does not resolve to a transform property aborts the reduction with a
/// configuration fault before anything is changed.
pub fn reduce_timeline(
    timeline: &mut Timeline,
    lookup: &impl PropertyLookup,
    options: &TimelineOptions,
) -> Result<TimelineReduction> {
    let (bound, live) = bound_transforms(timeline, lookup)?;

    let mut stats = TimelineStats {
        key_frames_before: timeline.key_frames.len(),
        key_values_before: timeline.key_value_count(),
        targets: live.len(),
        ..Default::default()
    };

    let redundant = find_redundant(timeline, &live);
    stats.key_values_removed = redundant.len();

    for (frame, key_frame) in timeline.key_frames.iter_mut().enumerate() {
        if !redundant.is_empty() {
            let mut slot = 0;
            key_frame.values.retain(|_| {
                let keep = !redundant.contains(&KvRef { frame, slot });
                slot += 1;
                keep
            });
        }
        if options.downgrade_to_discrete {
            stats.key_values_discretized += discretize(&mut key_frame.values);
        }
    }

    timeline.key_frames.retain(|kf| {
        if !kf.values.is_empty() {
            return true;
        }
        if kf.on_finished.is_some() {
            stats.callback_frames_kept += 1;
            return true;
        }
        stats.key_frames_removed += 1;
        false
    });

    if stats.callback_frames_kept > 0 {
        debug!("kept {} empty keyframes with callbacks", stats.callback_frames_kept);
    }
    info!(
        "timeline: removed {} of {} key values and {} of {} keyframes, {} bound transforms",
        stats.key_values_removed,
        stats.key_values_before,
        stats.key_frames_removed,
        stats.key_frames_before,
        bound.len()
    );

    Ok(TimelineReduction { bound, stats })
}

fn discretize(values: &mut [KeyValue]) -> usize {
    let mut changed = 0;
    for kv in values.iter_mut() {
        if kv.interpolation != Interpolation::Discrete {
            kv.interpolation = Interpolation::Discrete;
            changed += 1;
        }
    }
    changed
}

/// Value of `target` at `time`.
///
/// `initial` is the property's value before the animation starts. Between
/// keyframes a continuous key value blends linearly from the previous value,
/// a discrete one holds the previous value until its own time. After the last
/// keyframe the last value holds. When several key values share a time, the
/// later one in keyframe order wins.
pub fn sample(timeline: &Timeline, target: &PropertyTarget, time: f64, initial: f64) -> f64 {
    let mut from_time = 0.0;
    let mut from_value = initial;

    for (key_time, kv) in timeline.values_in_time_order() {
        if &kv.target != target {
            continue;
        }
        if key_time > time {
            return match kv.interpolation {
                Interpolation::Discrete => from_value,
                Interpolation::Continuous => {
                    let span = key_time - from_time;
                    if span <= 0.0 {
                        kv.end_value
                    } else {
                        let t = (time - from_time) / span;
                        from_value + (kv.end_value - from_value) * t
                    }
                }
            };
        }
        from_time = key_time;
        from_value = kv.end_value;
    }
    from_value
}
