//! Bounded history of odometry and fused poses, used to apply late corrections.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::VecDeque;

use super::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One entry in the pose history.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    /// Units: seconds
    pub timestamp_s: f64,

    /// Pose from odometry alone
    pub odom_pose: Pose,

    /// Best estimate pose at this time
    pub fused_pose: Pose,
}

/// Ring buffer of samples ordered by timestamp.
///
/// The buffer holds at most `capacity` samples, and drops samples older than `window_s` before
/// the newest one. Storage is allocated once on construction.
#[derive(Debug, Clone)]
pub struct PoseHistory {
    samples: VecDeque<Sample>,
    capacity: usize,
    window_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseHistory {
    pub fn new(capacity: usize, window_s: f64) -> Self {
        Self {
            // One extra slot so an insert never reallocates before eviction
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            window_s,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Add a sample, keeping the buffer in time order. A sample with the same timestamp as an
    /// existing one replaces it.
    pub fn push(&mut self, sample: Sample) {
        self.insert(sample);
        self.evict();
    }

    /// Get the odometry and fused poses at `timestamp_s`, interpolating between neighbouring
    /// samples. Times outside the history clamp to the oldest or newest sample.
    pub fn sample_at(&self, timestamp_s: f64) -> Option<(Pose, Pose)> {
        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;

        if timestamp_s <= oldest.timestamp_s {
            return Some((oldest.odom_pose, oldest.fused_pose));
        }
        if timestamp_s >= newest.timestamp_s {
            return Some((newest.odom_pose, newest.fused_pose));
        }

        // First sample strictly after the time, guaranteed to be in 1..len by the checks above
        let hi_idx = self.samples.partition_point(|s| s.timestamp_s <= timestamp_s);
        let lo = &self.samples[hi_idx - 1];
        let hi = &self.samples[hi_idx];

        let t = (timestamp_s - lo.timestamp_s) / (hi.timestamp_s - lo.timestamp_s);

        Some((
            lo.odom_pose.interpolate(&hi.odom_pose, t),
            lo.fused_pose.interpolate(&hi.fused_pose, t),
        ))
    }

    /// Insert a corrected sample and replay all later samples on top of it.
    ///
    /// Each later sample keeps the odometry motion it had relative to `corrected.odom_pose`, which
    /// is re-applied to `corrected.fused_pose`. Returns the newest fused pose after the replay.
    pub fn insert_and_replay(&mut self, corrected: Sample) -> Option<Pose> {
        let idx = self.insert(corrected);

        for sample in self.samples.iter_mut().skip(idx + 1) {
            let motion = corrected.odom_pose.motion_to(&sample.odom_pose);
            sample.fused_pose = corrected.fused_pose.transform_by(&motion);

            // Vision never moves the heading, keep it bit-exact with odometry
            sample.fused_pose.heading_rad = sample.odom_pose.heading_rad;
        }

        self.evict();

        self.samples.back().map(|s| s.fused_pose)
    }

    /// Insert in time order, returning the index the sample now sits at.
    fn insert(&mut self, sample: Sample) -> usize {
        let idx = self.samples.partition_point(|s| s.timestamp_s < sample.timestamp_s);

        match self.samples.get_mut(idx) {
            Some(s) if s.timestamp_s == sample.timestamp_s => *s = sample,
            _ => self.samples.insert(idx, sample),
        }

        idx
    }

    /// Drop samples beyond the capacity or outside the time window.
    fn evict(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        let newest_s = match self.samples.back() {
            Some(s) => s.timestamp_s,
            None => return,
        };

        while self
            .samples
            .front()
            .map(|s| newest_s - s.timestamp_s > self.window_s)
            .unwrap_or(false)
        {
            self.samples.pop_front();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector2;

    fn sample(t: f64, x: f64) -> Sample {
        Sample {
            timestamp_s: t,
            odom_pose: Pose::new(x, 0.0, 0.0),
            fused_pose: Pose::new(x, 0.0, 0.0),
        }
    }

    #[test]
    fn test_eviction() {
        let mut h = PoseHistory::new(4, 1.0);

        for i in 0..6 {
            h.push(sample(i as f64 * 0.1, i as f64));
        }
        assert_eq!(h.len(), 4);
        assert_eq!(h.oldest().unwrap().timestamp_s, 0.2);

        // Jump forward in time, everything older than the window goes
        h.push(sample(2.0, 10.0));
        assert_eq!(h.len(), 1);
        assert_eq!(h.newest().unwrap().timestamp_s, 2.0);
    }

    #[test]
    fn test_sample_at() {
        let mut h = PoseHistory::new(16, 1.5);
        assert!(h.sample_at(0.0).is_none());

        h.push(sample(0.0, 0.0));
        h.push(sample(0.2, 2.0));
        h.push(sample(0.1, 1.0));

        let (odom, fused) = h.sample_at(0.15).unwrap();
        assert_abs_diff_eq!(odom.position_m.x, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fused.position_m.x, 1.5, epsilon = 1e-12);

        assert_eq!(h.sample_at(-1.0).unwrap().0.position_m.x, 0.0);
        assert_eq!(h.sample_at(5.0).unwrap().0.position_m.x, 2.0);
        assert_eq!(h.sample_at(0.1).unwrap().0.position_m.x, 1.0);
    }

    #[test]
    fn test_insert_and_replay() {
        let mut h = PoseHistory::new(16, 1.5);
        for i in 0..4 {
            h.push(sample(i as f64 * 0.1, i as f64));
        }

        // Correct the pose at 0.15 s by +1 m in Y
        let corrected = Sample {
            timestamp_s: 0.15,
            odom_pose: Pose::new(1.5, 0.0, 0.0),
            fused_pose: Pose::new(1.5, 1.0, 0.0),
        };
        let newest = h.insert_and_replay(corrected).unwrap();

        assert_eq!(h.len(), 5);
        assert_abs_diff_eq!(newest.position_m, Vector2::new(3.0, 1.0), epsilon = 1e-12);

        // Samples before the correction are untouched
        let untouched: Vec<f64> = h.iter().take(2).map(|s| s.fused_pose.position_m.y).collect();
        assert_eq!(untouched, vec![0.0, 0.0]);

        // A second correction at the same time replaces the first
        let again = Sample {
            fused_pose: Pose::new(1.5, -1.0, 0.0),
            ..corrected
        };
        let newest = h.insert_and_replay(again).unwrap();
        assert_eq!(h.len(), 5);
        assert_abs_diff_eq!(newest.position_m, Vector2::new(3.0, -1.0), epsilon = 1e-12);
    }
}
