use crate::counter::{CounterError, CounterSession};

/// One track's slot on the tape, in seconds from pressing record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrack {
    pub name: String,
    pub start: f64,
    pub duration: f64,
}

impl PlannedTrack {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// The timed layout of a whole side: leader, then tracks separated by the
/// inter-track gap. No gap trails the final track.
#[derive(Debug, Clone)]
pub struct RecordingPlan {
    pub tracks: Vec<PlannedTrack>,
    pub leader_gap: f64,
    pub track_gap: f64,
}

impl RecordingPlan {
    pub fn build(
        leader_gap: f64,
        track_gap: f64,
        tracks: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        let mut planned = Vec::new();
        let mut cursor = leader_gap;
        for (name, duration) in tracks {
            planned.push(PlannedTrack {
                name,
                start: cursor,
                duration,
            });
            cursor += duration + track_gap;
        }
        Self {
            tracks: planned,
            leader_gap,
            track_gap,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Wall time from record start to the end of the last track.
    pub fn total_time(&self) -> f64 {
        self.tracks
            .last()
            .map(|t| t.end())
            .unwrap_or(self.leader_gap)
    }

    pub fn fits_on(&self, tape_duration: f64) -> bool {
        self.total_time() <= tape_duration
    }

    /// Seconds by which the plan overshoots the side, zero when it fits.
    pub fn overrun(&self, tape_duration: f64) -> f64 {
        (self.total_time() - tape_duration).max(0.0)
    }

    /// Counter stamps (start, end) for each slot, in plan order.
    pub fn counter_stamps(
        &self,
        session: &CounterSession,
    ) -> Result<Vec<(f64, f64)>, CounterError> {
        self.tracks
            .iter()
            .map(|t| Ok((session.counter_at(t.start)?, session.counter_at(t.end())?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterSetup;

    fn two_track_plan() -> RecordingPlan {
        RecordingPlan::build(
            10.0,
            5.0,
            [("one".to_string(), 60.0), ("two".to_string(), 120.0)],
        )
    }

    #[test]
    fn tracks_start_after_the_leader_and_gaps() {
        let plan = two_track_plan();
        assert_eq!(plan.tracks[0].start, 10.0);
        assert_eq!(plan.tracks[0].end(), 70.0);
        assert_eq!(plan.tracks[1].start, 75.0);
        assert_eq!(plan.tracks[1].end(), 195.0);
    }

    #[test]
    fn no_gap_trails_the_final_track() {
        let plan = two_track_plan();
        assert_eq!(plan.total_time(), 195.0);
    }

    #[test]
    fn capacity_check_uses_total_time() {
        let plan = two_track_plan();
        assert!(plan.fits_on(195.0));
        assert!(!plan.fits_on(180.0));
        assert_eq!(plan.overrun(180.0), 15.0);
        assert_eq!(plan.overrun(1800.0), 0.0);
    }

    #[test]
    fn empty_plan_is_just_the_leader() {
        let plan = RecordingPlan::build(10.0, 5.0, []);
        assert!(plan.is_empty());
        assert_eq!(plan.total_time(), 10.0);
    }

    #[test]
    fn counter_stamps_track_the_layout() {
        let plan = two_track_plan();
        let session = CounterSession::new(CounterSetup::Static { rate: 2.0 }).unwrap();
        let stamps = plan.counter_stamps(&session).unwrap();
        assert_eq!(stamps, vec![(20.0, 140.0), (150.0, 390.0)]);
    }
}
