use std::time::{Duration, Instant};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use interview_backend::engagement::fusion::{engagement_score, positivity_score, FusionInputs};
use interview_backend::engagement::geometry::{eye_aspect_ratio, LEFT_EYE};
use interview_backend::engagement::smoother::ScoreSmoother;
use interview_backend::engagement::types::{Emotion, LandmarkSet, Point, LANDMARK_COUNT};
use interview_backend::engagement::EngagementConfig;

const ALL_EMOTIONS: [Emotion; 7] = [
    Emotion::Happy,
    Emotion::Surprise,
    Emotion::Neutral,
    Emotion::Angry,
    Emotion::Sad,
    Emotion::Fear,
    Emotion::Disgust,
];

fn emotion_strategy() -> impl Strategy<Value = Emotion> {
    (0usize..ALL_EMOTIONS.len()).prop_map(|i| ALL_EMOTIONS[i])
}

proptest! {
    #[test]
    fn pt_engagement_is_always_bounded(
        emotion in emotion_strategy(),
        blinks in 0.0_f64..1000.0,
        movement in proptest::option::of(0.0_f64..10_000.0),
        tilted in any::<bool>(),
    ) {
        let cfg = EngagementConfig::default();
        let inputs = FusionInputs {
            emotion,
            blinks_per_sec: blinks,
            head_movement: movement,
            tilt_penalty: if tilted { cfg.tilt_penalty } else { 0.0 },
        };
        let score = engagement_score(&inputs, &cfg);
        prop_assert!((0.0..=1.0).contains(&score), "engagement {score} out of range");
    }

    #[test]
    fn pt_positivity_is_always_bounded(
        emotion in emotion_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let score = positivity_score(emotion, &mut rng);
        prop_assert!((0.0..1.0).contains(&score), "positivity {score} out of range");
    }

    #[test]
    fn pt_positivity_respects_bucket_ordering(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let positive = positivity_score(Emotion::Happy, &mut rng);
        let neutral = positivity_score(Emotion::Neutral, &mut rng);
        let negative = positivity_score(Emotion::Sad, &mut rng);
        prop_assert!(positive >= 0.8);
        prop_assert!((0.4..0.8).contains(&neutral));
        prop_assert!(negative < 0.4);
    }

    #[test]
    fn pt_smoother_never_exceeds_capacity(
        samples in proptest::collection::vec((0.0_f64..1.0, 0.0_f64..1.0), 0..40),
    ) {
        let mut smoother = ScoreSmoother::new(10, Duration::from_secs(1));
        let t0 = Instant::now();
        for (i, (e, p)) in samples.iter().enumerate() {
            smoother.record(*e, *p, t0 + Duration::from_secs(i as u64 * 2));
        }
        prop_assert!(smoother.len() <= 10);

        let (e, p) = smoother.smoothed();
        prop_assert!((0.0..=1.0).contains(&e));
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn pt_ear_is_positive_and_finite_for_nondegenerate_eyes(
        corner_dx in 0.01_f64..0.2,
        lid_dy in 0.001_f64..0.1,
    ) {
        let mut points = vec![Point::new(0.5, 0.5); LANDMARK_COUNT];
        points[LEFT_EYE[0]] = Point::new(0.5 - corner_dx, 0.5);
        points[LEFT_EYE[3]] = Point::new(0.5 + corner_dx, 0.5);
        points[LEFT_EYE[1]] = Point::new(0.5 - corner_dx / 2.0, 0.5 - lid_dy);
        points[LEFT_EYE[5]] = Point::new(0.5 - corner_dx / 2.0, 0.5 + lid_dy);
        points[LEFT_EYE[2]] = Point::new(0.5 + corner_dx / 2.0, 0.5 - lid_dy);
        points[LEFT_EYE[4]] = Point::new(0.5 + corner_dx / 2.0, 0.5 + lid_dy);
        let set = LandmarkSet::new(points).unwrap();

        let ear = eye_aspect_ratio(&set, &LEFT_EYE);
        prop_assert!(ear.is_finite());
        prop_assert!(ear > 0.0);
    }
}
