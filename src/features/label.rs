//! Bootstrap dropout label. No historical outcome exists, so training labels are drawn
//! from a weighted risk score instead of thresholded, keeping the classifier from
//! relearning the formula verbatim.

use super::FeatureVector;
use rand::Rng;

/// Backlog count at which the backlog term saturates.
pub const BACKLOG_CAP: u32 = 5;

const W_ATTENDANCE: f64 = 0.3;
const W_CGPA: f64 = 0.2;
const W_BACKLOGS: f64 = 0.2;
const W_FEES: f64 = 0.3;

/// Deterministic weighted score in [0, 1]; each term is normalized before weighting.
pub fn dropout_score(f: &FeatureVector) -> f64 {
    let attendance = ((100.0 - f.attendance) / 100.0).clamp(0.0, 1.0);
    let cgpa = ((10.0 - f.cgpa) / 10.0).clamp(0.0, 1.0);
    let backlogs = (f.backlogs as f64 / BACKLOG_CAP as f64).min(1.0);
    let fees = f.pending_fee_ratio.clamp(0.0, 1.0);
    W_ATTENDANCE * attendance + W_CGPA * cgpa + W_BACKLOGS * backlogs + W_FEES * fees
}

/// Bernoulli draw with success probability `dropout_score`.
pub fn synthesize_label<R: Rng + ?Sized>(f: &FeatureVector, rng: &mut R) -> bool {
    rng.gen::<f64>() < dropout_score(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fv(attendance: f64, cgpa: f64, backlogs: u32, pending_fee_ratio: f64) -> FeatureVector {
        FeatureVector {
            attendance,
            cgpa,
            backlogs,
            assignments_submitted: 0,
            pending_fee_ratio,
        }
    }

    #[test]
    fn score_examples() {
        assert!((dropout_score(&fv(95.0, 9.0, 0, 0.0)) - 0.035).abs() < 1e-12);
        assert!((dropout_score(&fv(40.0, 3.0, 4, 0.8)) - 0.72).abs() < 1e-12);
        assert!((dropout_score(&fv(0.0, 0.0, 9, 1.0)) - 1.0).abs() < 1e-12);
        assert_eq!(dropout_score(&fv(100.0, 10.0, 0, 0.0)), 0.0);
    }

    #[test]
    fn score_never_drops_when_inputs_worsen() {
        let base = fv(70.0, 6.0, 1, 0.2);
        let s = dropout_score(&base);
        assert!(dropout_score(&fv(60.0, 6.0, 1, 0.2)) >= s);
        assert!(dropout_score(&fv(70.0, 5.0, 1, 0.2)) >= s);
        assert!(dropout_score(&fv(70.0, 6.0, 2, 0.2)) >= s);
        assert!(dropout_score(&fv(70.0, 6.0, 1, 0.5)) >= s);

        let mut prev = 0.0;
        for backlogs in 0..10 {
            let next = dropout_score(&fv(70.0, 6.0, backlogs, 0.2));
            assert!(next >= prev);
            prev = next;
        }
        assert_eq!(
            dropout_score(&fv(70.0, 6.0, BACKLOG_CAP, 0.2)),
            dropout_score(&fv(70.0, 6.0, BACKLOG_CAP + 3, 0.2))
        );
    }

    #[test]
    fn label_frequency_tracks_score() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = 20_000;

        let low = fv(95.0, 9.0, 0, 0.0);
        let hits = (0..trials).filter(|_| synthesize_label(&low, &mut rng)).count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.035).abs() < 0.01, "low-risk rate {}", rate);

        let high = fv(40.0, 3.0, 4, 0.8);
        let hits = (0..trials).filter(|_| synthesize_label(&high, &mut rng)).count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.72).abs() < 0.02, "high-risk rate {}", rate);
    }

    #[test]
    fn extremes_are_certain() {
        let mut rng = StdRng::seed_from_u64(1);
        let perfect = fv(100.0, 10.0, 0, 0.0);
        assert!((0..1000).all(|_| !synthesize_label(&perfect, &mut rng)));
    }
}
