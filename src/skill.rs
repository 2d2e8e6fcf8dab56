use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF, Normal};

use crate::error::{Result, SimError};

/// Distribution that raw skill values are drawn from.
///
/// A competitor's percentile is this distribution's CDF at its raw skill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum SkillDistribution {
    Normal { loc: f64, scale: f64 },
    Beta { alpha: f64, beta: f64 },
    /// Raw skill is `1 - x` for `x ~ Beta(alpha, beta)`, while percentiles
    /// are still read from the unmirrored Beta CDF. With `Beta(2, 5)` this
    /// skews the field towards high percentiles.
    MirroredBeta { alpha: f64, beta: f64 },
}

impl Default for SkillDistribution {
    fn default() -> Self {
        SkillDistribution::Normal {
            loc: 0.0,
            scale: 1.0,
        }
    }
}

impl SkillDistribution {
    /// Percentile in [0, 1] of `raw` under this distribution.
    pub fn percentile(&self, raw: f64) -> Result<f64> {
        let p = match *self {
            SkillDistribution::Normal { loc, scale } => normal(loc, scale)?.cdf(raw),
            SkillDistribution::Beta { alpha, beta } | SkillDistribution::MirroredBeta { alpha, beta } => {
                beta_dist(alpha, beta)?.cdf(raw)
            }
        };
        Ok(p)
    }

    /// Draw a raw skill value.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<f64> {
        let raw = match *self {
            SkillDistribution::Normal { loc, scale } => normal(loc, scale)?.sample(rng),
            SkillDistribution::Beta { alpha, beta } => beta_dist(alpha, beta)?.sample(rng),
            SkillDistribution::MirroredBeta { alpha, beta } => 1.0 - beta_dist(alpha, beta)?.sample(rng),
        };
        Ok(raw)
    }

    /// Check the parameters without drawing anything.
    pub fn validate(&self) -> Result<()> {
        self.percentile(0.0).map(|_| ())
    }
}

fn normal(loc: f64, scale: f64) -> Result<Normal> {
    Normal::new(loc, scale).map_err(|e| SimError::InvalidSkillDistribution(e.to_string()))
}

fn beta_dist(alpha: f64, beta: f64) -> Result<Beta> {
    Beta::new(alpha, beta).map_err(|e| SimError::InvalidSkillDistribution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_normal_percentile() {
        let dist = SkillDistribution::Normal { loc: 0.0, scale: 1.0 };
        assert!((dist.percentile(0.0).unwrap() - 0.5).abs() < 1e-12);
        // Reference tracked entrant at 2.5 sigma
        assert!((dist.percentile(2.5).unwrap() - 0.99379).abs() < 1e-4);
    }

    #[test]
    fn test_beta_percentile_bounds() {
        let dist = SkillDistribution::Beta { alpha: 2.0, beta: 5.0 };
        assert!(dist.percentile(0.0).unwrap().abs() < 1e-12);
        assert!((dist.percentile(1.0).unwrap() - 1.0).abs() < 1e-12);
        let p = dist.percentile(0.98).unwrap();
        assert!(p > 0.99 && p <= 1.0);
    }

    #[test]
    fn test_percentile_is_repeatable() {
        let dist = SkillDistribution::Beta { alpha: 2.0, beta: 5.0 };
        assert_eq!(dist.percentile(0.3).unwrap(), dist.percentile(0.3).unwrap());
    }

    #[test]
    fn test_invalid_parameters() {
        let dist = SkillDistribution::Normal { loc: 0.0, scale: -1.0 };
        assert!(matches!(dist.validate(), Err(SimError::InvalidSkillDistribution(_))));

        let dist = SkillDistribution::Beta { alpha: 0.0, beta: 5.0 };
        assert!(dist.percentile(0.5).is_err());
    }

    #[test]
    fn test_sample_seeded() {
        let dist = SkillDistribution::default();
        let mut rng1 = ChaCha8Rng::seed_from_u64(3);
        let mut rng2 = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(dist.sample(&mut rng1).unwrap(), dist.sample(&mut rng2).unwrap());
        }
    }

    #[test]
    fn test_mirrored_beta_skews_high() {
        let plain = SkillDistribution::Beta { alpha: 2.0, beta: 5.0 };
        let mirrored = SkillDistribution::MirroredBeta { alpha: 2.0, beta: 5.0 };
        let mut rng1 = ChaCha8Rng::seed_from_u64(8);
        let mut rng2 = ChaCha8Rng::seed_from_u64(8);

        let n = 2000;
        let mut plain_sum = 0.0;
        let mut mirrored_sum = 0.0;
        for _ in 0..n {
            let x = plain.sample(&mut rng1).unwrap();
            let y = mirrored.sample(&mut rng2).unwrap();
            assert!((x + y - 1.0).abs() < 1e-12);
            plain_sum += plain.percentile(x).unwrap();
            mirrored_sum += mirrored.percentile(y).unwrap();
        }

        // Plain draws read through their own CDF are uniform
        assert!((plain_sum / n as f64 - 0.5).abs() < 0.05);
        assert!(mirrored_sum / n as f64 > 0.8);
        assert_eq!(plain.percentile(0.4).unwrap(), mirrored.percentile(0.4).unwrap());
    }

    #[test]
    fn test_deserialize() {
        let dist: SkillDistribution =
            serde_json::from_str(r#"{"family": "beta", "alpha": 2.0, "beta": 5.0}"#).unwrap();
        assert_eq!(dist, SkillDistribution::Beta { alpha: 2.0, beta: 5.0 });

        let dist: SkillDistribution =
            serde_json::from_str(r#"{"family": "mirrored_beta", "alpha": 2.0, "beta": 5.0}"#).unwrap();
        assert_eq!(dist, SkillDistribution::MirroredBeta { alpha: 2.0, beta: 5.0 });
    }
}
