// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Decimal score estimate for a printed target face.

/// Scoring geometry of one paper face. Diameters in mm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TargetFace {
    pub name: &'static str,
    /// Diameter of the 10 ring.
    pub ten_ring_mm: f64,
    /// Diameter of the inner ten (X) ring.
    pub inner_ten_mm: f64,
    /// Radial distance worth one point outside the 10 ring.
    pub ring_width_mm: f64,
    /// Scores at or below this are reported as zero.
    pub min_score: f64,
}

/// NRA B-38, the 50 yd reduction of the ISSF rapid-fire face.
pub const NRA_B38: TargetFace = TargetFace {
    name: "NRA B-38",
    ten_ring_mm: 92.0,
    inner_ten_mm: 46.0,
    ring_width_mm: 40.0,
    min_score: 5.0,
};

impl TargetFace {
    /// Radius at which a projectile of `caliber_mm` still touches the 10 ring.
    pub fn ten_radius(&self, caliber_mm: f64) -> f64 {
        self.ten_ring_mm / 2.0 + caliber_mm / 2.0
    }

    /// Whether the hit touches the inner ten.
    pub fn is_inner_ten(&self, radius_mm: f64, caliber_mm: f64) -> bool {
        radius_mm <= self.inner_ten_mm / 2.0 + caliber_mm / 2.0
    }

    /// Decimal score for a hit `radius_mm` from the centre.
    pub fn score(&self, radius_mm: f64, caliber_mm: f64) -> f64 {
        let r10 = self.ten_radius(caliber_mm);
        let score = if radius_mm > r10 {
            10.0 - (radius_mm - r10) / self.ring_width_mm
        } else {
            11.0 - radius_mm / r10
        };

        if score > self.min_score {
            score
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const PELLET: f64 = 4.5;

    #[test]
    fn centre_shot_is_eleven() {
        assert_abs_diff_eq!(NRA_B38.score(0.0, PELLET), 11.0);
        assert!(NRA_B38.is_inner_ten(0.0, PELLET));
    }

    #[test]
    fn ten_ring_edge_is_ten() {
        let r10 = NRA_B38.ten_radius(PELLET);
        assert_abs_diff_eq!(r10, 48.25);
        assert_abs_diff_eq!(NRA_B38.score(r10, PELLET), 10.0);
        assert!(!NRA_B38.is_inner_ten(r10, PELLET));
    }

    #[test]
    fn outside_the_ten_ring_drops_one_point_per_ring_width() {
        assert_abs_diff_eq!(NRA_B38.score(48.25 + 60.0, PELLET), 8.5, epsilon = 1e-12);
    }

    #[test]
    fn low_scores_are_zero() {
        assert_eq!(NRA_B38.score(48.25 + 200.0, PELLET), 0.0);
        assert_eq!(NRA_B38.score(1000.0, PELLET), 0.0);
    }
}
