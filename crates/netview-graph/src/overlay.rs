//! Proportional pie overlay data.

use tracing::warn;

/// Ordered overlay proportions. Either empty or non-negative values summing to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments(Vec<f32>);

impl Segments {
    /// Normalize raw weights into proportions.
    ///
    /// A non-positive total, or any non-finite value, disables the overlay.
    /// Individual negative weights in a positive total count as zero.
    pub fn normalized(values: &[f32]) -> Self {
        if values.iter().any(|v| !v.is_finite()) {
            warn!("Discarding overlay values containing non-finite entries");
            return Self::default();
        }
        // Summed in f64 so large finite weights cannot overflow to infinity.
        let raw_sum: f64 = values.iter().map(|v| f64::from(*v)).sum();
        if raw_sum <= 0.0 {
            return Self::default();
        }
        let clamped: Vec<f64> = values.iter().map(|v| f64::from(v.max(0.0))).collect();
        let sum: f64 = clamped.iter().sum();
        if !sum.is_finite() {
            warn!("Discarding overlay values whose total is not finite");
            return Self::default();
        }
        Self(clamped.into_iter().map(|v| (v / sum) as f32).collect())
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `(start, span)` in degrees for each segment, starting at angle 0.
    pub fn sweeps(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.0.iter().scan(0.0_f32, |start, value| {
            let sweep = (*start * 360.0, value * 360.0);
            *start += value;
            Some(sweep)
        })
    }
}
