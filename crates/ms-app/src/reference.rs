//! Reference waveforms built from their configuration.

use ms_core::Real;
use ms_project::ReferenceDef;
use ms_sim::ReferenceSource;
use std::f64::consts::TAU;

/// Reference signal generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    def: ReferenceDef,
}

impl Reference {
    pub fn new(def: ReferenceDef) -> Self {
        Self { def }
    }

    pub fn def(&self) -> &ReferenceDef {
        &self.def
    }
}

impl From<&ReferenceDef> for Reference {
    fn from(def: &ReferenceDef) -> Self {
        Self::new(def.clone())
    }
}

impl ReferenceSource for Reference {
    fn sample(&self, t: Real) -> Real {
        match self.def {
            ReferenceDef::Constant { value } => value,
            ReferenceDef::Square {
                amplitude,
                frequency_hz,
                offset,
            } => {
                let period = 1.0 / frequency_hz;
                // High through the first half period, including its end
                let level = if t.rem_euclid(period) <= 0.5 * period {
                    amplitude
                } else {
                    -amplitude
                };
                level + offset
            }
            ReferenceDef::Sine {
                amplitude,
                frequency_hz,
                offset,
            } => amplitude * (TAU * frequency_hz * t).sin() + offset,
            ReferenceDef::Step {
                initial,
                value,
                time_s,
            } => {
                if t >= time_s {
                    value
                } else {
                    initial
                }
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn square_only_takes_two_levels(
            t in -100.0_f64..100.0,
            amplitude in 0.0_f64..10.0,
            frequency_hz in 0.01_f64..10.0,
            offset in -5.0_f64..5.0,
        ) {
            let r = Reference::new(ReferenceDef::Square { amplitude, frequency_hz, offset });
            let v = r.sample(t);
            prop_assert!(v == amplitude + offset || v == -amplitude + offset);
        }
    }
}
