//! Left/right slider readings.

use super::{AnalogChannel, AnalogSampler};

/// Raw slider positions, 0..=255, transmitted unscaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sliders {
    pub left: u8,
    pub right: u8,
}

impl Sliders {
    pub fn read(sampler: &mut impl AnalogSampler) -> Self {
        Self {
            left: sampler.read(AnalogChannel::SliderLeft),
            right: sampler.read(AnalogChannel::SliderRight),
        }
    }
}
