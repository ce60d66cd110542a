//! SAADC-backed analog caches.
//!
//! A sampling task converts all channels and stores the results; the
//! main loop reads the latest values through the library traits.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use embassy_nrf::saadc::Saadc;

use crate::config::GOAL_SAMPLES;
use crate::control::goal::LightSensor;
use crate::input::{AnalogChannel, AnalogSampler};

/// Latest 8-bit reading of each multifunction-board channel.
///
/// SAADC channel order must be X, Y, left slider, right slider.
pub struct AnalogCache {
    channels: [AtomicU8; 4],
}

impl AnalogCache {
    pub const fn new() -> Self {
        Self {
            channels: [const { AtomicU8::new(0) }; 4],
        }
    }

    fn slot(channel: AnalogChannel) -> usize {
        match channel {
            AnalogChannel::JoystickX => 0,
            AnalogChannel::JoystickY => 1,
            AnalogChannel::SliderLeft => 2,
            AnalogChannel::SliderRight => 3,
        }
    }

    /// Convert every channel once and store the results.
    pub async fn refresh(&self, saadc: &mut Saadc<'_, 4>) {
        let mut buf = [0i16; 4];
        saadc.sample(&mut buf).await;
        for (cell, raw) in self.channels.iter().zip(buf) {
            // Single-ended inputs can read slightly negative near ground.
            cell.store(raw.clamp(0, 255) as u8, Ordering::Relaxed);
        }
    }
}

impl Default for AnalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogSampler for &AnalogCache {
    fn read(&mut self, channel: AnalogChannel) -> u8 {
        self.channels[AnalogCache::slot(channel)].load(Ordering::Relaxed)
    }
}

/// Ring of the most recent photodiode conversions.
///
/// Each `read` hands out the next entry, so one filtered level averages
/// `GOAL_SAMPLES` distinct conversions.
pub struct LightCache {
    samples: [AtomicU16; GOAL_SAMPLES],
    write: AtomicU8,
    read: AtomicU8,
}

impl LightCache {
    pub const fn new() -> Self {
        Self {
            samples: [const { AtomicU16::new(u16::MAX) }; GOAL_SAMPLES],
            write: AtomicU8::new(0),
            read: AtomicU8::new(0),
        }
    }

    pub async fn refresh(&self, saadc: &mut Saadc<'_, 1>) {
        let mut buf = [0i16; 1];
        saadc.sample(&mut buf).await;
        let index = usize::from(self.write.fetch_add(1, Ordering::Relaxed)) % GOAL_SAMPLES;
        self.samples[index].store(buf[0].max(0) as u16, Ordering::Relaxed);
    }
}

impl Default for LightCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSensor for &LightCache {
    fn read(&mut self) -> u16 {
        let index = usize::from(self.read.fetch_add(1, Ordering::Relaxed)) % GOAL_SAMPLES;
        self.samples[index].load(Ordering::Relaxed)
    }
}
