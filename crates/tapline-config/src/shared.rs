//! Live parameters shared with the audio thread.

use std::sync::Arc;

use tapline_core::SharedParam;
use tapline_effects::reverb_amount_param;
use tapline_io::volume_param;

use crate::PlayerSettings;

/// Reverb amount and output volume, readable from the audio thread.
///
/// Clones share the same underlying parameters.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    reverb: Arc<SharedParam>,
    volume: Arc<SharedParam>,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self {
            reverb: Arc::new(reverb_amount_param()),
            volume: Arc::new(volume_param()),
        }
    }
}

impl SharedSettings {
    /// Live parameters at their defaults (reverb off, unity volume).
    pub fn new() -> Self {
        Self::default()
    }

    /// Live parameters initialised from persisted settings.
    pub fn from_settings(settings: &PlayerSettings) -> Self {
        let shared = Self::new();
        shared.set_reverb(settings.reverb.amount);
        shared.set_volume(settings.volume);
        shared
    }

    /// Copy the live values back for saving.
    pub fn store_into(&self, settings: &mut PlayerSettings) {
        settings.reverb.amount = self.reverb_amount();
        settings.volume = self.volume_level();
    }

    /// Parameter handed to the reverb stage.
    pub fn reverb(&self) -> &Arc<SharedParam> {
        &self.reverb
    }

    /// Parameter handed to the output adapter.
    pub fn volume(&self) -> &Arc<SharedParam> {
        &self.volume
    }

    /// Set the reverb amount (0 = off).
    pub fn set_reverb(&self, amount: u8) {
        self.reverb.set(i32::from(amount));
    }

    /// Current reverb amount.
    pub fn reverb_amount(&self) -> u8 {
        self.reverb.get() as u8
    }

    /// Set the output gain numerator.
    pub fn set_volume(&self, volume: i16) {
        self.volume.set(i32::from(volume));
    }

    /// Current output gain numerator.
    pub fn volume_level(&self) -> i16 {
        self.volume.get() as i16
    }
}
