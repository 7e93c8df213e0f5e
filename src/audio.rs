//! Audio collaborator
//!
//! The round logic only triggers cues; playback belongs to the host.

/// Sound cues the round logic can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Round finished (winner fanfare)
    RoundEnd,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::RoundEnd => "round_end",
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs cues instead of playing them (headless runs)
#[derive(Debug, Clone, Default)]
pub struct LogAudio {
    muted: bool,
    played: u32,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Cues played while unmuted
    pub fn played(&self) -> u32 {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        self.played += 1;
        log::info!("Sound: {}", cue.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_log_audio_skips() {
        let mut audio = LogAudio::new();
        audio.play(SoundCue::RoundEnd);
        audio.set_muted(true);
        audio.play(SoundCue::RoundEnd);
        assert!(audio.is_muted());
        assert_eq!(audio.played(), 1);
    }
}
