use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{AlarmSound, AudioBackend};
use crate::error::AudioError;

/// Plays the alarm through the default output device.
#[derive(Debug, Clone)]
pub struct RodioBackend {
    volume: f32,
    looped: bool,
}

impl RodioBackend {
    /// `volume` is clamped to 0.0..=1.0. A looped alarm rings until stopped.
    pub fn new(volume: f32, looped: bool) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            looped,
        }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new(0.8, true)
    }
}

enum Clip {
    Encoded(Arc<[u8]>),
    Tone { frequency_hz: f32, duration: Duration },
}

/// A loaded alarm: the open output stream plus the decoded-on-demand clip.
pub struct RodioAlarm {
    // Keep the stream alive - dropping it stops all audio
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    clip: Clip,
}

impl AudioBackend for RodioBackend {
    type Handle = RodioAlarm;

    fn load(&mut self, sound: &AlarmSound) -> Result<RodioAlarm, AudioError> {
        let clip = match sound {
            AlarmSound::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| AudioError::Load {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                // Decode once up front so a bad file fails here, not at expiry.
                Decoder::new(Cursor::new(bytes.clone()))
                    .map_err(|e| AudioError::Decode(e.to_string()))?;
                Clip::Encoded(Arc::from(bytes))
            }
            AlarmSound::Tone {
                frequency_hz,
                duration_ms,
            } => Clip::Tone {
                frequency_hz: *frequency_hz,
                duration: Duration::from_millis(*duration_ms),
            },
        };

        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;

        Ok(RodioAlarm {
            _stream: stream,
            stream_handle,
            sink: None,
            clip,
        })
    }

    fn play(&mut self, handle: &mut RodioAlarm) -> Result<(), AudioError> {
        if let Some(old) = handle.sink.take() {
            old.stop();
        }
        let sink =
            Sink::try_new(&handle.stream_handle).map_err(|e| AudioError::Output(e.to_string()))?;
        sink.set_volume(self.volume);

        match &handle.clip {
            Clip::Encoded(bytes) => {
                let source = Decoder::new(Cursor::new(Arc::clone(bytes)))
                    .map_err(|e| AudioError::Decode(e.to_string()))?;
                if self.looped {
                    sink.append(source.repeat_infinite());
                } else {
                    sink.append(source);
                }
            }
            Clip::Tone {
                frequency_hz,
                duration,
            } => {
                let beep = rodio::source::SineWave::new(*frequency_hz)
                    .take_duration(*duration)
                    .amplify(0.3);
                if self.looped {
                    // Pause, beep, repeat.
                    sink.append(beep.delay(Duration::from_millis(500)).repeat_infinite());
                } else {
                    sink.append(beep);
                }
            }
        }
        sink.play();
        handle.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self, handle: &mut RodioAlarm) -> Result<(), AudioError> {
        if let Some(sink) = handle.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn unload(&mut self, mut handle: RodioAlarm) {
        if let Some(sink) = handle.sink.take() {
            sink.stop();
        }
    }
}

/// Backend that never makes a sound. Used when the alarm is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    type Handle = ();

    fn load(&mut self, _sound: &AlarmSound) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, _handle: &mut ()) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self, _handle: &mut ()) -> Result<(), AudioError> {
        Ok(())
    }

    fn unload(&mut self, _handle: ()) {}
}
