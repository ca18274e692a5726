//! Tones through the default audio device.
//!
//! `rodio` output streams are not `Send`, so a dedicated thread owns the
//! stream and sink and takes commands over a channel.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, Sink};
use studytimer_core::storage::AudioConfig;
use studytimer_core::{PlatformError, ToneClip, TonePlayer};
use tracing::{debug, warn};

const VOLUME: f32 = 0.25;

enum AudioCommand {
    Once(ToneClip),
    Looping(ToneClip),
    Stop,
}

/// Plays each clip from the file named in the audio config, or a
/// synthesized beep when that file does not exist.
pub struct SynthTones {
    delay_clip: String,
    alarm_clip: String,
    tx: Option<Sender<AudioCommand>>,
}

impl SynthTones {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            delay_clip: config.delay_clip.clone(),
            alarm_clip: config.alarm_clip.clone(),
            tx: None,
        }
    }

    fn send(&mut self, cmd: AudioCommand) -> Result<(), PlatformError> {
        let tx = match &self.tx {
            Some(tx) => tx.clone(),
            None => {
                let tx = spawn_audio_thread(self.delay_clip.clone(), self.alarm_clip.clone())?;
                self.tx = Some(tx.clone());
                tx
            }
        };
        tx.send(cmd).map_err(|_| {
            self.tx = None;
            PlatformError::failed("audio", "audio thread has exited")
        })
    }
}

impl TonePlayer for SynthTones {
    fn play_once(&mut self, clip: ToneClip) -> Result<(), PlatformError> {
        self.send(AudioCommand::Once(clip))
    }

    fn play_looping(&mut self, clip: ToneClip) -> Result<(), PlatformError> {
        self.send(AudioCommand::Looping(clip))
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        if self.tx.is_none() {
            return Ok(());
        }
        self.send(AudioCommand::Stop)
    }
}

fn spawn_audio_thread(
    delay_clip: String,
    alarm_clip: String,
) -> Result<Sender<AudioCommand>, PlatformError> {
    let (tx, rx) = mpsc::channel::<AudioCommand>();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

    thread::Builder::new()
        .name("audio-engine".to_string())
        .spawn(move || {
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("no audio output: {e}")));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));
            let mut sink: Option<Sink> = None;

            while let Ok(cmd) = rx.recv() {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                let (clip, looping) = match cmd {
                    AudioCommand::Stop => continue,
                    AudioCommand::Once(clip) => (clip, false),
                    AudioCommand::Looping(clip) => (clip, true),
                };
                let name = match clip {
                    ToneClip::Delay => &delay_clip,
                    ToneClip::Alarm => &alarm_clip,
                };
                match Sink::try_new(&handle) {
                    Ok(new_sink) => {
                        new_sink.set_volume(VOLUME);
                        append_clip(&new_sink, clip, name, looping);
                        sink = Some(new_sink);
                    }
                    Err(e) => warn!(error = %e, "failed to create audio sink"),
                }
            }
        })
        .map_err(|e| PlatformError::failed("audio", e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(tx),
        Ok(Err(message)) => Err(PlatformError::failed("audio", message)),
        Err(_) => Err(PlatformError::failed("audio", "audio thread failed to start")),
    }
}

fn append_clip(sink: &Sink, clip: ToneClip, name: &str, looping: bool) {
    let path = Path::new(name);
    if path.is_file() {
        match File::open(path) {
            Ok(file) => {
                let decoded = if looping {
                    Decoder::new_looped(BufReader::new(file)).map(|d| sink.append(d))
                } else {
                    Decoder::new(BufReader::new(file)).map(|d| sink.append(d))
                };
                match decoded {
                    Ok(()) => return,
                    Err(e) => warn!(clip = name, error = %e, "undecodable clip, using beep"),
                }
            }
            Err(e) => warn!(clip = name, error = %e, "unreadable clip, using beep"),
        }
    } else {
        debug!(clip = name, "no clip file, using beep");
    }

    let pitch = match clip {
        ToneClip::Delay => 660.0,
        ToneClip::Alarm => 880.0,
    };
    let beep = SineWave::new(pitch).take_duration(Duration::from_millis(400));
    if looping {
        sink.append(beep.delay(Duration::from_millis(600)).repeat_infinite());
    } else {
        sink.append(beep);
    }
}
