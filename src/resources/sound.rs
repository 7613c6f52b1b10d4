//! Sound triggering.
//!
//! Mini-games only ever say "play this file"; [`SoundBoard`] resolves the
//! identifier to a path, loads the clip once and hands it to an
//! [`AudioBackend`]. A clip that fails to load is cached as silent so a
//! missing asset is reported once and never stalls the frame loop.
//!
//! With the `audio` feature the clips are decoded and played through
//! rodio; without it, or without an output device, effects ring the bell.

use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the mini-games see.
pub trait SoundTrigger {
    fn play(&self, id: &str);
    fn play_looped(&self, id: &str);
    fn stop_all(&self);
}

/// A loaded clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub path: PathBuf,
    /// Encoded file contents, shared with whatever backend decodes them.
    pub data: Arc<[u8]>,
    /// Linear gain in `[0, 1]`, applied when the clip is next started.
    pub gain: f32,
}

pub trait AudioBackend {
    fn start(&mut self, clip: &Clip, looped: bool);
    fn stop_all(&mut self);
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn start(&mut self, clip: &Clip, looped: bool) {
        (**self).start(clip, looped);
    }

    fn stop_all(&mut self) {
        (**self).stop_all();
    }
}

/// The best backend available: rodio on the default output device when
/// built with `audio`, the terminal bell otherwise.
pub fn default_backend() -> Box<dyn AudioBackend> {
    device_backend().unwrap_or_else(|| Box::new(BellBackend))
}

#[cfg(feature = "audio")]
fn device_backend() -> Option<Box<dyn AudioBackend>> {
    device::RodioBackend::try_default().map(|b| Box::new(b) as Box<dyn AudioBackend>)
}

#[cfg(not(feature = "audio"))]
fn device_backend() -> Option<Box<dyn AudioBackend>> {
    None
}

/// Rings the terminal bell for one-shot effects. Looped music is ignored.
#[derive(Debug, Default)]
pub struct BellBackend;

impl AudioBackend for BellBackend {
    fn start(&mut self, clip: &Clip, looped: bool) {
        if looped || clip.gain <= 0.0 {
            return;
        }
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }

    fn stop_all(&mut self) {}
}

#[cfg(feature = "audio")]
pub mod device {
    use super::{AudioBackend, Clip};
    use log::{info, warn};
    use rodio::source::Buffered;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::Arc;

    type Decoded = Buffered<Decoder<Cursor<Arc<[u8]>>>>;

    /// Plays clips on the default output device. Each clip is decoded once
    /// and replayed from the buffered samples.
    pub struct RodioBackend {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        decoded: HashMap<PathBuf, Option<Decoded>>,
        sinks: Vec<Sink>,
    }

    impl RodioBackend {
        /// `None` when there is no output device.
        pub fn try_default() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    info!("audio device found, playback enabled");
                    Some(Self {
                        _stream: stream,
                        handle,
                        decoded: HashMap::new(),
                        sinks: Vec::new(),
                    })
                }
                Err(e) => {
                    warn!("no audio device ({}), falling back to the bell", e);
                    None
                }
            }
        }

        fn decode(clip: &Clip) -> Option<Decoded> {
            match Decoder::new(Cursor::new(Arc::clone(&clip.data))) {
                Ok(decoder) => Some(decoder.buffered()),
                Err(e) => {
                    warn!("could not decode {}: {}", clip.path.display(), e);
                    None
                }
            }
        }
    }

    impl AudioBackend for RodioBackend {
        fn start(&mut self, clip: &Clip, looped: bool) {
            let source = self
                .decoded
                .entry(clip.path.clone())
                .or_insert_with(|| Self::decode(clip));
            let Some(source) = source.clone() else {
                return;
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    warn!("could not open sink for {}: {}", clip.path.display(), e);
                    return;
                }
            };
            sink.set_volume(clip.gain);
            if looped {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
            self.sinks.retain(|s| !s.empty());
            self.sinks.push(sink);
        }

        fn stop_all(&mut self) {
            for sink in self.sinks.drain(..) {
                sink.stop();
            }
        }
    }
}

/// Discards every trigger.
#[derive(Debug, Default)]
pub struct Silence;

impl SoundTrigger for Silence {
    fn play(&self, _id: &str) {}
    fn play_looped(&self, _id: &str) {}
    fn stop_all(&self) {}
}

pub struct SoundBoard<B: AudioBackend> {
    root: Option<PathBuf>,
    clips: RefCell<HashMap<PathBuf, Option<Clip>>>,
    backend: RefCell<B>,
}

impl<B: AudioBackend> SoundBoard<B> {
    pub fn new(root: Option<PathBuf>, backend: B) -> Self {
        Self {
            root,
            clips: RefCell::new(HashMap::new()),
            backend: RefCell::new(backend),
        }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(id),
            None => PathBuf::from(id),
        }
    }

    fn load(path: &Path) -> Option<Clip> {
        match fs::read(path) {
            Ok(data) => {
                debug!("loaded clip {} ({} bytes)", path.display(), data.len());
                Some(Clip {
                    path: path.to_path_buf(),
                    data: data.into(),
                    gain: 1.0,
                })
            }
            Err(e) => {
                warn!("could not load sound {}: {}", path.display(), e);
                None
            }
        }
    }

    fn trigger(&self, id: &str, looped: bool) {
        let path = self.resolve(id);
        let mut clips = self.clips.borrow_mut();
        let clip = clips
            .entry(path.clone())
            .or_insert_with(|| Self::load(&path));
        if let Some(clip) = clip {
            self.backend.borrow_mut().start(clip, looped);
        }
    }

    /// Set the gain for `id`, clamped to `[0, 1]`. Takes effect on the next
    /// trigger. Loads the clip if it is not cached yet.
    pub fn set_volume(&self, id: &str, gain: f32) {
        let path = self.resolve(id);
        let mut clips = self.clips.borrow_mut();
        let clip = clips
            .entry(path.clone())
            .or_insert_with(|| Self::load(&path));
        if let Some(clip) = clip {
            clip.gain = gain.clamp(0.0, 1.0);
        }
    }

    /// Number of distinct paths seen, including ones that failed to load.
    pub fn cached(&self) -> usize {
        self.clips.borrow().len()
    }

    pub fn backend(&self) -> std::cell::Ref<'_, B> {
        self.backend.borrow()
    }
}

impl<B: AudioBackend> SoundTrigger for SoundBoard<B> {
    fn play(&self, id: &str) {
        self.trigger(id, false);
    }

    fn play_looped(&self, id: &str) {
        self.trigger(id, true);
    }

    fn stop_all(&self) {
        self.backend.borrow_mut().stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingBackend {
        started: Vec<(PathBuf, bool, f32)>,
        stops: u32,
    }

    impl AudioBackend for RecordingBackend {
        fn start(&mut self, clip: &Clip, looped: bool) {
            self.started.push((clip.path.clone(), looped, clip.gain));
        }

        fn stop_all(&mut self) {
            self.stops += 1;
        }
    }

    fn temp_clip(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lexiplay-sound-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[test]
    fn test_clip_loaded_once_and_replayed() {
        let path = temp_clip("hit.wav");
        let board = SoundBoard::new(None, RecordingBackend::default());
        let id = path.to_string_lossy().to_string();

        board.play(&id);
        board.play(&id);

        assert_eq!(board.cached(), 1);
        assert_eq!(board.backend().started.len(), 2);
    }

    #[test]
    fn test_missing_clip_degrades_to_silence() {
        let board = SoundBoard::new(None, RecordingBackend::default());
        board.play("/definitely/not/here.wav");
        board.play("/definitely/not/here.wav");

        assert_eq!(board.cached(), 1);
        assert!(board.backend().started.is_empty());
    }

    #[test]
    fn test_volume_is_clamped_and_applied_on_next_play() {
        let path = temp_clip("loud.wav");
        let board = SoundBoard::new(None, RecordingBackend::default());
        let id = path.to_string_lossy().to_string();

        board.set_volume(&id, 3.0);
        board.play(&id);
        board.set_volume(&id, -1.0);
        board.play_looped(&id);

        let started = &board.backend().started;
        assert_eq!(started[0].2, 1.0);
        assert_eq!(started[1], (path.clone(), true, 0.0));
    }

    #[test]
    fn test_root_prefixes_identifiers() {
        let path = temp_clip("coin.wav");
        let root = path.parent().unwrap().to_path_buf();
        let board = SoundBoard::new(Some(root), RecordingBackend::default());

        board.play("coin.wav");
        assert_eq!(board.backend().started[0].0, path);
    }

    #[test]
    fn test_boxed_backend_gets_cached_bytes() {
        struct Shared(Rc<RefCell<Vec<usize>>>);

        impl AudioBackend for Shared {
            fn start(&mut self, clip: &Clip, _looped: bool) {
                self.0.borrow_mut().push(clip.data.len());
            }
            fn stop_all(&mut self) {}
        }

        let path = temp_clip("boxed.wav");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let backend: Box<dyn AudioBackend> = Box::new(Shared(Rc::clone(&seen)));
        let board = SoundBoard::new(None, backend);
        let id = path.to_string_lossy().to_string();

        board.play(&id);
        board.play_looped(&id);
        assert_eq!(*seen.borrow(), vec![4, 4]);
    }

    #[test]
    fn test_stop_all_reaches_backend() {
        let board = SoundBoard::new(None, RecordingBackend::default());
        board.stop_all();
        assert_eq!(board.backend().stops, 1);
    }
}
