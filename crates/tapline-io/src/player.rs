//! Stream lifecycle around an [`OutputAdapter`].
//!
//! The adapter lives behind a mutex shared with the audio callback. The
//! callback only ever `try_lock`s it and writes silence when the lock is
//! held elsewhere, so the audio thread never waits on a control thread.
//!
//! [`Player::stop_playing`] is synchronous: it clears the playing flag,
//! drops the stream, then takes the lock (waiting out any render still in
//! flight) before telling the mixer to release its state. Nothing the
//! callback might touch is freed while a render can still run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tapline_core::Mixer;

use crate::Result;
use crate::adapter::OutputAdapter;
use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::format::OutputFormat;

/// Owns an output stream feeding an [`OutputAdapter`].
pub struct Player<M: Mixer + 'static> {
    adapter: Arc<Mutex<OutputAdapter<M>>>,
    playing: Arc<AtomicBool>,
    stream: Option<StreamHandle>,
    config: BackendStreamConfig,
}

impl<M: Mixer + 'static> Player<M> {
    /// Create a stopped player.
    pub fn new(adapter: OutputAdapter<M>, config: BackendStreamConfig) -> Self {
        Self {
            adapter: Arc::new(Mutex::new(adapter)),
            playing: Arc::new(AtomicBool::new(false)),
            stream: None,
            config,
        }
    }

    /// Stream configuration used by [`start_playing`](Self::start_playing).
    pub fn config(&self) -> &BackendStreamConfig {
        &self.config
    }

    /// Whether the stream is running.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Negotiate the format and open a stream on `backend`.
    ///
    /// Does nothing if already playing.
    pub fn start_playing(&mut self, backend: &dyn AudioBackend) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let sample_rate = backend.actual_sample_rate(&self.config);
        let format = OutputFormat {
            channels: self.config.channels,
            ..OutputFormat::float_stereo(sample_rate)
        };
        self.adapter
            .lock()
            .negotiate(format, self.config.buffer_size as usize)?;

        let adapter = Arc::clone(&self.adapter);
        let playing = Arc::clone(&self.playing);
        let callback = Box::new(move |data: &mut [f32]| {
            if !playing.load(Ordering::Acquire) {
                data.fill(0.0);
                return;
            }
            let Some(mut adapter) = adapter.try_lock() else {
                data.fill(0.0);
                return;
            };
            let capacity = adapter.capacity();
            if capacity == 0 {
                data.fill(0.0);
                return;
            }
            for chunk in data.chunks_mut(capacity) {
                adapter.render(chunk);
            }
        });
        let on_error = Box::new(|msg: &str| {
            tracing::error!(error = msg, "output stream error");
        });

        let config = BackendStreamConfig {
            sample_rate,
            ..self.config.clone()
        };
        self.playing.store(true, Ordering::Release);
        match backend.build_output_stream(&config, callback, on_error) {
            Ok(handle) => {
                self.stream = Some(handle);
                tracing::info!(backend = backend.name(), %format, "playback started");
                Ok(())
            }
            Err(e) => {
                self.playing.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Stop the stream and release mixer state.
    ///
    /// Blocks until no render is in flight. Safe to call when stopped.
    pub fn stop_playing(&mut self) {
        self.playing.store(false, Ordering::Release);
        let was_running = self.stream.take().is_some();

        // Any render that slipped past the flag holds the lock until done.
        self.adapter.lock().stop();

        if was_running {
            tracing::info!("playback stopped");
        }
    }

    /// Run `f` with exclusive access to the adapter.
    ///
    /// Blocks the audio callback (which then outputs silence) for the
    /// duration; keep `f` short.
    pub fn with_adapter<R>(&self, f: impl FnOnce(&mut OutputAdapter<M>) -> R) -> R {
        let mut adapter = self.adapter.lock();
        f(&mut *adapter)
    }
}

impl<M: Mixer + 'static> Drop for Player<M> {
    fn drop(&mut self) {
        if self.stream.is_some() {
            self.stop_playing();
        }
    }
}
