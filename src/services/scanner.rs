// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scanner session controller.
//!
//! Owns the camera for the duration of one check-in attempt and exposes a
//! small state machine:
//!
//! ```text
//! Idle -> Acquiring -> Scanning -> Processing -> Idle
//!             |
//!             +-> Error -> Idle (via stop)
//! ```
//!
//! Decoded payloads arrive on a channel owned by the `Scanning` state. Taking
//! a payload drops that channel, which ends the camera's decode loop before
//! the payload is handed on. `Processing` has no channel, so a second decode
//! cannot reach the session while a validation is in flight.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Decoded frames buffered between the decode loop and the session.
const DECODE_BUFFER: usize = 8;

/// Stream of decoded QR payloads from a camera's decode loop.
///
/// The decode loop must stop once the receiver is dropped.
pub type DecodeStream = mpsc::Receiver<String>;

/// Why the camera could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera hardware failure: {0}")]
    Hardware(String),
}

/// Camera with an attached QR decoder.
///
/// Frame decoding is opaque: the device either yields a payload string for a
/// frame or nothing.
#[async_trait]
pub trait Camera: Send {
    /// Request access and start the decode loop.
    async fn open(&mut self) -> Result<DecodeStream, CameraError>;

    /// Release the device. Must tolerate an `open` that never completed.
    fn close(&mut self);
}

/// Externally visible state of a [`ScannerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerPhase {
    Idle,
    Acquiring,
    Scanning,
    Processing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScannerError {
    /// Terminal for this attempt; the user has to start again.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(CameraError),

    #[error("Cannot {operation} while {phase:?}")]
    InvalidTransition {
        operation: &'static str,
        phase: ScannerPhase,
    },
}

enum SessionState {
    Idle,
    Acquiring,
    Scanning { decoded: DecodeStream },
    Processing { payload: String },
    Error(CameraError),
}

impl SessionState {
    fn phase(&self) -> ScannerPhase {
        match self {
            SessionState::Idle => ScannerPhase::Idle,
            SessionState::Acquiring => ScannerPhase::Acquiring,
            SessionState::Scanning { .. } => ScannerPhase::Scanning,
            SessionState::Processing { .. } => ScannerPhase::Processing,
            SessionState::Error(_) => ScannerPhase::Error,
        }
    }
}

/// One camera-driven check-in attempt at a time.
pub struct ScannerSession<C: Camera> {
    camera: C,
    camera_held: bool,
    state: SessionState,
}

impl<C: Camera> ScannerSession<C> {
    pub fn new(camera: C) -> Self {
        Self {
            camera,
            camera_held: false,
            state: SessionState::Idle,
        }
    }

    pub fn phase(&self) -> ScannerPhase {
        self.state.phase()
    }

    pub fn camera_held(&self) -> bool {
        self.camera_held
    }

    /// Payload under validation, if any.
    pub fn payload(&self) -> Option<&str> {
        match &self.state {
            SessionState::Processing { payload } => Some(payload),
            _ => None,
        }
    }

    /// Failure that put the session into `Error`.
    pub fn camera_error(&self) -> Option<&CameraError> {
        match &self.state {
            SessionState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Acquire the camera and begin scanning. Valid only from `Idle`.
    ///
    /// A refused or broken camera moves the session to `Error`; there is no
    /// automatic retry.
    pub async fn start(&mut self) -> Result<(), ScannerError> {
        self.require("start", ScannerPhase::Idle)?;

        self.state = SessionState::Acquiring;
        // Counted as held while acquiring so an abandoned open still gets closed
        self.camera_held = true;
        tracing::debug!("Requesting camera");

        match self.camera.open().await {
            Ok(decoded) => {
                self.state = SessionState::Scanning { decoded };
                tracing::debug!("Camera open, scanning");
                Ok(())
            }
            Err(err) => {
                self.camera_held = false;
                tracing::warn!(error = %err, "Camera unavailable");
                self.state = SessionState::Error(err.clone());
                Err(ScannerError::CameraUnavailable(err))
            }
        }
    }

    /// Wait for the decode loop to produce a payload, then take it via
    /// [`on_decoded`](Self::on_decoded). Valid only from `Scanning`.
    pub async fn scan(&mut self) -> Result<String, ScannerError> {
        let next = match &mut self.state {
            SessionState::Scanning { decoded } => decoded.recv().await,
            other => {
                return Err(ScannerError::InvalidTransition {
                    operation: "scan",
                    phase: other.phase(),
                })
            }
        };

        match next {
            Some(payload) => {
                self.on_decoded(payload.clone())?;
                Ok(payload)
            }
            None => {
                let err = CameraError::Hardware("decode loop ended".to_string());
                tracing::warn!(error = %err, "Camera stopped delivering frames");
                self.release_camera();
                self.state = SessionState::Error(err.clone());
                Err(ScannerError::CameraUnavailable(err))
            }
        }
    }

    /// Accept a decoded payload. Valid only from `Scanning`.
    ///
    /// The decode loop is shut down before this returns, so later frames are
    /// never delivered.
    pub fn on_decoded(&mut self, payload: String) -> Result<&str, ScannerError> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Scanning { mut decoded } => {
                decoded.close();
                drop(decoded);
                tracing::debug!("Payload decoded, decode loop closed");
                self.state = SessionState::Processing { payload };
                Ok(self.payload().unwrap_or_default())
            }
            other => {
                let phase = other.phase();
                self.state = other;
                tracing::debug!(?phase, "Ignoring decode outside of scanning");
                Err(ScannerError::InvalidTransition {
                    operation: "accept a decoded payload",
                    phase,
                })
            }
        }
    }

    /// Finish the attempt with the validation result. Valid only from
    /// `Processing`; releases the camera and returns to `Idle`.
    pub fn complete<T>(&mut self, result: T) -> Result<T, ScannerError> {
        self.require("complete", ScannerPhase::Processing)?;
        self.release_camera();
        self.state = SessionState::Idle;
        Ok(result)
    }

    /// Release the camera and return to `Idle` from any state.
    ///
    /// Safe to call repeatedly, and when the camera was never acquired.
    pub fn stop(&mut self) {
        self.release_camera();
        self.state = SessionState::Idle;
    }

    fn require(&self, operation: &'static str, phase: ScannerPhase) -> Result<(), ScannerError> {
        let current = self.phase();
        if current != phase {
            return Err(ScannerError::InvalidTransition {
                operation,
                phase: current,
            });
        }
        Ok(())
    }

    fn release_camera(&mut self) {
        if self.camera_held {
            self.camera.close();
            self.camera_held = false;
            tracing::debug!("Camera released");
        }
    }
}

impl<C: Camera> Drop for ScannerSession<C> {
    fn drop(&mut self) {
        self.release_camera();
    }
}

// ─── Mock Camera ─────────────────────────────────────────────

/// In-memory camera for tests and demos.
///
/// Clones share state: keep one clone to feed frames with [`show`](Self::show)
/// and inspect open/close counts while the session owns the other.
#[derive(Clone, Default)]
pub struct MockCamera {
    inner: Arc<MockCameraInner>,
}

#[derive(Default)]
struct MockCameraInner {
    deny: AtomicBool,
    opens: AtomicUsize,
    closes: AtomicUsize,
    frames: Mutex<Option<mpsc::Sender<String>>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose permission prompt is always refused.
    pub fn denied() -> Self {
        let camera = Self::default();
        camera.inner.deny.store(true, Ordering::SeqCst);
        camera
    }

    /// Present a frame that decodes to `payload`.
    ///
    /// Returns `false` if no decode loop is listening.
    pub async fn show(&self, payload: &str) -> bool {
        let sender = self
            .inner
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match sender {
            Some(sender) => sender.send(payload.to_string()).await.is_ok(),
            None => false,
        }
    }

    /// Simulate the device failing mid-scan.
    pub fn disconnect(&self) {
        self.inner
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for MockCamera {
    async fn open(&mut self) -> Result<DecodeStream, CameraError> {
        if self.inner.deny.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        self.inner.opens.fetch_add(1, Ordering::SeqCst);

        let (sender, receiver) = mpsc::channel(DECODE_BUFFER);
        *self
            .inner
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(sender);
        Ok(receiver)
    }

    fn close(&mut self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
