//! Capture session domain module

mod capture_session;

pub use capture_session::{
    CaptureSession, InvalidStateTransition, SessionId, SessionSnapshot, SessionState,
};
