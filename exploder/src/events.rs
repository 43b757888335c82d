use crate::framing::CameraFocus;
use crate::types::{PartId, ViewMode};

/// Notifications for the UI and render layers, drained once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimEvent {
    /// A short press without movement on a part.
    PartTapped(PartId),
    SelectionChanged(Option<PartId>),
    /// Every part finished moving toward the given pose.
    Settled(ViewMode),
    /// Orbit/pan must be disabled while a part is held.
    CameraControl { enabled: bool },
    /// Frame the selected part.
    FocusPart(CameraFocus),
    /// Frame the whole object in its upcoming pose.
    FrameView(CameraFocus),
}
