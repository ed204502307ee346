//! Display mode state and video error types

/// What the adapter is currently scanning out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Legacy text mode; video memory is not touched by the compositor.
    #[default]
    Text,
    /// The negotiated 1024x768 linear-framebuffer mode.
    Video,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoError {
    /// The adapter offers no mode matching the configured resolution.
    ModeUnavailable,
    /// No real-mode services have been registered yet.
    BridgeUnavailable,
    /// A VBE call returned something other than `VBE_SUCCESS` in `AX`.
    BiosCallFailed { function: u16, status: u16 },
    /// The controller info block was short or lacked the `VESA` signature.
    InvalidControllerInfo,
    /// The negotiated framebuffer could not be mapped.
    MappingFailed,
}

pub type VideoResult<T = ()> = Result<T, VideoError>;
