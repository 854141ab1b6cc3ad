use std::time::Duration;

#[cfg(windows)]
pub mod windows;

/// One foreground-window observation. A failed OS query yields
/// [`WindowSample::unknown`], which carries an empty title and is ignored by
/// the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowSample {
    pub window_title: String,
    pub app_name: Option<String>,
    pub process_id: Option<u32>,
    pub app_path: Option<String>,
}

impl WindowSample {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.window_title.is_empty()
    }
}

pub trait Platform {
    /// The window currently holding input focus, or the unknown sentinel.
    fn foreground_window() -> WindowSample;

    /// Elapsed time since the last user input event.
    fn last_input_elapsed() -> Result<Duration, ()>;
}

#[cfg(windows)]
pub use self::windows::WindowsHandle as NativeHandle;

// Fallback for targets without a supported windowing system.
#[cfg(not(windows))]
pub struct NativeHandle;

#[cfg(not(windows))]
impl Platform for NativeHandle {
    fn foreground_window() -> WindowSample {
        WindowSample::unknown()
    }

    fn last_input_elapsed() -> Result<Duration, ()> {
        Err(())
    }
}
