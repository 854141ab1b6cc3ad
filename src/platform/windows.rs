use std::{ffi::OsString, os::windows::prelude::*, path::Path, time::Duration};

use log::error;
use regex::Regex;
use sysinfo::{Pid, ProcessesToUpdate, System};
use unicode_segmentation::UnicodeSegmentation;
use windows::Win32::{
    Foundation::{CloseHandle, FALSE, HMODULE, HWND},
    System::{
        ProcessStatus::GetModuleFileNameExW,
        SystemInformation::GetTickCount,
        Threading::{OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ},
    },
    UI::{
        Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO},
        WindowsAndMessaging::{
            GetForegroundWindow, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId,
        },
    },
};

use super::{Platform, WindowSample};

// Shell surfaces that grab focus without representing user activity.
const FILTERED_WINDOWS: [&str; 6] = [
    "Windows Input Experience",
    "Program Manager",
    "Settings",
    "Microsoft Text Input Application",
    "Windows Shell Experience Host",
    "Application Frame Host",
];

pub struct WindowsHandle;

impl Platform for WindowsHandle {
    fn foreground_window() -> WindowSample {
        let window = unsafe { GetForegroundWindow() };

        let title = match unsafe { window_title(window) } {
            Some(title) => sanitize_title(&title),
            None => return WindowSample::unknown(),
        };
        if !should_include_window(&title) {
            return WindowSample::unknown();
        }

        let mut process_id = 0u32;
        unsafe { GetWindowThreadProcessId(window, Some(&mut process_id)) };
        if process_id == 0 {
            return WindowSample {
                window_title: title,
                ..WindowSample::unknown()
            };
        }

        let (app_name, app_path) = process_details(process_id);
        WindowSample {
            window_title: title,
            app_name,
            process_id: Some(process_id),
            app_path,
        }
    }

    fn last_input_elapsed() -> Result<Duration, ()> {
        unsafe {
            let now = GetTickCount();
            let mut last_input_info = LASTINPUTINFO {
                cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
                dwTime: 0,
            };

            if !GetLastInputInfo(&mut last_input_info).as_bool() {
                error!("Failed to retrieve the last input time.");
                return Err(());
            }

            // GetTickCount wraps every 49.7 days.
            let millis = now.wrapping_sub(last_input_info.dwTime);
            Ok(Duration::from_millis(millis as u64))
        }
    }
}

unsafe fn window_title(window: HWND) -> Option<String> {
    let length = GetWindowTextLengthW(window);
    if length == 0 {
        return None;
    }

    let mut buffer = vec![0u16; (length + 1) as usize];
    let len = GetWindowTextW(window, &mut buffer);
    buffer.truncate(len as usize);

    String::from_utf16(&buffer).ok()
}

/// Process name from the executable image, working directory from sysinfo.
fn process_details(process_id: u32) -> (Option<String>, Option<String>) {
    let image_path = process_image_path(process_id);
    let app_name = image_path.as_deref().and_then(|path| {
        Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    });

    let pid = Pid::from_u32(process_id);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    let process = sys.process(pid);

    let app_name = app_name.or_else(|| process.map(|p| p.name().to_string_lossy().into_owned()));
    let working_dir = process.and_then(|p| p.cwd().map(|cwd| cwd.to_string_lossy().into_owned()));

    (app_name, working_dir)
}

fn process_image_path(process_id: u32) -> Option<String> {
    let handle = unsafe {
        OpenProcess(
            PROCESS_QUERY_INFORMATION | PROCESS_VM_READ,
            FALSE,
            process_id,
        )
    }
    .map_err(|e| {
        error!("OpenProcess failed: {:?}", e);
    })
    .ok()?;

    let mut buffer = [0u16; 260];
    let len = unsafe { GetModuleFileNameExW(handle, HMODULE::default(), &mut buffer) };
    unsafe {
        if CloseHandle(handle).is_err() {
            error!("Unable to close the process handle");
        }
    }

    if len == 0 {
        error!("GetModuleFileNameExW failed");
        return None;
    }

    Some(
        OsString::from_wide(&buffer[..len as usize])
            .to_string_lossy()
            .into_owned(),
    )
}

fn sanitize_title(title: &str) -> String {
    let emoji_pattern = Regex::new(r"[\p{Emoji}]|●|[^\x00-\x7F]").unwrap();
    title
        .graphemes(true)
        .filter(|g| !emoji_pattern.is_match(g))
        .collect::<String>()
        .trim()
        .to_string()
}

fn should_include_window(title: &str) -> bool {
    !title.is_empty()
        && !FILTERED_WINDOWS.contains(&title)
        && !title.to_lowercase().contains("notification")
        && !title.starts_with('_')
}
