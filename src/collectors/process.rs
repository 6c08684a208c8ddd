//! Process-level memory accounting.

use thiserror::Error;

/// OS memory accounting for a single process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessMemory {
    /// Resident set size in bytes.
    pub resident: u64,

    /// Virtual address space size in bytes, zero where the platform
    /// does not report it cheaply.
    pub virtual_size: u64,
}

/// Failure to obtain memory accounting from the operating system.
#[derive(Debug, Error)]
pub enum ProcessInfoError {
    /// The underlying OS query failed.
    #[error("failed to query process memory accounting: {0}")]
    Io(#[from] std::io::Error),

    /// The OS reported accounting data in an unexpected shape.
    #[error("malformed process memory accounting data")]
    Malformed,

    /// No accounting source exists for this platform.
    #[error("process memory accounting is not supported on this platform")]
    Unsupported,
}

/// Source of per-process memory accounting.
///
/// Implementations are queried once per sampling tick and should be
/// cheap and non-blocking.
pub trait ProcessInfoSource: Send + Sync + 'static {
    /// Returns memory accounting for the process identified by `pid`.
    fn memory_info(&self, pid: u32) -> Result<ProcessMemory, ProcessInfoError>;
}

/// Reads process memory accounting from the operating system.
///
/// On Linux this consults `/proc/<pid>/statm`. macOS and Windows report
/// the calling process only and ignore `pid`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcessInfo;

impl SystemProcessInfo {
    /// Creates a new OS-backed source.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessInfoSource for SystemProcessInfo {
    fn memory_info(&self, pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
        read_process_memory(pid)
    }
}

#[cfg(target_os = "linux")]
fn read_process_memory(pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
    use std::fs;

    // Format: size resident shared text lib data dt
    // Values are in pages
    let statm = fs::read_to_string(format!("/proc/{pid}/statm"))?;
    let mut fields = statm.split_whitespace();
    let size_pages: u64 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or(ProcessInfoError::Malformed)?;
    let resident_pages: u64 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or(ProcessInfoError::Malformed)?;

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
    Ok(ProcessMemory {
        resident: resident_pages * page_size,
        virtual_size: size_pages * page_size,
    })
}

#[cfg(target_os = "macos")]
fn read_process_memory(_pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
    use std::mem;

    unsafe {
        let mut info: libc::rusage = mem::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, &mut info) == 0 {
            // On macOS, ru_maxrss is in bytes
            Ok(ProcessMemory {
                resident: info.ru_maxrss as u64,
                virtual_size: 0,
            })
        } else {
            Err(std::io::Error::last_os_error().into())
        }
    }
}

#[cfg(target_os = "windows")]
fn read_process_memory(_pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
    use windows_sys::Win32::System::ProcessStatus::{
        GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS,
    };
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    unsafe {
        let process = GetCurrentProcess();
        let mut pmc: PROCESS_MEMORY_COUNTERS = std::mem::zeroed();
        pmc.cb = std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;

        if GetProcessMemoryInfo(
            process,
            &mut pmc,
            std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32,
        ) != 0
        {
            Ok(ProcessMemory {
                resident: pmc.WorkingSetSize as u64,
                virtual_size: pmc.PagefileUsage as u64,
            })
        } else {
            Err(std::io::Error::last_os_error().into())
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn read_process_memory(_pid: u32) -> Result<ProcessMemory, ProcessInfoError> {
    Err(ProcessInfoError::Unsupported)
}
