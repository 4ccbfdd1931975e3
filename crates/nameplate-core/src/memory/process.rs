//! Target process discovery and OS-level memory access.

use crate::error::Result;
use crate::memory::ProcessProvider;

/// Executable name of the game
pub const DEFAULT_PROCESS_NAME: &str = "SF30thAnniversaryCollection.exe";

/// Finds the game process by executable name on every poll
#[derive(Debug, Clone)]
pub struct ProcessFinder {
    process_name: String,
}

impl ProcessFinder {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
        }
    }
}

impl Default for ProcessFinder {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NAME)
    }
}

impl ProcessProvider for ProcessFinder {
    type Process = ProcessHandle;

    fn find_process(&self) -> Result<ProcessHandle> {
        ProcessHandle::find_and_open(&self.process_name)
    }
}

#[cfg(target_os = "windows")]
pub use windows_impl::ProcessHandle;

#[cfg(not(target_os = "windows"))]
pub use unsupported::ProcessHandle;

#[cfg(target_os = "windows")]
mod windows_impl {
    use std::ffi::c_void;
    use std::mem;

    use tracing::{debug, trace};
    use windows::Wdk::System::Threading::{NtQueryInformationProcess, ProcessBasicInformation};
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };
    use windows::Win32::System::Memory::{MEMORY_BASIC_INFORMATION, VirtualQueryEx};
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_BASIC_INFORMATION, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    use crate::error::{Error, Result};
    use crate::memory::{
        EnvironmentBlock, MemoryRegion, MemoryState, ProcessEnvironment, QueryRegions,
        ReadMemory, RegionType,
    };

    /// PEB.ProcessParameters (x64)
    const PEB_PROCESS_PARAMETERS: u64 = 0x20;
    /// RTL_USER_PROCESS_PARAMETERS.Environment (x64)
    const PARAMS_ENVIRONMENT: u64 = 0x80;
    /// RTL_USER_PROCESS_PARAMETERS.EnvironmentSize (x64)
    const PARAMS_ENVIRONMENT_SIZE: u64 = 0x3F0;
    /// 32767 UTF-16 characters
    const MAX_ENVIRONMENT_SIZE: usize = 0x10000;

    /// An open handle to the game process
    pub struct ProcessHandle {
        pub pid: u32,
        pub name: String,
        handle: HANDLE,
    }

    // SAFETY: the handle is only used for query/read calls, which the OS
    // allows from any thread concurrently.
    unsafe impl Send for ProcessHandle {}
    unsafe impl Sync for ProcessHandle {}

    impl ProcessHandle {
        /// Find the first process whose executable name matches (case-insensitive)
        pub fn find_and_open(name: &str) -> Result<Self> {
            let pid = find_pid_by_name(name)?
                .ok_or_else(|| Error::ProcessNotFound(name.to_string()))?;
            debug!("Found {} (pid {})", name, pid);

            let mut process = Self::open(pid)?;
            process.name = name.to_string();
            Ok(process)
        }

        pub fn open(pid: u32) -> Result<Self> {
            let handle =
                unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
                    .map_err(|e| Error::ProcessOpenFailed(format!("pid {}: {}", pid, e)))?;

            Ok(Self {
                pid,
                name: String::new(),
                handle,
            })
        }

        fn environment_block(&self) -> Result<EnvironmentBlock> {
            let mut info = PROCESS_BASIC_INFORMATION::default();
            let mut return_length = 0u32;
            let status = unsafe {
                NtQueryInformationProcess(
                    self.handle,
                    ProcessBasicInformation,
                    &mut info as *mut PROCESS_BASIC_INFORMATION as *mut c_void,
                    mem::size_of::<PROCESS_BASIC_INFORMATION>() as u32,
                    &mut return_length,
                )
            };
            if status.is_err() {
                return Err(Error::IdentityUnresolved(format!(
                    "NtQueryInformationProcess failed with status {:#x}",
                    status.0
                )));
            }

            let peb = info.PebBaseAddress as u64;
            let params = self.read_u64(peb + PEB_PROCESS_PARAMETERS)?;
            let environment = self.read_u64(params + PARAMS_ENVIRONMENT)?;
            let size = match self.read_u64(params + PARAMS_ENVIRONMENT_SIZE)? as usize {
                0 => MAX_ENVIRONMENT_SIZE,
                size => size.min(MAX_ENVIRONMENT_SIZE),
            };
            trace!(
                "Environment block at {:#x} ({} bytes) for pid {}",
                environment, size, self.pid
            );

            let raw = self.read_bytes(environment, size)?;
            Ok(EnvironmentBlock::parse(&raw))
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            let _ = unsafe { CloseHandle(self.handle) };
        }
    }

    impl ReadMemory for ProcessHandle {
        fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
            let mut buffer = vec![0u8; size];
            let mut bytes_read = 0usize;

            unsafe {
                ReadProcessMemory(
                    self.handle,
                    address as *const c_void,
                    buffer.as_mut_ptr() as *mut c_void,
                    size,
                    Some(&mut bytes_read),
                )
            }
            .map_err(|e| Error::MemoryReadFailed {
                address,
                message: e.to_string(),
            })?;

            if bytes_read != size {
                return Err(Error::MemoryReadFailed {
                    address,
                    message: format!("partial read ({} of {} bytes)", bytes_read, size),
                });
            }

            Ok(buffer)
        }
    }

    impl QueryRegions for ProcessHandle {
        fn query_region(&self, address: u64) -> Result<MemoryRegion> {
            let mut info = MEMORY_BASIC_INFORMATION::default();
            let written = unsafe {
                VirtualQueryEx(
                    self.handle,
                    Some(address as *const c_void),
                    &mut info,
                    mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };

            if written == 0 {
                return Err(Error::ScanFailed(format!(
                    "VirtualQueryEx failed at {:#x}: {}",
                    address,
                    windows::core::Error::from_win32()
                )));
            }

            Ok(MemoryRegion {
                base: info.BaseAddress as u64,
                size: info.RegionSize as u64,
                protect: info.Protect.0,
                state: MemoryState::from_raw(info.State.0),
                kind: RegionType::from_raw(info.Type.0),
            })
        }
    }

    impl ProcessEnvironment for ProcessHandle {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn read_environment(&self, key: &str) -> Result<Option<String>> {
            let block = self.environment_block()?;
            Ok(block.get(key).map(str::to_string))
        }
    }

    fn find_pid_by_name(name: &str) -> Result<Option<u32>> {
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::ProcessOpenFailed(format!("process snapshot: {}", e)))?;

        let mut entry = PROCESSENTRY32W {
            dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        let mut next = unsafe { Process32FirstW(snapshot, &mut entry) };
        while next.is_ok() {
            let len = entry
                .szExeFile
                .iter()
                .position(|&c| c == 0)
                .unwrap_or(entry.szExeFile.len());
            let exe = String::from_utf16_lossy(&entry.szExeFile[..len]);

            if exe.eq_ignore_ascii_case(name) {
                found = Some(entry.th32ProcessID);
                break;
            }

            next = unsafe { Process32NextW(snapshot, &mut entry) };
        }

        let _ = unsafe { CloseHandle(snapshot) };
        Ok(found)
    }
}

#[cfg(not(target_os = "windows"))]
mod unsupported {
    use crate::error::{Error, Result};
    use crate::memory::{MemoryRegion, ProcessEnvironment, QueryRegions, ReadMemory};

    /// Placeholder handle on platforms without remote memory support.
    ///
    /// It can never be constructed, so every capability is unreachable.
    pub struct ProcessHandle {
        pub pid: u32,
        pub name: String,
        _private: (),
    }

    impl ProcessHandle {
        pub fn find_and_open(name: &str) -> Result<Self> {
            Err(Error::ProcessNotFound(name.to_string()))
        }

        pub fn open(pid: u32) -> Result<Self> {
            Err(Error::ProcessOpenFailed(format!(
                "pid {}: remote memory access is only supported on Windows",
                pid
            )))
        }
    }

    impl ReadMemory for ProcessHandle {
        fn read_bytes(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
            Err(Error::MemoryReadFailed {
                address,
                message: "unsupported platform".to_string(),
            })
        }
    }

    impl QueryRegions for ProcessHandle {
        fn query_region(&self, address: u64) -> Result<MemoryRegion> {
            Err(Error::ScanFailed(format!(
                "unsupported platform (query at {:#x})",
                address
            )))
        }
    }

    impl ProcessEnvironment for ProcessHandle {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn read_environment(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::IdentityUnresolved("unsupported platform".to_string()))
        }
    }
}
