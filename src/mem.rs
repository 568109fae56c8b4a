//! # Secure Memory
//!
//! Secret-holding buffers with page locking and deterministic zeroization.
//!
//! ## Protection Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SECRET BUFFER LIFECYCLE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   allocate (zeroed, mlock'd)                                           │
//! │        │                                                               │
//! │        ▼                                                               │
//! │   ┌─────────┐   read(|bytes| ...)    ┌──────────┐                      │
//! │   │ locked  │ ─────────────────────► │ readable │                      │
//! │   │         │ ◄───────────────────── │ (scoped) │                      │
//! │   └────┬────┘   closure returns      └──────────┘                      │
//! │        │        (every exit path)                                      │
//! │        ▼                                                               │
//! │   free(): zeroize + munlock + release                                  │
//! │        │                                                               │
//! │        ▼                                                               │
//! │   any further use ──► Error::UseAfterDestroy                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page locking (`mlock(2)`) prevents the OS from swapping secret pages to
//! disk. It is best-effort: sandboxed or unprivileged environments may not
//! permit it, and that must never make allocation fail. Zero-on-free is
//! unconditional.
//!
//! ## Platform Support
//!
//! - Unix/macOS/Linux: mlock/munlock and RLIMIT_CORE via libc
//! - Other: zero-on-free only

use std::sync::atomic::{AtomicBool, Ordering};

use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Track whether core dumps have been disabled (call only once)
static CORE_DUMPS_DISABLED: AtomicBool = AtomicBool::new(false);

/// Disable core dumps for the current process.
///
/// Prevents seed material from being written to disk if the process
/// crashes. Best-effort; returns `true` on success.
pub fn disable_core_dumps() -> bool {
    if CORE_DUMPS_DISABLED.swap(true, Ordering::SeqCst) {
        return true;
    }

    #[cfg(unix)]
    {
        unix::disable_core_dumps_impl()
    }

    #[cfg(not(unix))]
    {
        tracing::warn!("core dump prevention not supported on this platform");
        false
    }
}

/// How aggressively a [`SecretBuffer`]'s pages are protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockLevel {
    /// Zero-on-free only; pages may be swapped.
    None,
    /// Zero-on-free plus best-effort `mlock(2)` page locking.
    Memlock,
}

/// An owned buffer of secret bytes.
///
/// The raw bytes are only reachable inside the scoped [`read`](Self::read)
/// window; the protected state is restored on every exit path because the
/// closure's scope *is* the window, and no pointer to the contents can
/// outlive it. `free` zeroes synchronously; using a freed buffer is a
/// loud error, never a silent no-op.
pub struct SecretBuffer {
    /// `None` once freed
    data: Option<Vec<u8>>,
    lock: LockLevel,
    /// Whether mlock actually succeeded for this allocation
    locked: bool,
}

impl SecretBuffer {
    /// Allocate a zero-filled, page-locked buffer.
    pub fn secure(len: usize) -> Self {
        Self::with_lock_level(len, LockLevel::Memlock)
    }

    /// Allocate a zero-filled buffer with an explicit lock level.
    pub fn with_lock_level(len: usize, lock: LockLevel) -> Self {
        let data = vec![0u8; len];
        let locked = Self::lock_pages(&data, lock);
        Self {
            data: Some(data),
            lock,
            locked,
        }
    }

    /// Take ownership of existing bytes, locking them in place.
    ///
    /// The vector is adopted without copying, so no unprotected duplicate
    /// of the secret is left behind by this call.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let lock = LockLevel::Memlock;
        let locked = Self::lock_pages(&data, lock);
        Self {
            data: Some(data),
            lock,
            locked,
        }
    }

    /// Copy bytes from a slice. The caller remains responsible for
    /// zeroizing the source.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Number of bytes held (0 once freed).
    pub fn len(&self) -> usize {
        self.data.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The lock level this buffer was allocated with.
    pub fn lock_level(&self) -> LockLevel {
        self.lock
    }

    /// Whether page locking actually succeeded.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Fill the buffer with cryptographically secure random bytes.
    pub fn randomize(&mut self) -> Result<()> {
        let data = self.data.as_mut().ok_or(Error::UseAfterDestroy)?;
        rand::rngs::OsRng.fill_bytes(data);
        Ok(())
    }

    /// Run `f` inside a scoped readable window over the raw bytes.
    ///
    /// The buffer returns to its protected state when the closure exits,
    /// whether it returns normally or unwinds.
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let data = self.data.as_ref().ok_or(Error::UseAfterDestroy)?;
        Ok(f(data))
    }

    /// Run `f` with scoped mutable access to the raw bytes.
    pub fn write<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        let data = self.data.as_mut().ok_or(Error::UseAfterDestroy)?;
        Ok(f(data))
    }

    /// Zeroize, unlock, and release the buffer.
    ///
    /// Freeing twice is a programming error and fails with
    /// [`Error::UseAfterDestroy`] rather than silently succeeding.
    pub fn free(&mut self) -> Result<()> {
        let mut data = self.data.take().ok_or(Error::UseAfterDestroy)?;
        data.zeroize();
        self.unlock_pages(&data);
        Ok(())
    }

    fn lock_pages(data: &[u8], lock: LockLevel) -> bool {
        if lock != LockLevel::Memlock || data.is_empty() {
            return false;
        }

        #[cfg(unix)]
        {
            let ok = unsafe { unix::mlock_impl(data.as_ptr(), data.len()) };
            if !ok {
                tracing::warn!(
                    len = data.len(),
                    "mlock failed; secret bytes may be swappable"
                );
            }
            ok
        }

        #[cfg(not(unix))]
        {
            false
        }
    }

    fn unlock_pages(&self, data: &[u8]) {
        if self.locked && !data.is_empty() {
            #[cfg(unix)]
            unsafe {
                unix::munlock_impl(data.as_ptr(), data.len());
            }
        }
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        if let Some(mut data) = self.data.take() {
            data.zeroize();
            self.unlock_pages(&data);
        }
    }
}

// Never leak secret bytes through Debug output
impl std::fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(d) => write!(f, "SecretBuffer([REDACTED], {} bytes)", d.len()),
            None => write!(f, "SecretBuffer(<freed>)"),
        }
    }
}

// ---- Platform implementations ----

#[cfg(unix)]
mod unix {
    pub fn disable_core_dumps_impl() -> bool {
        // SAFETY: setrlimit with RLIMIT_CORE=0 is a standard POSIX operation
        unsafe {
            let rlim = libc::rlimit {
                rlim_cur: 0,
                rlim_max: 0,
            };
            if libc::setrlimit(libc::RLIMIT_CORE, &rlim) != 0 {
                tracing::warn!(
                    "failed to disable core dumps: {}",
                    std::io::Error::last_os_error()
                );
                return false;
            }
        }
        true
    }

    pub unsafe fn mlock_impl(ptr: *const u8, len: usize) -> bool {
        libc::mlock(ptr as *const libc::c_void, len) == 0
    }

    pub unsafe fn munlock_impl(ptr: *const u8, len: usize) -> bool {
        libc::munlock(ptr as *const libc::c_void, len) == 0
    }
}

// ============================================================================
// TESTS
// ============================================================================
