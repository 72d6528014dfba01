//! Operator interrupt handling.
//!
//! SIGINT sets a [`CancelToken`] instead of killing the process, so the frame
//! loop can stop at the next frame boundary and close the serial port. The
//! handler is installed without `SA_RESTART`, so a blocked serial write or a
//! blocked read of the detector feed returns `EINTR` when the signal lands.
//! The transport and [`JsonLinesSource`](crate::JsonLinesSource) both see the
//! token set and report cancellation instead of resuming.
//!
//! The handler resets itself after the first delivery, so a second Ctrl-C
//! terminates the process as usual.

use std::io;
use std::sync::OnceLock;

use robot_link::CancelToken;

static SIGINT_TOKEN: OnceLock<CancelToken> = OnceLock::new();

#[cfg(unix)]
extern "C" fn on_sigint(_signum: libc::c_int) {
    // Atomic load and store only
    if let Some(token) = SIGINT_TOKEN.get() {
        token.cancel();
    }
}

/// Route SIGINT to `token`. May be called once per process.
#[cfg(unix)]
pub fn install_sigint_handler(token: CancelToken) -> io::Result<()> {
    if SIGINT_TOKEN.set(token).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "SIGINT handler already installed",
        ));
    }

    // Safety: a zeroed sigaction is a valid starting value; every field the
    // kernel reads is set below.
    let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
    action.sa_sigaction = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    action.sa_flags = libc::SA_RESETHAND;

    // Safety: sa_mask is a valid sigset_t owned by `action`.
    unsafe { libc::sigemptyset(&mut action.sa_mask) };

    // Safety: `action` is fully initialized and the handler only touches
    // atomics through a static that is set before installation.
    let ret = unsafe { libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }

    tracing::debug!("SIGINT handler installed");
    Ok(())
}

/// Interrupts are not intercepted on this platform; Ctrl-C ends the process.
#[cfg(not(unix))]
pub fn install_sigint_handler(token: CancelToken) -> io::Result<()> {
    let _ = SIGINT_TOKEN.set(token);
    tracing::warn!("SIGINT handling not supported on this platform");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_sigint_sets_token() {
        let token = CancelToken::new();
        install_sigint_handler(token.clone()).unwrap();
        assert!(!token.is_cancelled());

        // Safety: raise delivers to this thread and the handler was just installed
        let ret = unsafe { libc::raise(libc::SIGINT) };
        assert_eq!(ret, 0);
        assert!(token.is_cancelled());

        assert_eq!(
            install_sigint_handler(CancelToken::new())
                .unwrap_err()
                .kind(),
            io::ErrorKind::AlreadyExists
        );
    }
}
