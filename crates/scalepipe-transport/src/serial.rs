use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Bytes requested per read cycle. The chunk handed back is sized to
/// the bytes actually received, never to this capacity.
const READ_CHUNK_SIZE: usize = 4096;

/// Read-cycle bound, in termios `VTIME` tenths of a second. With
/// `VMIN = 0` a read returns after at most this long even when the
/// line is silent, so callers can re-check cancellation.
const READ_CYCLE_TENTHS: libc::cc_t = 2;

/// A raw serial line opened read-only on a tty device.
///
/// Configuration is hardcoded to the scale head's wiring:
/// - no parity
/// - 1 stop bit
/// - 8 bits per byte
/// - no RTS/CTS or software flow control
/// - non-canonical (bytes arrive as they come, not line-buffered)
///
/// The line discipline found at open time is saved and restored when
/// the line is closed or dropped.
pub struct SerialLine {
    file: Option<File>,
    path: PathBuf,
    saved: libc::termios,
}

impl SerialLine {
    /// Open and configure the device at `path`.
    ///
    /// `baud` must be one of the standard UNIX rates (50..=460800),
    /// otherwise `TransportError::UnsupportedBaud` is returned before
    /// the device is touched.
    pub fn open(path: impl AsRef<Path>, baud: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let speed = baud_to_speed(baud).ok_or(TransportError::UnsupportedBaud(baud))?;

        let file = File::open(&path).map_err(|e| TransportError::Open {
            path: path.clone(),
            source: e,
        })?;

        let saved = configure_raw(&file, &path, speed)?;

        info!(?path, baud, "opened serial line");

        Ok(Self {
            file: Some(file),
            path,
            saved,
        })
    }

    /// Device path this line was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for SerialLine {
    fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| TransportError::Io(std::io::Error::other("serial line closed")))?;

        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match file.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Read(err)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            // Restore whatever discipline the port had before us.
            // SAFETY: `file` is still an open descriptor we own, and
            // `saved` was filled by tcgetattr on the same descriptor.
            let rc = unsafe { libc::tcsetattr(file.as_raw_fd(), libc::TCSANOW, &self.saved) };
            if rc != 0 {
                return Err(TransportError::Configure {
                    path: self.path.clone(),
                    source: std::io::Error::last_os_error(),
                });
            }
            debug!(path = ?self.path, "closed serial line");
        }
        Ok(())
    }
}

impl Drop for SerialLine {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for SerialLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLine")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .finish()
    }
}

/// Apply raw 8N1 no-flow configuration with timed reads; returns the
/// termios state found on the descriptor so it can be restored later.
fn configure_raw(file: &File, path: &Path, speed: libc::speed_t) -> Result<libc::termios> {
    let fd = file.as_raw_fd();

    // SAFETY: zeroed termios is a valid all-fields-clear value; it is
    // fully overwritten by tcgetattr before use.
    let mut saved: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor and `saved` is a valid
    // writable termios.
    if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
        return Err(TransportError::Configure {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }

    let mut cfg = saved;

    // 8N1, receiver on, modem status lines ignored.
    cfg.c_cflag &= !(libc::PARENB | libc::CSTOPB | libc::CRTSCTS);
    cfg.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;
    // Raw input: no canonical mode, echo, or signal keys.
    cfg.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ECHOE | libc::ISIG);
    // No software flow control or input mangling.
    cfg.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);
    cfg.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL);
    // Timed reads: return with whatever arrived after at most
    // READ_CYCLE_TENTHS, possibly nothing.
    cfg.c_cc[libc::VMIN] = 0;
    cfg.c_cc[libc::VTIME] = READ_CYCLE_TENTHS;

    // SAFETY: `cfg` is a valid termios obtained from tcgetattr.
    if unsafe { libc::cfsetspeed(&mut cfg, speed) } != 0 {
        return Err(TransportError::Configure {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }

    // SAFETY: `fd` is open and `cfg` is a fully initialized termios.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &cfg) } != 0 {
        return Err(TransportError::Configure {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }

    debug!(?path, "applied raw 8N1 line configuration");
    Ok(saved)
}

/// Map a numeric rate onto the standard UNIX baud constants.
///
/// Only the standard table is supported; anything else is rejected at
/// open time.
pub fn baud_to_speed(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        1800 => libc::B1800,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        #[cfg(target_os = "linux")]
        460800 => libc::B460800,
        _ => return None,
    };
    Some(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rates_map() {
        assert_eq!(baud_to_speed(9600), Some(libc::B9600));
        assert_eq!(baud_to_speed(115200), Some(libc::B115200));
        assert_eq!(baud_to_speed(50), Some(libc::B50));
    }

    #[test]
    fn nonstandard_rates_rejected() {
        assert!(baud_to_speed(0).is_none());
        assert!(baud_to_speed(9601).is_none());
        assert!(baud_to_speed(1_000_000).is_none());
    }

    #[test]
    fn open_missing_device_fails() {
        let err = SerialLine::open("/definitely/not/a/device", 9600)
            .expect_err("open should fail on a missing path");
        assert!(matches!(err, TransportError::Open { .. }));
    }

    #[test]
    fn open_rejects_bad_baud_before_touching_device() {
        let err = SerialLine::open("/definitely/not/a/device", 12345)
            .expect_err("bad baud should fail");
        assert!(matches!(err, TransportError::UnsupportedBaud(12345)));
    }
}
