//! Input sources for the `,` operation.

use std::collections::VecDeque;
use std::io::{self, Read};

use tracing::{debug, warn};

use crate::error::InputError;

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

/// Something the VM can read from. Blocks until input is available.
///
/// Narrow cells take single bytes; wide cells take whole characters,
/// decoded from the same byte stream as UTF-8.
pub trait InputSource {
    fn read_byte(&mut self) -> Result<u8, InputError>;

    fn read_char(&mut self) -> Result<char, InputError> {
        let first = self.read_byte()?;
        decode_utf8(first, || self.read_byte())
    }
}

/// Standard input. On a terminal each key is read in raw mode, with Ctrl-C
/// and Ctrl-D reported as [`InputError::Interrupted`] and
/// [`InputError::EndOfInput`] and carriage return read as a newline.
/// Otherwise bytes come from buffered stdin untranslated.
pub struct Terminal {
    stdin: io::Stdin,
    raw: bool,
}

impl Terminal {
    pub fn new() -> Terminal {
        let raw = stdin_is_tty();
        debug!(raw, "terminal: input attached");
        Terminal {
            stdin: io::stdin(),
            raw,
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Terminal::new()
    }
}

impl InputSource for Terminal {
    fn read_byte(&mut self) -> Result<u8, InputError> {
        if self.raw {
            return read_raw_byte().and_then(translate_raw);
        }

        let mut byte = [0u8];
        loop {
            match self.stdin.read(&mut byte) {
                Ok(0) => return Err(InputError::EndOfInput),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Maps the control keys of a raw terminal onto input signals.
fn translate_raw(byte: u8) -> Result<u8, InputError> {
    match byte {
        CTRL_C => Err(InputError::Interrupted),
        CTRL_D => Err(InputError::EndOfInput),
        b'\r' => Ok(b'\n'),
        _ => Ok(byte),
    }
}

/// Decodes one UTF-8 character whose leading byte is `first`, pulling
/// continuation bytes from `next`.
fn decode_utf8<F>(first: u8, mut next: F) -> Result<char, InputError>
where
    F: FnMut() -> Result<u8, InputError>,
{
    let width = match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Err(invalid_utf8()),
    };

    let mut buf = [first, 0, 0, 0];
    for slot in buf.iter_mut().take(width).skip(1) {
        *slot = next()?;
    }
    std::str::from_utf8(&buf[..width])
        .ok()
        .and_then(|s| s.chars().next())
        .ok_or_else(invalid_utf8)
}

fn invalid_utf8() -> InputError {
    io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8").into()
}

#[cfg(unix)]
fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
fn stdin_is_tty() -> bool {
    false
}

// Switches the terminal to raw mode for exactly one read and restores the
// previous settings afterwards, whatever the read returned.
#[cfg(unix)]
fn read_raw_byte() -> Result<u8, InputError> {
    let fd = libc::STDIN_FILENO;
    let mut original = unsafe { std::mem::zeroed::<libc::termios>() };
    if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut raw = original;
    unsafe { libc::cfmakeraw(&mut raw) };
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut byte = 0u8;
    let read = unsafe { libc::read(fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
    let result = match read {
        1 => Ok(byte),
        0 => Err(InputError::EndOfInput),
        _ => Err(io::Error::last_os_error().into()),
    };

    if unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, &original) } != 0 {
        warn!(
            error = %io::Error::last_os_error(),
            "terminal: failed to restore settings, still in raw mode"
        );
    }
    result
}

#[cfg(not(unix))]
fn read_raw_byte() -> Result<u8, InputError> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "raw terminal input").into())
}

/// A fixed queue of input, held as UTF-8 bytes. Reading past the end is
/// [`InputError::EndOfInput`].
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    queue: VecDeque<u8>,
}

impl Scripted {
    pub fn new(text: &str) -> Scripted {
        Scripted {
            queue: text.bytes().collect(),
        }
    }
}

impl InputSource for Scripted {
    fn read_byte(&mut self) -> Result<u8, InputError> {
        self.queue.pop_front().ok_or(InputError::EndOfInput)
    }
}
