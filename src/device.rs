//! Line oriented data sources
use std::collections::VecDeque;
use std::io::BufRead;

use log::{debug, error};

/// Lines longer than this are not NMEA: they are dropped.
const MAX_LINE_LENGTH: usize = 1024;

/// [LineDevice] is the data source of a
/// [SatelliteSource](crate::prelude::SatelliteSource).
/// It hands over complete lines, in order of arrival, and must never block:
/// when no complete line is available right now, simply return None.
pub trait LineDevice {
    /// Returns next complete line (terminator included), if any is available.
    fn read_line(&mut self) -> Option<Vec<u8>>;

    /// Discards content that is already buffered, so only newer data is consumed.
    /// Devices replaying a recorded log keep all their content.
    fn skip_buffered(&mut self) {}

    /// Returns true once this device will never deliver data anymore.
    fn at_end(&self) -> bool {
        false
    }
}

/// [NmeaFeed] is an in-memory [LineDevice]: push the bytes you
/// receive from your serial port or socket, in any chunk size.
#[derive(Debug, Clone, Default)]
pub struct NmeaFeed {
    buffer: VecDeque<u8>,
    closed: bool,
    /// Dropping the remainder of an oversized line
    discarding: bool,
}

impl NmeaFeed {
    /// Appends newly received bytes.
    /// The unterminated content is bounded to one line length, so a peer that
    /// never sends a line terminator (wrong baudrate, binary protocol)
    /// cannot grow this buffer.
    pub fn push(&mut self, bytes: &[u8]) {
        if self.closed {
            return;
        }

        let bytes = if self.discarding {
            // resume on next line, or next sentence start
            match bytes.iter().position(|c| *c == b'\n' || *c == b'$') {
                Some(pos) => {
                    self.discarding = false;
                    if bytes[pos] == b'$' {
                        &bytes[pos..]
                    } else {
                        &bytes[pos + 1..]
                    }
                },
                None => return,
            }
        } else {
            bytes
        };

        self.buffer.extend(bytes);
        self.bound_unterminated();
    }

    fn bound_unterminated(&mut self) {
        let start = self
            .buffer
            .iter()
            .rposition(|c| *c == b'\n')
            .map(|end| end + 1)
            .unwrap_or(0);

        let tail = self.buffer.len() - start;
        if tail <= MAX_LINE_LENGTH {
            return;
        }

        // a sentence may have started in the last bytes
        let keep = self
            .buffer
            .range(start..)
            .rposition(|c| *c == b'$')
            .map(|offset| tail - offset)
            .filter(|len| *len <= MAX_LINE_LENGTH)
            .unwrap_or(0);

        debug!("feed: dropping {} unterminated bytes", tail - keep);

        let end = self.buffer.len() - keep;
        self.buffer.drain(start..end);
        self.discarding = keep == 0;
    }

    /// Declares that no more bytes will be pushed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Number of buffered bytes, complete lines or not.
    pub fn bytes_available(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if at least one complete line is buffered.
    pub fn can_read_line(&self) -> bool {
        self.buffer.contains(&b'\n')
    }
}

impl LineDevice for NmeaFeed {
    fn read_line(&mut self) -> Option<Vec<u8>> {
        loop {
            let end = self.buffer.iter().position(|c| *c == b'\n')?;
            let line = self.buffer.drain(..=end).collect::<Vec<_>>();
            if line.len() <= MAX_LINE_LENGTH {
                return Some(line);
            }
        }
    }

    fn skip_buffered(&mut self) {
        self.buffer.clear();
    }

    fn at_end(&self) -> bool {
        self.closed && !self.can_read_line()
    }
}

/// [NmeaReplay] replays a recorded NMEA log, from any [BufRead]
/// (typically a [std::io::BufReader] over a file).
#[derive(Debug)]
pub struct NmeaReplay<R: BufRead> {
    reader: R,
    end: bool,
}

impl<R: BufRead> NmeaReplay<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, end: false }
    }
}

impl<R: BufRead> LineDevice for NmeaReplay<R> {
    fn read_line(&mut self) -> Option<Vec<u8>> {
        loop {
            if self.end {
                return None;
            }

            let mut line = Vec::with_capacity(128);

            match self.reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    self.end = true;
                },
                Ok(_) => {
                    if line.len() <= MAX_LINE_LENGTH {
                        return Some(line);
                    }
                },
                Err(e) => {
                    error!("replay: read error: {}", e);
                    self.end = true;
                },
            }
        }
    }

    fn at_end(&self) -> bool {
        self.end
    }
}
