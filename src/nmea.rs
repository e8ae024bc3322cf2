//! NMEA sentences parsing
use log::debug;

use crate::{
    prelude::{Constellation, SatelliteRecord},
    satellite::constellation_from_id,
};

/// Maximal number of satellites described by a single GSV sentence
const SATELLITES_PER_GSV: usize = 4;

/// Satellites in use, as reported by one GSA sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct InUseReport {
    /// [Constellation] these identifiers belong to.
    /// [Constellation::Mixed] when it could not be determined.
    pub system: Constellation,
    /// Identifiers of the satellites used in the fix
    pub ids: Vec<u16>,
}

/// Outcome of a satellites in view parsing attempt.
/// Satellites in view are usually described over several sentences:
/// the complete list is only returned once the last one was consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum InViewStatus {
    /// This line does not describe satellites in view
    NotRecognized,
    /// This line was one chunk of a multi part description,
    /// more are to come.
    PartiallyParsed {
        /// [Constellation] being described
        system: Constellation,
        /// Number of satellites gathered so far
        received: usize,
    },
    /// The description is now complete.
    FullyParsed {
        /// [Constellation] being described
        system: Constellation,
        /// All satellites in view, in order of description
        satellites: Vec<SatelliteRecord>,
    },
}

/// [SentenceParser] decodes satellites in use and in view from raw lines.
/// The default implementation is [NmeaParser], which supports standard GSA and GSV
/// sentences. Implement your own to support proprietary sentences.
/// Implementations must never panic: any line that does not match is simply
/// not recognized.
pub trait SentenceParser {
    /// Parses identifiers of satellites in use, from this line.
    fn parse_in_use(&mut self, line: &[u8]) -> Option<InUseReport>;

    /// Parses one chunk of satellites in view description, from this line.
    /// The parser is responsible for the multi part reassembly.
    fn parse_in_view(&mut self, line: &[u8]) -> InViewStatus;
}

/// Ongoing multi part GSV reassembly
#[derive(Debug, Clone)]
struct GsvAssembly {
    system: Constellation,
    total: usize,
    next: usize,
    declared: usize,
    satellites: Vec<SatelliteRecord>,
}

/// Standard NMEA [SentenceParser], for GSA and GSV sentences
/// emitted by any talker (GPS, Glonass, Galileo, BeiDou, QZSS and combined receivers).
#[derive(Debug, Clone, Default)]
pub struct NmeaParser {
    assembly: Option<GsvAssembly>,
}

/// NMEA sentence that passed the framing and checksum verifications
struct Sentence<'a> {
    talker: &'a str,
    kind: &'a str,
    /// Comma separated fields, the address being the first one
    fields: Vec<&'a str>,
}

impl<'a> Sentence<'a> {
    fn field(&self, index: usize) -> Option<&'a str> {
        self.fields
            .get(index)
            .copied()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    fn parse_field<T: std::str::FromStr>(&self, index: usize) -> Option<T> {
        self.field(index)?.parse::<T>().ok()
    }
}

/// XOR checksum of the sentence content, between '$' and '*'
pub(crate) fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, b| acc ^ b)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Verifies framing and checksum, then splits the sentence
fn split_sentence(line: &[u8]) -> Option<Sentence<'_>> {
    let line = line.trim_ascii();

    if line.first() != Some(&b'$') {
        return None;
    }

    let star = line.iter().position(|c| *c == b'*')?;
    let payload = &line[1..star];

    let high = hex_digit(*line.get(star + 1)?)?;
    let low = hex_digit(*line.get(star + 2)?)?;

    let expected = (high << 4) | low;
    let computed = checksum(payload);

    if computed != expected {
        debug!(
            "nmea: checksum mismatch (expected {:02X}, got {:02X})",
            expected, computed
        );
        return None;
    }

    let payload = std::str::from_utf8(payload).ok()?;
    let fields = payload.split(',').collect::<Vec<_>>();
    let address = *fields.first()?;

    if address.len() != 5 || !address.is_ascii() {
        return None;
    }

    Some(Sentence {
        talker: &address[..2],
        kind: &address[2..],
        fields,
    })
}

fn talker_constellation(talker: &str) -> Option<Constellation> {
    match talker {
        "GP" => Some(Constellation::GPS),
        "GL" => Some(Constellation::Glonass),
        "GA" => Some(Constellation::Galileo),
        "GB" | "BD" => Some(Constellation::BeiDou),
        "GQ" | "QZ" => Some(Constellation::QZSS),
        "GN" => Some(Constellation::Mixed),
        _ => None,
    }
}

/// NMEA 4.10 GNSS system identifier
fn system_id_constellation(system_id: u8) -> Option<Constellation> {
    match system_id {
        1 => Some(Constellation::GPS),
        2 => Some(Constellation::Glonass),
        3 => Some(Constellation::Galileo),
        4 => Some(Constellation::BeiDou),
        5 => Some(Constellation::QZSS),
        _ => None,
    }
}

impl NmeaParser {
    /// Drops any incomplete GSV reassembly.
    pub fn reset(&mut self) {
        self.assembly = None;
    }

    /// Returns true while a multi part GSV description is being gathered.
    pub fn is_assembling(&self) -> bool {
        self.assembly.is_some()
    }

    fn drop_assembly(&mut self, reason: &str) {
        if let Some(assembly) = self.assembly.take() {
            debug!(
                "nmea: dropping incomplete {:?} GSV ({}/{}): {}",
                assembly.system,
                assembly.next - 1,
                assembly.total,
                reason
            );
        }
    }
}

impl SentenceParser for NmeaParser {
    fn parse_in_use(&mut self, line: &[u8]) -> Option<InUseReport> {
        let sentence = split_sentence(line)?;
        if sentence.kind != "GSA" {
            return None;
        }

        let mut system = talker_constellation(sentence.talker)?;

        // malformed identifiers are skipped
        let ids = (3..=14)
            .filter_map(|i| sentence.parse_field::<u16>(i))
            .filter(|id| *id > 0)
            .collect::<Vec<_>>();

        if system == Constellation::Mixed {
            let explicit = sentence
                .parse_field::<u8>(18)
                .and_then(system_id_constellation);

            let guessed = ids.first().and_then(|id| constellation_from_id(*id));

            if let Some(resolved) = explicit.or(guessed) {
                system = resolved;
            }
        }

        Some(InUseReport { system, ids })
    }

    fn parse_in_view(&mut self, line: &[u8]) -> InViewStatus {
        let sentence = match split_sentence(line) {
            Some(sentence) => sentence,
            None => return InViewStatus::NotRecognized,
        };

        if sentence.kind != "GSV" {
            return InViewStatus::NotRecognized;
        }

        let system = match talker_constellation(sentence.talker) {
            Some(system) => system,
            None => return InViewStatus::NotRecognized,
        };

        let (total, index, declared) = match (
            sentence.parse_field::<usize>(1),
            sentence.parse_field::<usize>(2),
            sentence.parse_field::<usize>(3),
        ) {
            (Some(total), Some(index), Some(declared)) => (total, index, declared),
            _ => return InViewStatus::NotRecognized,
        };

        if total == 0 || index == 0 || index > total {
            return InViewStatus::NotRecognized;
        }

        if index == 1 {
            self.drop_assembly("new description started");
            self.assembly = Some(GsvAssembly {
                system,
                total,
                declared,
                next: 1,
                satellites: Vec::with_capacity(declared.min(64)),
            });
        } else {
            let in_sequence = self
                .assembly
                .as_ref()
                .map(|a| a.system == system && a.total == total && a.next == index)
                .unwrap_or(false);

            if !in_sequence {
                debug!(
                    "nmea: {:?} GSV chunk {}/{} out of sequence",
                    system, index, total
                );
                self.drop_assembly("out of sequence chunk");
                return InViewStatus::NotRecognized;
            }
        }

        let assembly = match self.assembly.as_mut() {
            Some(assembly) => assembly,
            None => return InViewStatus::NotRecognized,
        };

        for group in 0..SATELLITES_PER_GSV {
            let base = 4 + group * 4;

            // empty or malformed groups are skipped
            let id = match sentence.parse_field::<u16>(base) {
                Some(id) => id,
                None => continue,
            };

            assembly.satellites.push(SatelliteRecord {
                system,
                id,
                elevation: sentence.parse_field::<f64>(base + 1),
                azimuth: sentence.parse_field::<f64>(base + 2),
                snr: sentence.parse_field::<u8>(base + 3),
            });
        }

        assembly.next += 1;

        if index < total {
            return InViewStatus::PartiallyParsed {
                system,
                received: assembly.satellites.len(),
            };
        }

        let assembly = match self.assembly.take() {
            Some(assembly) => assembly,
            None => return InViewStatus::NotRecognized,
        };

        if assembly.declared != assembly.satellites.len() {
            debug!(
                "nmea: {:?} GSV declared {} satellites but described {}",
                system,
                assembly.declared,
                assembly.satellites.len()
            );
        }

        InViewStatus::FullyParsed {
            system,
            satellites: assembly.satellites,
        }
    }
}
