//! Header chunk validation

use std::num::NonZeroU16;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::FormatError;

/// Header chunk data. Only format 1 files with a metrical division make it this far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderInfo {
    /// The MIDI format, always [`Format::One`] once validated
    format: Format,
    /// Number of tracks the header claims
    ntrks: u16,
    /// Ticks per quarter note
    ticks_per_quarter: NonZeroU16,
}

impl HeaderInfo {
    /// The file's format
    pub fn format(&self) -> Format {
        self.format
    }

    /// Track count as declared by the header, which may disagree with the chunks present
    pub fn declared_tracks(&self) -> u16 {
        self.ntrks
    }

    /// Ticks per quarter note
    pub fn ticks_per_quarter(&self) -> NonZeroU16 {
        self.ticks_per_quarter
    }
}

impl TryFrom<(u16, u16, u16)> for HeaderInfo {
    type Error = FormatError;
    fn try_from(value: (u16, u16, u16)) -> Result<Self, Self::Error> {
        let (format, ntrks, division) = value;

        let format = Format::try_from(format)?;
        if format != Format::One {
            return Err(FormatError::UnsupportedFormat(format as u16));
        }

        let ticks_per_quarter = match Division::from(division) {
            Division::Metrical(ticks) => NonZeroU16::new(ticks).ok_or(FormatError::ZeroDivision)?,
            Division::TimeCodeBased => return Err(FormatError::SmpteDivision(division)),
        };

        Ok(Self {
            format,
            ntrks,
            ticks_per_quarter,
        })
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero = 0,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One = 1,
    /// The file contains one or more sequentially independent single-track patterns
    Two = 2,
}

impl TryFrom<u16> for Format {
    type Error = FormatError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            _ => Err(FormatError::UnsupportedFormat(value)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1 the division is SMPTE frames, which playback cannot pace
    TimeCodeBased,
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value >> 15 == 0 {
            Division::Metrical(value & MASK)
        } else {
            Division::TimeCodeBased
        }
    }
}
