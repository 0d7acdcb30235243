// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Binary serialization format for theta sketches.
//!
//! All values are little endian. The first 8 bytes are present in every serial version:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | preamble_longs | Low 6 bits: number of 8-byte longs in the preamble. High 2 bits: lg resize factor |
//! | 1 | serial_version | 1, 2 or 3 |
//! | 2 | family_id | 2 (QuickSelect), 3 (Compact) or 4 (Union) |
//! | 3 | lg_k | Log2 of nominal entries |
//! | 4 | lg_arr | Log2 of the hash table size (updatable layouts only) |
//! | 5 | flags | Bit flags (see below) |
//! | 6-7 | seed_hash | 16-bit hash of the seed (absent in serial version 1) |
//!
//! If preamble_longs >= 2:
//! | Byte 8-11 | retained_entries | Number of hash values stored |
//! | Byte 12-15 | p | Sampling probability as f32 |
//!
//! If preamble_longs >= 3:
//! | Byte 16-23 | theta | Theta value as 64-bit integer |
//!
//! If preamble_longs == 4 (union):
//! | Byte 24-31 | union_theta | Running theta of the union |
//!
//! The hash values follow the preamble. Compact layouts store exactly `retained_entries` values;
//! updatable layouts store the whole hash table, unused slots included.
//!
//! ## Flags (Byte 5)
//!
//! | Bit | Name | Description |
//! |-----|------|-------------|
//! | 0 | BIG_ENDIAN | Not used (always 0 for little endian) |
//! | 1 | READ_ONLY | Sketch is read-only (always 1 for compact) |
//! | 2 | EMPTY | Sketch is empty |
//! | 3 | COMPACT | Sketch is in compact form |
//! | 4 | ORDERED | Hash values are sorted |
//! | 5 | SINGLE_ITEM | Compact sketch holding exactly one hash after an 8-byte preamble |
//!
//! Serial version 1 has no seed hash and is always compact and ordered with three preamble
//! longs. Serial version 2 adds the seed hash and the empty and exact preambles, still always
//! ordered. Serial version 3 adds unordered compact sketches and the single item form.

use byteorder::ByteOrder;
use byteorder::LE;

use crate::codec::Family;
use crate::codec::SketchMemory;
use crate::error::Error;
use crate::hash::compute_seed_hash;
use crate::theta::hash_table::MAX_THETA;

pub(crate) const SERIAL_VERSION: u8 = 3;
pub(crate) const SERIAL_VERSION_1: u8 = 1;
pub(crate) const SERIAL_VERSION_2: u8 = 2;

pub(crate) const PREAMBLE_LONGS_BYTE: usize = 0;
pub(crate) const SER_VER_BYTE: usize = 1;
pub(crate) const FAMILY_BYTE: usize = 2;
pub(crate) const LG_K_BYTE: usize = 3;
pub(crate) const FLAGS_BYTE: usize = 5;
pub(crate) const SEED_HASH_SHORT: usize = 6;
pub(crate) const RETAINED_ENTRIES_INT: usize = 8;
pub(crate) const THETA_LONG: usize = 16;
pub(crate) const UNION_THETA_LONG: usize = 24;

pub(crate) const FLAG_READ_ONLY: u8 = 1 << 1;
pub(crate) const FLAG_EMPTY: u8 = 1 << 2;
pub(crate) const FLAG_COMPACT: u8 = 1 << 3;
pub(crate) const FLAG_ORDERED: u8 = 1 << 4;
pub(crate) const FLAG_SINGLE_ITEM: u8 = 1 << 5;

pub(crate) const PREAMBLE_LONGS_EMPTY: u8 = 1;
pub(crate) const PREAMBLE_LONGS_EXACT: u8 = 2;
pub(crate) const PREAMBLE_LONGS_ESTIMATION: u8 = 3;
pub(crate) const PREAMBLE_LONGS_UNION: u8 = 4;

pub(crate) const PREAMBLE_LONGS_MASK: u8 = 0x3F;
pub(crate) const LG_RESIZE_FACTOR_SHIFT: u8 = 6;

pub(crate) const HASH_SIZE_BYTES: usize = 8;

/// Buffers of at most this many bytes hold an empty sketch, per serial version.
const MIN_BYTES: usize = 8;
const V1_EMPTY_BYTES: usize = 24;

/// The decoded preamble of a serialized compact sketch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompactLayout {
    pub is_empty: bool,
    pub is_ordered: bool,
    pub seed_hash: u16,
    pub theta: u64,
    pub num_entries: usize,
    pub entries_offset: usize,
}

impl CompactLayout {
    fn empty(seed_hash: u16) -> Self {
        Self {
            is_empty: true,
            is_ordered: true,
            seed_hash,
            theta: MAX_THETA,
            num_entries: 0,
            entries_offset: 0,
        }
    }

    /// Reads the preamble of a compact sketch in serial version 1, 2 or 3.
    ///
    /// The number of entries declared by the preamble is checked against the buffer, so the
    /// entries can be read in place afterwards.
    pub fn read(mem: SketchMemory<'_>, seed: u64) -> Result<Self, Error> {
        let expected_seed_hash = compute_seed_hash(seed);
        if mem.capacity() < MIN_BYTES {
            return Ok(Self::empty(expected_seed_hash));
        }

        let serial_version = mem.get_u8(SER_VER_BYTE)?;
        let layout = match serial_version {
            SERIAL_VERSION_1 => Self::read_v1(mem, expected_seed_hash)?,
            SERIAL_VERSION_2 => Self::read_v2(mem, expected_seed_hash)?,
            SERIAL_VERSION => Self::read_v3(mem, expected_seed_hash)?,
            _ => return Err(Error::unsupported_serial_version(serial_version)),
        };

        if layout.theta == 0 || layout.theta > MAX_THETA {
            return Err(Error::deserial(format!(
                "theta must be in (0, {MAX_THETA}], got {}",
                layout.theta
            )));
        }
        let entries_end = layout.entries_offset + layout.num_entries * HASH_SIZE_BYTES;
        if mem.capacity() < entries_end {
            return Err(Error::insufficient_data(format!(
                "expected {} entries in {entries_end} bytes, got {} bytes",
                layout.num_entries,
                mem.capacity()
            )));
        }
        Ok(layout)
    }

    /// Serial version 1: no seed hash, always ordered, three preamble longs.
    fn read_v1(mem: SketchMemory<'_>, seed_hash: u16) -> Result<Self, Error> {
        if mem.capacity() <= V1_EMPTY_BYTES {
            return Ok(Self::empty(seed_hash));
        }
        Family::COMPACT.validate_id(mem.get_u8(FAMILY_BYTE)?)?;
        Ok(Self {
            is_empty: false,
            is_ordered: true,
            seed_hash,
            theta: mem.get_u64_le(THETA_LONG)?,
            num_entries: mem.get_u32_le(RETAINED_ENTRIES_INT)? as usize,
            entries_offset: PREAMBLE_LONGS_ESTIMATION as usize * HASH_SIZE_BYTES,
        })
    }

    /// Serial version 2: seed hash, always ordered.
    fn read_v2(mem: SketchMemory<'_>, seed_hash: u16) -> Result<Self, Error> {
        if mem.capacity() <= MIN_BYTES {
            return Ok(Self::empty(seed_hash));
        }
        Family::COMPACT.validate_id(mem.get_u8(FAMILY_BYTE)?)?;
        check_seed_hash(mem, seed_hash)?;

        let preamble_longs = mem.get_u8(PREAMBLE_LONGS_BYTE)? & PREAMBLE_LONGS_MASK;
        let entries_offset = preamble_longs as usize * HASH_SIZE_BYTES;
        match preamble_longs {
            PREAMBLE_LONGS_EMPTY => Ok(Self::empty(seed_hash)),
            PREAMBLE_LONGS_EXACT => {
                let num_entries = mem.get_u32_le(RETAINED_ENTRIES_INT)? as usize;
                if num_entries == 0 {
                    return Err(Error::deserial(
                        "exact mode sketch must retain at least one entry",
                    ));
                }
                Ok(Self {
                    is_empty: false,
                    is_ordered: true,
                    seed_hash,
                    theta: MAX_THETA,
                    num_entries,
                    entries_offset,
                })
            }
            PREAMBLE_LONGS_ESTIMATION => {
                let num_entries = mem.get_u32_le(RETAINED_ENTRIES_INT)? as usize;
                let flags = mem.get_u8(FLAGS_BYTE)?;
                Ok(Self {
                    is_empty: flags & FLAG_EMPTY != 0 && num_entries == 0,
                    is_ordered: true,
                    seed_hash,
                    theta: mem.get_u64_le(THETA_LONG)?,
                    num_entries,
                    entries_offset,
                })
            }
            _ => Err(invalid_preamble_longs(preamble_longs)),
        }
    }

    /// Serial version 3: ordered flag and single item form.
    fn read_v3(mem: SketchMemory<'_>, seed_hash: u16) -> Result<Self, Error> {
        if mem.capacity() <= MIN_BYTES {
            return Ok(Self::empty(seed_hash));
        }
        Family::COMPACT.validate_id(mem.get_u8(FAMILY_BYTE)?)?;

        let preamble_longs = mem.get_u8(PREAMBLE_LONGS_BYTE)? & PREAMBLE_LONGS_MASK;
        let flags = mem.get_u8(FLAGS_BYTE)?;
        let entries_offset = preamble_longs as usize * HASH_SIZE_BYTES;

        if flags & FLAG_EMPTY != 0 {
            let mut layout = Self::empty(seed_hash);
            if preamble_longs >= PREAMBLE_LONGS_ESTIMATION {
                layout.theta = mem.get_u64_le(THETA_LONG)?;
            }
            return Ok(layout);
        }
        if flags & FLAG_COMPACT == 0 {
            return Err(Error::deserial("only compact sketches are supported"));
        }
        check_seed_hash(mem, seed_hash)?;

        let is_ordered = mem.is_any_bits_set(FLAGS_BYTE, FLAG_ORDERED)?;
        match preamble_longs {
            PREAMBLE_LONGS_EMPTY if flags & FLAG_SINGLE_ITEM != 0 => Ok(Self {
                is_empty: false,
                is_ordered: true,
                seed_hash,
                theta: MAX_THETA,
                num_entries: 1,
                entries_offset,
            }),
            PREAMBLE_LONGS_EMPTY => Ok(Self::empty(seed_hash)),
            PREAMBLE_LONGS_EXACT => {
                let num_entries = mem.get_u32_le(RETAINED_ENTRIES_INT)? as usize;
                if num_entries == 0 {
                    return Err(Error::deserial(
                        "exact mode sketch must retain at least one entry",
                    ));
                }
                Ok(Self {
                    is_empty: false,
                    is_ordered,
                    seed_hash,
                    theta: MAX_THETA,
                    num_entries,
                    entries_offset,
                })
            }
            PREAMBLE_LONGS_ESTIMATION => Ok(Self {
                is_empty: false,
                is_ordered,
                seed_hash,
                theta: mem.get_u64_le(THETA_LONG)?,
                num_entries: mem.get_u32_le(RETAINED_ENTRIES_INT)? as usize,
                entries_offset,
            }),
            _ => Err(invalid_preamble_longs(preamble_longs)),
        }
    }

    /// Returns the packed entries of the sketch described by this layout.
    ///
    /// `bytes` must be the buffer the layout was read from.
    pub fn entries<'a>(&self, bytes: &'a [u8]) -> impl ExactSizeIterator<Item = u64> + 'a {
        let end = self.entries_offset + self.num_entries * HASH_SIZE_BYTES;
        bytes[self.entries_offset..end]
            .chunks_exact(HASH_SIZE_BYTES)
            .map(LE::read_u64)
    }
}

fn check_seed_hash(mem: SketchMemory<'_>, expected: u16) -> Result<(), Error> {
    let actual = mem.get_u16_le(SEED_HASH_SHORT)?;
    if actual != expected {
        return Err(Error::incompatible_seed(expected, actual));
    }
    Ok(())
}

fn invalid_preamble_longs(preamble_longs: u8) -> Error {
    Error::deserial(format!(
        "compact sketch must have 1 to 3 preamble longs, got {preamble_longs}"
    ))
}

/// Packs the preamble longs and the lg resize factor into the first byte.
pub(crate) fn preamble_byte(preamble_longs: u8, lg_resize_factor: u8) -> u8 {
    (preamble_longs & PREAMBLE_LONGS_MASK) | (lg_resize_factor << LG_RESIZE_FACTOR_SHIFT)
}
