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

use byteorder::ByteOrder;
use byteorder::LE;

use crate::error::Error;

fn out_of_bounds(offset: usize, len: usize, capacity: usize) -> Error {
    Error::insufficient_data(format!(
        "read of {len} bytes at offset {offset} exceeds capacity {capacity}"
    ))
}

/// A read-only, random access view over a serialized sketch.
///
/// All multi-byte values are little-endian. Accesses past the end of the buffer
/// return a `MalformedBuffer` error instead of panicking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SketchMemory<'a> {
    bytes: &'a [u8],
}

impl<'a> SketchMemory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    fn range(&self, offset: usize, len: usize) -> Result<&'a [u8], Error> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| out_of_bounds(offset, len, self.bytes.len()))?;
        self.bytes
            .get(offset..end)
            .ok_or_else(|| out_of_bounds(offset, len, self.bytes.len()))
    }

    pub fn get_u8(&self, offset: usize) -> Result<u8, Error> {
        Ok(self.range(offset, 1)?[0])
    }

    pub fn get_u16_le(&self, offset: usize) -> Result<u16, Error> {
        Ok(LE::read_u16(self.range(offset, 2)?))
    }

    pub fn get_u32_le(&self, offset: usize) -> Result<u32, Error> {
        Ok(LE::read_u32(self.range(offset, 4)?))
    }

    pub fn get_u64_le(&self, offset: usize) -> Result<u64, Error> {
        Ok(LE::read_u64(self.range(offset, 8)?))
    }

    /// Returns true if any of the bits in `mask` are set in the byte at `offset`.
    pub fn is_any_bits_set(&self, offset: usize, mask: u8) -> Result<bool, Error> {
        Ok(self.get_u8(offset)? & mask != 0)
    }
}

/// A writable, random access view over a caller provided buffer.
#[derive(Debug)]
pub(crate) struct SketchMemoryMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> SketchMemoryMut<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    fn range_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], Error> {
        let capacity = self.bytes.len();
        let end = offset
            .checked_add(len)
            .ok_or_else(|| out_of_bounds(offset, len, capacity))?;
        self.bytes
            .get_mut(offset..end)
            .ok_or_else(|| out_of_bounds(offset, len, capacity))
    }

    pub fn put_slice(&mut self, offset: usize, src: &[u8]) -> Result<(), Error> {
        self.range_mut(offset, src.len())?.copy_from_slice(src);
        Ok(())
    }

    pub fn put_u64_le(&mut self, offset: usize, value: u64) -> Result<(), Error> {
        LE::write_u64(self.range_mut(offset, 8)?, value);
        Ok(())
    }
}
