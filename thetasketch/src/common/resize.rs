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

/// The growth factor applied when an updatable sketch's hash table fills up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFactor {
    /// Do not resize. Sketch will be configured to full size.
    X1,
    /// Resize by factor of 2
    X2,
    /// Resize by factor of 4
    X4,
    /// Resize by factor of 8
    X8,
}

impl ResizeFactor {
    /// Returns the Log-base 2 of the Resize Factor
    pub fn lg_value(self) -> u8 {
        match self {
            ResizeFactor::X1 => 0,
            ResizeFactor::X2 => 1,
            ResizeFactor::X4 => 2,
            ResizeFactor::X8 => 3,
        }
    }

    /// Returns the Resize Factor.
    pub fn value(self) -> usize {
        1 << self.lg_value()
    }

    /// Returns the Resize Factor with the given Log-base 2 value, as stored in the top two bits
    /// of a serialized preamble.
    pub fn from_lg_value(lg_value: u8) -> ResizeFactor {
        match lg_value & 0x3 {
            0 => ResizeFactor::X1,
            1 => ResizeFactor::X2,
            2 => ResizeFactor::X4,
            _ => ResizeFactor::X8,
        }
    }
}
