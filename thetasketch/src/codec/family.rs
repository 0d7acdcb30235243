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

use std::fmt;

use crate::error::Error;

/// Defines the various families of sketch and set operation classes.
///
/// A family defines a set of classes that share fundamental algorithms and behaviors. The classes
/// within a family may still differ by how they are stored and accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    /// The byte ID for this family.
    pub id: u8,
    /// The name for this family.
    pub name: &'static str,
    /// The minimum preamble size for this family in longs (8-bytes integer).
    pub min_pre_longs: u8,
    /// The maximum preamble size for this family in longs (8-bytes integer).
    pub max_pre_longs: u8,
}

impl Family {
    /// The Alpha family of theta sketches.
    pub const ALPHA: Family = Family {
        id: 1,
        name: "ALPHA",
        min_pre_longs: 3,
        max_pre_longs: 3,
    };

    /// The QuickSelect family of updatable theta sketches.
    pub const QUICKSELECT: Family = Family {
        id: 2,
        name: "QUICKSELECT",
        min_pre_longs: 3,
        max_pre_longs: 3,
    };

    /// The Compact family of immutable theta sketches.
    pub const COMPACT: Family = Family {
        id: 3,
        name: "COMPACT",
        min_pre_longs: 1,
        max_pre_longs: 3,
    };

    /// The theta Union set operation.
    pub const UNION: Family = Family {
        id: 4,
        name: "UNION",
        min_pre_longs: 4,
        max_pre_longs: 4,
    };

    /// The theta Intersection set operation.
    pub const INTERSECTION: Family = Family {
        id: 5,
        name: "INTERSECTION",
        min_pre_longs: 3,
        max_pre_longs: 3,
    };

    /// The theta A and not B set operation.
    pub const A_NOT_B: Family = Family {
        id: 6,
        name: "A_NOT_B",
        min_pre_longs: 3,
        max_pre_longs: 3,
    };
}

static FAMILIES: [Family; 6] = [
    Family::ALPHA,
    Family::QUICKSELECT,
    Family::COMPACT,
    Family::UNION,
    Family::INTERSECTION,
    Family::A_NOT_B,
];

impl Family {
    /// Looks up the family with the given byte ID.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::Family;
    /// assert_eq!(Family::from_id(3), Some(Family::COMPACT));
    /// assert_eq!(Family::from_id(42), None);
    /// ```
    pub fn from_id(id: u8) -> Option<Family> {
        FAMILIES.iter().find(|f| f.id == id).copied()
    }

    pub(crate) fn validate_id(&self, family_id: u8) -> Result<(), Error> {
        if family_id != self.id {
            Err(Error::invalid_family(self.id, family_id, self.name))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
