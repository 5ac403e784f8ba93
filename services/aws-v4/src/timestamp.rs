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

use chrono::Timelike;
use s3sign_core::time::{format_date, format_iso8601, parse_iso8601, Clock, DateTime};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The instant a request is signed at.
///
/// Only the instant is stored. Both renderings are derived from it on
/// demand, so the date stamp can never disagree with the full timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime);

impl Timestamp {
    /// Create a timestamp from an instant, dropping sub-second precision.
    pub fn new(t: DateTime) -> Self {
        // 0 is always a valid nanosecond value.
        Self(t.with_nanosecond(0).unwrap_or(t))
    }

    /// Sample the given clock once.
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.now())
    }

    /// The instant this timestamp represents.
    pub fn datetime(&self) -> DateTime {
        self.0
    }

    /// Full date-time stamp: `YYYYMMDDTHHMMSSZ`
    pub fn iso8601(&self) -> String {
        format_iso8601(self.0)
    }

    /// Date-only stamp: `YYYYMMDD`
    pub fn date(&self) -> String {
        format_date(self.0)
    }
}

impl From<DateTime> for Timestamp {
    fn from(t: DateTime) -> Self {
        Self::new(t)
    }
}

impl FromStr for Timestamp {
    type Err = s3sign_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_iso8601(s).map(Self::new)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.iso8601())
    }
}
