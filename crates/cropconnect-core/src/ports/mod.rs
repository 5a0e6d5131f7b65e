// SPDX-License-Identifier: Apache-2.0

mod clock;

pub use clock::{ClockPort, FixedClock, SystemClock};
