// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-linear stepping for duration bounds.
//!
//! Below [`BREAKPOINT_MINUTES`] the value moves one minute at a time. At or
//! above it, values snap to multiples of the breakpoint and move by a whole
//! breakpoint per step.

use std::time::Duration;

/// Boundary between the fine and the coarse stepping zone
pub const BREAKPOINT_MINUTES: u32 = 5;

/// Next value up. A value with no representable next step comes back as is.
pub fn step_up(minutes: u32) -> u32 {
    if minutes < BREAKPOINT_MINUTES - 1 {
        minutes + 1
    } else {
        // Round up to the next multiple, also from the top of the fine zone
        (minutes / BREAKPOINT_MINUTES + 1)
            .checked_mul(BREAKPOINT_MINUTES)
            .unwrap_or(minutes)
    }
}

/// Next value down, never below zero
pub fn step_down(minutes: u32) -> u32 {
    if minutes <= BREAKPOINT_MINUTES {
        minutes.saturating_sub(1)
    } else if minutes % BREAKPOINT_MINUTES == 0 {
        minutes - BREAKPOINT_MINUTES
    } else {
        minutes - minutes % BREAKPOINT_MINUTES
    }
}

/// [`step_up`] on a duration truncated to whole minutes
pub fn step_duration_up(duration: Duration) -> Duration {
    from_minutes(step_up(whole_minutes(duration)))
}

/// [`step_down`] on a duration truncated to whole minutes
pub fn step_duration_down(duration: Duration) -> Duration {
    from_minutes(step_down(whole_minutes(duration)))
}

pub fn whole_minutes(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs() / 60).unwrap_or(u32::MAX)
}

pub fn from_minutes(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}
