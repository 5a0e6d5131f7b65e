// SPDX-License-Identifier: Apache-2.0

mod context;
mod machine;

pub use context::{ErrorContext, ResultExt};
pub use machine::{ExitCode, MachineError};
