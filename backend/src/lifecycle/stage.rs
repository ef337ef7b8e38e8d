//! Stage transition function.

use crate::models::Stage;

/// Next stage after a completed SMC pitch.
///
/// Total over [`Stage`]: `S0 -> S1 -> S2 -> S3`, every other stage maps to
/// itself.
pub fn next_stage(current: Stage) -> Stage {
    match current {
        Stage::S0 => Stage::S1,
        Stage::S1 => Stage::S2,
        Stage::S2 => Stage::S3,
        other => other,
    }
}

/// Stages from which a new SMC pitch may be booked.
pub fn accepts_smc_booking(stage: Stage) -> bool {
    matches!(stage, Stage::S0 | Stage::S1 | Stage::S2)
}
