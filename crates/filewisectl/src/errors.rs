//! Exit codes for filewisectl

use filewise_common::OutcomeKind;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when a command was refused: protected name or no such file
pub const EXIT_REFUSED: i32 = 65;

/// Exit code for a routed outcome
pub fn exit_code_for(kind: OutcomeKind) -> i32 {
    if kind.is_success() {
        EXIT_SUCCESS
    } else if kind.is_refusal() {
        EXIT_REFUSED
    } else {
        EXIT_GENERAL_ERROR
    }
}
