//! Human-readable error descriptions for the CLI.

use blind_core::{BuildError, CommandError, ControlError};

/// Map an eyre::Report to an explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = err.downcast_ref::<CommandError>() {
        return match ce {
            CommandError::CalibrationLocked => {
                "What happened: Travel timing cannot change right now.\nLikely causes: The blind is moving or parked somewhere between fully open and fully closed.\nHow to fix: Move the blind fully open (0) or fully closed (100), then retry.".to_string()
            }
            CommandError::InvalidTarget => {
                "What happened: The target position is not a usable number.\nLikely causes: A NaN or infinite value was passed to --position.\nHow to fix: Pass a percentage between 0 and 100.".to_string()
            }
            CommandError::InvalidTiming => {
                "What happened: The timing value is not usable.\nLikely causes: Zero, negative or non-finite seconds.\nHow to fix: Pass finite seconds greater than zero.".to_string()
            }
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingRelays | BuildError::MissingButtons | BuildError::MissingStore => {
                format!(
                    "What happened: The controller could not be assembled ({be}).\nLikely causes: Hardware failed to initialize.\nHow to fix: Check wiring and the [pins] section of the config."
                )
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<ControlError>() {
        if let ControlError::Storage(_) = de {
            return format!(
                "What happened: {de}.\nLikely causes: The state file is unwritable or corrupt.\nHow to fix: Check the [store] path and its permissions; delete the file to start from defaults."
            );
        }
        return format!(
            "What happened: {de}.\nLikely causes: Relay or button I/O failed.\nHow to fix: Check wiring and GPIO permissions; re-run with --log-level=debug for detail."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {err}"
    )
}
