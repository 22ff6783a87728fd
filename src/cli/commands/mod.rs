//! Command execution.
//!
//! Argument validation happens here; the release itself is delegated to
//! [`ReleasePipeline`](crate::release::ReleasePipeline).

mod release;

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

use release::execute_release;

/// Exit code for invalid arguments, matching clap's
pub const EXIT_USAGE: i32 = 2;

/// Execute the release described by `args`
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {validation_error}"));
        return Ok(EXIT_USAGE);
    }

    let config = RuntimeConfig::from(&args);

    match execute_release(&args, &config).await {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("Release failed: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.indent(&format!("• {suggestion}"));
                }
            }

            Ok(1)
        }
    }
}
