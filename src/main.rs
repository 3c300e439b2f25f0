/*!
# stickerdiary

Command-line boundary for the sticker diary backend. Each invocation runs one
command against the configured SQLite database and prints a JSON document on
stdout.

## Usage

```text
stickerdiary signup --email alice@example.com --password pw1 --nickname alice
stickerdiary login --email alice@example.com --password pw1
stickerdiary --token <ACCESS> diary create --file diary.json
stickerdiary --token <ACCESS> diary search --keyword rofan
stickerdiary diary feed --limit 10
```

## Configuration

- `STICKERDIARY_DB`: database path (defaults to `~/.local/share/stickerdiary/diary.db`)
- `STICKERDIARY_TOKEN_SECRET`: token signing secret, at least 32 bytes (required)
- `STICKERDIARY_ACCESS_TTL_SECS` / `STICKERDIARY_REFRESH_TTL_SECS`: token lifetimes
- `STICKERDIARY_LOG_FORMAT` (`text` or `json`) and `STICKERDIARY_LOG_LEVEL`

Failures print `{"status", "code", "message", "errors"}` and exit with status 1.
*/

use clap::Parser;
use stickerdiary::cli::{self, CliArgs};
use stickerdiary::config::Config;
use stickerdiary::errors::AppError;
use stickerdiary::logging::{init_logging, root_span};
use std::process::ExitCode;
use tracing::{error, info};

fn print_failure(err: &AppError) -> ExitCode {
    let response = err.to_response();
    match serde_json::to_string_pretty(&response) {
        Ok(body) => println!("{}", body),
        Err(_) => println!("{{\"status\":500,\"code\":\"INTERNAL_ERROR\"}}"),
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet and config errors are not opaque to the operator
            eprintln!("{}", e);
            return print_failure(&e);
        }
    };

    if let Err(e) = init_logging(config.log_format, &config.log_level) {
        eprintln!("{}", e);
        return print_failure(&e);
    }

    let span = root_span(args.command.name());
    let _guard = span.enter();
    info!("Starting stickerdiary");

    match cli::run(args, &config) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(body) => {
                println!("{}", body);
                ExitCode::SUCCESS
            }
            Err(e) => print_failure(&AppError::Unexpected(e.to_string())),
        },
        Err(e) => {
            error!(error = %e, "Command failed");
            print_failure(&e)
        }
    }
}
