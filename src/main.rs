// SPDX-License-Identifier: MPL-2.0
use snappy::app::{self, Flags};
use snappy::paths;
use std::process::ExitCode;
use std::time::Duration;

const HELP: &str = "\
snappy - capture photos and store them permanently

USAGE:
  snappy [OPTIONS]

OPTIONS:
  --lang <LOCALE>       Interface language (e.g. en-US, fr)
  --config-dir <DIR>    Directory holding settings.toml
  --data-dir <DIR>      Directory for diagnostic reports
  --owner <ADDRESS>     Wallet address listed by the gallery
  --simulate            Use an in-memory camera and storage
  -h, --help            Print this help
";

/// Time allowed for camera workers to wind down after the prompt exits.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

fn parse_flags() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let flags = Flags {
        lang: args.opt_value_from_str("--lang")?,
        data_dir: args.opt_value_from_str("--data-dir")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        owner: args.opt_value_from_str("--owner")?,
        simulate: args.contains("--simulate"),
    };

    let rest = args.finish();
    if let Some(extra) = rest.first() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected argument {}", extra.to_string_lossy()),
        });
    }
    Ok(Some(flags))
}

fn main() -> ExitCode {
    let flags = match parse_flags() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {err}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("[ERROR] Failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(app::run(flags));
    // Standard input is read on a blocking thread that never returns on its own.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            ExitCode::FAILURE
        }
    }
}
