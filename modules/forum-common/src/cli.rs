use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;

/// Exit status for a rejected command line.
///
/// `--help` and `--version` come back from clap as errors but are not
/// failures, so they map to 0. Every real usage error maps to 1 rather than
/// clap's default of 2.
pub fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Parse `args`, printing clap's message on failure.
pub fn parse_from<P, I, T>(args: I) -> Result<P, ExitCode>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        ExitCode::from(usage_exit_code(&e))
    })
}

/// Parse the process arguments.
pub fn parse<P: Parser>() -> Result<P, ExitCode> {
    parse_from(std::env::args_os())
}
