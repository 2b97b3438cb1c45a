//! `quiverd` binary entry point; see the library crate for behaviour.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    quiverd::run(std::env::args_os(), &mut stdout, &mut stderr)
}
