//! Stand-in JVM launcher that prints simulated collector logs.
//!
//! Accepts the same argument shape as `java`:
//! `fake-jvm [options] <entry point> [args...]`.

use std::io::{self, Write};
use std::process::ExitCode;

use gc_harness::simulate::{simulate, Mode, VmOptions};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = VmOptions::parse(&args);
    let mode = Mode::from_args(&opts.program_args);
    let sim = simulate(&opts, mode);

    let mut stdout = io::stdout().lock();
    for line in &sim.stdout {
        let _ = writeln!(stdout, "{line}");
    }
    let _ = stdout.flush();

    let mut stderr = io::stderr().lock();
    for line in &sim.stderr {
        let _ = writeln!(stderr, "{line}");
    }

    ExitCode::from(sim.exit_code)
}
