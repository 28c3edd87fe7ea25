//! Process runner tests against real child processes.

mod launch_test;
#[cfg(unix)]
mod runner_test;
