//! Child-side behavior: probe modes and a collector log simulator.
//!
//! The real child is a JVM running a probe class that calls `System.gc()`
//! when given any program argument. [`simulate`] reproduces the log output
//! such a JVM writes under `-Xlog:gc`, so scenarios can be exercised without
//! a JDK through the `fake-jvm` binary.

use serde::{Deserialize, Serialize};

/// What the probe program does once started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Start and exit without touching the collector.
    #[default]
    Default,
    /// Request an explicit collection, then exit.
    RequestCollection,
}

impl Mode {
    /// Decide the mode from the probe's program arguments: any argument
    /// requests a collection.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        if args.is_empty() {
            Self::Default
        } else {
            Self::RequestCollection
        }
    }

    /// Program arguments that select this mode.
    #[must_use]
    pub fn program_args(self) -> &'static [&'static str] {
        match self {
            Self::Default => &[],
            Self::RequestCollection => &["test"],
        }
    }
}

/// Runtime options as a JVM launcher would read them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmOptions {
    /// `-XX:+Name` / `-XX:-Name` in command-line order.
    flags: Vec<(String, bool)>,
    /// `-Xmx` value, as written.
    pub max_heap: Option<String>,
    /// Whether `-Xlog` enabled the `gc` tag.
    pub gc_logging: bool,
    pub classpath: Option<String>,
    pub entry_point: Option<String>,
    pub program_args: Vec<String>,
}

impl VmOptions {
    /// Parse a launcher argument list (without the program name).
    ///
    /// Options the simulator has no use for are ignored.
    #[must_use]
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let mut opts = Self::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            if !arg.starts_with('-') {
                opts.entry_point = Some(arg.to_string());
                opts.program_args = iter.map(String::from).collect();
                break;
            }
            if arg == "-cp" || arg == "-classpath" || arg == "--class-path" {
                opts.classpath = iter.next().map(String::from);
            } else if let Some(flag) = arg.strip_prefix("-XX:+") {
                opts.flags.push((flag.to_string(), true));
            } else if let Some(flag) = arg.strip_prefix("-XX:-") {
                opts.flags.push((flag.to_string(), false));
            } else if let Some(size) = arg.strip_prefix("-Xmx") {
                opts.max_heap = Some(size.to_string());
            } else if let Some(spec) = arg.strip_prefix("-Xlog") {
                opts.gc_logging = parse_xlog(spec);
            }
        }
        opts
    }

    /// Last explicit setting of a boolean `-XX` flag.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    fn is_set(&self, name: &str) -> bool {
        self.flag(name) == Some(true)
    }

    fn first_position(&self, name: &str) -> Option<usize> {
        self.flags.iter().position(|(n, v)| n == name && *v)
    }

    fn heap_label(&self) -> String {
        self.max_heap
            .as_deref()
            .map_or_else(|| "256M".to_string(), str::to_uppercase)
    }
}

/// `-Xlog` with no selection means `all=warning`; otherwise look for a `gc` tag.
fn parse_xlog(spec: &str) -> bool {
    let Some(rest) = spec.strip_prefix(':') else {
        return false;
    };
    let selection = rest.split(':').next().unwrap_or_default();
    if selection == "disable" {
        return false;
    }
    selection
        .split(',')
        .any(|s| s == "gc" || s.starts_with("gc*") || s.starts_with("gc=") || s == "all")
}

/// Lines a simulated JVM run writes, and how it exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Simulation {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub exit_code: u8,
}

impl Simulation {
    fn fail(mut self, lines: &[&str]) -> Self {
        self.stderr.extend(lines.iter().map(|l| (*l).to_string()));
        self.exit_code = 1;
        self
    }
}

/// Produces `[uptime][info][gc]` lines with a monotonically advancing clock.
struct GcLog {
    enabled: bool,
    uptime_ms: u32,
    lines: Vec<String>,
}

impl GcLog {
    fn line(&mut self, msg: &str) {
        if !self.enabled {
            return;
        }
        self.uptime_ms += 3;
        let secs = f64::from(self.uptime_ms) / 1000.0;
        self.lines.push(format!("[{secs:.3}s][info][gc] {msg}"));
    }
}

/// Simulate a JVM started with `opts` running the probe in `mode`.
#[must_use]
pub fn simulate(opts: &VmOptions, mode: Mode) -> Simulation {
    let sim = Simulation::default();
    let shenandoah = opts.is_set("UseShenandoahGC");

    if shenandoah {
        match opts.first_position("UnlockExperimentalVMOptions") {
            None => {
                return sim.fail(&[
                    "Error: VM option 'UseShenandoahGC' is experimental and must be enabled via -XX:+UnlockExperimentalVMOptions.",
                    "Error: Could not create the Java Virtual Machine.",
                    "Error: A fatal exception has occurred. Program will exit.",
                ]);
            }
            Some(unlock) if opts.first_position("UseShenandoahGC") < Some(unlock) => {
                return sim.fail(&[
                    "Error: VM option 'UseShenandoahGC' is experimental and must be enabled via -XX:+UnlockExperimentalVMOptions.",
                    "Error: The unlock option must precede 'UseShenandoahGC'.",
                    "Error: Could not create the Java Virtual Machine.",
                    "Error: A fatal exception has occurred. Program will exit.",
                ]);
            }
            Some(_) => {}
        }
    }

    if opts.entry_point.is_none() {
        return sim.fail(&["Usage: java [options] <mainclass> [args...]"]);
    }

    let heap = opts.heap_label();
    let mut log = GcLog {
        enabled: opts.gc_logging,
        uptime_ms: 0,
        lines: Vec::new(),
    };
    log.line(if shenandoah { "Using Shenandoah" } else { "Using G1" });

    let mut app = Vec::new();
    if mode == Mode::RequestCollection {
        app.push("Calling System.gc()".to_string());
        collect_explicitly(opts, shenandoah, &heap, &mut log);
    }
    log.line(&format!("Heap: {heap} reserved, exiting"));

    // The JVM interleaves log and application output on stdout; the log lines
    // for the collection follow the println that triggered it.
    let mut stdout = Vec::new();
    let mut lines = log.lines.into_iter();
    stdout.extend(lines.next());
    stdout.extend(app);
    stdout.extend(lines);

    Simulation {
        stdout,
        stderr: Vec::new(),
        exit_code: 0,
    }
}

fn collect_explicitly(opts: &VmOptions, shenandoah: bool, heap: &str, log: &mut GcLog) {
    if opts.is_set("DisableExplicitGC") {
        return;
    }

    // Shenandoah turns explicit requests into concurrent cycles unless told otherwise.
    let concurrent = opts.flag("ExplicitGCInvokesConcurrent").unwrap_or(shenandoah);

    match (shenandoah, concurrent) {
        (true, true) => {
            log.line("Trigger: Explicit GC request (System.gc())");
            log.line("GC(0) Pause Init Mark 0.214ms");
            log.line("GC(0) Concurrent marking 2M->2M(8M) 1.032ms");
            log.line("GC(0) Pause Final Mark 0.187ms");
            log.line("GC(0) Concurrent cleanup 2M->1M(8M) 0.011ms");
            log.line("GC(0) Concurrent evacuation 1M->1M(8M) 0.204ms");
            log.line("GC(0) Pause Init Update Refs 0.019ms");
            log.line("GC(0) Concurrent update references 1M->1M(8M) 0.312ms");
            log.line("GC(0) Pause Final Update Refs 0.045ms");
            log.line("GC(0) Concurrent cleanup 1M->1M(8M) 0.006ms");
        }
        (true, false) => {
            log.line(&format!(
                "GC(0) Pause Full (System.gc()) 2M->1M({heap}) 4.871ms"
            ));
        }
        (false, true) => {
            log.line("GC(0) Pause Young (Concurrent Start) (System.gc()) 2M->1M(8M) 1.204ms");
            log.line("GC(1) Concurrent Mark Cycle");
            log.line("GC(1) Concurrent Mark Cycle 2.118ms");
        }
        (false, false) => {
            log.line(&format!(
                "GC(0) Pause Full (System.gc()) 2M->1M({heap}) 5.302ms"
            ));
        }
    }
}
