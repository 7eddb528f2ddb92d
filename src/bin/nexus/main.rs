//! nexus-cli - Tool for inspecting event archives.

use nexus_persistency::event::{Particle, SerializedEvent};
use nexus_persistency::persist::EventArchive;
use std::collections::HashMap;
use std::env;
use std::path::Path;

use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the command-line level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    // JSON output must stay clean
    if filtered_args.iter().any(|&s| s == "--json" || s == "-j") {
        level = "error";
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - archive summary
        "info" | "i" => {
            let Some(path) = filtered_args.get(1) else {
                usage_error("missing file argument", "nexus-cli info <file.nxevt>");
            };
            cmd_info(path);
        }

        // Tree command - particle family tree of one event
        "tree" | "t" => {
            if filtered_args.len() < 2 {
                usage_error("missing file argument", "nexus-cli tree <file.nxevt> [event]");
            }
            let event = parse_event_arg(filtered_args.get(2).copied());
            cmd_tree(filtered_args[1], event);
        }

        // Dump command - full event contents
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                usage_error("missing file argument", "nexus-cli dump <file.nxevt> [event] [--json]");
            }
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            let event = filtered_args
                .get(2)
                .copied()
                .filter(|&s| s != "--json" && s != "-j")
                .map(|s| parse_event_arg(Some(s)));
            cmd_dump(filtered_args[1], event, json_mode);
        }

        // Meta command - run metadata
        "meta" | "m" => {
            let Some(path) = filtered_args.get(1) else {
                usage_error("missing file argument", "nexus-cli meta <file.nxevt>");
            };
            cmd_meta(path);
        }

        "version" | "--version" | "-V" => {
            println!(
                "nexus-cli {} (built {})",
                env!("CARGO_PKG_VERSION"),
                env!("NEXUS_BUILD_STAMP")
            );
        }

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0]);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("nexus-cli - event archive toolkit");
    println!();
    println!("USAGE:");
    println!("    nexus-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>                  Show event count and totals");
    println!("    t, tree   <file> [event]          Show particle family tree (default: event 0)");
    println!("    d, dump   <file> [event] [--json] Dump events (all, or one by id)");
    println!("    m, meta   <file>                  Show run metadata");
    println!("    version                           Show version and build date");
    println!("    h, help                           Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    nexus-cli info run.nxevt              # Quick overview");
    println!("    nexus-cli tree run.nxevt 12           # Family tree of event 12");
    println!("    nexus-cli dump run.nxevt --json       # Export all events as JSON");
    println!("    RUST_LOG=trace nexus-cli info run.nxevt");
    println!();
    println!("NOTES:");
    println!("    - Passing an archive directly is equivalent to 'info'");
}

fn usage_error(msg: &str, usage: &str) -> ! {
    eprintln!("Error: {}", msg);
    eprintln!("Usage: {}", usage);
    std::process::exit(1);
}

fn parse_event_arg(arg: Option<&str>) -> i64 {
    match arg {
        None => 0,
        Some(s) => s.parse().unwrap_or_else(|_| {
            eprintln!("Error: '{}' is not an event id", s);
            std::process::exit(1);
        }),
    }
}

fn open_archive(path: &str) -> EventArchive {
    info!("Opening archive: {}", path);
    match EventArchive::open(path) {
        Ok(a) => {
            debug!(events = a.num_events(), frozen = a.is_frozen(), "archive opened");
            a
        }
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn load_event(archive: &EventArchive, event_id: i64) -> SerializedEvent {
    match archive.event_by_id(event_id) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Failed to read event {}: {}", event_id, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str) {
    let archive = open_archive(path);

    println!("Archive: {}", path);
    println!("Version: {}", archive.version());
    println!("Closed:  {}", if archive.is_frozen() { "yes" } else { "no (truncated run?)" });
    if let Some(n) = archive.metadata().num_events() {
        println!("Run events: {}", n);
    }
    println!();

    let mut totals = EventTotals::default();
    for (i, event) in archive.events().enumerate() {
        match event {
            Ok(evt) => {
                trace!(index = i, event = evt.event_id, "counting event");
                totals.add(&evt);
            }
            Err(e) => {
                eprintln!("Failed to read event #{}: {}", i, e);
                std::process::exit(1);
            }
        }
    }

    println!("Events:      {}", totals.events);
    println!("  Particles: {} ({} primaries)", totals.particles, totals.primaries);
    println!("  Tracks:    {} ({:.4} MeV deposited)", totals.tracks, totals.energy_deposit);
    println!("  Sensors:   {} ({} photons)", totals.sensor_hits, totals.amplitude);
}

/// Totals over all events of an archive.
#[derive(Default)]
struct EventTotals {
    events: usize,
    particles: usize,
    primaries: usize,
    tracks: usize,
    sensor_hits: usize,
    energy_deposit: f64,
    amplitude: u64,
}

impl EventTotals {
    fn add(&mut self, evt: &SerializedEvent) {
        self.events += 1;
        self.particles += evt.particles.len();
        self.primaries += evt.primaries().count();
        self.tracks += evt.tracks.len();
        self.sensor_hits += evt.sensor_hits.len();
        self.energy_deposit += evt.total_energy_deposit();
        self.amplitude += evt.total_amplitude();
    }
}

fn cmd_tree(path: &str, event_id: i64) {
    let archive = open_archive(path);
    let evt = load_event(&archive, event_id);

    println!("Archive: {}", path);
    println!("Event:   {}", evt.event_id);
    println!();

    if evt.particles.is_empty() {
        println!("(no particles stored)");
        return;
    }
    let by_id: HashMap<u32, &Particle> = evt.particles.iter().map(|p| (p.id, p)).collect();
    for p in evt.primaries() {
        print_tree(p, &by_id, 0);
    }
}

fn print_tree(p: &Particle, by_id: &HashMap<u32, &Particle>, depth: usize) {
    let indent = "  ".repeat(depth);
    let tracks = if p.track_indices.is_empty() {
        String::new()
    } else {
        format!(" [{} tracks]", p.track_indices.len())
    };
    println!(
        "{}{} #{} ({}) E={:.4} MeV L={:.3} mm {} -> {}{}",
        indent,
        p.name,
        p.id,
        p.creator_process,
        p.initial_momentum.energy,
        p.track_length,
        p.initial_volume,
        p.decay_volume.as_deref().unwrap_or("?"),
        tracks
    );
    for id in &p.daughter_ids {
        match by_id.get(id) {
            Some(d) => print_tree(d, by_id, depth + 1),
            None => println!("{}  #{} (missing)", indent, id),
        }
    }
}

fn cmd_dump(path: &str, event_id: Option<i64>, json_mode: bool) {
    let archive = open_archive(path);
    let events: Vec<SerializedEvent> = match event_id {
        Some(id) => vec![load_event(&archive, id)],
        None => archive.events().collect::<Result<_, _>>().unwrap_or_else(|e| {
            eprintln!("Failed to read events: {}", e);
            std::process::exit(1);
        }),
    };

    if json_mode {
        match serde_json::to_string_pretty(&events) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("JSON encoding failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for evt in &events {
        println!("Event {}", evt.event_id);
        println!("  Particles ({}):", evt.particles.len());
        for p in &evt.particles {
            println!(
                "    #{} {} pdg={} mother={} daughters={:?}",
                p.id,
                p.name,
                p.pdg_code,
                p.mother_id.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
                p.daughter_ids
            );
            println!("      production: {}", p.production_vertex);
            match &p.decay_vertex {
                Some(v) => println!("      decay:      {}", v),
                None => println!("      decay:      (not finished)"),
            }
        }
        println!("  Tracks ({}):", evt.tracks.len());
        for t in &evt.tracks {
            println!(
                "    particle #{} in {}: {} samples, {:.4} MeV",
                t.owner_particle_id,
                t.sensor_name,
                t.samples.len(),
                t.energy_deposit()
            );
        }
        println!("  Sensor hits ({}):", evt.sensor_hits.len());
        for h in &evt.sensor_hits {
            println!(
                "    {} #{} bins={} width={} ns amplitude={}",
                h.sensor_name,
                h.sensor_id,
                h.samples.len(),
                h.bin_width,
                h.amplitude
            );
        }
        println!();
    }
}

fn cmd_meta(path: &str) {
    let archive = open_archive(path);

    println!("Archive: {}", path);
    println!("\nRun Metadata:");
    if archive.metadata().is_empty() {
        println!("  (none)");
    }
    for (k, v) in archive.metadata().iter() {
        println!("  {}: {}", k, v);
    }
}
