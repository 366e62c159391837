//! Settlement entry point: CLI wiring, ingestion, and report output.

use std::path::Path;
use std::process;

use vpp_settle::config::JobConfig;
use vpp_settle::io::export::{export_csv, export_json};
use vpp_settle::io::import::{import_entities, import_events};
use vpp_settle::registry::Registry;
use vpp_settle::settlement::SettlementEngine;

/// Parsed CLI arguments.
struct CliArgs {
    job_path: Option<String>,
    entities: Option<String>,
    events: Option<String>,
    vpp: Option<String>,
    month: Option<String>,
    json_out: Option<String>,
    csv_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("vpp-settle — VPP metering-fee settlement engine");
    eprintln!();
    eprintln!("Usage: vpp-settle [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --job <path>             Load job description from TOML config file");
    eprintln!("  --entities <path>        Tagged entity rows CSV");
    eprintln!("  --events <path>          Metering events CSV");
    eprintln!("  --vpp <name>             VPP to settle");
    eprintln!("  --month <YYYY-MM>        Month selector");
    eprintln!("  --json-out <path>        Write the full report as JSON");
    eprintln!("  --csv-out <path>         Write per-site rows as CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the report");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Flags override values loaded from the job file.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        job_path: None,
        entities: None,
        events: None,
        vpp: None,
        month: None,
        json_out: None,
        csv_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--job" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --job requires a path argument");
                    process::exit(1);
                }
                cli.job_path = Some(args[i].clone());
            }
            "--entities" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --entities requires a path argument");
                    process::exit(1);
                }
                cli.entities = Some(args[i].clone());
            }
            "--events" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --events requires a path argument");
                    process::exit(1);
                }
                cli.events = Some(args[i].clone());
            }
            "--vpp" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --vpp requires a name argument");
                    process::exit(1);
                }
                cli.vpp = Some(args[i].clone());
            }
            "--month" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --month requires a YYYY-MM argument");
                    process::exit(1);
                }
                cli.month = Some(args[i].clone());
            }
            "--json-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --json-out requires a path argument");
                    process::exit(1);
                }
                cli.json_out = Some(args[i].clone());
            }
            "--csv-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --csv-out requires a path argument");
                    process::exit(1);
                }
                cli.csv_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load the job file first; flags override its values.
    let mut job = if let Some(ref path) = cli.job_path {
        match JobConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        JobConfig::default()
    };

    if let Some(entities) = cli.entities {
        job.input.entities = entities;
    }
    if let Some(events) = cli.events {
        job.input.events = events;
    }
    if let Some(vpp) = cli.vpp {
        job.report.vpp = vpp;
    }
    if let Some(month) = cli.month {
        job.report.month = month;
    }
    if let Some(path) = cli.json_out {
        job.output.json = Some(path);
    }
    if let Some(path) = cli.csv_out {
        job.output.csv = Some(path);
    }

    // Validate
    let errors = job.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Ingest
    let mut registry = Registry::new();
    if let Err(e) = import_entities(Path::new(&job.input.entities), &mut registry) {
        eprintln!("error: failed to read entities: {e}");
        process::exit(1);
    }
    let events = match import_events(Path::new(&job.input.events)) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("error: failed to read events: {e}");
            process::exit(1);
        }
    };
    eprintln!(
        "Loaded {} vpps, {} sites, {} batteries, {} events",
        registry.vpps().len(),
        registry.sites().len(),
        registry.batteries().len(),
        events.len()
    );

    // Settle
    let engine = SettlementEngine::new(&registry);
    let report = match engine.create_report(&events, &job.report.vpp, &job.report.month) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{report}");

    // Export sinks if requested
    if let Some(ref path) = job.output.json {
        if let Err(e) = export_json(&report, Path::new(path)) {
            eprintln!("error: failed to write JSON: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }
    if let Some(ref path) = job.output.csv {
        if let Err(e) = export_csv(&report, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Site rows written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(vpp_settle::api::AppState { registry, events });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(vpp_settle::api::serve(state, addr));
    }
}
