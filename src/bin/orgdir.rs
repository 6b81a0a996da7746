//! Organization directory CLI (orgdir) - Main binary entry point

use orgdir::cli::args::{Command, ImportArgs, LinkArgs, TreeArgs, ViewArgs, parse_args};
use orgdir::cli::output::{format_json, format_rows, format_view_text};
use orgdir::io::cache::{CacheStore, Expiry, TREE_EXPANSION_CACHE_KEY};
use orgdir::io::snapshot::{read_snapshot, write_snapshot};
use orgdir::io::source::{
    DirectorySource, EnvToken, JsonFileSource, SessionToken, load_directory,
};
use orgdir::io::store::{FileStore, KeyValueStore, MemoryStore};
use orgdir::models::{ALL_COMPANIES, OrgField, SnapshotMeta};
use orgdir::services::aggregate::{SortBy, aggregate_counts, direct_counts};
use orgdir::services::filter::filter_tree;
use orgdir::services::links::{LinkKind, LinkLauncher, deep_link, launch};
use orgdir::services::tree::{all_ids, build_tree, root_ids};
use orgdir::{Action, Directory, Error, SyncOptions, ViewSynchronizer};
use std::collections::HashSet;
use std::process;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

const TOKEN_VAR: &str = "ORGDIR_TOKEN";

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug orgdir view org.parquet
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = match &cli_args.command {
        Command::Import(import_args) => handle_import(import_args),
        Command::View(view_args) => handle_view(view_args),
        Command::Tree(tree_args) => handle_tree(tree_args),
        Command::Link(link_args) => handle_link(link_args),
    };

    process::exit(exit_code);
}

fn exit_code(err: &Error) -> i32 {
    match err {
        Error::InvalidInput(_) | Error::Parse(_) | Error::Auth(_) => 2,
        Error::Io(_) | Error::Snapshot(_) => 4,
    }
}

fn handle_import(args: &ImportArgs) -> i32 {
    let snapshot_path = if let Some(ref path) = args.snapshot {
        path.clone()
    } else {
        eprintln!("Error: --snapshot is required for import command");
        eprintln!("Example: orgdir import directory.json --snapshot org.parquet");
        return 2;
    };

    let raw = match JsonFileSource::new(&args.input).fetch("") {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code(&e);
        }
    };
    let directory = Directory::ingest(raw);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let meta = SnapshotMeta {
        source: args.input.clone(),
        exported_at: exported_at.to_string(),
        org_count: directory.orgs().len() as u64,
        employee_count: directory.employees().len() as u64,
    };

    if let Err(e) = write_snapshot(&snapshot_path, &meta, &directory) {
        eprintln!("Error: Failed to save snapshot: {e}");
        return 4;
    }

    if !args.quiet {
        eprintln!(
            "Snapshot saved: {} ({} orgs, {} employees)",
            snapshot_path, meta.org_count, meta.employee_count
        );
    }
    0
}

fn handle_view(args: &ViewArgs) -> i32 {
    let sort_by = match SortBy::from_str(&args.sort) {
        Ok(sort_by) => sort_by,
        Err(_) => {
            eprintln!("Invalid sort: {}. Use 'sort', 'name' or 'count'", args.sort);
            return 2;
        }
    };

    match &args.state {
        Some(path) => match FileStore::open(path) {
            Ok(store) => run_view(args, store, sort_by),
            Err(e) => {
                eprintln!("Error opening state file {path}: {e}");
                4
            }
        },
        None => run_view(args, MemoryStore::new(), sort_by),
    }
}

fn run_view<S: KeyValueStore>(args: &ViewArgs, store: S, sort_by: SortBy) -> i32 {
    let mut cache = CacheStore::new(store);
    let loaded = if args.source.ends_with(".json") {
        let mut token = SessionToken::new(EnvToken::new(TOKEN_VAR).with_fallback("local"));
        load_directory(&JsonFileSource::new(&args.source), &mut token, &mut cache)
    } else {
        read_snapshot(&args.source)
            .map(|(_, directory)| directory)
            .map_err(|e| Error::Snapshot(format!("{}: {e}", args.source)))
    };

    let mut sync = ViewSynchronizer::with_cache(cache, SyncOptions::default());
    let token = sync.liveness();
    match loaded {
        Ok(directory) => {
            sync.on_data_loaded(&token, directory, args.user.as_deref());
        }
        Err(e) => {
            sync.on_load_failed(&token, e.to_string());
            eprintln!("Error: {e}");
            return exit_code(&e);
        }
    }

    if let Some(code) = &args.company {
        sync.dispatch(Action::SetCompany(code.clone()));
    }
    if let Some(org_id) = &args.org {
        sync.dispatch(Action::SelectOrg(org_id.clone()));
    }
    if let Some(term) = &args.dept {
        sync.dispatch(Action::SetTreeSearchCategory("dept".to_string()));
        sync.dispatch(Action::SetTreeSearchTerm(term.clone()));
        sync.dispatch(Action::TriggerTreeSearch);
    }
    if let Some((category, term)) = &args.search {
        sync.dispatch(Action::Search {
            category: category.clone(),
            term: term.clone(),
        });
    }
    for emp_id in &args.checks {
        sync.dispatch(Action::ToggleCheck(emp_id.clone()));
    }

    if args.json {
        println!("{}", format_json(&sync, sort_by, args.top));
    } else {
        print!("{}", format_view_text(&sync, sort_by, args.top));
    }
    sync.unmount();
    0
}

fn handle_tree(args: &TreeArgs) -> i32 {
    match &args.state {
        Some(path) => match FileStore::open(path) {
            Ok(store) => run_tree(args, store),
            Err(e) => {
                eprintln!("Error opening state file {path}: {e}");
                4
            }
        },
        None => run_tree(args, MemoryStore::new()),
    }
}

fn run_tree<S: KeyValueStore>(args: &TreeArgs, store: S) -> i32 {
    let directory = match read_snapshot(&args.snapshot) {
        Ok((_, directory)) => directory,
        Err(e) => {
            eprintln!("Error reading snapshot: {e}");
            return 4;
        }
    };

    let partition = Some(args.company.as_deref().unwrap_or(ALL_COMPANIES));
    let forest = build_tree(directory.orgs(), partition);
    let counts = aggregate_counts(&forest, &direct_counts(directory.employees(), partition));

    let mut cache = CacheStore::new(store);
    let mut expanded: HashSet<String> = cache
        .get::<Vec<String>>(TREE_EXPANSION_CACHE_KEY, Expiry::Never)
        .map_or_else(|| root_ids(&forest), |ids| ids.into_iter().collect());
    expanded.extend(args.expand.iter().cloned());
    for org_id in &args.collapse {
        expanded.remove(org_id);
    }

    let mut saved: Vec<&String> = expanded.iter().collect();
    saved.sort();
    cache.set(TREE_EXPANSION_CACHE_KEY, &saved);

    let rows_text = match args.dept.as_deref().filter(|term| !term.trim().is_empty()) {
        Some(term) => {
            let filtered = filter_tree(&forest, term, Some(&[OrgField::OrgName, OrgField::OrgId][..]));
            format_rows(&filtered.visible_rows(&all_ids(&filtered)), &counts)
        }
        None => format_rows(&forest.visible_rows(&expanded), &counts),
    };

    if rows_text.is_empty() {
        println!("No organizations found.");
    } else {
        print!("{rows_text}");
    }
    0
}

/// The terminal stands in for both the host application and the browser.
struct TerminalLauncher;

impl LinkLauncher for TerminalLauncher {
    fn open_in_host(&self, url: &str) -> std::io::Result<()> {
        println!("{url}");
        Ok(())
    }

    fn open_window(&self, url: &str) -> std::io::Result<()> {
        println!("{url}");
        Ok(())
    }
}

fn handle_link(args: &LinkArgs) -> i32 {
    let kind = match LinkKind::from_str(&args.kind) {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("Error: {e}. Use chat, call, meeting or mail");
            return 2;
        }
    };

    let link = match deep_link(kind, &args.emails) {
        Ok(link) => link,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code(&e);
        }
    };

    if let Err(e) = launch(&TerminalLauncher, &link) {
        eprintln!("Error: Failed to open link: {e}");
        return 4;
    }
    0
}

fn print_help() {
    println!("Organization directory CLI (orgdir) - Browse a company hierarchy and its people");
    println!();
    println!("USAGE:");
    println!("    orgdir import <DIRECTORY_JSON> --snapshot <FILE> [OPTIONS]");
    println!("    orgdir view <SNAPSHOT|DIRECTORY_JSON> [OPTIONS]");
    println!("    orgdir tree <SNAPSHOT> [OPTIONS]");
    println!("    orgdir link <chat|call|meeting|mail> <EMAIL>...");
    println!();
    println!("COMMANDS:");
    println!("    import    Enrich a directory export and persist it as a Parquet snapshot");
    println!("    view      Restore the saved view, apply options, and print tree and employees");
    println!("    tree      Print the org tree with a persistent expansion state");
    println!("    link      Build a chat, call, meeting or mail link for the given people");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help                 Show this help message");
    println!("    -v, --version              Show version information");
    println!();
    println!("IMPORT OPTIONS:");
    println!("    --snapshot <FILE>         Save the directory to a Parquet snapshot (required)");
    println!("    --quiet                   Suppress non-error output");
    println!();
    println!("VIEW OPTIONS:");
    println!("    --state <FILE>            Persist view state (and cached JSON directories) here");
    println!("    --user <EMAIL>            Current user; their org is selected by default");
    println!("    --company <CODE>          Switch company partition (ALL for every company)");
    println!("    --org <ID>                Browse an organization and its descendants");
    println!("    --search <CAT:TERM>       Search employees (user|dept|extension|mobile|");
    println!("                              position|jobTitle|email|all)");
    println!("    --dept <TERM>             Filter the tree by department name or id");
    println!("    --check <ID>              Toggle an employee's check mark (repeatable)");
    println!("    --sort <FIELD>            Order siblings by sort|name|count (default: sort)");
    println!("    --top <K>                 Show at most K children per expanded org");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("TREE OPTIONS:");
    println!("    --state <FILE>            Persist the expansion state here");
    println!("    --company <CODE>          Company partition (default: ALL)");
    println!("    --expand <ID>             Expand an organization (repeatable)");
    println!("    --collapse <ID>           Collapse an organization (repeatable)");
    println!("    --dept <TERM>             Show only matching orgs and their ancestors");
    println!();
    println!("ENVIRONMENT:");
    println!("    {TOKEN_VAR}              Credential passed to the directory source");
    println!("    RUST_LOG                  Log filter, e.g. debug");
    println!();
    println!("EXAMPLES:");
    println!("    orgdir import export.json --snapshot org.parquet");
    println!("    orgdir view org.parquet --state ui.json --user kim@example.com");
    println!("    orgdir view org.parquet --state ui.json --search user:Kim --check e1");
    println!("    orgdir link chat kim@example.com lee@example.com");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_DATE: &str = env!("GIT_DATE");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("orgdir {VERSION}");
    println!("Commit: {GIT_HASH} ({GIT_DATE})");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
