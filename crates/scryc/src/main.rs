//! Scry CLI
//!
//! Source map tools and structural diffs of parsed script versions.

use scryc::commands::{
    debug_map, decode_map, diff_trees, discover_map, lookup, parse_matcher_options, read_file,
    rebase_maps, source_ranges, CommandError,
};
use scryc::tracing_setup::init_tracing;

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let rest = &args[2..];

    let result = match command.as_str() {
        "decode" => {
            let [map] = required::<1>(rest, "scry decode <map.json>");
            read_file(map).and_then(|json| decode_map(&json))
        }
        "lookup" => {
            let reverse = rest.iter().any(|arg| arg == "--reverse");
            let positional: Vec<&String> = rest.iter().filter(|arg| *arg != "--reverse").collect();
            let usage = "scry lookup <map.json> <line> <column> [--reverse]";
            let [map, line, column] = match positional.as_slice() {
                [map, line, column] => [*map, *line, *column],
                _ => usage_error(usage),
            };
            let (Ok(line), Ok(column)) = (line.parse::<u32>(), column.parse::<u32>()) else {
                eprintln!("error: line and column must be non-negative integers");
                usage_error(usage)
            };
            read_file(map).and_then(|json| lookup(&json, line, column, reverse))
        }
        "rebase" => {
            let [first, next] = required::<2>(rest, "scry rebase <first.map> <next.map>");
            read_file(first).and_then(|first| {
                let next = read_file(next)?;
                rebase_maps(&first, &next)
            })
        }
        "ranges" => {
            let [map, script] = required::<2>(rest, "scry ranges <map.json> <script.js>");
            read_file(map).and_then(|json| {
                let text = read_file(script)?;
                source_ranges(&json, &text)
            })
        }
        "debug-map" => run_debug_map(rest),
        "discover" => {
            let [script] = required::<1>(rest, "scry discover <script.js>");
            read_file(script).and_then(|text| discover_map(&text))
        }
        "diff" => run_diff(rest),
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-v" => {
            println!("scry {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

fn run_debug_map(args: &[String]) -> Result<String, CommandError> {
    let usage = "scry debug-map <url> <script.js> <operations.json> [--map=<map.json>]";
    let mut map_path = None;
    let mut positional = Vec::new();
    for arg in args {
        if let Some(path) = arg.strip_prefix("--map=") {
            map_path = Some(path);
        } else if arg.starts_with("--") {
            return Err(CommandError::UnknownOption(arg.clone()));
        } else {
            positional.push(arg.as_str());
        }
    }
    let [url, script, operations] = match positional.as_slice() {
        [url, script, operations] => [*url, *script, *operations],
        _ => usage_error(usage),
    };
    let content = read_file(script)?;
    let operations = read_file(operations)?;
    let original_map = map_path.map(read_file).transpose()?;
    debug_map(url, &content, &operations, original_map.as_deref())
}

fn run_diff(args: &[String]) -> Result<String, CommandError> {
    let (config, positional) = parse_matcher_options(args)?;
    let [old, new] = match positional.as_slice() {
        [old, new] => [*old, *new],
        _ => usage_error("scry diff <old.estree.json> <new.estree.json> [options]"),
    };
    let old = read_file(old)?;
    let new = read_file(new)?;
    diff_trees(&old, &new, &config)
}

/// Exactly `N` positional arguments, or exit with `usage`.
fn required<'a, const N: usize>(args: &'a [String], usage: &str) -> [&'a str; N] {
    let positional: Vec<&str> = args.iter().map(String::as_str).collect();
    match <[&str; N]>::try_from(positional) {
        Ok(values) => values,
        Err(_) => usage_error(usage),
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: {usage}");
    std::process::exit(1);
}

fn print_usage() {
    println!("scry - statement identity tools for deployed scripts");
    println!();
    println!("Usage: scry <command> [options]");
    println!();
    println!("Commands:");
    println!("  decode <map.json>                       List every mapping of a source map");
    println!("  lookup <map.json> <line> <column>       Translate a generated position (0-based)");
    println!("  rebase <first.map> <next.map>           Compose two maps (next maps onto first's output)");
    println!("  ranges <map.json> <script.js>           Byte ranges of the script per mapping");
    println!("  debug-map <url> <script> <ops.json>     Source map for an instrumented script");
    println!("  discover <script.js>                    Show the script's sourceMappingURL target");
    println!("  diff <old.json> <new.json>              Match two ESTree documents by structure");
    println!("  help                                    Show this help message");
    println!("  version                                 Show version information");
    println!();
    println!("Lookup options:");
    println!("  --reverse              Translate a position in source 0 to the generated file");
    println!();
    println!("Debug-map options:");
    println!("  --map=<map.json>       The script's own map, to point at original sources");
    println!();
    println!("Diff options:");
    println!("  --strict               Require closer matches (min Dice 0.75)");
    println!("  --fast                 Skip child alignment and single-leaf anchors");
    println!("  --min-dice=<0..1>      Minimum descendant overlap for bottom-up pairs");
    println!("  --min-height=<n>       Smallest subtree height matched top-down");
    println!("  --max-recovery-size=<n> Largest subtree aligned child by child");
    println!();
    println!("Logging:");
    println!("  SCRY_LOG=scry_tree=debug scry diff old.json new.json");
}
