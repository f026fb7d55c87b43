use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use pm2_core::core_api::{Engine, Session};
use pm2_core::field::{FieldKind, StatValue};
use pm2_core::registry::{StatId, definition_for};
use pm2_core::version::FileVersion;
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    EnglishRefine,
    JapaneseRefine,
}

#[derive(Debug, Parser)]
#[command(version, about = "Inspect and edit Princess Maker 2 save files")]
struct Cli {
    #[arg(value_name = "SAVE.DAT")]
    path: PathBuf,
    /// Save variant; defaults to English Refine.
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,
    /// Print one stat by key (repeatable); without --get, all stats print.
    #[arg(long = "get", value_name = "STAT")]
    get: Vec<String>,
    /// Edit one stat (repeatable); requires --output.
    #[arg(long = "set", value_name = "STAT=VALUE")]
    set: Vec<String>,
    /// Also print the checksum the file would carry when saved.
    #[arg(long)]
    checksum: bool,
    #[arg(long)]
    json: bool,
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if !cli.set.is_empty() && cli.output.is_none() {
        eprintln!("--set requires --output <PATH>");
        process::exit(2);
    }
    if cli.set.is_empty() && cli.output.is_some() {
        eprintln!("--output requires at least one --set");
        process::exit(2);
    }

    let hint = cli.variant.map(to_core_version);

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let engine = Engine::new();
    let mut session = engine.open_bytes(bytes, hint).unwrap_or_else(|e| {
        eprintln!("Error loading save file {}: {e}", cli.path.display());
        process::exit(1);
    });

    for edit in &cli.set {
        apply_edit(&mut session, edit).unwrap_or_else(|e| {
            eprintln!("Error applying edit '{edit}': {e}");
            process::exit(1);
        });
    }

    let selection = resolve_selection(&cli);

    if cli.json {
        print_json(&session, &selection, cli.checksum);
    } else {
        print_fields(&session, &selection, cli.checksum);
    }

    if let Some(output) = &cli.output {
        let image = session.save_bytes().unwrap_or_else(|e| {
            eprintln!("Error preparing save image: {e}");
            process::exit(1);
        });
        fs::write(output, image).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", output.display());
            process::exit(1);
        });
    }
}

fn resolve_selection(cli: &Cli) -> Vec<StatId> {
    if !cli.get.is_empty() {
        return cli
            .get
            .iter()
            .map(|key| {
                StatId::from_key(key).unwrap_or_else(|| {
                    eprintln!("Unknown stat '{key}'");
                    process::exit(2);
                })
            })
            .collect();
    }
    if cli.set.is_empty() && !cli.checksum {
        return StatId::ALL.to_vec();
    }
    Vec::new()
}

fn apply_edit(session: &mut Session, spec: &str) -> Result<(), String> {
    let Some((key, raw)) = spec.split_once('=') else {
        return Err("expected STAT=VALUE".to_string());
    };
    let stat = StatId::from_key(key).ok_or_else(|| format!("unknown stat '{key}'"))?;
    let def = definition_for(stat).ok_or_else(|| format!("no field table entry for '{key}'"))?;

    let result = match def.kind {
        FieldKind::Int { .. } => {
            let value: i64 = raw
                .parse()
                .map_err(|_| format!("'{raw}' is not an integer"))?;
            session.set_stat_int(stat, value)
        }
        FieldKind::Float { .. } => {
            let value: f64 = raw
                .parse()
                .map_err(|_| format!("'{raw}' is not a number"))?;
            session.set_stat_float(stat, value)
        }
        FieldKind::Text => session.set_stat_text(stat, raw),
    };
    result.map_err(|e| e.to_string())
}

fn print_fields(session: &Session, selection: &[StatId], checksum: bool) {
    for &stat in selection {
        match session.stat_value(stat) {
            Ok(value) => println!("{}={value}", stat.key()),
            Err(e) => {
                eprintln!("Error reading {}: {e}", stat.key());
                process::exit(1);
            }
        }
    }
    if checksum {
        println!("checksum=0x{:08X}", session.checksum());
    }
}

fn print_json(session: &Session, selection: &[StatId], checksum: bool) {
    let mut out = JsonMap::new();
    out.insert(
        "variant".to_string(),
        JsonValue::String(session.version().to_string()),
    );
    for &stat in selection {
        let value = session.stat_value(stat).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", stat.key());
            process::exit(1);
        });
        out.insert(stat.key().to_string(), stat_value_to_json(value));
    }
    if checksum {
        out.insert(
            "checksum".to_string(),
            JsonValue::from(session.checksum() as u64),
        );
    }
    println!("{}", JsonValue::Object(out));
}

fn stat_value_to_json(value: StatValue) -> JsonValue {
    match value {
        StatValue::Int(v) => JsonValue::from(v),
        StatValue::Float(v) => JsonValue::from(v),
        StatValue::Text(v) => JsonValue::String(v),
    }
}

fn to_core_version(variant: VariantArg) -> FileVersion {
    match variant {
        VariantArg::EnglishRefine => FileVersion::EnglishRefine,
        VariantArg::JapaneseRefine => FileVersion::JapaneseRefine,
    }
}
