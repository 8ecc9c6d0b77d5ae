use gitmimic::config::Config;
use gitmimic::findings::{Finding, SecurityVerdict, SeverityCounts};
use gitmimic::security::SecurityAuditor;
use gitmimic::template::{TemplateDocument, TemplateValidator};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Serialize)]
struct Report<'a> {
    findings: &'a [Finding],
    verdict: SecurityVerdict,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut json = false;
    let mut config_path: Option<String> = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => config_path = iter.next().cloned(),
            other => positional.push(other.to_string()),
        }
    }

    let [command, dir] = positional.as_slice() else {
        eprintln!("usage: gitmimic check <template-dir> [--config <file>] [--json]");
        process::exit(2);
    };

    if command != "check" {
        eprintln!("unknown command: {}", command);
        process::exit(2);
    }

    let config = match config_path {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        },
        None => Config::default_config(),
    };

    let mut paths = Vec::new();
    if let Err(e) = collect_markdown(Path::new(dir), &mut paths) {
        eprintln!("Error: {}", e);
        process::exit(2);
    }
    paths.sort();

    let mut docs = Vec::new();
    for path in &paths {
        match TemplateDocument::load(path) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        }
    }

    let validator = TemplateValidator::from_config(&config);
    let mut findings = validator.validate_batch(&docs);

    let mut auditor = SecurityAuditor::from_config(&config);
    for doc in &docs {
        findings.extend(auditor.audit_document(doc));
    }

    let counts = SeverityCounts::from_findings(&findings);
    let verdict = SecurityVerdict::from_counts(counts);

    if json {
        let report = Report {
            findings: &findings,
            verdict,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        }
    } else {
        for finding in &findings {
            println!("{}", finding);
        }
        println!(
            "{} documents, {} findings (critical: {}, high: {}, medium: {}, low: {}, info: {}), status: {}",
            docs.len(),
            counts.total(),
            counts.critical,
            counts.high,
            counts.medium,
            counts.low,
            counts.info,
            verdict.status
        );
    }

    process::exit(verdict.exit_code());
}

/// Collect every `.md` file under `dir`, recursively
fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            out.push(path);
        }
    }
    Ok(())
}
