use std::env;
use std::process;

use chrono::NaiveDate;
use fount::{CodeBuilder, EmailBuilder, GenError, Generator, IdentifierBuilder};
use serde_json::json;

fn print_help() {
    eprintln!(
        "fount - synthetic test data CLI\n\n\
Usage:\n  fount mail [--domain <d>]... [--seed <n>] [--count <n>] [--json] <part>...\n  fount code [--length <n>] [--seed <n>] [--count <n>] [--json]\n  fount id [--date YYYY-MM-DD] [--sep <c>] [--seed <n>] [--count <n>] [--json]\n  fount int --min <a> --max <b> [--seed <n>] [--count <n>] [--json]\n  fount help\n"
    );
}

struct CommonOpts {
    seed: Option<u64>,
    count: usize,
    json: bool,
}

impl Default for CommonOpts {
    fn default() -> Self {
        Self {
            seed: None,
            count: 1,
            json: false,
        }
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let raw = value.ok_or_else(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| format!("{flag} got an invalid value: {raw}"))
}

fn emit(kind: &str, value: &str, json: bool) {
    if json {
        println!("{}", json!({ "kind": kind, "value": value }));
    } else {
        println!("{value}");
    }
}

fn cmd_mail(args: &[String]) -> Result<(), String> {
    let mut opts = CommonOpts::default();
    let mut domains: Vec<String> = Vec::new();
    let mut parts: Vec<String> = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--domain" => domains.push(parse_value("--domain", iter.next())?),
            "--seed" => opts.seed = Some(parse_value("--seed", iter.next())?),
            "--count" => opts.count = parse_value("--count", iter.next())?,
            "--json" => opts.json = true,
            other if other.starts_with("--") => return Err(format!("unknown flag: {other}")),
            part => parts.push(part.to_string()),
        }
    }
    if domains.is_empty() {
        domains = fount::DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect();
    }
    let builder = match opts.seed {
        Some(seed) => EmailBuilder::with_domains_seeded(domains, seed),
        None => EmailBuilder::with_domains(domains),
    }
    .map_err(|e| e.to_string())?;
    let part_refs: Vec<&str> = parts.iter().map(|p| p.as_str()).collect();
    for _ in 0..opts.count {
        let mail = builder.mail(&part_refs).map_err(|e| e.to_string())?;
        emit("mail", &mail, opts.json);
    }
    Ok(())
}

fn cmd_code(args: &[String]) -> Result<(), String> {
    let mut opts = CommonOpts::default();
    let mut length = fount::DEFAULT_CODE_LENGTH;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--length" => length = parse_value("--length", iter.next())?,
            "--seed" => opts.seed = Some(parse_value("--seed", iter.next())?),
            "--count" => opts.count = parse_value("--count", iter.next())?,
            "--json" => opts.json = true,
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    let builder = match opts.seed {
        Some(seed) => CodeBuilder::seeded(seed),
        None => CodeBuilder::new(),
    };
    for _ in 0..opts.count {
        let code = builder.code_of_length(length).map_err(|e| e.to_string())?;
        emit("code", &code, opts.json);
    }
    Ok(())
}

fn cmd_id(args: &[String]) -> Result<(), String> {
    let mut opts = CommonOpts::default();
    let mut date: Option<NaiveDate> = None;
    let mut separator: Option<char> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--date" => date = Some(parse_value("--date", iter.next())?),
            "--sep" => separator = Some(parse_value("--sep", iter.next())?),
            "--seed" => opts.seed = Some(parse_value("--seed", iter.next())?),
            "--count" => opts.count = parse_value("--count", iter.next())?,
            "--json" => opts.json = true,
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    let mut builder = match opts.seed {
        Some(seed) => IdentifierBuilder::seeded(seed),
        None => IdentifierBuilder::new(),
    };
    if let Some(sep) = separator {
        builder = builder.with_separator(sep);
    }
    for _ in 0..opts.count {
        let id = match date {
            Some(date) => builder.identifier_for(date),
            None => builder.identifier(),
        }
        .map_err(|e| e.to_string())?;
        emit("id", &id, opts.json);
    }
    Ok(())
}

fn cmd_int(args: &[String]) -> Result<(), String> {
    let mut opts = CommonOpts::default();
    let mut min: Option<i64> = None;
    let mut max: Option<i64> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--min" => min = Some(parse_value("--min", iter.next())?),
            "--max" => max = Some(parse_value("--max", iter.next())?),
            "--seed" => opts.seed = Some(parse_value("--seed", iter.next())?),
            "--count" => opts.count = parse_value("--count", iter.next())?,
            "--json" => opts.json = true,
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    let min = min.ok_or("--min is required")?;
    let max = max.ok_or("--max is required")?;
    let emit_all = |values: Result<Vec<i64>, GenError>| -> Result<(), String> {
        for v in values.map_err(|e| e.to_string())? {
            emit("int", &v.to_string(), opts.json);
        }
        Ok(())
    };
    match opts.seed {
        Some(seed) => {
            let mut values = fount::longs_seeded(min, max, seed).map_err(|e| e.to_string())?;
            emit_all(values.take(opts.count))
        }
        None => {
            let mut values = fount::longs(min, max).map_err(|e| e.to_string())?;
            emit_all(values.take(opts.count))
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        process::exit(2);
    }
    let result = match args[0].as_str() {
        "mail" => cmd_mail(&args[1..]),
        "code" => cmd_code(&args[1..]),
        "id" => cmd_id(&args[1..]),
        "int" => cmd_int(&args[1..]),
        "help" | "--help" | "-h" => {
            print_help();
            return;
        }
        other => {
            eprintln!("unknown command: {other}");
            print_help();
            process::exit(2);
        }
    };
    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}
