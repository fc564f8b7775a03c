//! CLI mínima:
//!
//! ```text
//! chemreport resolve <nombre> [--ip <IP>] [--ua <UA>] [--json]
//! chemreport stats  [--limit <N>] [--json]
//! chemreport recent [--limit <N>] [--json]
//! chemreport migrate
//! ```

use std::io::Write;

use serde_json::json;

use chem_core::constants::{DEFAULT_RECENT_LIMIT, DEFAULT_STATISTICS_LIMIT};
use chem_core::Resolution;
use chem_domain::RequestMeta;

use crate::bootstrap::App;
use crate::errors::AppError;

pub const USAGE: &str = "Uso:
  chemreport resolve <nombre> [--ip <IP>] [--ua <UA>] [--json]
  chemreport stats [--limit <N>] [--json]
  chemreport recent [--limit <N>] [--json]
  chemreport migrate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve { name: String, meta: RequestMeta, json: bool },
    Stats { limit: usize, json: bool },
    Recent { limit: usize, json: bool },
    Migrate,
    Help,
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, AppError> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| AppError::Usage(format!("{flag} requiere un valor")))
}

fn parse_limit(raw: &str) -> Result<usize, AppError> {
    raw.parse::<usize>()
       .ok()
       .filter(|n| *n > 0)
       .ok_or_else(|| AppError::Usage(format!("--limit inválido: {raw:?}")))
}

/// Parsea los argumentos (sin el nombre del binario).
pub fn parse_args(args: &[String]) -> Result<Command, AppError> {
    let Some(sub) = args.first() else {
        return Ok(Command::Help);
    };
    let mut json = false;
    let mut limit = None;
    let mut ip = None;
    let mut ua = None;
    let mut words: Vec<&str> = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => json = true,
            "--limit" => limit = Some(parse_limit(take_value(args, &mut i, "--limit")?)?),
            "--ip" => ip = Some(take_value(args, &mut i, "--ip")?),
            "--ua" => ua = Some(take_value(args, &mut i, "--ua")?),
            other if other.starts_with("--") => return Err(AppError::Usage(format!("opción desconocida: {other}"))),
            word => words.push(word),
        }
        i += 1;
    }
    match sub.as_str() {
        "resolve" => {
            if words.is_empty() {
                return Err(AppError::Usage("resolve requiere un nombre de sustancia".into()));
            }
            Ok(Command::Resolve { name: words.join(" "),
                                  meta: RequestMeta::new(ip, ua),
                                  json })
        }
        "stats" => Ok(Command::Stats { limit: limit.unwrap_or(DEFAULT_STATISTICS_LIMIT), json }),
        "recent" => Ok(Command::Recent { limit: limit.unwrap_or(DEFAULT_RECENT_LIMIT), json }),
        "migrate" => Ok(Command::Migrate),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(AppError::Usage(format!("comando desconocido: {other}"))),
    }
}

pub fn render_resolution(res: &Resolution, json: bool, out: &mut dyn Write) -> Result<(), AppError> {
    if json {
        let value = json!({
            "substance": res.substance_key.as_str(),
            "responseSource": res.source,
            "wasCached": res.was_cached,
            "processingTimeMs": res.processing_time_ms,
            "contentHash": res.report.content_hash(),
            "products": res.report.products(),
            "references": res.report.references(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }
    writeln!(out,
             "{} | fonte={} cache={} tempo={}ms hash={}",
             res.substance_key,
             res.source,
             res.was_cached,
             res.processing_time_ms,
             &res.report.content_hash()[..12])?;
    writeln!(out, "Produtos de degradação ({}):", res.report.products().len())?;
    for (n, p) in res.report.products().iter().enumerate() {
        writeln!(out, "  {}. {}", n + 1, p.substance())?;
        writeln!(out, "     via: {}", p.degradation_route())?;
        writeln!(out, "     condições: {}", p.environmental_conditions())?;
        writeln!(out, "     toxicidade: {}", p.toxicity_data())?;
    }
    writeln!(out, "Referências ({}):", res.report.references().len())?;
    for (n, r) in res.report.references().iter().enumerate() {
        writeln!(out, "  [{}] {r}", n + 1)?;
    }
    Ok(())
}

/// Ejecuta un comando que necesita la aplicación ensamblada.
pub async fn run(cmd: Command, app: &App, out: &mut dyn Write) -> Result<(), AppError> {
    match cmd {
        Command::Resolve { name, meta, json } => {
            let res = app.orchestrator.resolve(&name, &meta).await;
            render_resolution(&res, json, out)
        }
        Command::Stats { limit, json } => {
            let stats = app.analytics.search_statistics(limit).await?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                return Ok(());
            }
            writeln!(out, "{:<32} {:>8} {:>8}  último", "substância", "buscas", "usuários")?;
            for s in &stats {
                let last = s.last_searched.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".into());
                writeln!(out, "{:<32} {:>8} {:>8}  {last}", s.substance_name, s.search_count, s.unique_users)?;
            }
            Ok(())
        }
        Command::Recent { limit, json } => {
            let recent = app.analytics.recent_searches(limit).await?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&recent)?)?;
                return Ok(());
            }
            for r in &recent {
                writeln!(out,
                         "{}  {:<24} {:<24} {}",
                         r.search_timestamp.to_rfc3339(),
                         r.substance_name,
                         r.search_term,
                         r.user_ip.as_deref().unwrap_or("-"))?;
            }
            Ok(())
        }
        Command::Help => {
            writeln!(out, "{USAGE}")?;
            Ok(())
        }
        Command::Migrate => Err(AppError::Usage("migrate se ejecuta sin ensamblar la aplicación".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_joins_words_and_reads_meta() {
        let cmd = parse_args(&args(&["resolve", "Ácido", "acetilsalicílico", "--ip", "10.0.0.1", "--json"])).unwrap();
        assert_eq!(cmd,
                   Command::Resolve { name: "Ácido acetilsalicílico".into(),
                                      meta: RequestMeta::new(Some("10.0.0.1"), None),
                                      json: true });
    }

    #[test]
    fn listing_commands_use_default_limits() {
        assert_eq!(parse_args(&args(&["stats"])).unwrap(),
                   Command::Stats { limit: DEFAULT_STATISTICS_LIMIT, json: false });
        assert_eq!(parse_args(&args(&["recent", "--limit", "5"])).unwrap(),
                   Command::Recent { limit: 5, json: false });
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn usage_errors() {
        for bad in [&["resolve"][..], &["stats", "--limit", "0"], &["recent", "--limit"], &["frobnicate"], &["stats", "--x"]] {
            let err = parse_args(&args(bad)).unwrap_err();
            assert!(matches!(err, AppError::Usage(_)), "{bad:?} -> {err:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }
}
