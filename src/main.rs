//! Traffic Pattern Core - Main Entry Point
//!
//! Usage: `traffic-pattern-core [INPUT.json]` (stdin when omitted)
//!
//! Input is either an array of traffic records or an object
//! `{ "records": [...], "threat_events": [...] }`. The report is printed as
//! JSON on stdout. `TRAFFIC_CONFIG` names an optional JSON config file;
//! `TRAFFIC_*` variables override single options.

use std::io::Read;

use serde::Deserialize;

use traffic_pattern_core::constants::{APP_NAME, APP_VERSION};
use traffic_pattern_core::{
    AnalysisContext, AnalysisError, AnalysisInput, AnalyzerConfig, RawTrafficRecord, TrafficAnalyzer,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Records(Vec<RawTrafficRecord>),
    Full(AnalysisInput),
}

impl From<InputDocument> for AnalysisInput {
    fn from(doc: InputDocument) -> Self {
        match doc {
            InputDocument::Records(records) => AnalysisInput {
                records,
                threat_events: Vec::new(),
            },
            InputDocument::Full(input) => input,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => 2,
            CliError::Input(_) => 3,
            CliError::Analysis(AnalysisError::InvalidWindow { .. } | AnalysisError::InvalidConfig(_)) => 4,
            CliError::Analysis(_) => 1,
        }
    }
}

fn read_source(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|source| CliError::Io {
            path: p.to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|source| CliError::Io {
                path: "<stdin>".to_string(),
                source,
            })?;
            Ok(buf)
        }
    }
}

fn load_config() -> Result<AnalyzerConfig, CliError> {
    let base = match std::env::var("TRAFFIC_CONFIG") {
        Ok(path) => {
            log::info!("Loading config from {}", path);
            AnalyzerConfig::from_json(&read_source(Some(path.as_str()))?)?
        }
        Err(_) => AnalyzerConfig::default(),
    };
    Ok(base.overlay_env())
}

fn run() -> Result<(), CliError> {
    let path = std::env::args().nth(1);
    let config = load_config()?;

    let document: InputDocument = serde_json::from_str(&read_source(path.as_deref())?)?;
    let input = AnalysisInput::from(document);
    log::info!(
        "Loaded {} records, {} threat events",
        input.records.len(),
        input.threat_events.len()
    );

    let ctx = AnalysisContext::for_config("cli", &config);
    let analyzer = TrafficAnalyzer::new(config)?;
    let report = analyzer.analyze(input, &ctx)?;

    for w in &report.warnings {
        log::warn!("[{}] {}", w.component, w.message);
    }
    log::info!(
        "Risk {:.2}/10 ({}), {} anomalies, {} correlated findings",
        report.risk_assessment.overall_risk_score,
        report.risk_assessment.threat_class,
        report.anomalies.findings.len(),
        report.correlated_findings.len()
    );

    println!("{}", report.to_json()?);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    if let Err(e) = run() {
        match &e {
            CliError::Analysis(err) => log::error!("[E{}] {}", err.error_code(), err),
            other => log::error!("{}", other),
        }
        std::process::exit(e.exit_code());
    }
}
