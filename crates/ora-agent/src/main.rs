use anyhow::Result;
use clap::{value_parser, Arg, Command};
use ora_core::{
    AuditCollector, DecisionEngine, DeployTarget, DiagnosticCollector, FeatureFlags, Orchestrator,
    OrchestratorConfig, OutcomeVerifier, RemediationExecutor, RetryPolicy,
};
use ora_tools::{ClusterClient, ClusterConfig, ForgeClient, ForgeConfig, LogStoreClient, LogStoreConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod ingest;
mod metrics;
mod routes;
mod server;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("ora-agent")
        .version("0.1.0")
        .about("ORA - Operational Remediation Agent")
        .arg_required_else_help(false)
        .subcommand(
            Command::new("serve")
                .about("Run the webhook server")
                .arg(
                    Arg::new("addr")
                        .long("addr")
                        .default_value(DEFAULT_ADDR)
                        .help("Listen address"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Dry-run the decision engine on an analysis string")
                .arg(
                    Arg::new("analysis")
                        .long("analysis")
                        .required(true)
                        .help("Analysis text to classify"),
                )
                .arg(
                    Arg::new("retries")
                        .long("retries")
                        .default_value("0")
                        .value_parser(value_parser!(u32))
                        .help("Prior retry count"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("plan", args)) => {
            let analysis = args.get_one::<String>("analysis").expect("required arg");
            let retries = *args.get_one::<u32>("retries").expect("defaulted arg");

            let plan = DecisionEngine::new().decide(analysis, retries);
            println!("action:     {}", plan.action);
            println!("confidence: {:.2}", plan.confidence);
            println!("reasoning:  {}", plan.reasoning);
            Ok(())
        }
        Some(("serve", args)) => {
            let addr = args.get_one::<String>("addr").expect("defaulted arg").clone();
            server::run(&addr, build_state()?).await
        }
        _ => server::run(DEFAULT_ADDR, build_state()?).await,
    }
}

/// Wire the orchestrator from environment-sourced configuration
fn build_state() -> Result<server::AppState> {
    let flags = FeatureFlags::from_env();
    let target = DeployTarget::from_env();
    let retry_policy = retry_policy_from_env();

    let logs = Arc::new(LogStoreClient::new(LogStoreConfig::from_env())?);
    let forge = Arc::new(ForgeClient::new(ForgeConfig::from_env())?);
    let cluster = Arc::new(ClusterClient::new(ClusterConfig::from_env())?);

    let orchestrator = Orchestrator::new(
        DiagnosticCollector::new(logs),
        AuditCollector::new(forge.clone()),
        DecisionEngine::new(),
        RemediationExecutor::new(cluster, forge, target),
        OutcomeVerifier::new(),
    )
    .with_config(OrchestratorConfig::new().with_retry_policy(retry_policy));

    Ok(server::AppState::new(orchestrator, flags))
}

fn retry_policy_from_env() -> RetryPolicy {
    match std::env::var("ORA_RETRY_POLICY").ok().as_deref() {
        Some("recollect") => RetryPolicy::Recollect,
        _ => RetryPolicy::Reassess,
    }
}
