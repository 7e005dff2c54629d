use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    Checklist, DashboardView, GenerativeRiskGateway, HttpBackendGateway, IncidentForm,
    IncidentFormView, RiskAuditorView, StandardsView, SubmitPhase, SCENARIO_PRESETS,
};
use shared::domain::{OperativePhase, Severity, StandardId};
use uuid::Uuid;

mod config;

use config::{load_settings, validate_base_url};

#[derive(Parser, Debug)]
#[command(name = "safeor", about = "Operating-room QMS console")]
struct Args {
    /// Overrides the configured QMS backend base URL.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    page: Page,
}

/// The active-page selection. Each invocation drives exactly one view
/// lifecycle; views never share state.
#[derive(Subcommand, Debug)]
enum Page {
    /// Show the live compliance stats snapshot.
    Dashboard,
    /// Browse the standards catalogue, optionally opening one detail pane.
    Standards {
        #[arg(long)]
        select: Option<Uuid>,
    },
    /// Submit a safety incident report.
    Report {
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_enum, default_value = "low")]
        severity: SeverityArg,
        #[arg(long)]
        reported_by: Option<String>,
    },
    /// Score a free-text scenario with the AI risk auditor.
    Analyze {
        scenario: Option<String>,
        /// Use one of the suggested scenario templates instead.
        #[arg(long)]
        preset: Option<usize>,
    },
    /// Walk the local surgical-safety checklist.
    Checklist {
        /// Item ids to toggle before rendering, e.g. --toggle 1 --toggle 4.
        #[arg(long = "toggle")]
        toggles: Vec<String>,
        #[arg(long)]
        finalize: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    let base_url = validate_base_url(&settings.api_base_url)?;
    let timeout = Duration::from_secs(settings.request_timeout_secs);

    match args.page {
        Page::Dashboard => {
            let gateway = HttpBackendGateway::with_timeout(&base_url, timeout)?;
            let mut view = DashboardView::new();
            view.refresh(&gateway).await;
            render_dashboard(&view);
        }
        Page::Standards { select } => {
            let gateway = HttpBackendGateway::with_timeout(&base_url, timeout)?;
            let mut view = StandardsView::new();
            view.load(&gateway).await;
            if let Some(id) = select {
                if !view.select(StandardId(id)) {
                    println!("Standard {id} is not in the catalogue.");
                }
            }
            render_standards(&view);
        }
        Page::Report {
            kind,
            description,
            severity,
            reported_by,
        } => {
            let gateway = HttpBackendGateway::with_timeout(&base_url, timeout)?;
            let view = IncidentFormView::new();
            view.set_form(IncidentForm {
                kind,
                description,
                severity: severity.into(),
                reported_by: reported_by.unwrap_or_default(),
            })
            .await;

            if !view.submit(&gateway).await {
                bail!("incident type and description are required");
            }
            match view.phase().await {
                SubmitPhase::Submitted => {
                    if let Some(report) = view.last_submitted().await {
                        println!(
                            "Incident reported successfully (id {}). Use Dashboard to monitor status.",
                            report.id.0
                        );
                    }
                }
                SubmitPhase::Failed(message) => println!("{message}"),
                _ => {}
            }
            view.teardown().await;
        }
        Page::Analyze { scenario, preset } => {
            let scenario = match (scenario, preset) {
                (Some(text), _) => text,
                (None, Some(index)) => SCENARIO_PRESETS
                    .get(index)
                    .copied()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("preset index out of range"))?,
                (None, None) => bail!("provide a scenario or --preset <n>"),
            };

            let gateway = GenerativeRiskGateway::new(settings.gemini_api_key.clone(), timeout)?
                .with_model(&settings.gemini_model);
            let mut view = RiskAuditorView::new();
            view.set_scenario(scenario);
            view.analyze(&gateway).await;
            render_analysis(&view);
        }
        Page::Checklist { toggles, finalize } => {
            let mut checklist = Checklist::new();
            for id in &toggles {
                if !checklist.toggle(id) {
                    println!("Unknown checklist item id {id}.");
                }
            }
            render_checklist(&checklist);
            if finalize {
                checklist.finalize();
            }
        }
    }

    Ok(())
}

fn render_dashboard(view: &DashboardView) {
    if let Some(message) = view.error() {
        println!("warning: {message}");
    }
    let stats = view.stats();
    println!("Compliance score : {:.1}%", stats.compliance_score);
    println!("Total reports    : {}", stats.total_incidents);
    println!("Active alerts    : {}", stats.open_incidents);
    println!("System status    : {}", stats.system_status);
}

fn render_standards(view: &StandardsView) {
    if let Some(message) = view.error() {
        println!("{message}");
        return;
    }
    if view.standards().is_empty() {
        println!("{}", client_core::standards::EMPTY_LIST_MESSAGE);
        return;
    }

    for standard in view.standards() {
        println!(
            "{}  {} [{}] v{}",
            standard.id.0, standard.title, standard.category, standard.version
        );
    }

    println!();
    match view.selected() {
        Some(standard) => {
            println!("{} (v{})", standard.title, standard.version);
            println!("Category: {}", standard.category);
            println!();
            println!("{}", standard.content);
        }
        None => println!("{}", client_core::standards::NO_SELECTION_PROMPT),
    }
}

fn render_analysis(view: &RiskAuditorView) {
    let Some(result) = view.result() else {
        println!("Enter an OR scenario to see potential risks and remediation steps.");
        return;
    };
    println!("Risk level: {:.0}%", result.risk_score);
    println!("Critical findings:");
    for finding in &result.findings {
        println!("  - {finding}");
    }
    println!("Remediation steps:");
    for step in &result.remediation {
        println!("  - {step}");
    }
}

fn render_checklist(checklist: &Checklist) {
    for phase in [
        OperativePhase::PreOp,
        OperativePhase::IntraOp,
        OperativePhase::PostOp,
    ] {
        println!("{}", phase_label(phase));
        for item in checklist.items_for_phase(phase) {
            let mark = if item.completed { "x" } else { " " };
            println!("  [{mark}] {}. {}", item.id, item.text);
        }
    }
    println!("Overall progress: {}%", checklist.completion_percent());
}

fn phase_label(phase: OperativePhase) -> &'static str {
    match phase {
        OperativePhase::PreOp => "Pre-op",
        OperativePhase::IntraOp => "Intra-op",
        OperativePhase::PostOp => "Post-op",
    }
}
