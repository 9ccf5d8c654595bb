//! Barangay Records CLI
//!
//! Command-line front end for the records screens:
//! - Request and track documents
//! - Review and manage document requests
//! - Submit and review blotter reports
//! - Keep the local blotter log
//! - Edit barangay settings

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use barangay_records::config::{generate_default_config, Config};
use barangay_records::model::{
    DocumentRequest, DocumentStatus, DocumentType, IncidentReport, IncidentStatus,
};
use barangay_records::repository::{
    DocumentRepository, FallbackRepository, LocalRepository, RemoteRepository, ReportRepository,
};
use barangay_records::store::{FileStore, KeyValueStore};
use barangay_records::views::{
    DocumentDesk, DocumentEdit, DocumentRequestForm, LogEntryForm, Lookup, ReportForm, ReportLog,
    ReportReview, RequestTracker, SettingsPanel,
};
use barangay_records::{logging, RecordsClient};

#[derive(Parser)]
#[command(name = "records")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Barangay document requests and blotter reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Records API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Local store directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Request a document
    Request {
        /// Resident's full name
        #[arg(long)]
        name: String,
        /// Document type, by display name (e.g. "Barangay Clearance")
        #[arg(short = 't', long = "type")]
        document_type: DocumentType,
        /// Extra fields in key=value format
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        /// Appointment as YYYY-MM-DDTHH:MM
        #[arg(long)]
        appointment: Option<String>,
        /// Pick the document up at the hall (issues a pickup code)
        #[arg(long)]
        pickup: bool,
    },

    /// Track a request by tracking number
    Track {
        number: String,
    },

    /// Staff: manage document requests
    #[command(subcommand)]
    Documents(DocumentCommands),

    /// Blotter reports
    #[command(subcommand)]
    Reports(ReportCommands),

    /// Local blotter log
    #[command(subcommand)]
    Log(LogCommands),

    /// Barangay settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the effective configuration instead of the template
        #[arg(long)]
        effective: bool,
    },
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// List requests
    List {
        /// Match tracking number or resident name
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<DocumentStatus>,
        #[arg(short = 't', long = "type")]
        document_type: Option<DocumentType>,
    },
    /// Show one request
    Show { id: String },
    /// Change a request's status
    Status { id: String, status: DocumentStatus },
    /// Edit status, resident name, or document type
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 't', long = "type")]
        document_type: Option<DocumentType>,
        #[arg(long)]
        status: Option<DocumentStatus>,
    },
    /// Delete a request
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// List reports
    List {
        /// Only reports awaiting review
        #[arg(long)]
        pending: bool,
        /// Title contains (case-insensitive)
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<IncidentStatus>,
    },
    /// Show one report with reporter details
    Show { id: String },
    /// Submit a report
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        reporter: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        /// Let the reporter's name appear publicly
        #[arg(long)]
        show_reporter: bool,
        /// When it happened (RFC 3339)
        #[arg(long)]
        incident_date: Option<DateTime<Utc>>,
    },
    /// Publish one or more reports
    Publish {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        show_reporter: bool,
    },
    /// Reject a report
    Reject { id: String },
    /// Set a report's status
    Status { id: String, status: IncidentStatus },
    /// Show or hide the reporter of a report
    Visibility {
        id: String,
        #[arg(long, conflicts_with = "hide")]
        show: bool,
        #[arg(long)]
        hide: bool,
    },
    /// Delete one or more reports
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// List log entries
    List,
    /// Add an entry
    Add {
        #[command(flatten)]
        entry: LogEntryArgs,
    },
    /// Edit an entry; unset options keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        entry: LogEntryArgs,
    },
    /// Delete an entry
    Delete { id: String },
}

#[derive(clap::Args)]
pub struct LogEntryArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    complainant: Option<String>,
    #[arg(long)]
    respondent: Option<String>,
    /// Dispute, Theft, Assault, or Disturbance
    #[arg(short = 't', long = "type")]
    incident_type: Option<String>,
    #[arg(long)]
    narrative: Option<String>,
    /// pending, resolved, or investigating
    #[arg(long)]
    status: Option<IncidentStatus>,
}

impl LogEntryArgs {
    fn apply(self, form: &mut LogEntryForm) {
        if let Some(date) = self.date {
            form.date = date;
        }
        if let Some(complainant) = self.complainant {
            form.complainant = complainant;
        }
        if let Some(respondent) = self.respondent {
            form.respondent = respondent;
        }
        if let Some(incident_type) = self.incident_type {
            form.incident_type = incident_type;
        }
        if let Some(narrative) = self.narrative {
            form.narrative = narrative;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
    }
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show settings
    Show,
    /// Set one field (barangay_name, municipality, province)
    Set { field: String, value: String },
}

/// Everything a command needs, built from the effective config
struct App {
    config: Config,
    format: OutputFormat,
    client: RecordsClient,
    store: Arc<dyn KeyValueStore>,
}

impl App {
    fn new(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::load_with_env(path)?,
            None => Config::load_default(),
        };
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &cli.data_dir {
            config.storage.data_dir = dir.to_string_lossy().to_string();
        }

        let client = RecordsClient::new(config.client_config())?;
        let data_dir = config.data_dir();
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&data_dir)
                .with_context(|| format!("Cannot open local store at {:?}", data_dir))?,
        );

        Ok(Self {
            config,
            format: cli.format,
            client,
            store,
        })
    }

    /// Staff screens talk to the backend only
    fn staff_reports(&self) -> Arc<dyn ReportRepository> {
        Arc::new(RemoteRepository::<IncidentReport>::new(self.client.clone()))
    }

    fn staff_documents(&self) -> Arc<dyn DocumentRepository> {
        Arc::new(RemoteRepository::<DocumentRequest>::new(self.client.clone()))
    }

    /// Resident screens fall back to the local store per config
    fn resident_documents(&self) -> Arc<dyn DocumentRepository> {
        Arc::new(
            FallbackRepository::new(
                RemoteRepository::<DocumentRequest>::new(self.client.clone()),
                LocalRepository::<DocumentRequest>::new(Arc::clone(&self.store)),
            )
            .reads(self.config.fallback.reads)
            .writes(self.config.fallback.writes),
        )
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output, effective } = &cli.command {
        return write_config(&cli, output.as_ref(), *effective);
    }

    let ctx = App::new(&cli)?;
    logging::init(&ctx.config.logging);

    match cli.command {
        Commands::Request {
            name,
            document_type,
            fields,
            contact,
            purpose,
            appointment,
            pickup,
        } => {
            let mut form = DocumentRequestForm::new(ctx.resident_documents());
            form.select_type(document_type);
            for field in fields {
                match field.split_once('=') {
                    Some((k, v)) => form.set_field(k.trim(), v.trim()),
                    None => bail!("Invalid field {:?}, expected key=value", field),
                }
            }
            form.draft.resident_name = name;
            form.draft.resident_contact = contact;
            form.draft.purpose = purpose;
            form.draft.appointment_datetime = appointment;
            form.draft.pickup = pickup;

            let submission = form.submit().await?;

            match ctx.format {
                OutputFormat::Json => ctx.print_json(&serde_json::json!({
                    "trackingNumber": submission.tracking_number,
                    "pickupCode": submission.pickup_code,
                    "origin": submission.origin.to_string(),
                    "request": submission.record,
                }))?,
                OutputFormat::Table => {
                    println!("Request submitted.");
                    println!("  Tracking number: {}", submission.tracking_number);
                    if let Some(code) = &submission.pickup_code {
                        println!("  Pickup code:     {}", code);
                    }
                    if submission.is_offline() {
                        println!();
                        println!("The records office could not be reached.");
                        println!("The request was saved on this device only.");
                    }
                }
            }
        }

        Commands::Track { number } => {
            let mut tracker = RequestTracker::new(ctx.resident_documents());
            tracker.search(&number).await;
            if let Some(error) = tracker.error() {
                bail!("{}", error);
            }

            match tracker.result() {
                Some(Lookup::Found(doc)) => match ctx.format {
                    OutputFormat::Json => ctx.print_json(&serde_json::json!({
                        "request": doc,
                        "timeline": tracker.timeline(),
                    }))?,
                    OutputFormat::Table => {
                        print_document(doc);
                        println!();
                        for step in tracker.timeline().unwrap_or_default() {
                            let mark = if step.completed { "x" } else { " " };
                            println!("  [{}] {}", mark, step.label);
                        }
                    }
                },
                _ => bail!("No request found with tracking number {}", tracker.query()),
            }
        }

        Commands::Documents(cmd) => documents(&ctx, cmd).await?,
        Commands::Reports(cmd) => reports(&ctx, cmd).await?,
        Commands::Log(cmd) => log(&ctx, cmd).await?,

        Commands::Settings(cmd) => {
            let mut panel = SettingsPanel::new(Arc::clone(&ctx.store));
            panel.load()?;
            if let SettingsCommands::Set { field, value } = cmd {
                panel.set(&field, &value)?;
            }
            let settings = panel.settings();
            match ctx.format {
                OutputFormat::Json => ctx.print_json(settings)?,
                OutputFormat::Table => {
                    println!("Barangay:     {}", settings.barangay_name);
                    println!("Municipality: {}", settings.municipality);
                    println!("Province:     {}", settings.province);
                }
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn write_config(cli: &Cli, output: Option<&PathBuf>, effective: bool) -> anyhow::Result<()> {
    let content = if effective {
        let ctx = App::new(cli)?;
        toml::to_string_pretty(&ctx.config)?
    } else {
        generate_default_config()
    };

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &content)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

async fn documents(ctx: &App, cmd: DocumentCommands) -> anyhow::Result<()> {
    let mut desk = DocumentDesk::new(ctx.staff_documents());

    match cmd {
        DocumentCommands::List {
            search,
            status,
            document_type,
        } => {
            desk.filters.search = search.unwrap_or_default();
            desk.filters.status = status;
            desk.filters.document_type = document_type;

            if !desk.load().await {
                bail!("{}", desk.error().unwrap_or("Failed to load requests"));
            }
            let rows = desk.filtered();
            match ctx.format {
                OutputFormat::Json => ctx.print_json(&rows)?,
                OutputFormat::Table => {
                    print_documents_table(&rows);
                    println!();
                    let counts: Vec<String> = desk
                        .status_counts()
                        .into_iter()
                        .filter(|(_, n)| *n > 0)
                        .map(|(s, n)| format!("{}: {}", s.label(), n))
                        .collect();
                    println!("{} total  {}", desk.requests().len(), counts.join("  "));
                }
            }
        }

        DocumentCommands::Show { id } => match desk.view_detail(&id).await? {
            Lookup::Found(doc) => match ctx.format {
                OutputFormat::Json => ctx.print_json(&doc)?,
                OutputFormat::Table => print_document(&doc),
            },
            Lookup::NotFound => bail!("No document request with id {}", id),
        },

        DocumentCommands::Status { id, status } => {
            desk.change_status(&id, status).await?;
            println!("Request {} is now {}", id, status.label());
        }

        DocumentCommands::Edit {
            id,
            name,
            document_type,
            status,
        } => {
            let doc = match desk.view_detail(&id).await? {
                Lookup::Found(doc) => doc,
                Lookup::NotFound => bail!("No document request with id {}", id),
            };
            let mut edit = DocumentEdit::from(&doc);
            if let Some(name) = name {
                edit.resident_name = name;
            }
            if let Some(kind) = document_type {
                edit.document_type = kind;
            }
            if let Some(status) = status {
                edit.status = status;
            }
            desk.save_edit(&id, edit).await?;
            println!("Updated request {}", id);
        }

        DocumentCommands::Delete { id } => {
            desk.delete(&id).await?;
            println!("Deleted request {}", id);
        }
    }

    Ok(())
}

async fn reports(ctx: &App, cmd: ReportCommands) -> anyhow::Result<()> {
    let mut review = ReportReview::new(ctx.staff_reports());

    match cmd {
        ReportCommands::List {
            pending,
            title,
            status,
        } => {
            if !review.load().await {
                bail!("{}", review.error().unwrap_or("Failed to load reports"));
            }
            let rows = if pending {
                review.filters.pending_title = title.unwrap_or_default();
                review.filtered_pending()
            } else {
                review.filters.all_title = title.unwrap_or_default();
                review.filters.status = status;
                review.filtered_all()
            };
            match ctx.format {
                OutputFormat::Json => ctx.print_json(&rows)?,
                OutputFormat::Table => {
                    print_reports_table(&rows);
                    let counts = review.counts();
                    println!();
                    println!(
                        "{} pending  {} published  {} total",
                        counts.pending, counts.published, counts.total
                    );
                }
            }
        }

        ReportCommands::Show { id } => match review.view_detail(&id).await? {
            Lookup::Found(report) => match ctx.format {
                OutputFormat::Json => ctx.print_json(&report)?,
                OutputFormat::Table => print_report(&report, &ctx.config.api.uploads_url),
            },
            Lookup::NotFound => bail!("No report with id {}", id),
        },

        ReportCommands::Publish { ids, show_reporter } => {
            if let [id] = ids.as_slice() {
                review.publish(id, show_reporter).await?;
                println!("Published report {}", id);
            } else {
                for id in &ids {
                    review.toggle_selected(id);
                }
                let outcome = review.bulk_publish(show_reporter).await?;
                print_bulk("Published", &outcome.succeeded, &outcome.failed);
            }
        }

        ReportCommands::Reject { id } => {
            review.reject(&id).await?;
            println!("Rejected report {}", id);
        }

        ReportCommands::Status { id, status } => {
            review.change_status(&id, status).await?;
            println!("Report {} is now {}", id, status);
        }

        ReportCommands::Visibility { id, show, hide } => {
            if show == hide {
                bail!("Pass either --show or --hide");
            }
            review.set_visibility(&id, show).await?;
            let state = if show { "shown" } else { "hidden" };
            println!("Reporter of {} is now {}", id, state);
        }

        ReportCommands::Delete { ids } => {
            if let [id] = ids.as_slice() {
                review.delete(id).await?;
                println!("Deleted report {}", id);
            } else {
                for id in &ids {
                    review.toggle_selected(id);
                }
                let outcome = review.bulk_delete().await?;
                print_bulk("Deleted", &outcome.succeeded, &outcome.failed);
            }
        }

        ReportCommands::Submit {
            title,
            description,
            reporter,
            contact,
            show_reporter,
            incident_date,
        } => {
            let mut form = ReportForm::new(ctx.staff_reports());
            form.draft.title = Some(title);
            form.draft.description = Some(description);
            form.draft.reporter_name = reporter;
            form.draft.reporter_contact = contact;
            form.draft.show_reporter = show_reporter;
            form.draft.incident_date = incident_date;

            let report = form.submit().await?;
            match ctx.format {
                OutputFormat::Json => ctx.print_json(&report)?,
                OutputFormat::Table => println!("Report {} submitted for review.", report.id),
            }
        }
    }

    Ok(())
}

async fn log(ctx: &App, cmd: LogCommands) -> anyhow::Result<()> {
    let mut blotter = ReportLog::new(Arc::clone(&ctx.store));
    if !blotter.load().await {
        bail!("{}", blotter.error().unwrap_or("Failed to read the blotter log"));
    }

    match cmd {
        LogCommands::List => match ctx.format {
            OutputFormat::Json => ctx.print_json(blotter.entries())?,
            OutputFormat::Table => print_log_table(blotter.entries()),
        },

        LogCommands::Add { entry } => {
            let mut form = LogEntryForm::default();
            entry.apply(&mut form);
            let created = blotter.add(form).await?;
            println!("Added log entry {}", created.id);
        }

        LogCommands::Edit { id, entry } => {
            let mut form = match blotter.entries().iter().find(|e| e.id == id) {
                Some(existing) => LogEntryForm::from_entry(existing),
                None => bail!("No log entry with id {}", id),
            };
            entry.apply(&mut form);
            blotter.edit(&id, form).await?;
            println!("Updated log entry {}", id);
        }

        LogCommands::Delete { id } => {
            blotter.delete(&id).await?;
            println!("Deleted log entry {}", id);
        }
    }

    Ok(())
}

fn format_time(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_documents_table(rows: &[&DocumentRequest]) {
    if rows.is_empty() {
        println!("No document requests match.");
        return;
    }

    println!(
        "{:<24} {:<24} {:<28} {:<16} {}",
        "Tracking", "Resident", "Type", "Status", "Requested"
    );
    println!("{}", "-".repeat(110));

    for doc in rows {
        println!(
            "{:<24} {:<24} {:<28} {:<16} {}",
            doc.tracking_number,
            truncate(&doc.resident_name, 24),
            truncate(doc.document_type.display_name(), 28),
            doc.status.label(),
            format_time(doc.request_date.as_ref())
        );
    }
}

fn print_document(doc: &DocumentRequest) {
    println!("Tracking number: {}", doc.tracking_number);
    println!("Resident:        {}", doc.resident_name);
    if let Some(contact) = &doc.resident_contact {
        println!("Contact:         {}", contact);
    }
    println!("Document:        {}", doc.document_type);
    println!("Status:          {}", doc.status.label());
    println!("Requested:       {}", format_time(doc.request_date.as_ref()));
    if let Some(purpose) = &doc.purpose {
        println!("Purpose:         {}", purpose);
    }
    if let Some(appointment) = &doc.appointment_datetime {
        println!("Appointment:     {}", appointment);
    }
    if let Some(code) = &doc.pickup_code {
        println!("Pickup code:     {}", code);
    }
    for (name, value) in &doc.form_fields {
        println!("  {}: {}", name, value);
    }
    if let Some(remarks) = &doc.remarks {
        println!("Remarks:         {}", remarks);
    }
}

fn print_reports_table(rows: &[&IncidentReport]) {
    if rows.is_empty() {
        println!("No reports match.");
        return;
    }

    println!(
        "{:<34} {:<32} {:<14} {:<20} {}",
        "ID", "Title", "Status", "Reporter", "Created"
    );
    println!("{}", "-".repeat(120));

    for report in rows {
        println!(
            "{:<34} {:<32} {:<14} {:<20} {}",
            report.id,
            truncate(report.title.as_deref().unwrap_or("(untitled)"), 32),
            report.status.as_str(),
            truncate(report.public_reporter().unwrap_or("Anonymous"), 20),
            format_time(report.created_at.as_ref())
        );
    }
}

fn print_report(report: &IncidentReport, uploads_url: &str) {
    println!("ID:       {}", report.id);
    println!("Title:    {}", report.title.as_deref().unwrap_or("(untitled)"));
    println!("Status:   {}", report.status);
    println!("Created:  {}", format_time(report.created_at.as_ref()));
    println!("Incident: {}", format_time(report.incident_date.as_ref()));
    println!(
        "Reporter: {} ({})",
        report.reporter_name.as_deref().unwrap_or("-"),
        if report.show_reporter { "shown" } else { "hidden" }
    );
    if let Some(contact) = &report.reporter_contact {
        println!("Contact:  {}", contact);
    }
    if let Some(description) = &report.description {
        println!();
        println!("{}", description);
    }

    let urls: Vec<String> = report
        .attachments
        .iter()
        .filter_map(|a| a.resolve(uploads_url))
        .collect();
    if !urls.is_empty() {
        println!();
        println!("Attachments:");
        for url in urls {
            println!("  {}", url);
        }
    }
}

fn print_log_table(entries: &[IncidentReport]) {
    if entries.is_empty() {
        println!("The blotter log is empty.");
        return;
    }

    println!(
        "{:<16} {:<12} {:<20} {:<20} {:<12} {}",
        "ID", "Date", "Complainant", "Respondent", "Type", "Status"
    );
    println!("{}", "-".repeat(96));

    for entry in entries {
        println!(
            "{:<16} {:<12} {:<20} {:<20} {:<12} {}",
            entry.id,
            entry.date.as_deref().unwrap_or("-"),
            truncate(entry.complainant.as_deref().unwrap_or("-"), 20),
            truncate(entry.respondent.as_deref().unwrap_or("-"), 20),
            entry.incident_type.as_deref().unwrap_or("-"),
            entry.status
        );
    }
}

fn print_bulk(action: &str, succeeded: &[String], failed: &[(String, String)]) {
    println!("{} {} of {}", action, succeeded.len(), succeeded.len() + failed.len());
    for (id, error) in failed {
        eprintln!("  {}: {}", id, error);
    }
}
