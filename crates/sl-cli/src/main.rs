use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use sl_core::{ContactInfo, TimelineEvent, TrackingDraft, TrackingStatus, TrackingView};
use sl_sync::{
    AdminPanel, ContactSaveOutcome, DeleteOutcome, ListingView, LookupAttempt, LookupResult,
    NoopView, PanelOpened, RefreshReport, TrackingClient,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

mod args;
mod render;

use render::{format_listing, format_tracking, ListingPrinter, StderrProgress};

#[derive(Parser)]
#[command(name = "sl", version, about = "Swift Logistics tracking store and client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS", global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracking API server
    Serve,
    /// Look up a tracking number
    Track {
        number: String,
        /// Keep the result current as other clients change the local mirror
        #[arg(long, default_value_t = false)]
        follow: bool,
    },
    /// Tracking admin panel
    Admin {
        #[command(flatten)]
        auth: AdminAuth,
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Company contact details
    Contact {
        #[command(flatten)]
        auth: AdminAuth,
        #[command(subcommand)]
        command: ContactCommand,
    },
}

#[derive(Args)]
struct AdminAuth {
    /// Admin passphrase; prompted for when omitted
    #[arg(long, global = true)]
    passphrase: Option<String>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Show the mirrored entries
    List,
    /// Refresh the mirror from the remote store
    Sync,
    /// Create or replace an entry
    Upsert(UpsertArgs),
    /// Delete an entry
    Delete { number: String },
    /// Delete every entry
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Keep the listing live until interrupted
    Watch,
}

#[derive(Args)]
struct UpsertArgs {
    #[arg(long)]
    number: String,
    #[arg(long, value_parser = args::parse_status)]
    status: TrackingStatus,
    #[arg(long, default_value = "")]
    status_text: String,
    #[arg(long, default_value = "")]
    origin: String,
    #[arg(long, default_value = "")]
    destination: String,
    #[arg(long, default_value = "")]
    eta: String,
    #[arg(long, default_value = "")]
    package_type: String,
    #[arg(long, default_value = "")]
    weight: String,
    #[arg(long, default_value = "")]
    dimensions: String,
    #[arg(long, default_value = "")]
    insurance: String,
    /// date|title|description|location[|done][|blink], repeatable
    #[arg(long = "event", value_parser = args::parse_event)]
    events: Vec<TimelineEvent>,
}

impl UpsertArgs {
    fn into_draft(self) -> TrackingDraft {
        TrackingDraft {
            number: self.number,
            status: self.status,
            status_text: self.status_text,
            origin: self.origin,
            destination: self.destination,
            estimated_delivery: self.eta,
            package_type: self.package_type,
            weight: self.weight,
            dimensions: self.dimensions,
            insurance: self.insurance,
            timeline: self.events,
        }
    }
}

#[derive(Subcommand)]
enum ContactCommand {
    Show,
    /// Update the given fields, keeping the rest
    Set {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        hours: Option<String>,
    },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = sl_api::load_config()?;
            sl_api::run(config).await
        }
        command => {
            sl_core::logging::init_cli(&cli.log_level, cli.json_logs)?;
            run_client(command).await
        }
    }
}

async fn run_client(command: Commands) -> Result<()> {
    let config = sl_sync::load_client_config()?;

    match command {
        Commands::Serve => Err(anyhow!("serve does not run as a client")),
        Commands::Track { number, follow } => {
            let client = TrackingClient::connect(config, Arc::new(NoopView)).await?;
            track(&client, &number, follow).await
        }
        Commands::Admin { auth, command } => {
            let view: Arc<dyn ListingView> = if matches!(command, AdminCommand::Watch) {
                Arc::new(ListingPrinter)
            } else {
                Arc::new(NoopView)
            };
            let client = TrackingClient::connect(config, view).await?;
            admin(&client, auth, command).await
        }
        Commands::Contact { auth, command } => {
            let client = TrackingClient::connect(config, Arc::new(NoopView)).await?;
            contact(&client, auth, command).await
        }
    }
}

fn print_lookup(result: LookupResult) -> Result<()> {
    match result {
        LookupResult::Found { entry, source } => {
            tracing::debug!(%source, "lookup resolved");
            println!("{}", format_tracking(&TrackingView::from_entry(&entry)));
            Ok(())
        }
        other => Err(anyhow!(other
            .not_found_message()
            .unwrap_or("Tracking number not found."))),
    }
}

async fn track(client: &TrackingClient, number: &str, follow: bool) -> Result<()> {
    let progress = StderrProgress::default();
    let subscription = client.mirror.subscribe();

    let shown = match client.lookup.track(number, &progress).await? {
        LookupAttempt::Completed(result) => print_lookup(result),
        LookupAttempt::Superseded => return Ok(()),
    };
    if !follow {
        return shown;
    }
    if let Err(err) = shown {
        eprintln!("{err}");
    }

    let tasks = client.start().await?;
    eprintln!("Following {number}, press Ctrl+C to stop");
    tokio::select! {
        followed = client.lookup.follow(subscription, number, &progress, |result| {
            if let Err(err) = print_lookup(result) {
                eprintln!("{err}");
            }
        }) => followed?,
        signal = tokio::signal::ctrl_c() => signal?,
    }
    tasks.shutdown();
    Ok(())
}

fn read_passphrase(auth: AdminAuth) -> Result<String> {
    if let Some(passphrase) = auth.passphrase {
        return Ok(passphrase);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_refresh(report: &RefreshReport) {
    match report {
        RefreshReport::Merged {
            remote,
            kept_unsynced,
            evicted,
        } => println!(
            "Synced {remote} remote entries ({} pending local, {} removed)",
            kept_unsynced.len(),
            evicted.len()
        ),
        RefreshReport::Skipped { reason } => {
            eprintln!("Remote store unavailable, showing local copy ({reason})")
        }
    }
}

async fn admin(client: &TrackingClient, auth: AdminAuth, command: AdminCommand) -> Result<()> {
    let attempt = read_passphrase(auth)?;
    let opened = client.open_admin(AdminPanel::Tracking, &attempt).await?;
    let PanelOpened::Tracking(report) = opened else {
        return Err(anyhow!("tracking panel did not open"));
    };

    match command {
        AdminCommand::List => {
            if let RefreshReport::Skipped { .. } = report {
                print_refresh(&report);
            }
            println!("{}", format_listing(&client.mirror.load().await));
        }
        AdminCommand::Sync => {
            print_refresh(&report);
        }
        AdminCommand::Upsert(upsert) => {
            let outcome = client.writes.save_entry(upsert.into_draft()).await?;
            println!("{}", outcome.notice());
        }
        AdminCommand::Delete { number } => {
            let outcome = client.writes.delete(&number).await?;
            println!("{}", outcome.notice());
            if let DeleteOutcome::RolledBack { .. } = outcome {
                return Err(anyhow!("delete was not applied"));
            }
        }
        AdminCommand::Reset { yes } => {
            if !yes {
                return Err(anyhow!("reset deletes every entry; pass --yes to confirm"));
            }
            let report = client.writes.reset_all().await?;
            println!("Reset {} entries", report.attempted);
            if !report.is_complete() {
                let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
                eprintln!(
                    "Remote delete failed for {}; they may still exist remotely",
                    failed.join(", ")
                );
            }
        }
        AdminCommand::Watch => {
            let tasks = client.start().await?;
            eprintln!("Watching tracking mirror, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            tasks.shutdown();
        }
    }
    Ok(())
}

fn print_contact(info: &ContactInfo) {
    if info.is_empty() {
        println!("No contact details saved.");
        return;
    }
    println!("Address: {}", info.address);
    println!("Phone:   {}", info.phone);
    println!("Email:   {}", info.email);
    println!("Hours:   {}", info.hours);
}

async fn contact(client: &TrackingClient, auth: AdminAuth, command: ContactCommand) -> Result<()> {
    if let ContactCommand::Show = command {
        print_contact(&client.contact.load().await);
        return Ok(());
    }

    let attempt = read_passphrase(auth)?;
    let PanelOpened::Contact(current) = client.open_admin(AdminPanel::Contact, &attempt).await?
    else {
        return Err(anyhow!("contact panel did not open"));
    };

    let outcome = match command {
        ContactCommand::Show => return Ok(()),
        ContactCommand::Set {
            address,
            phone,
            email,
            hours,
        } => {
            let info = ContactInfo {
                address: address.unwrap_or(current.address),
                phone: phone.unwrap_or(current.phone),
                email: email.unwrap_or(current.email),
                hours: hours.unwrap_or(current.hours),
            };
            client.contact.save(info).await
        }
        ContactCommand::Clear => client.contact.clear().await,
    };

    println!("{}", outcome.notice());
    match outcome {
        ContactSaveOutcome::Saved(info) => {
            print_contact(&info);
            Ok(())
        }
        ContactSaveOutcome::Failed { .. } => Err(anyhow!("contact details were not saved")),
    }
}
