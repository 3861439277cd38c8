use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtrack_core::{
    analytics, export, reminder, validate, BillingCycle, Category, Config, Subscription,
    SubscriptionStore,
};

#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about = "Local-first subscription tracker", long_about = None)]
struct Cli {
    /// Override the data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a subscription
    Add {
        /// Subscription name
        name: String,
        /// Payment amount per billing cycle
        #[arg(long)]
        amount: f64,
        /// Billing cycle (daily/weekly/biweekly/monthly/quarterly/yearly)
        #[arg(long, default_value = "monthly")]
        cycle: BillingCycle,
        /// Next due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        /// Spending category
        #[arg(long, default_value = "other")]
        category: Category,
        /// Enable push reminders
        #[arg(long)]
        push: bool,
        /// Enable email reminders to this address
        #[arg(long)]
        email: Option<String>,
        /// Reminder lead time in days
        #[arg(long)]
        lead_days: Option<u32>,
    },
    /// List all subscriptions
    List,
    /// Show one subscription in full
    Show {
        /// Subscription id
        id: String,
    },
    /// Update fields on a subscription
    Update {
        /// Subscription id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        cycle: Option<BillingCycle>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        category: Option<Category>,
        /// Turn push reminders on or off
        #[arg(long)]
        push: Option<bool>,
        /// Email reminder address; an empty string disables email reminders
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        lead_days: Option<u32>,
    },
    /// Remove a subscription
    Remove {
        /// Subscription id
        id: String,
    },
    /// Search by name or category
    Search {
        /// Case-insensitive substring
        term: String,
    },
    /// Payments coming up, with reminder status
    Due {
        /// Window in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Spending summary by category
    Summary,
    /// Export all subscriptions to a JSON file
    Export {
        /// Output path
        path: PathBuf,
    },
    /// Import subscriptions from a JSON export
    Import {
        /// Input path
        path: PathBuf,
    },
    /// Delete all subscriptions
    Reset {
        /// Skip the are-you-sure check
        #[arg(long)]
        yes: bool,
    },
    /// Read a stored config value (primary storage mode only)
    ConfigGet {
        key: String,
    },
    /// Store a config value (primary storage mode only)
    ConfigSet {
        key: String,
        value: String,
    },
    /// Show which storage engine is active
    Mode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("could not load config ({}), using defaults", e);
            Config::default()
        }
    };

    let mut store = open_store(&cli, &config)?;
    let currency = config.display.currency.clone();

    match cli.command {
        Commands::Add {
            name,
            amount,
            cycle,
            due,
            category,
            push,
            email,
            lead_days,
        } => {
            let sub = Subscription {
                id: String::new(),
                name,
                amount,
                billing_cycle: cycle,
                due_date: due,
                category,
                push_reminder: push,
                email_reminder: email.is_some(),
                reminder_days: lead_days.unwrap_or(config.reminders.default_lead_days),
                reminder_email: email.or_else(|| config.reminders.email.clone()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            validate::validate(&sub)?;

            let stored = store.add(sub).await?;
            println!("added {} ({})", stored.name, stored.id);
        }

        Commands::List => {
            let subs = store.get_all().await?;
            print_table(&subs, &currency);
        }

        Commands::Show { id } => match store.get(&id).await? {
            Some(sub) => print_detail(&sub, &currency),
            None => bail!("no subscription with id {}", id),
        },

        Commands::Update {
            id,
            name,
            amount,
            cycle,
            due,
            category,
            push,
            email,
            lead_days,
        } => {
            let mut sub = store
                .get(&id)
                .await?
                .with_context(|| format!("no subscription with id {}", id))?;

            if let Some(name) = name {
                sub.name = name;
            }
            if let Some(amount) = amount {
                sub.amount = amount;
            }
            if let Some(cycle) = cycle {
                sub.billing_cycle = cycle;
            }
            if let Some(due) = due {
                sub.due_date = due;
            }
            if let Some(category) = category {
                sub.category = category;
            }
            if let Some(push) = push {
                sub.push_reminder = push;
            }
            if let Some(email) = email {
                if email.is_empty() {
                    sub.email_reminder = false;
                    sub.reminder_email = None;
                } else {
                    sub.email_reminder = true;
                    sub.reminder_email = Some(email);
                }
            }
            if let Some(lead_days) = lead_days {
                sub.reminder_days = lead_days;
            }
            validate::validate(&sub)?;

            let stored = store.update(sub).await?;
            println!("updated {} ({})", stored.name, stored.id);
        }

        Commands::Remove { id } => {
            store.remove(&id).await?;
            println!("removed {}", id);
        }

        Commands::Search { term } => {
            let hits = store.search(&term).await?;
            if hits.is_empty() {
                println!("no matches for '{}'", term);
            } else {
                print_table(&hits, &currency);
            }
        }

        Commands::Due { days } => {
            let subs = store.get_all().await?;
            let today = Local::now().date_naive();

            let due = analytics::upcoming(&subs, today, days);
            if due.is_empty() {
                println!("nothing due in the next {} days", days);
            } else {
                for sub in &due {
                    println!(
                        "{:<20} {}{:<8.2} due {} ({} days)",
                        sub.name,
                        currency,
                        sub.amount,
                        sub.due_date,
                        sub.days_until_due(today)
                    );
                }
            }

            let reminders = reminder::due_reminders(&subs, today);
            if !reminders.is_empty() {
                println!();
                for r in &reminders {
                    let channels: Vec<&str> = r
                        .channels
                        .iter()
                        .map(|c| match c {
                            reminder::Channel::Push => "push",
                            reminder::Channel::Email => "email",
                        })
                        .collect();
                    println!(
                        "reminder: {} due {} ({})",
                        r.name,
                        r.due_date,
                        channels.join(", ")
                    );
                }
            }
        }

        Commands::Summary => {
            let subs = store.get_all().await?;
            let summary = analytics::summarize(&subs);

            println!("{} subscriptions", summary.subscription_count);
            println!("monthly: {}{:.2}", currency, summary.monthly_total);
            println!("yearly:  {}{:.2}", currency, summary.yearly_total);

            if !summary.by_category.is_empty() {
                println!();
                for cat in &summary.by_category {
                    println!(
                        "{:<12} {}{:<8.2} {:>5.1}%",
                        cat.category.as_str(),
                        currency,
                        cat.monthly,
                        cat.share
                    );
                }
            }
        }

        Commands::Export { path } => {
            let doc = export::export_store(&mut store).await?;
            let json = export::to_json(&doc)?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "exported {} subscriptions to {}",
                doc.subscriptions.len(),
                path.display()
            );
        }

        Commands::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let count = export::import_into(&mut store, &json).await?;
            println!("imported {} subscriptions", count);
        }

        Commands::Reset { yes } => {
            if !yes {
                bail!("this deletes every subscription; re-run with --yes to confirm");
            }
            store.clear_all().await?;
            println!("all subscriptions deleted");
        }

        Commands::ConfigGet { key } => match store.get_config(&key).await? {
            Some(value) => println!("{}", value),
            None => bail!("no config value for key '{}'", key),
        },

        Commands::ConfigSet { key, value } => {
            store.set_config(&key, &value).await?;
            println!("set {} = {}", key, value);
        }

        Commands::Mode => {
            println!("{}", store.mode());
        }
    }

    Ok(())
}

fn open_store(cli: &Cli, config: &Config) -> anyhow::Result<SubscriptionStore> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => config.data_dir()?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let store = SubscriptionStore::open(
        data_dir.join("subtrack.db"),
        data_dir.join("subscriptions.json"),
        config.cache_ttl(),
    )?;
    Ok(store)
}

fn print_table(subs: &[Subscription], currency: &str) {
    if subs.is_empty() {
        println!("no subscriptions yet - try 'subtrack add'");
        return;
    }

    println!(
        "{:<24} {:<20} {:>10} {:<10} {:<12} {}",
        "ID", "NAME", "AMOUNT", "CYCLE", "DUE", "CATEGORY"
    );
    for sub in subs {
        println!(
            "{:<24} {:<20} {}{:>9.2} {:<10} {:<12} {}",
            sub.id,
            sub.name,
            currency,
            sub.amount,
            sub.billing_cycle.as_str(),
            sub.due_date.to_string(),
            sub.category.as_str()
        );
    }
}

fn print_detail(sub: &Subscription, currency: &str) {
    println!("{} ({})", sub.name, sub.id);
    println!("  amount:    {}{:.2} {}", currency, sub.amount, sub.billing_cycle.as_str());
    println!("  due:       {}", sub.due_date);
    println!("  category:  {}", sub.category.as_str());
    println!(
        "  reminders: push={} email={} ({} days ahead)",
        sub.push_reminder, sub.email_reminder, sub.reminder_days
    );
    if let Some(email) = &sub.reminder_email {
        println!("  email to:  {}", email);
    }
    println!("  created:   {}", sub.created_at.format("%Y-%m-%d %H:%M"));
    println!("  updated:   {}", sub.updated_at.format("%Y-%m-%d %H:%M"));
}
