use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Subscription model - the star of the show
///
/// Serialized as camelCase JSON so export files stay compatible with the
/// original data format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Unique id, assigned by the store when empty.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub billing_cycle: BillingCycle,
    /// Next due date.
    pub due_date: NaiveDate,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub push_reminder: bool,
    #[serde(default)]
    pub email_reminder: bool,
    /// Days of lead time before the due date for reminders.
    #[serde(default = "default_reminder_days")]
    pub reminder_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_email: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_reminder_days() -> u32 {
    3
}

impl Subscription {
    /// Amount normalized to a per-month cost, for analytics.
    pub fn monthly_cost(&self) -> f64 {
        self.amount * self.billing_cycle.monthly_factor()
    }

    /// Days from `today` until the due date. Negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

/// Generate a fresh subscription id: unix millis plus a random suffix.
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", millis, &suffix[..8])
}

/// How often a subscription bills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    /// Multiplier that converts one payment into a per-month cost.
    ///
    /// Daily uses the mean month length (365.25 / 12) so yearly and daily
    /// normalizations agree.
    pub fn monthly_factor(&self) -> f64 {
        match self {
            BillingCycle::Daily => 365.25 / 12.0,
            BillingCycle::Weekly => 52.0 / 12.0,
            BillingCycle::Biweekly => 26.0 / 12.0,
            BillingCycle::Monthly => 1.0,
            BillingCycle::Quarterly => 1.0 / 3.0,
            BillingCycle::Yearly => 1.0 / 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Daily => "daily",
            BillingCycle::Weekly => "weekly",
            BillingCycle::Biweekly => "biweekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn all() -> Vec<BillingCycle> {
        vec![
            BillingCycle::Daily,
            BillingCycle::Weekly,
            BillingCycle::Biweekly,
            BillingCycle::Monthly,
            BillingCycle::Quarterly,
            BillingCycle::Yearly,
        ]
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(BillingCycle::Daily),
            "weekly" => Ok(BillingCycle::Weekly),
            "biweekly" => Ok(BillingCycle::Biweekly),
            "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(format!("unknown billing cycle: {}", other)),
        }
    }
}

/// Spending category. Open-ended: anything we don't recognize lands on
/// `Other` rather than failing deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Streaming,
    Music,
    Gaming,
    Software,
    Fitness,
    News,
    Education,
    Utilities,
    Food,
    Shopping,
    #[serde(other)]
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Streaming => "streaming",
            Category::Music => "music",
            Category::Gaming => "gaming",
            Category::Software => "software",
            Category::Fitness => "fitness",
            Category::News => "news",
            Category::Education => "education",
            Category::Utilities => "utilities",
            Category::Food => "food",
            Category::Shopping => "shopping",
            Category::Other => "other",
        }
    }

    pub fn all() -> Vec<Category> {
        vec![
            Category::Streaming,
            Category::Music,
            Category::Gaming,
            Category::Software,
            Category::Fitness,
            Category::News,
            Category::Education,
            Category::Utilities,
            Category::Food,
            Category::Shopping,
            Category::Other,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    // Never fails: unknown categories are what `Other` is for.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cat = Category::all()
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .unwrap_or(Category::Other);
        Ok(cat)
    }
}
