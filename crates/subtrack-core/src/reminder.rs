use chrono::{Days, Months, NaiveDate};

use crate::models::{BillingCycle, Subscription};

/// A reminder that should fire: the subscription is inside its lead
/// window and at least one channel is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub subscription_id: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub channels: Vec<Channel>,
}

/// Delivery channel for a reminder. Actual delivery is the host's
/// problem - this module only decides what is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Email,
}

/// Which subscriptions are inside their reminder lead window on `today`.
///
/// A subscription qualifies when `0 <= days_until_due <= reminder_days`
/// and at least one channel is on. Sorted soonest first, then by name so
/// the output is stable.
pub fn due_reminders(subs: &[Subscription], today: NaiveDate) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = subs
        .iter()
        .filter_map(|sub| {
            let mut channels = Vec::new();
            if sub.push_reminder {
                channels.push(Channel::Push);
            }
            if sub.email_reminder {
                channels.push(Channel::Email);
            }
            if channels.is_empty() {
                return None;
            }

            let days = sub.days_until_due(today);
            if days < 0 || days > i64::from(sub.reminder_days) {
                return None;
            }

            Some(Reminder {
                subscription_id: sub.id.clone(),
                name: sub.name.clone(),
                due_date: sub.due_date,
                days_until_due: days,
                channels,
            })
        })
        .collect();

    reminders.sort_by(|a, b| {
        a.days_until_due
            .cmp(&b.days_until_due)
            .then_with(|| a.name.cmp(&b.name))
    });
    reminders
}

/// The due date one billing cycle after `date`.
///
/// Month-based cycles clamp to the end of shorter months (Jan 31 +
/// 1 month = Feb 29 in a leap year). Saturates at the calendar bounds,
/// which nobody will hit with a real due date.
pub fn next_due_date(date: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    let next = match cycle {
        BillingCycle::Daily => date.checked_add_days(Days::new(1)),
        BillingCycle::Weekly => date.checked_add_days(Days::new(7)),
        BillingCycle::Biweekly => date.checked_add_days(Days::new(14)),
        BillingCycle::Monthly => date.checked_add_months(Months::new(1)),
        BillingCycle::Quarterly => date.checked_add_months(Months::new(3)),
        BillingCycle::Yearly => date.checked_add_months(Months::new(12)),
    };
    next.unwrap_or(date)
}

/// Advance a due date cycle by cycle until it is not in the past.
/// Already-current dates come back unchanged.
pub fn roll_forward(date: NaiveDate, cycle: BillingCycle, today: NaiveDate) -> NaiveDate {
    let mut due = date;
    while due < today {
        due = next_due_date(due, cycle);
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;

    fn sub(name: &str, due: NaiveDate, lead: u32, push: bool, email: bool) -> Subscription {
        Subscription {
            id: name.to_lowercase(),
            name: name.to_string(),
            amount: 9.99,
            billing_cycle: BillingCycle::Monthly,
            due_date: due,
            category: Category::Streaming,
            push_reminder: push,
            email_reminder: email,
            reminder_days: lead,
            reminder_email: email.then(|| "me@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inside_lead_window_fires() {
        let today = date(2024, 5, 29);
        let subs = vec![sub("Netflix", date(2024, 6, 1), 3, true, false)];

        let reminders = due_reminders(&subs, today);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].days_until_due, 3);
        assert_eq!(reminders[0].channels, vec![Channel::Push]);
    }

    #[test]
    fn test_window_boundaries() {
        let due = date(2024, 6, 1);
        let subs = vec![sub("Netflix", due, 3, true, false)];

        // Due today: fires
        assert_eq!(due_reminders(&subs, due).len(), 1);
        // Exactly at the lead edge: fires
        assert_eq!(due_reminders(&subs, date(2024, 5, 29)).len(), 1);
        // One day before the window opens: silent
        assert!(due_reminders(&subs, date(2024, 5, 28)).is_empty());
        // Past due: silent, reminders don't nag about missed payments
        assert!(due_reminders(&subs, date(2024, 6, 2)).is_empty());
    }

    #[test]
    fn test_disabled_channels_never_fire() {
        let subs = vec![sub("Netflix", date(2024, 6, 1), 3, false, false)];
        assert!(due_reminders(&subs, date(2024, 6, 1)).is_empty());
    }

    #[test]
    fn test_both_channels_reported() {
        let subs = vec![sub("Netflix", date(2024, 6, 1), 3, true, true)];
        let reminders = due_reminders(&subs, date(2024, 6, 1));
        assert_eq!(reminders[0].channels, vec![Channel::Push, Channel::Email]);
    }

    #[test]
    fn test_sorted_soonest_first_then_name() {
        let subs = vec![
            sub("Spotify", date(2024, 6, 3), 7, true, false),
            sub("Netflix", date(2024, 6, 1), 7, true, false),
            sub("Disney+", date(2024, 6, 3), 7, true, false),
        ];

        let names: Vec<String> = due_reminders(&subs, date(2024, 6, 1))
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Netflix", "Disney+", "Spotify"]);
    }

    #[test]
    fn test_next_due_date_per_cycle() {
        let d = date(2024, 5, 15);
        assert_eq!(next_due_date(d, BillingCycle::Daily), date(2024, 5, 16));
        assert_eq!(next_due_date(d, BillingCycle::Weekly), date(2024, 5, 22));
        assert_eq!(next_due_date(d, BillingCycle::Biweekly), date(2024, 5, 29));
        assert_eq!(next_due_date(d, BillingCycle::Monthly), date(2024, 6, 15));
        assert_eq!(next_due_date(d, BillingCycle::Quarterly), date(2024, 8, 15));
        assert_eq!(next_due_date(d, BillingCycle::Yearly), date(2025, 5, 15));
    }

    #[test]
    fn test_monthly_clamps_at_month_end() {
        // Jan 31 + 1 month lands on the leap-year Feb 29
        assert_eq!(
            next_due_date(date(2024, 1, 31), BillingCycle::Monthly),
            date(2024, 2, 29)
        );
        assert_eq!(
            next_due_date(date(2023, 1, 31), BillingCycle::Monthly),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn test_roll_forward() {
        // Three months behind: advances to the first occurrence >= today
        let rolled = roll_forward(date(2024, 2, 10), BillingCycle::Monthly, date(2024, 5, 1));
        assert_eq!(rolled, date(2024, 5, 10));

        // Already current: untouched
        let rolled = roll_forward(date(2024, 5, 10), BillingCycle::Monthly, date(2024, 5, 1));
        assert_eq!(rolled, date(2024, 5, 10));

        // Weekly catches up in 7-day hops
        let rolled = roll_forward(date(2024, 4, 29), BillingCycle::Weekly, date(2024, 5, 8));
        assert_eq!(rolled, date(2024, 5, 13));
    }
}
