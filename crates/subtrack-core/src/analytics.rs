use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Category, Subscription};

/// Aggregate spending view over the whole collection.
///
/// All figures are normalized to per-month costs so a yearly and a
/// monthly subscription compare honestly.
#[derive(Debug, Clone, Serialize)]
pub struct SpendingSummary {
    pub subscription_count: usize,
    pub monthly_total: f64,
    pub yearly_total: f64,
    /// Sorted by monthly spend, highest first.
    pub by_category: Vec<CategorySpend>,
}

/// One category's slice of the monthly total.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySpend {
    pub category: Category,
    pub monthly: f64,
    /// Share of the monthly total, 0-100.
    pub share: f64,
}

/// Compute the spending summary for a set of subscriptions.
pub fn summarize(subs: &[Subscription]) -> SpendingSummary {
    let monthly_total: f64 = subs.iter().map(Subscription::monthly_cost).sum();

    let mut per_category: HashMap<Category, f64> = HashMap::new();
    for sub in subs {
        *per_category.entry(sub.category).or_insert(0.0) += sub.monthly_cost();
    }

    let mut by_category: Vec<CategorySpend> = per_category
        .into_iter()
        .map(|(category, monthly)| CategorySpend {
            category,
            monthly,
            share: if monthly_total > 0.0 {
                monthly / monthly_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    by_category.sort_by(|a, b| b.monthly.total_cmp(&a.monthly));

    SpendingSummary {
        subscription_count: subs.len(),
        monthly_total,
        yearly_total: monthly_total * 12.0,
        by_category,
    }
}

/// Subscriptions due within the next `within_days` days (inclusive),
/// soonest first. Overdue entries are excluded.
pub fn upcoming(subs: &[Subscription], today: NaiveDate, within_days: i64) -> Vec<&Subscription> {
    let mut due: Vec<&Subscription> = subs
        .iter()
        .filter(|s| {
            let days = s.days_until_due(today);
            (0..=within_days).contains(&days)
        })
        .collect();
    due.sort_by_key(|s| s.due_date);
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingCycle;
    use chrono::Utc;

    fn sub(name: &str, amount: f64, cycle: BillingCycle, category: Category) -> Subscription {
        Subscription {
            id: name.to_lowercase(),
            name: name.to_string(),
            amount,
            billing_cycle: cycle,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            category,
            push_reminder: false,
            email_reminder: false,
            reminder_days: 3,
            reminder_email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.subscription_count, 0);
        assert_eq!(summary.monthly_total, 0.0);
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn test_totals_normalize_cycles() {
        let subs = vec![
            sub("Netflix", 15.0, BillingCycle::Monthly, Category::Streaming),
            // 120/year is 10/month
            sub("Domains", 120.0, BillingCycle::Yearly, Category::Software),
        ];

        let summary = summarize(&subs);
        assert_eq!(summary.subscription_count, 2);
        assert!((summary.monthly_total - 25.0).abs() < 1e-9);
        assert!((summary.yearly_total - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_breakdown_sorted_with_shares() {
        let subs = vec![
            sub("Netflix", 15.0, BillingCycle::Monthly, Category::Streaming),
            sub("Disney+", 10.0, BillingCycle::Monthly, Category::Streaming),
            sub("Spotify", 5.0, BillingCycle::Monthly, Category::Music),
        ];

        let summary = summarize(&subs);
        assert_eq!(summary.by_category.len(), 2);

        // Streaming (25) outranks music (5)
        assert_eq!(summary.by_category[0].category, Category::Streaming);
        assert!((summary.by_category[0].monthly - 25.0).abs() < 1e-9);

        let total_share: f64 = summary.by_category.iter().map(|c| c.share).sum();
        assert!((total_share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_upcoming_window_and_order() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 28).unwrap();

        let mut tomorrow = sub("Gym", 30.0, BillingCycle::Monthly, Category::Fitness);
        tomorrow.due_date = NaiveDate::from_ymd_opt(2024, 5, 29).unwrap();

        let mut in_four_days = sub("Netflix", 15.0, BillingCycle::Monthly, Category::Streaming);
        in_four_days.due_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut next_month = sub("Spotify", 5.0, BillingCycle::Monthly, Category::Music);
        next_month.due_date = NaiveDate::from_ymd_opt(2024, 6, 25).unwrap();

        let mut overdue = sub("News", 8.0, BillingCycle::Monthly, Category::News);
        overdue.due_date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        let subs = vec![in_four_days, next_month, tomorrow, overdue];
        let due = upcoming(&subs, today, 7);

        let names: Vec<&str> = due.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Gym", "Netflix"]);
    }

    #[test]
    fn test_upcoming_includes_today_and_window_edge() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 28).unwrap();

        let mut due_today = sub("Gym", 30.0, BillingCycle::Monthly, Category::Fitness);
        due_today.due_date = today;

        let mut at_edge = sub("Netflix", 15.0, BillingCycle::Monthly, Category::Streaming);
        at_edge.due_date = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();

        let subs = vec![due_today, at_edge];
        assert_eq!(upcoming(&subs, today, 7).len(), 2);
    }
}
