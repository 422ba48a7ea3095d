use chrono::{ Duration, Utc };
use rand::{ seq::IndexedRandom, Rng };
use rust_decimal::Decimal;
use serde_json::{ json, Value };

use crate::models::Report;

const CATEGORIES: &[&str] = &["sales", "analytics", "finance", "operations", "marketing"];
const STATUSES: &[&str] = &["draft", "published", "archived", "in_review"];
const AUTHORS: &[&str] = &["ada", "grace", "linus", "margaret", "ken", "barbara"];
const TAGS: &[&str] = &["weekly", "monthly", "quarterly", "internal", "external", "priority"];

/// Produces a fully-populated report for a group.
pub trait ReportGenerator: Send + Sync + 'static {
    fn generate(&self, group: &str) -> Report;
}

/// Random synthetic reports, enabled and tagged with the requested group.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomReportGenerator;

impl RandomReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn pick(rng: &mut impl Rng, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

impl ReportGenerator for RandomReportGenerator {
    fn generate(&self, group: &str) -> Report {
        let mut rng = rand::rng();

        let category = pick(&mut rng, CATEGORIES);
        let number: u32 = rng.random_range(1000..100_000);
        let revenue = Decimal::new(rng.random_range(0..10_000_000), 2);
        let views: u64 = rng.random_range(0..50_000);
        let created_at = Utc::now() - Duration::minutes(rng.random_range(0..60 * 24 * 90));

        let tag_count = rng.random_range(1..=3);
        let tags: Vec<Value> = TAGS.choose_multiple(&mut rng, tag_count)
            .map(|tag| json!(tag))
            .collect();

        Report::new(group)
            .with_name(format!("{} report #{}", category, number))
            .with_field(
                "description",
                format!("Synthetic {} report generated for group '{}'", category, group)
            )
            .with_field("category", category)
            .with_field("status", pick(&mut rng, STATUSES))
            .with_field("author", pick(&mut rng, AUTHORS))
            .with_field("revenue", revenue.to_string())
            .with_field("views", views)
            .with_field("createdAt", created_at.to_rfc3339())
            .with_field("tags", Value::Array(tags))
    }
}
