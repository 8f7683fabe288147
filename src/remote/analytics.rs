//! Analytics read from the `/analytics` endpoints.
//!
//! - `GET /analytics/dashboard`: headline counters
//! - `GET /analytics/leads`: lead breakdowns and monthly intake
//! - `GET /analytics/properties`: listings by type
//!
//! Breakdowns missing from a response read as empty lists.

use serde::{Deserialize, Serialize};

/// Headline counters for the dashboard.
///
/// The server speaks camelCase; snake_case keys are accepted as well. Absent
/// counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(alias = "total_leads")]
    pub total_leads: u64,
    #[serde(alias = "total_properties")]
    pub total_properties: u64,
    #[serde(alias = "total_tasks")]
    pub total_tasks: u64,
    #[serde(alias = "completed_tasks")]
    pub completed_tasks: u64,
    /// Percentage of leads that reached `won`
    #[serde(alias = "lead_conversion_rate")]
    pub lead_conversion_rate: f64,
    /// Month-over-month growth, percent
    #[serde(alias = "monthly_growth")]
    pub monthly_growth: f64,
}

impl DashboardStats {
    /// Share of tasks completed, percent. Zero when there are no tasks.
    pub fn task_completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 * 100.0 / self.total_tasks as f64
        }
    }
}

/// One labelled value of a breakdown, e.g. `{ "name": "won", "value": 12 }`.
///
/// Aggregation output in the `{ "_id": ..., "count": ... }` form is read as
/// well. Other keys (chart colours) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slice {
    #[serde(alias = "_id")]
    pub name: String,
    #[serde(alias = "count")]
    pub value: f64,
}

/// Leads received and converted in one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyLeads {
    pub month: String,
    pub leads: f64,
    pub converted: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadAnalytics {
    #[serde(alias = "leads_by_status")]
    pub leads_by_status: Vec<Slice>,
    #[serde(alias = "leads_by_source")]
    pub leads_by_source: Vec<Slice>,
    #[serde(alias = "monthly_leads")]
    pub monthly_leads: Vec<MonthlyLeads>,
}

impl LeadAnalytics {
    pub fn is_empty(&self) -> bool {
        self.leads_by_status.is_empty()
            && self.leads_by_source.is_empty()
            && self.monthly_leads.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyAnalytics {
    #[serde(alias = "properties_by_type")]
    pub properties_by_type: Vec<Slice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalLeads": 12,
            "totalProperties": 4,
            "totalTasks": 8,
            "completedTasks": 2,
            "leadConversionRate": 25.0,
            "monthlyGrowth": 3.5
        }))
        .unwrap();

        assert_eq!(stats.total_leads, 12);
        assert_eq!(stats.completed_tasks, 2);
        assert_eq!(stats.task_completion_rate(), 25.0);
    }

    #[test]
    fn test_deserialize_snake_case_and_missing() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_leads": 3
        }))
        .unwrap();
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.task_completion_rate(), 0.0);
    }

    #[test]
    fn test_lead_analytics_reads_chart_and_aggregation_shapes() {
        let analytics: LeadAnalytics = serde_json::from_value(json!({
            "leadsByStatus": [
                {"name": "new", "value": 45, "color": "#3B82F6"},
                {"name": "won", "value": 25}
            ],
            "leads_by_source": [{"_id": "referral", "count": 7}],
            "monthlyLeads": [{"month": "Jan", "leads": 65, "converted": 12}]
        }))
        .unwrap();

        assert_eq!(analytics.leads_by_status.len(), 2);
        assert_eq!(analytics.leads_by_status[1].value, 25.0);
        assert_eq!(
            analytics.leads_by_source,
            vec![Slice {
                name: "referral".to_string(),
                value: 7.0
            }]
        );
        assert_eq!(analytics.monthly_leads[0].converted, 12.0);
    }

    #[test]
    fn test_missing_breakdowns_are_empty() {
        let leads: LeadAnalytics = serde_json::from_value(json!({})).unwrap();
        assert!(leads.is_empty());
        let properties: PropertyAnalytics =
            serde_json::from_value(json!({"unrelated": 1})).unwrap();
        assert!(properties.properties_by_type.is_empty());
    }
}
