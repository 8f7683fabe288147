use owo_colors::OwoColorize;
use serde_json::json;
use tabled::builder::Builder;
use tabled::settings::Style;

use super::CommandOutput;
use crate::app::AppContext;
use crate::cli::OutputOptions;
use crate::error::Result;
use crate::remote::{DashboardStats, LeadAnalytics, PropertyAnalytics, Slice};
use crate::toast::Toast;

/// Show dashboard statistics and the lead and property breakdowns
///
/// The dashboard counters are required. A breakdown that fails to load is
/// reported as a warning and left out.
pub async fn cmd_stats(ctx: &AppContext, output: OutputOptions) -> Result<()> {
    let http = ctx.http()?;
    let (stats, leads, properties) = futures::join!(
        http.dashboard_stats(),
        http.lead_analytics(),
        http.property_analytics()
    );
    let stats = stats?;
    let leads = leads
        .inspect_err(|e| ctx.notifications.push(Toast::warning(e.user_message())))
        .unwrap_or_default();
    let properties = properties
        .inspect_err(|e| ctx.notifications.push(Toast::warning(e.user_message())))
        .unwrap_or_default();

    let mut json_output = serde_json::to_value(&stats)?;
    json_output["taskCompletionRate"] = json!(stats.task_completion_rate());
    json_output["leadsByStatus"] = serde_json::to_value(&leads.leads_by_status)?;
    json_output["leadsBySource"] = serde_json::to_value(&leads.leads_by_source)?;
    json_output["monthlyLeads"] = serde_json::to_value(&leads.monthly_leads)?;
    json_output["propertiesByType"] = serde_json::to_value(&properties.properties_by_type)?;

    let mut text = render_stats(&stats);
    if let Some(breakdowns) = render_breakdowns(&leads, &properties) {
        text = format!("{text}\n\n{breakdowns}");
    }

    CommandOutput::new(json_output).with_text(text).print(output)
}

fn render_stats(stats: &DashboardStats) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["Leads".to_string(), stats.total_leads.to_string()]);
    builder.push_record(["Properties".to_string(), stats.total_properties.to_string()]);
    builder.push_record([
        "Tasks".to_string(),
        format!("{} ({} completed)", stats.total_tasks, stats.completed_tasks),
    ]);
    builder.push_record([
        "Task completion".to_string(),
        format!("{:.1}%", stats.task_completion_rate()),
    ]);
    builder.push_record([
        "Lead conversion".to_string(),
        format!("{:.1}%", stats.lead_conversion_rate),
    ]);
    builder.push_record(["Monthly growth".to_string(), growth(stats.monthly_growth)]);

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n{}", "Dashboard".cyan().bold(), table)
}

fn render_breakdowns(leads: &LeadAnalytics, properties: &PropertyAnalytics) -> Option<String> {
    let mut sections = Vec::new();
    for (title, slices) in [
        ("Leads by status", &leads.leads_by_status),
        ("Leads by source", &leads.leads_by_source),
        ("Properties by type", &properties.properties_by_type),
    ] {
        if !slices.is_empty() {
            sections.push(format!("{}\n{}", title.cyan().bold(), slice_table(slices)));
        }
    }

    if !leads.monthly_leads.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Month", "Leads", "Converted"]);
        for month in &leads.monthly_leads {
            builder.push_record([
                month.month.clone(),
                month.leads.to_string(),
                month.converted.to_string(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        sections.push(format!("{}\n{}", "Monthly leads".cyan().bold(), table));
    }

    (!sections.is_empty()).then(|| sections.join("\n\n"))
}

fn slice_table(slices: &[Slice]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Name", "Count"]);
    for slice in slices {
        builder.push_record([slice.name.clone(), slice.value.to_string()]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn growth(percent: f64) -> String {
    let text = format!("{percent:+.1}%");
    if percent < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stats() {
        let stats = DashboardStats {
            total_leads: 12,
            total_tasks: 4,
            completed_tasks: 1,
            ..Default::default()
        };
        let rendered = render_stats(&stats);
        assert!(rendered.contains("Leads"));
        assert!(rendered.contains("12"));
        assert!(rendered.contains("25.0%"));
        assert!(rendered.contains("4 (1 completed)"));
    }

    #[test]
    fn test_render_breakdowns() {
        let leads = LeadAnalytics {
            leads_by_status: vec![Slice {
                name: "won".to_string(),
                value: 25.0,
            }],
            ..Default::default()
        };
        let rendered = render_breakdowns(&leads, &PropertyAnalytics::default()).unwrap();
        assert!(rendered.contains("Leads by status"));
        assert!(rendered.contains("won"));
        assert!(rendered.contains("25"));
        assert!(!rendered.contains("Properties by type"));

        assert!(render_breakdowns(&LeadAnalytics::default(), &PropertyAnalytics::default()).is_none());
    }
}
