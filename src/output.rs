//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{App, Job, Organization, ServiceInstance, Space};

/// Trait for human-readable key-value output.
///
/// Implemented by resource types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for App {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.guid.len().max(30));

        let mut lines = vec![
            format!("App: {}", self.name),
            divider,
            format!("GUID:           {}", self.guid),
            format!("State:          {}", self.state),
        ];

        if let Some(ref lifecycle) = self.lifecycle {
            lines.push(format!("Lifecycle:      {}", lifecycle.lifecycle_type));
        }

        if let Some(space) = self.space_guid() {
            lines.push(format!("Space:          {}", space));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!(
                "Created:        {}",
                created.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Organization {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.guid.len().max(30));

        let mut lines = vec![
            format!("Organization: {}", self.name),
            divider,
            format!("GUID:           {}", self.guid),
        ];

        if self.suspended {
            lines.push("Status:         suspended".to_string());
        }

        if let Some(quota) = self.quota_guid() {
            lines.push(format!("Quota:          {}", quota));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Space {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.guid.len().max(30));

        let mut lines = vec![
            format!("Space: {}", self.name),
            divider,
            format!("GUID:           {}", self.guid),
        ];

        if let Some(org) = self.organization_guid() {
            lines.push(format!("Organization:   {}", org));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ServiceInstance {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.guid.len().max(30));

        let mut lines = vec![
            format!("Service Instance: {}", self.name),
            divider,
            format!("GUID:           {}", self.guid),
            format!("Type:           {}", self.instance_type),
        ];

        if let Some(ref last) = self.last_operation {
            lines.push(format!(
                "Last Operation: {} {}",
                last.operation_type, last.state
            ));
            if let Some(ref description) = last.description {
                lines.push(format!("Detail:         {}", description));
            }
        }

        if !self.tags.is_empty() {
            lines.push(format!("Tags:           {}", self.tags.join(", ")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Job {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.guid.len().max(30));

        let mut lines = vec![
            format!("Job: {}", self.operation),
            divider,
            format!("GUID:           {}", self.guid),
            format!("State:          {}", self.state),
        ];

        for error in &self.errors {
            lines.push(format!("Error:          {}: {}", error.title, error.detail));
        }

        for warning in &self.warnings {
            lines.push(format!("Warning:        {}", warning.detail));
        }

        lines.join("\n")
    }
}
