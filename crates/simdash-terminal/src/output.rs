//! Output formatting for the dashboard
//!
//! Two formatters render a [`DashboardFrame`] snapshot:
//! - [`TableFormatter`] draws text charts and `prettytable` tables for the
//!   terminal
//! - [`JsonFormatter`] emits the frame as JSON for scripting
//!
//! Unit conversion and currency rounding happen here and nowhere else.

use crate::charts::{Series, bar_chart};
use crate::frame::DashboardFrame;
use colored::*;
use prettytable::{Table, format, row};
use serde_json::json;
use simdash_core::presenter::SyncOutcome;
use simdash_core::types::{DatacenterStat, ProviderId, ProviderRate, Summary, VmStat};
use simdash_core::work_unit::{Reading, WorkUnit};
use simdash_pricing::RateSource;
use tracing::error;

const MIB: f64 = 1_048_576.0;
const GIB: f64 = 1_073_741_824.0;

/// Scale from raw RAM bytes to the table's RAM unit
const TABLE_RAM_SCALE: f64 = 10.0;

/// Scale from raw storage bytes to the table's storage unit
const TABLE_STORAGE_SCALE: f64 = 90_000.0;

/// Default chart width when the terminal size is unknown
const DEFAULT_WIDTH: usize = 100;

/// Formats dashboard snapshots and auxiliary tables
pub trait OutputFormatter {
    /// Render the whole dashboard
    fn format_frame(&self, frame: &DashboardFrame) -> String;

    /// Render the resolved rate table
    fn format_pricing(&self, entries: &[(ProviderId, ProviderRate, RateSource)]) -> String;

    /// Render the VM table
    fn format_vms(&self, vms: &[VmStat]) -> String;
}

/// Human-readable terminal output
pub struct TableFormatter {
    /// Whether to emit ANSI colors
    pub colored_output: bool,
    /// Total line width for charts
    pub width: usize,
}

impl TableFormatter {
    pub fn new(colored_output: bool) -> Self {
        let width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH)
            .clamp(60, 160);
        Self {
            colored_output,
            width,
        }
    }

    fn format_currency(amount: f64) -> String {
        format!("${amount:.2}")
    }

    fn format_reading(reading: &Reading) -> String {
        match reading.value() {
            Some(v) => format!("{v:.2}"),
            None => "n/a".to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.colored_output {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn status_line(&self, frame: &DashboardFrame) -> String {
        let stamp = frame
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        let Some(outcome) = &frame.last_outcome else {
            return format!("Last updated: {stamp}");
        };

        let text = outcome.to_string();
        let text = if !self.colored_output {
            text
        } else {
            match outcome {
                SyncOutcome::Updated { .. } => text.green().to_string(),
                SyncOutcome::Partial { .. } | SyncOutcome::Discarded { .. } => {
                    text.yellow().to_string()
                }
                SyncOutcome::Failed { .. } => text.red().to_string(),
            }
        };

        let run = if frame.run_enabled {
            "ready"
        } else {
            "running"
        };
        format!("Last updated: {stamp} | {text} | run: {run}")
    }

    fn format_summary(summary: &Summary) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Datacenters",
            b -> "Hosts",
            b -> "VMs",
            b -> "Cloudlets",
            b -> "Completed",
            b -> "Avg Exec (s)",
            b -> "Avg Wait (s)"
        ]);
        table.add_row(row![
            r -> summary.num_datacenters,
            r -> summary.num_hosts,
            r -> summary.num_vms,
            r -> summary.total_cloudlets,
            r -> summary.completed_cloudlets,
            r -> format!("{:.2}", summary.avg_execution_time),
            r -> format!("{:.2}", summary.avg_wait_time)
        ]);
        table.to_string()
    }

    fn format_datacenters(rows: &[DatacenterStat]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Datacenter",
            b -> "Hosts",
            b -> "PEs",
            b -> "RAM",
            b -> "Storage",
            b -> "Bandwidth"
        ]);
        for dc in rows {
            table.add_row(row![
                format!("Datacenter {}", dc.id),
                r -> dc.num_hosts,
                r -> dc.total_pes,
                r -> format!("{:.2}", table_ram(dc.total_ram)),
                r -> format!("{:.2}", table_storage(dc.total_storage)),
                r -> format!("{:.2}", table_bandwidth(dc.total_bandwidth))
            ]);
        }
        table.to_string()
    }

    fn format_work_units(rows: &[WorkUnit]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "ID",
            b -> "VM",
            b -> "Datacenter",
            b -> "PEs",
            b -> "Length",
            b -> "Start",
            b -> "Finish",
            b -> "Exec Time",
            b -> "Status"
        ]);
        for unit in rows {
            table.add_row(row![
                r -> unit.id,
                r -> unit.vm_id,
                r -> unit.datacenter_id,
                r -> Self::format_reading(&unit.pes),
                r -> unit.length,
                r -> format!("{:.2}", unit.start_time),
                r -> format!("{:.2}", unit.finish_time),
                r -> Self::format_reading(&unit.execution_time),
                unit.status.to_string()
            ]);
        }
        table.to_string()
    }
}

/// Table RAM column, in the backend's logical units
pub fn table_ram(total_ram: u64) -> f64 {
    total_ram as f64 / MIB * TABLE_RAM_SCALE
}

/// Table storage column, in the backend's logical units
pub fn table_storage(total_storage: u64) -> f64 {
    total_storage as f64 / GIB * TABLE_STORAGE_SCALE
}

/// Table bandwidth column, in the backend's logical units
pub fn table_bandwidth(total_bandwidth: u64) -> f64 {
    total_bandwidth as f64 / MIB
}

impl OutputFormatter for TableFormatter {
    fn format_frame(&self, frame: &DashboardFrame) -> String {
        let mut output = String::new();

        output.push_str(&self.status_line(frame));
        output.push_str("\n\n");

        output.push_str(&self.heading("Simulation Summary"));
        output.push('\n');
        match &frame.summary {
            Some(summary) => output.push_str(&Self::format_summary(summary)),
            None => output.push_str("  (no summary)\n"),
        }
        output.push('\n');

        if let Some(resource) = &frame.resource {
            let pes: Vec<Option<f64>> = resource.pes.iter().copied().map(Some).collect();
            let ram: Vec<Option<f64>> = resource.ram_gb.iter().copied().map(Some).collect();
            output.push_str(&bar_chart(
                &self.heading("Resource Distribution"),
                &resource.labels,
                &[
                    Series {
                        name: "PEs",
                        values: &pes,
                    },
                    Series {
                        name: "RAM (GB)",
                        values: &ram,
                    },
                ],
                self.width,
                |v| format!("{v:.2}"),
            ));
            output.push('\n');
        }

        if let Some(execution) = &frame.execution {
            output.push_str(&bar_chart(
                &self.heading("Execution Time (s)"),
                &execution.labels,
                &[Series {
                    name: "",
                    values: &execution.exec_times,
                }],
                self.width,
                |v| format!("{v:.2}"),
            ));
            output.push('\n');
        }

        if let Some(cost) = &frame.cost {
            let amounts: Vec<Option<f64>> = cost.costs.iter().map(|c| c.amount()).collect();
            let title = format!("Price Consumed ({})", cost.provider.as_str().to_uppercase());
            output.push_str(&bar_chart(
                &self.heading(&title),
                &cost.labels,
                &[Series {
                    name: "",
                    values: &amounts,
                }],
                self.width,
                Self::format_currency,
            ));
            let total: f64 = amounts.iter().flatten().sum();
            output.push_str(&format!("  Total: {}\n\n", Self::format_currency(total)));
        }

        if let Some(datacenters) = &frame.datacenters {
            output.push_str(&self.heading("Datacenters"));
            output.push('\n');
            output.push_str(&Self::format_datacenters(datacenters));
            output.push('\n');
        }

        if let Some(units) = &frame.work_units {
            output.push_str(&self.heading("Cloudlets"));
            output.push('\n');
            output.push_str(&Self::format_work_units(units));
        }

        output
    }

    fn format_pricing(&self, entries: &[(ProviderId, ProviderRate, RateSource)]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Provider",
            b -> "PE Cost",
            b -> "RAM Cost",
            b -> "Time Unit (s)",
            b -> "Source"
        ]);
        for (provider, rate, source) in entries {
            table.add_row(row![
                provider,
                r -> format!("{:.4}", rate.pe_cost),
                r -> format!("{:.4}", rate.ram_cost),
                r -> rate.time_unit,
                source
            ]);
        }
        table.to_string()
    }

    fn format_vms(&self, vms: &[VmStat]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "VM",
            b -> "Host",
            b -> "Datacenter",
            b -> "PEs",
            b -> "MIPS",
            b -> "RAM",
            b -> "Storage",
            b -> "Bandwidth"
        ]);
        for vm in vms {
            table.add_row(row![
                r -> vm.id,
                r -> vm.host_id,
                r -> vm.datacenter_id,
                r -> vm.pes,
                r -> format!("{:.2}", vm.mips),
                r -> vm.ram,
                r -> vm.storage,
                r -> vm.bandwidth
            ]);
        }
        table.to_string()
    }
}

/// Machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    fn to_pretty(value: &serde_json::Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            error!("Failed to serialize output: {}", e);
            "{}".to_string()
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_frame(&self, frame: &DashboardFrame) -> String {
        let value = serde_json::to_value(frame).unwrap_or_else(|e| {
            error!("Failed to serialize frame: {}", e);
            serde_json::Value::Null
        });
        Self::to_pretty(&value)
    }

    fn format_pricing(&self, entries: &[(ProviderId, ProviderRate, RateSource)]) -> String {
        let output = json!({
            "providers": entries.iter().map(|(provider, rate, source)| json!({
                "provider": provider,
                "peCost": rate.pe_cost,
                "ramCost": rate.ram_cost,
                "timeUnit": rate.time_unit,
                "source": source,
            })).collect::<Vec<_>>(),
        });
        Self::to_pretty(&output)
    }

    fn format_vms(&self, vms: &[VmStat]) -> String {
        Self::to_pretty(&json!({ "vms": vms }))
    }
}

/// Pick a formatter
///
/// Colors are only used for table output and only when `colored_output` is
/// set; callers decide that from `NO_COLOR` and whether stdout is a terminal.
pub fn get_formatter(json: bool, colored_output: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(colored_output))
    }
}
