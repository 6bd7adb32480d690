use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::parser::Container;

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Summary of a container, suitable for JSON output.
///
/// # Examples
/// ```
/// use wirekit_core::container::{ContainerWriter, REPORT_VERSION, build_report, parse_container};
///
/// let mut writer = ContainerWriter::new(0);
/// writer.add_entry("a", b"abc")?;
/// let bytes = writer.finish()?;
/// let container = parse_container(&bytes)?;
///
/// let report = build_report(&container, "a.wkc", bytes.len() as u64);
/// assert_eq!(report.report_version, REPORT_VERSION);
/// assert_eq!(report.container.created_at.as_deref(), Some("1970-01-01T00:00:00Z"));
/// assert!(!report.has_corruption());
/// # Ok::<(), wirekit_core::container::ContainerError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    pub container: ContainerSummary,
    /// Entries in file order.
    pub entries: Vec<EntrySummary>,
}

impl ContainerReport {
    pub fn has_corruption(&self) -> bool {
        !self.container.trailer_ok || self.container.corrupted_entries > 0
    }
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "wirekit").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided by the caller.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub format_version: u8,
    /// RFC3339 creation time; absent when the stored value is out of range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub entry_count: usize,
    pub payload_bytes: u64,
    /// Stored trailer CRC-32, lowercase hex.
    pub trailer_crc32: String,
    pub trailer_ok: bool,
    pub corrupted_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub index: u32,
    pub name: String,
    pub size: u64,
    /// Stored CRC-32, lowercase hex.
    pub crc32: String,
    pub crc_ok: bool,
    /// CRC-32 of the payload as read, present only on mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_crc32: Option<String>,
}

pub fn build_report(
    container: &Container<'_>,
    input_path: &str,
    input_bytes: u64,
) -> ContainerReport {
    let entries: Vec<EntrySummary> = container
        .entries
        .iter()
        .map(|entry| EntrySummary {
            index: entry.index,
            name: entry.name.to_string(),
            size: entry.payload.len() as u64,
            crc32: hex_crc(entry.stored_crc),
            crc_ok: entry.crc_ok(),
            computed_crc32: (!entry.crc_ok()).then(|| hex_crc(entry.computed_crc)),
        })
        .collect();
    ContainerReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "wirekit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        container: ContainerSummary {
            format_version: container.version,
            created_at: unix_to_rfc3339(container.created_at),
            entry_count: entries.len(),
            payload_bytes: container.payload_bytes(),
            trailer_crc32: hex_crc(container.stored_crc),
            trailer_ok: container.trailer_ok(),
            corrupted_entries: container.corrupted_entries().count(),
        },
        entries,
    }
}

fn hex_crc(value: u32) -> String {
    format!("{value:08x}")
}

fn unix_to_rfc3339(seconds: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .ok()?
        .format(&Rfc3339)
        .ok()
}
