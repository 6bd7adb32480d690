//! Checksummed multi-entry container format.
//!
//! Layout (all lengths are placeholders closed once their content is known):
//! - header: magic `WKC1`, version u8, flags u8, created_at i64 BE, entry
//!   count u32 BE
//! - per entry: record length u32 BE (excluding itself), name length u16 BE,
//!   UTF-8 name, payload length u32 LE, payload, payload CRC-32 u32 BE
//! - trailer: CRC-32 of every preceding byte, u32 LE
//!
//! The module follows the layered structure used across the crate:
//! - `layout`: constants and sizes
//! - `reader`: byte conventions and stream sniffing
//! - `parser`: structural validation into [`Container`]
//! - `writer`: [`ContainerWriter`]
//! - `report`: serializable summaries
//!
//! Version française (résumé):
//! Format de conteneur avec en-tête, enregistrements préfixés par leur
//! longueur et CRC-32 par entrée et global. Les erreurs de structure sont
//! fatales, les erreurs de somme de contrôle sont signalées.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod report;
pub mod writer;

pub use error::ContainerError;
pub use parser::{Container, Entry, parse_container};
pub use reader::{is_container_magic, read_magic};
pub use report::{
    ContainerReport, ContainerSummary, EntrySummary, InputInfo, REPORT_VERSION, ToolInfo,
    build_report,
};
pub use writer::{ContainerOptions, ContainerWriter};
