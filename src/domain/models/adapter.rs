//! Adapter identity models.
//!
//! Every adapter speaks one protocol and moves data in one direction:
//! inbound adapters pull data from an external system, outbound adapters
//! push data to one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The protocol family an adapter speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    File,
    Ftp,
    Sftp,
    Http,
    Rest,
    Soap,
    Jdbc,
    Kafka,
    IbmMq,
    Mail,
    Idoc,
    Odata,
    Rfc,
}

impl AdapterKind {
    /// Returns the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Ftp => "ftp",
            Self::Sftp => "sftp",
            Self::Http => "http",
            Self::Rest => "rest",
            Self::Soap => "soap",
            Self::Jdbc => "jdbc",
            Self::Kafka => "kafka",
            Self::IbmMq => "ibm_mq",
            Self::Mail => "mail",
            Self::Idoc => "idoc",
            Self::Odata => "odata",
            Self::Rfc => "rfc",
        }
    }

    /// Parse a kind from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "file" => Some(Self::File),
            "ftp" => Some(Self::Ftp),
            "sftp" => Some(Self::Sftp),
            "http" => Some(Self::Http),
            "rest" => Some(Self::Rest),
            "soap" => Some(Self::Soap),
            "jdbc" => Some(Self::Jdbc),
            "kafka" => Some(Self::Kafka),
            "ibm_mq" | "ibmmq" | "mq" => Some(Self::IbmMq),
            "mail" | "email" => Some(Self::Mail),
            "idoc" => Some(Self::Idoc),
            "odata" => Some(Self::Odata),
            "rfc" => Some(Self::Rfc),
            _ => None,
        }
    }

    /// Whether inbound adapters of this kind need the polling scheduler.
    ///
    /// Protocols with a native push transport deliver on their own.
    pub fn requires_polling(&self) -> bool {
        matches!(
            self,
            Self::File
                | Self::Ftp
                | Self::Sftp
                | Self::Jdbc
                | Self::Kafka
                | Self::IbmMq
                | Self::Mail
        )
    }

    /// Whether outbound adapters of this kind can batch payloads.
    pub fn supports_batching(&self) -> bool {
        matches!(
            self,
            Self::File | Self::Ftp | Self::Sftp | Self::Rest | Self::Http | Self::Mail
        )
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The data-flow direction of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterDirection {
    /// Pulls data from an external system.
    Inbound,
    /// Pushes data to an external system.
    Outbound,
}

impl AdapterDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Parse a direction from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inbound" | "in" | "sender" => Some(Self::Inbound),
            "outbound" | "out" | "receiver" => Some(Self::Outbound),
            _ => None,
        }
    }

    pub fn is_inbound(&self) -> bool {
        matches!(self, Self::Inbound)
    }
}

impl fmt::Display for AdapterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
