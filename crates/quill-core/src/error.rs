use std::fmt;

/// Machine-readable error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DataDirUnavailable,
    ImportNotJson,
    ImportShapeInvalid,
    ImportIntegrity,
    ItemNotFound,
    SnapshotCorrupt,
    StorageReadFailed,
    StorageWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    pub const ALL: [Self; 11] = [
        Self::ConfigParseError,
        Self::DataDirUnavailable,
        Self::ImportNotJson,
        Self::ImportShapeInvalid,
        Self::ImportIntegrity,
        Self::ItemNotFound,
        Self::SnapshotCorrupt,
        Self::StorageReadFailed,
        Self::StorageWriteFailed,
        Self::LockContention,
        Self::InternalUnexpected,
    ];

    /// Stable code identifier (`Q####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Q1001",
            Self::DataDirUnavailable => "Q1002",
            Self::ImportNotJson => "Q2001",
            Self::ImportShapeInvalid => "Q2002",
            Self::ImportIntegrity => "Q2003",
            Self::ItemNotFound => "Q2004",
            Self::SnapshotCorrupt => "Q3001",
            Self::StorageReadFailed => "Q5001",
            Self::StorageWriteFailed => "Q5002",
            Self::LockContention => "Q5003",
            Self::InternalUnexpected => "Q9001",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DataDirUnavailable => "No data directory available",
            Self::ImportNotJson => "Import file is not valid JSON",
            Self::ImportShapeInvalid => "Import file is not a Quill backup",
            Self::ImportIntegrity => "Import file fails integrity checks",
            Self::ItemNotFound => "Item not found",
            Self::SnapshotCorrupt => "Stored snapshot is corrupt",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for the terminal.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .quill/config.toml and retry."),
            Self::DataDirUnavailable => Some("Pass --data-dir or set QUILL_DATA_DIR."),
            Self::ImportNotJson | Self::ImportShapeInvalid => {
                Some("Import a file produced by `quill export`.")
            }
            Self::ImportIntegrity => {
                Some("Run `quill verify` on the source, or import without --strict.")
            }
            Self::ItemNotFound => Some("Run `quill show` to list ids."),
            Self::SnapshotCorrupt => Some("Restore from an export, or run `quill reset`."),
            Self::StorageReadFailed | Self::StorageWriteFailed => {
                Some("Check disk space and permissions on the data directory.")
            }
            Self::LockContention => Some("Retry after the other `quill` process finishes."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
