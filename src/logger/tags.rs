/// Log tags, one per subsystem.
///
/// The tag controls both the colored prefix in console output and the
/// `--debug-<key>` flag that enables debug logging for that subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Api,
    Rpc,
    SolPrice,
    Migration,
    Enrich,
    Scoring,
    Monitor,
    Webserver,
    Stream,
    Test,
}

impl LogTag {
    /// Fixed-width display name used in the console prefix.
    pub fn display_name(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Api => "API",
            LogTag::Rpc => "RPC",
            LogTag::SolPrice => "SOLPRICE",
            LogTag::Migration => "MIGRATION",
            LogTag::Enrich => "ENRICH",
            LogTag::Scoring => "SCORING",
            LogTag::Monitor => "MONITOR",
            LogTag::Webserver => "WEBSERVER",
            LogTag::Stream => "STREAM",
            LogTag::Test => "TEST",
        }
    }

    /// Key used for `--debug-<key>` command-line gating.
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Api => "api",
            LogTag::Rpc => "rpc",
            LogTag::SolPrice => "solprice",
            LogTag::Migration => "migration",
            LogTag::Enrich => "enrich",
            LogTag::Scoring => "scoring",
            LogTag::Monitor => "monitor",
            LogTag::Webserver => "webserver",
            LogTag::Stream => "stream",
            LogTag::Test => "test",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
