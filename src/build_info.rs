/// Build metadata captured once at compile time.
///
/// The commit and timestamp are injected by the release build via
/// `TABLITE_COMMIT` and `TABLITE_BUILD_TIMESTAMP`; plain `cargo build`
/// produces a version-only string.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: Option<&'static str>,
    pub timestamp: Option<&'static str>,
}

impl BuildInfo {
    pub fn from_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("TABLITE_COMMIT"),
            timestamp: option_env!("TABLITE_BUILD_TIMESTAMP"),
        }
    }

    /// Version line shown by `--version`. clap prepends the binary name,
    /// so the rendered string starts with the bare version.
    pub fn render(&self) -> String {
        let mut line = String::from(self.version);
        if let Some(commit) = self.commit {
            line.push_str(" commit ");
            line.push_str(commit);
        }
        if let Some(timestamp) = self.timestamp {
            line.push_str(" built ");
            line.push_str(timestamp);
        }
        line
    }
}
