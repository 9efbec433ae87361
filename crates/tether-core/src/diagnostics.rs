//! Environment / compatibility diagnostics.
//!
//! 外部コラボレータ（thin glue）。ビルド環境の情報をログに出すだけで、
//! コアの制御フローには一切影響しません。

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    pub crate_version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl EnvironmentReport {
    pub fn collect() -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            crate_version = self.crate_version,
            os = self.os,
            arch = self.arch,
            "tether environment"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_build_info() {
        let report = EnvironmentReport::collect();
        assert!(!report.crate_version.is_empty());
        assert!(!report.os.is_empty());

        // Serializes for status views / manual diagnostics.
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["crate_version"], report.crate_version);
    }
}
