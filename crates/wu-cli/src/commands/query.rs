//! Query command: one-shot `getWebUsageData` response.

use std::io::Write;

use anyhow::Result;

use crate::Config;
use crate::events::UsageResponse;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let response = UsageResponse {
        web_usage_data: super::load_usage(config)?,
    };
    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use wu_core::{USAGE_DATA_KEY, UsageStore};
    use wu_db::Database;

    #[test]
    fn query_prints_stored_table() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("wu.db");
        let mut db = Database::open(&db_path).unwrap();
        db.set(
            USAGE_DATA_KEY,
            serde_json::json!({"example.com": {"2025-01-15": 42}}),
        )
        .unwrap();
        drop(db);

        let config = Config {
            database_path: db_path,
            checkpoint_interval_secs: 15,
        };
        let mut output = Vec::new();
        run(&mut output, &config).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"webUsageData\":{\"example.com\":{\"2025-01-15\":42}}}\n"
        );
    }

    #[test]
    fn query_on_fresh_database_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("wu.db"),
            checkpoint_interval_secs: 15,
        };
        let mut output = Vec::new();
        run(&mut output, &config).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "{\"webUsageData\":{}}\n");
    }
}
