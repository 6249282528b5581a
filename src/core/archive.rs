//! Timestamped CSV snapshots under the archive directory.

use crate::domain::model::{MarketOdds, MatchupRecord, Snapshot};
use crate::domain::ports::{Storage, StoredFile};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MATCHUP_COLUMNS: [&str; 10] = [
    "TournamentName",
    "Round",
    "Player1Name",
    "Player2Name",
    "Player1_Match_Prob",
    "Player2_Match_Prob",
    "Player1_Match_Odds",
    "Player2_Match_Odds",
    "Player1_Market_Odds",
    "Player2_Market_Odds",
];

pub const MARKET_ODDS_COLUMNS: [&str; 5] = [
    "Source",
    "Player1Name",
    "Player2Name",
    "Player1_Odds",
    "Player2_Odds",
];

/// `<prefix>_<YYYYMMDD>_<HHMMSS>.csv`
pub fn snapshot_file_name(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}_{}.csv", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

pub fn snapshot_path(dir: &str, prefix: &str, timestamp: DateTime<Utc>) -> String {
    let name = snapshot_file_name(prefix, timestamp);
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        name
    } else {
        format!("{}/{}", dir, name)
    }
}

/// 對應 glob `<prefix>_*.csv`
pub fn matches_prefix(prefix: &str, file_name: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| rest.ends_with(".csv"))
}

/// 修改時間最新者勝出；時間相同時取檔名較大者
pub async fn find_latest<S: Storage>(storage: &S, dir: &str, prefix: &str) -> Result<Option<StoredFile>> {
    let files = storage.list_files(dir).await?;
    tracing::debug!("Searching {} files in '{}' for {}_*.csv", files.len(), dir, prefix);

    Ok(files
        .into_iter()
        .filter(|f| matches_prefix(prefix, &f.name))
        .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name))))
}

pub async fn load_latest<S: Storage>(storage: &S, dir: &str, prefix: &str) -> Result<Option<Snapshot>> {
    let Some(latest) = find_latest(storage, dir, prefix).await? else {
        return Ok(None);
    };
    tracing::info!("📂 Found latest snapshot: {}", latest.path);
    let contents = storage.read_file(&latest.path).await?;
    Ok(Some(Snapshot {
        path: latest.path,
        contents,
    }))
}

/// 以固定表頭寫出 CSV；沒有資料列時也會寫出表頭
pub fn to_csv_bytes<T: Serialize>(headers: &[&str], records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::EtlError::IoError(e.into_error()))
}

pub fn matchups_to_csv(records: &[MatchupRecord]) -> Result<Vec<u8>> {
    to_csv_bytes(&MATCHUP_COLUMNS, records)
}

pub fn market_odds_to_csv(records: &[MarketOdds]) -> Result<Vec<u8>> {
    to_csv_bytes(&MARKET_ODDS_COLUMNS, records)
}

/// 讀回對戰快照；舊快照缺少市場賠率欄位時視為空值
pub fn read_matchups(contents: &[u8]) -> Result<Vec<MatchupRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_names_embed_utc_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 6, 5, 9).unwrap();
        assert_eq!(
            snapshot_file_name("sackmann_matchups", ts),
            "sackmann_matchups_20261019_060509.csv"
        );
        assert_eq!(
            snapshot_path("data_archive/", "market_odds", ts),
            "data_archive/market_odds_20261019_060509.csv"
        );
        assert_eq!(snapshot_path(".", "market_odds", ts), "market_odds_20261019_060509.csv");
    }

    #[test]
    fn test_matches_prefix() {
        assert!(matches_prefix("sackmann_matchups", "sackmann_matchups_20261019_060509.csv"));
        assert!(!matches_prefix("sackmann_matchups", "sackmann_matchups.csv"));
        assert!(!matches_prefix("sackmann_matchups", "sackmann_matchups_20261019.tsv"));
        assert!(!matches_prefix("sackmann_matchups", "market_odds_20261019.csv"));
    }

    #[tokio::test]
    async fn test_find_latest_breaks_mtime_ties_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        for name in [
            "sackmann_matchups_20261017_060000.csv",
            "sackmann_matchups_20261019_060000.csv",
            "sackmann_matchups_20261018_060000.csv",
            "market_odds_20261020_060000.csv",
        ] {
            storage
                .write_file(&format!("data_archive/{}", name), b"x")
                .await
                .unwrap();
        }

        // 統一修改時間，讓檔名決定勝負
        let fixed = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        for entry in std::fs::read_dir(dir.path().join("data_archive")).unwrap() {
            let file = std::fs::File::options()
                .write(true)
                .open(entry.unwrap().path())
                .unwrap();
            file.set_modified(fixed).unwrap();
        }

        let latest = find_latest(&storage, "data_archive", "sackmann_matchups")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.name, "sackmann_matchups_20261019_060000.csv");
    }

    #[tokio::test]
    async fn test_find_latest_prefers_newer_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .write_file("data_archive/sackmann_matchups_20991231_000000.csv", b"old")
            .await
            .unwrap();
        storage
            .write_file("data_archive/sackmann_matchups_20000101_000000.csv", b"new")
            .await
            .unwrap();

        let old = std::fs::File::options()
            .write(true)
            .open(dir.path().join("data_archive/sackmann_matchups_20991231_000000.csv"))
            .unwrap();
        old.set_modified(std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000))
            .unwrap();

        let snapshot = load_latest(&storage, "data_archive", "sackmann_matchups")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.contents, b"new");
    }

    #[tokio::test]
    async fn test_no_snapshot_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(load_latest(&storage, "data_archive", "sackmann_matchups")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_csv_roundtrip_keeps_optional_columns() {
        let mut record = MatchupRecord::new("Paris", "QF", "Jannik Sinner", "Ben Shelton", Some(70.0), None);
        record.player1_market_odds = Some(1.4);
        let bytes = matchups_to_csv(&[record.clone()]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert!(text.starts_with("TournamentName,Round,Player1Name,Player2Name,Player1_Match_Prob"));
        assert_eq!(read_matchups(&bytes).unwrap(), vec![record]);
    }

    #[test]
    fn test_empty_snapshot_has_header_only() {
        let text = String::from_utf8(matchups_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_matchups(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_reads_snapshots_without_market_columns() {
        let legacy = "TournamentName,Round,Player1Name,Player2Name,Player1_Match_Prob,Player2_Match_Prob,Player1_Match_Odds,Player2_Match_Odds\n\
                      Paris,R16,Casper Ruud,Holger Rune,52.0,48.0,1.92,2.08\n";
        let records = read_matchups(legacy.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player2_odds, Some(2.08));
        assert_eq!(records[0].player1_market_odds, None);
    }
}
