//! Removal of stale per-session databases

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use crate::config::CliConfig;

const SESSION_PREFIX: &str = "ontology_";
const SIDE_FILE_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

fn is_session_db(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(SESSION_PREFIX) && name.ends_with(".db"))
}

/// Session databases in `dir` last modified before `now - max_age`.
pub async fn find_stale(dir: &Path, max_age: Duration, now: SystemTime) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(stale);
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read output directory: {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_session_db(&path) {
            continue;
        }
        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable session database");
                continue;
            }
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            debug!(path = %path.display(), age_secs = age.as_secs(), "Stale session database");
            stale.push(path);
        }
    }
    stale.sort();
    Ok(stale)
}

async fn remove_with_side_files(path: &Path) -> Result<()> {
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Failed to remove {}", path.display()))?;

    for suffix in SIDE_FILE_SUFFIXES {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if tokio::fs::try_exists(&side).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(&side).await {
                warn!(path = %side.display(), error = %e, "Failed to remove side file");
            }
        }
    }
    Ok(())
}

/// Age limit for `hours`, saturating instead of wrapping.
fn max_age(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

pub async fn execute(config: CliConfig, max_age_hours: u64, dry_run: bool) -> Result<()> {
    let dir = &config.taxon.storage.output_dir;
    let max_age = max_age(max_age_hours);
    let stale = find_stale(dir, max_age, SystemTime::now()).await?;

    if dry_run {
        for path in &stale {
            println!("would remove {}", path.display());
        }
        println!("{} session databases older than {}h", stale.len(), max_age_hours);
        return Ok(());
    }

    let mut removed = 0;
    for path in &stale {
        match remove_with_side_files(path).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(error = %e, "Cleanup skipped a file"),
        }
    }
    println!(
        "{} Removed {} stale session databases from {}",
        "Cleanup:".green().bold(),
        removed,
        dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_session_db_names() {
        assert!(is_session_db(Path::new("out/ontology_abc.db")));
        assert!(!is_session_db(Path::new("out/ontology_abc.db-wal")));
        assert!(!is_session_db(Path::new("out/taxonomy.db")));
    }

    #[tokio::test]
    async fn test_find_and_remove_stale() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("ontology_old.db");
        fs::write(&db, b"x").unwrap();
        fs::write(dir.path().join("ontology_old.db-wal"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        // Pretend it is two hours later.
        let later = SystemTime::now() + Duration::from_secs(7200);
        let stale = find_stale(dir.path(), Duration::from_secs(3600), later)
            .await
            .unwrap();
        assert_eq!(stale, vec![db.clone()]);

        assert!(find_stale(dir.path(), Duration::from_secs(3600), SystemTime::now())
            .await
            .unwrap()
            .is_empty());

        remove_with_side_files(&db).await.unwrap();
        assert!(!db.exists());
        assert!(!dir.path().join("ontology_old.db-wal").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_huge_age_keeps_everything() {
        assert_eq!(max_age(2), Duration::from_secs(7200));
        assert_eq!(max_age(u64::MAX), Duration::from_secs(u64::MAX));

        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("ontology_fresh.db"), b"x").unwrap();
        let later = SystemTime::now() + Duration::from_secs(7200);
        let stale = find_stale(dir.path(), max_age(u64::MAX / 2), later)
            .await
            .unwrap();
        assert!(stale.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_entry_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let old = dir.path().join("ontology_old.db");
        fs::write(&old, b"x").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("gone.db"),
            dir.path().join("ontology_broken.db"),
        )
        .unwrap();

        let later = SystemTime::now() + Duration::from_secs(7200);
        let stale = find_stale(dir.path(), Duration::from_secs(3600), later)
            .await
            .unwrap();
        assert_eq!(stale, vec![old]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let stale = find_stale(
            Path::new("/no/such/output/dir"),
            Duration::ZERO,
            SystemTime::now(),
        )
        .await
        .unwrap();
        assert!(stale.is_empty());
    }
}
