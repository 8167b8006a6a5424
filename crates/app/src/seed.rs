use std::path::Path;

use tracing::info;

const SAMPLE_UNITS: [(&str, &str); 3] = [
    (
        "unit1.csv",
        "No,EN,JA\n1,Hello,こんにちは\n2,Good morning,おはようございます\n3,Good evening,こんばんは\n4,Goodbye,さようなら\n",
    ),
    (
        "unit2.csv",
        "No,EN,JA\n1,Thank you,ありがとう\n2,Excuse me,すみません\n3,Yes,はい\n4,No,いいえ\n",
    ),
    (
        "unit3.csv",
        "No,EN,JA\n1,Where is the station?,駅はどこですか\n2,How much is this?,これはいくらですか\n3,I don't understand,わかりません\n",
    ),
];

/// Write sample unit files into `data_dir`, leaving existing files alone.
/// Returns how many files were written.
///
/// # Errors
///
/// Returns an I/O error if the directory or a file cannot be written.
pub async fn write_samples(data_dir: &Path) -> std::io::Result<usize> {
    tokio::fs::create_dir_all(data_dir).await?;
    let mut written = 0;
    for (name, contents) in SAMPLE_UNITS {
        let path = data_dir.join(name);
        if tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "keeping existing unit file");
            continue;
        }
        tokio::fs::write(&path, contents).await?;
        info!(path = %path.display(), "wrote sample unit file");
        written += 1;
    }
    Ok(written)
}
