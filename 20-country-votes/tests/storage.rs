use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use country_votes::store::{VoteKind, VoteStore, VoteTally};

#[tokio::test]
async fn votes_survive_reopening_the_database() -> Result<()> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let file_name = format!("country-votes-{}-{nanos}.db", std::process::id());
    let path = std::env::temp_dir().join(file_name);
    let url = format!("sqlite://{}", path.display());

    {
        let store = VoteStore::connect(&url).await?;
        store.record("Kenya", VoteKind::Like).await?;
        store.record("Kenya", VoteKind::Dislike).await?;
        store.record("Kenya", VoteKind::Like).await?;
    }

    let reopened = VoteStore::connect(&url).await?;
    assert_eq!(
        reopened.tally("Kenya").await?,
        VoteTally {
            likes: 2,
            dislikes: 1
        }
    );

    drop(reopened);
    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[tokio::test]
async fn concurrent_votes_are_all_counted() -> Result<()> {
    let store = VoteStore::in_memory().await?;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let kind = if i % 4 == 0 {
            VoteKind::Dislike
        } else {
            VoteKind::Like
        };
        tasks.push(tokio::spawn(async move { store.record("Nepal", kind).await }));
    }
    for task in tasks {
        task.await??;
    }

    assert_eq!(store.count("Nepal", VoteKind::Like).await?, 15);
    assert_eq!(store.count("Nepal", VoteKind::Dislike).await?, 5);
    Ok(())
}
