//! Tests for reloads driven by changes to the banfile on disk:
//! - appends and overwrites are picked up without an explicit reload
//! - atomic replace (write temp file, rename over) is picked up
//! - unrelated files in the same directory do not trigger reloads

use banlist::ReloadTrigger;
use banlist_tests::{wait_for_reload, wait_until_banned, TestBanfile};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

// ============================================================================
// In-place edits
// ============================================================================

/// fail2ban appends one line per ban
#[tokio::test]
async fn test_appended_line_is_banned() {
    let banfile = TestBanfile::missing();
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();
    assert!(!handle.is_banned("127.0.0.1").await.unwrap());

    banfile.append_line("127.0.0.1");
    wait_until_banned(&handle, "127.0.0.1", true, WAIT)
        .await
        .expect("append should be picked up");

    banlist.stop().await;
}

/// Overwriting the file unbans whatever is no longer listed
#[tokio::test]
async fn test_overwrite_unbans_removed_entries() {
    let banfile = TestBanfile::with_contents("10.0.0.1\n10.0.0.2\n");
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();
    assert!(handle.is_banned("10.0.0.2").await.unwrap());

    banfile.write("10.0.0.1\n");
    wait_until_banned(&handle, "10.0.0.2", false, WAIT)
        .await
        .expect("overwrite should be picked up");
    assert!(handle.is_banned("10.0.0.1").await.unwrap());

    banlist.stop().await;
}

/// Watch-driven reloads notify subscribers with the file-change trigger
#[tokio::test]
async fn test_file_change_notifies_subscriber() {
    let banfile = TestBanfile::with_contents("");
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();

    assert!(!handle.is_banned("192.0.2.77").await.unwrap());
    let subscription = handle.subscribe_to_reload().await.unwrap();
    banfile.append_line("192.0.2.77");

    let event = wait_for_reload(subscription, WAIT).await.unwrap();
    assert_eq!(event.trigger, ReloadTrigger::FileChange);
    wait_until_banned(&handle, "192.0.2.77", true, WAIT)
        .await
        .expect("appended identifier should be banned");

    banlist.stop().await;
}

// ============================================================================
// Replacing the file
// ============================================================================

#[tokio::test]
async fn test_atomic_replace_is_picked_up() {
    let banfile = TestBanfile::with_contents("10.0.0.1\n");
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();

    banfile.replace_atomically("10.0.0.9\n");
    wait_until_banned(&handle, "10.0.0.9", true, WAIT)
        .await
        .expect("rename over banfile should be picked up");
    assert!(!handle.is_banned("10.0.0.1").await.unwrap());

    // The watch survives the inode swap
    banfile.append_line("10.0.0.10");
    wait_until_banned(&handle, "10.0.0.10", true, WAIT)
        .await
        .expect("edits after a rename should still be picked up");

    banlist.stop().await;
}

#[tokio::test]
async fn test_recreated_banfile_is_picked_up() {
    let banfile = TestBanfile::with_contents("10.0.0.1\n");
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();

    banfile.recreate("172.16.0.1\n");
    wait_until_banned(&handle, "172.16.0.1", true, WAIT)
        .await
        .expect("recreated banfile should be picked up");

    banlist.stop().await;
}

// ============================================================================
// Unrelated changes
// ============================================================================

/// Writes to other files in the watched directory never reload
#[tokio::test]
async fn test_sibling_file_does_not_trigger_reload() {
    let banfile = TestBanfile::with_contents("10.0.0.1\n");
    let mut banlist = banfile.start_default().await;
    let handle = banlist.handle();

    let mut subscription = handle.subscribe_to_reload().await.unwrap();
    banfile.write_sibling("other-list", "10.0.0.2\n");
    banfile.write_sibling("banned-ips.bak", "10.0.0.3\n");

    tokio::time::sleep(Duration::from_millis(750)).await;
    assert!(subscription.try_recv().unwrap().is_none());
    assert!(!handle.is_banned("10.0.0.2").await.unwrap());
    assert!(!handle.is_banned("10.0.0.3").await.unwrap());

    banlist.stop().await;
}
