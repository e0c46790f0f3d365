//! Integration tests for visibility summaries and breadcrumb trails.

mod helpers;

use drivehub_core::types::UserId;
use drivehub_entity::{
    DirectoryPermission, DirectoryResource, GranteeIdentity, VisibilityLabel,
};

use helpers::{NOW_MS, TestDrive, directory_grant};

#[tokio::test]
async fn test_ungranted_resource_is_restricted() {
    let drive = TestDrive::new();

    let summary = drive
        .breadcrumb_deriver()
        .derive_visibility(&DirectoryResource::File(drive.notes), NOW_MS)
        .await
        .unwrap();

    assert_eq!(summary.label(), VisibilityLabel::Restricted);
}

#[tokio::test]
async fn test_visibility_label_precedence() {
    let drive = TestDrive::new();
    let deriver = drive.breadcrumb_deriver();
    let resource = DirectoryResource::File(drive.notes);

    // A private view grant alone.
    drive
        .insert_directory(directory_grant(
            resource,
            GranteeIdentity::User(UserId::new()),
            &[DirectoryPermission::View],
            false,
        ))
        .await;
    let summary = deriver.derive_visibility(&resource, NOW_MS).await.unwrap();
    assert_eq!(summary.label(), VisibilityLabel::PrivateView);

    // Adding a private modify grant upgrades the label.
    drive
        .insert_directory(directory_grant(
            resource,
            GranteeIdentity::User(UserId::new()),
            &[DirectoryPermission::Edit],
            false,
        ))
        .await;
    let summary = deriver.derive_visibility(&resource, NOW_MS).await.unwrap();
    assert_eq!(summary.label(), VisibilityLabel::PrivateModify);

    // Public view outranks any private capability.
    drive
        .insert_directory(directory_grant(
            resource,
            GranteeIdentity::Public,
            &[DirectoryPermission::View],
            false,
        ))
        .await;
    let summary = deriver.derive_visibility(&resource, NOW_MS).await.unwrap();
    assert_eq!(summary.label(), VisibilityLabel::PublicView);

    // Public modify outranks everything.
    drive
        .insert_directory(directory_grant(
            resource,
            GranteeIdentity::Public,
            &[DirectoryPermission::Upload],
            false,
        ))
        .await;
    let summary = deriver.derive_visibility(&resource, NOW_MS).await.unwrap();
    assert_eq!(summary.label(), VisibilityLabel::PublicModify);
}

#[tokio::test]
async fn test_expired_grants_do_not_count_toward_visibility() {
    let drive = TestDrive::new();
    let resource = DirectoryResource::File(drive.notes);
    let mut grant = directory_grant(
        resource,
        GranteeIdentity::Public,
        &[DirectoryPermission::View],
        false,
    );
    grant.expire_at = NOW_MS - 1;
    drive.insert_directory(grant).await;

    let summary = drive
        .breadcrumb_deriver()
        .derive_visibility(&resource, NOW_MS)
        .await
        .unwrap();

    assert_eq!(summary.label(), VisibilityLabel::Restricted);
}

#[tokio::test]
async fn test_owner_trail_reaches_drive_root_with_disk_name() {
    let drive = TestDrive::new();

    let trail = drive
        .breadcrumb_deriver()
        .breadcrumbs(
            &DirectoryResource::File(drive.notes),
            &GranteeIdentity::User(drive.owner),
            NOW_MS,
        )
        .await
        .unwrap();

    let names: Vec<&str> = trail.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Main Drive", "docs", "notes.txt"]);
    assert_eq!(trail[0].resource, DirectoryResource::Folder(drive.root));
}

#[tokio::test]
async fn test_owner_trail_stops_at_sovereign_ancestor() {
    let drive = TestDrive::new();

    let trail = drive
        .breadcrumb_deriver()
        .breadcrumbs(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(drive.owner),
            NOW_MS,
        )
        .await
        .unwrap();

    // The chain never crosses the sovereign projects folder, so the
    // drive root is absent even for the owner.
    let names: Vec<&str> = trail.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["projects", "reports", "q3.pdf"]);
}

#[tokio::test]
async fn test_trail_truncated_at_first_unviewable_ancestor() {
    let drive = TestDrive::new();
    let user = UserId::new();
    drive
        .insert_directory(directory_grant(
            DirectoryResource::Folder(drive.reports),
            GranteeIdentity::User(user),
            &[DirectoryPermission::View],
            true,
        ))
        .await;

    let trail = drive
        .breadcrumb_deriver()
        .breadcrumbs(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(user),
            NOW_MS,
        )
        .await
        .unwrap();

    // The user can view reports and everything under it, but not the
    // sovereign projects folder above, so the trail starts at reports.
    let names: Vec<&str> = trail.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["reports", "q3.pdf"]);
}

#[tokio::test]
async fn test_trail_empty_for_requester_without_any_view() {
    let drive = TestDrive::new();

    let trail = drive
        .breadcrumb_deriver()
        .breadcrumbs(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(UserId::new()),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(trail.is_empty());
}
