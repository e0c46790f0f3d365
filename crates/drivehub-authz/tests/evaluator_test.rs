//! Integration tests for the directory and system permission evaluators.

mod helpers;

use std::collections::BTreeSet;

use drivehub_core::error::ErrorKind;
use drivehub_core::types::{GroupId, PlaceholderId, UserId};
use drivehub_entity::{
    DirectoryPermission, DirectoryResource, GranteeIdentity, SystemPermission, SystemResource,
};

use helpers::{NOW_MS, TestDrive, directory_grant, system_grant};

#[tokio::test]
async fn test_owner_bypass_returns_full_set_without_grants() {
    let drive = TestDrive::new();
    let evaluator = drive.directory_evaluator();

    let perms = evaluator
        .evaluate(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(drive.owner),
            NOW_MS,
        )
        .await
        .unwrap();

    assert_eq!(perms, DirectoryPermission::all());
}

#[tokio::test]
async fn test_direct_user_grant_applies() {
    let drive = TestDrive::new();
    let user = UserId::new();
    drive
        .insert_directory(directory_grant(
            DirectoryResource::File(drive.q3),
            GranteeIdentity::User(user),
            &[DirectoryPermission::View, DirectoryPermission::Edit],
            false,
        ))
        .await;

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(user),
            NOW_MS,
        )
        .await
        .unwrap();

    assert_eq!(
        perms,
        [DirectoryPermission::View, DirectoryPermission::Edit]
            .into_iter()
            .collect::<BTreeSet<_>>()
    );
}

#[tokio::test]
async fn test_group_grant_requires_membership() {
    let drive = TestDrive::new();
    let group = GroupId::new();
    let member = UserId::new();
    let outsider = UserId::new();
    drive.store.add_member(member, group);

    drive
        .insert_directory(directory_grant(
            DirectoryResource::Folder(drive.docs),
            GranteeIdentity::Group(group),
            &[DirectoryPermission::View],
            false,
        ))
        .await;

    let evaluator = drive.directory_evaluator();
    let resource = DirectoryResource::Folder(drive.docs);

    let member_perms = evaluator
        .evaluate(&resource, &GranteeIdentity::User(member), NOW_MS)
        .await
        .unwrap();
    assert!(member_perms.contains(&DirectoryPermission::View));

    let outsider_perms = evaluator
        .evaluate(&resource, &GranteeIdentity::User(outsider), NOW_MS)
        .await
        .unwrap();
    assert!(outsider_perms.is_empty());
}

#[tokio::test]
async fn test_public_grant_applies_to_any_user() {
    let drive = TestDrive::new();
    drive
        .insert_directory(directory_grant(
            DirectoryResource::File(drive.notes),
            GranteeIdentity::Public,
            &[DirectoryPermission::View],
            false,
        ))
        .await;

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drive.notes),
            &GranteeIdentity::User(UserId::new()),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(perms.contains(&DirectoryPermission::View));
}

#[tokio::test]
async fn test_placeholder_grant_never_applies_to_users() {
    let drive = TestDrive::new();
    drive
        .insert_directory(directory_grant(
            DirectoryResource::File(drive.notes),
            GranteeIdentity::Placeholder(PlaceholderId::new()),
            &[DirectoryPermission::View],
            false,
        ))
        .await;

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drive.notes),
            &GranteeIdentity::User(UserId::new()),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(perms.is_empty());
}

#[tokio::test]
async fn test_inheritable_grant_flows_to_descendants() {
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

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(user),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(perms.contains(&DirectoryPermission::View));
}

#[tokio::test]
async fn test_non_inheritable_grant_counts_only_at_its_origin() {
    let drive = TestDrive::new();
    let user = UserId::new();
    drive
        .insert_directory(directory_grant(
            DirectoryResource::Folder(drive.reports),
            GranteeIdentity::User(user),
            &[DirectoryPermission::View],
            false,
        ))
        .await;

    let evaluator = drive.directory_evaluator();
    let requester = GranteeIdentity::User(user);

    let on_origin = evaluator
        .evaluate(&DirectoryResource::Folder(drive.reports), &requester, NOW_MS)
        .await
        .unwrap();
    assert!(on_origin.contains(&DirectoryPermission::View));

    let on_child = evaluator
        .evaluate(&DirectoryResource::File(drive.q3), &requester, NOW_MS)
        .await
        .unwrap();
    assert!(on_child.is_empty());
}

#[tokio::test]
async fn test_sovereign_boundary_stops_inheritance() {
    let drive = TestDrive::new();
    let group = GroupId::new();
    let member = UserId::new();
    drive.store.add_member(member, group);

    // projects is sovereign: a grant on it reaches q3.pdf, a grant on
    // anything above it does not.
    drive
        .insert_directory(directory_grant(
            DirectoryResource::Folder(drive.projects),
            GranteeIdentity::Group(group),
            &[DirectoryPermission::View],
            true,
        ))
        .await;
    drive
        .insert_directory(directory_grant(
            DirectoryResource::Folder(drive.root),
            GranteeIdentity::Group(group),
            &[DirectoryPermission::Manage],
            true,
        ))
        .await;

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drive.q3),
            &GranteeIdentity::User(member),
            NOW_MS,
        )
        .await
        .unwrap();

    assert_eq!(
        perms,
        [DirectoryPermission::View].into_iter().collect::<BTreeSet<_>>()
    );
}

#[tokio::test]
async fn test_temporal_window_boundaries() {
    let drive = TestDrive::new();
    let user = UserId::new();
    let mut grant = directory_grant(
        DirectoryResource::File(drive.notes),
        GranteeIdentity::User(user),
        &[DirectoryPermission::View],
        false,
    );
    grant.begin_at = NOW_MS;
    grant.expire_at = NOW_MS + 10_000;
    drive.insert_directory(grant).await;

    let evaluator = drive.directory_evaluator();
    let resource = DirectoryResource::File(drive.notes);
    let requester = GranteeIdentity::User(user);

    // One tick before the window opens: excluded.
    let before = evaluator
        .evaluate(&resource, &requester, NOW_MS - 1)
        .await
        .unwrap();
    assert!(before.is_empty());

    // The instant begin_at is reached: included.
    let at_begin = evaluator
        .evaluate(&resource, &requester, NOW_MS)
        .await
        .unwrap();
    assert!(at_begin.contains(&DirectoryPermission::View));

    // The instant expire_at is reached: excluded again.
    let at_expiry = evaluator
        .evaluate(&resource, &requester, NOW_MS + 10_000)
        .await
        .unwrap();
    assert!(at_expiry.is_empty());
}

#[tokio::test]
async fn test_missing_resource_evaluates_to_empty_set() {
    let drive = TestDrive::new();

    let perms = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::File(drivehub_core::types::FileId::new()),
            &GranteeIdentity::User(UserId::new()),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(perms.is_empty());
}

#[tokio::test]
async fn test_folder_cycle_reported_as_corrupt_hierarchy() {
    use chrono::Utc;
    use drivehub_core::types::{DiskId, FolderId};
    use drivehub_entity::drive::{Disk, FolderMeta};

    let drive = TestDrive::new();
    let disk = DiskId::new();
    drive.store.add_disk(Disk {
        id: disk,
        name: "Loop".to_string(),
        root_path: "disk::loop".to_string(),
        created_at: Utc::now(),
    });

    let a = FolderId::new();
    let b = FolderId::new();
    drive.store.add_folder(FolderMeta {
        id: a,
        disk_id: disk,
        parent_id: Some(b),
        name: "a".to_string(),
        full_path: "disk::loop/a".to_string(),
        is_sovereign: false,
        owner_id: drive.owner,
    });
    drive.store.add_folder(FolderMeta {
        id: b,
        disk_id: disk,
        parent_id: Some(a),
        name: "b".to_string(),
        full_path: "disk::loop/b".to_string(),
        is_sovereign: false,
        owner_id: drive.owner,
    });

    let err = drive
        .directory_evaluator()
        .evaluate(
            &DirectoryResource::Folder(a),
            &GranteeIdentity::User(UserId::new()),
            NOW_MS,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::CorruptHierarchy);
}

#[tokio::test]
async fn test_system_grant_matches_exact_resource_only() {
    let drive = TestDrive::new();
    let user = UserId::new();
    drive
        .insert_system(system_grant(
            SystemResource::Table("contacts".to_string()),
            GranteeIdentity::User(user),
            &[SystemPermission::View, SystemPermission::Edit],
        ))
        .await;

    let evaluator = drive.system_evaluator();
    let requester = GranteeIdentity::User(user);

    let on_target = evaluator
        .evaluate(
            &SystemResource::Table("contacts".to_string()),
            &requester,
            NOW_MS,
        )
        .await
        .unwrap();
    assert_eq!(
        on_target,
        [SystemPermission::View, SystemPermission::Edit]
            .into_iter()
            .collect::<BTreeSet<_>>()
    );

    let on_other_table = evaluator
        .evaluate(
            &SystemResource::Table("invoices".to_string()),
            &requester,
            NOW_MS,
        )
        .await
        .unwrap();
    assert!(on_other_table.is_empty());

    let on_record = evaluator
        .evaluate(
            &SystemResource::Record("contacts/42".to_string()),
            &requester,
            NOW_MS,
        )
        .await
        .unwrap();
    assert!(on_record.is_empty());
}

#[tokio::test]
async fn test_system_owner_bypass() {
    let drive = TestDrive::new();

    let perms = drive
        .system_evaluator()
        .evaluate(
            &SystemResource::Table("webhooks".to_string()),
            &GranteeIdentity::User(drive.owner),
            NOW_MS,
        )
        .await
        .unwrap();

    assert_eq!(perms, SystemPermission::all());
}

#[tokio::test]
async fn test_system_group_grant_via_membership() {
    let drive = TestDrive::new();
    let group = GroupId::new();
    let member = UserId::new();
    drive.store.add_member(member, group);

    drive
        .insert_system(system_grant(
            SystemResource::Record("contacts/7".to_string()),
            GranteeIdentity::Group(group),
            &[SystemPermission::View],
        ))
        .await;

    let perms = drive
        .system_evaluator()
        .evaluate(
            &SystemResource::Record("contacts/7".to_string()),
            &GranteeIdentity::User(member),
            NOW_MS,
        )
        .await
        .unwrap();

    assert!(perms.contains(&SystemPermission::View));
}
