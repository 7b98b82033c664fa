//! Chart of accounts, details and detail levels against a live database.

mod common;

use daftar_core::taxonomy::{CodePayload, TaxonomyError};
use daftar_db::{
    CodeRepository, DetailLevelRepository, DetailRepository, RepoError,
    TreasuryResourceRepository,
    entities::sea_orm_active_enums::DetailKind,
    repositories::{CashboxInput, DetailInput, DetailLevelInput, LinkInput},
};

#[tokio::test]
async fn test_code_hierarchy_rules() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = CodeRepository::new(db.clone());
    let group = common::test_group(&db).await;
    let tag = common::suffix();

    let err = repo
        .create(CodePayload {
            code: format!("S{tag}"),
            title: "Orphan".into(),
            kind: "specific".into(),
            parent_id: Some(group.id),
            ..CodePayload::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::InvalidParent(_))));

    let err = repo
        .create(CodePayload {
            code: format!("G{tag}"),
            title: "No parent".into(),
            kind: "general".into(),
            ..CodePayload::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::InvalidParent(_))));

    let specific = common::specific_code(&db, "Bank").await;
    let general_id = specific.parent_id.unwrap();

    let err = repo
        .create(CodePayload {
            code: specific.code.clone(),
            title: "Copy".into(),
            kind: "specific".into(),
            parent_id: Some(general_id),
            ..CodePayload::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::DuplicateCode(_))));

    let err = repo.delete(general_id).await.unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::HasChildren(_))));

    repo.delete(specific.id).await.unwrap();
    repo.delete(general_id).await.unwrap();
}

#[tokio::test]
async fn test_detail_codes_and_system_handlers() {
    let Some(db) = common::connect().await else {
        return;
    };
    let repo = DetailRepository::new(db.clone());

    let detail = common::detail(&db, "Supplier").await;
    assert_eq!(detail.code.len(), 4);
    assert_eq!(detail.kind, DetailKind::UserManaged);

    let err = repo
        .create(DetailInput {
            code: Some(detail.code.clone()),
            title: "Same code".into(),
            is_active: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::DuplicateCode(_))));

    let err = repo
        .create(DetailInput {
            code: Some("12".into()),
            title: "Short code".into(),
            is_active: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::InvalidDetailCode(_))));

    let cashbox = TreasuryResourceRepository::new(db.clone())
        .create_cashbox(CashboxInput {
            title: format!("Petty cash {}", common::suffix()),
        })
        .await
        .unwrap();
    let handler = repo.get(cashbox.handler_detail_id).await.unwrap();
    assert_eq!(handler.kind, DetailKind::SystemManaged);

    let err = repo
        .update(
            handler.id,
            DetailInput {
                code: None,
                title: "Renamed".into(),
                is_active: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::SystemManaged(_))));
    let err = repo.delete(handler.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::SystemManaged(_))));

    repo.delete(detail.id).await.unwrap();
}

#[tokio::test]
async fn test_detail_level_links() {
    let Some(db) = common::connect().await else {
        return;
    };
    let levels = DetailLevelRepository::new(db.clone());
    let details = DetailRepository::new(db.clone());
    let tag = common::suffix();

    let parent = levels
        .create(DetailLevelInput {
            code: format!("P{tag}"),
            title: "People".into(),
            parent_id: None,
        })
        .await
        .unwrap();
    let customers = levels
        .create(DetailLevelInput {
            code: format!("C{tag}"),
            title: "Customers".into(),
            parent_id: Some(parent.id),
        })
        .await
        .unwrap();
    let suppliers = levels
        .create(DetailLevelInput {
            code: format!("S{tag}"),
            title: "Suppliers".into(),
            parent_id: Some(parent.id),
        })
        .await
        .unwrap();

    let detail = common::detail(&db, "Both sides").await;

    let err = details
        .link_level(
            detail.id,
            LinkInput {
                detail_level_id: parent.id,
                is_primary: true,
                position: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::LinkMustBeLeaf(_))));

    details
        .link_level(
            detail.id,
            LinkInput {
                detail_level_id: customers.id,
                is_primary: true,
                position: 0,
            },
        )
        .await
        .unwrap();
    details
        .link_level(
            detail.id,
            LinkInput {
                detail_level_id: suppliers.id,
                is_primary: true,
                position: 1,
            },
        )
        .await
        .unwrap();

    let links = details.levels(detail.id).await.unwrap();
    assert_eq!(links.len(), 2);
    let primaries: Vec<_> = links.iter().filter(|l| l.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].detail_level_id, suppliers.id);

    // A linked level cannot become a parent, and cannot be deleted.
    let err = levels
        .create(DetailLevelInput {
            code: format!("X{tag}"),
            title: "Nested".into(),
            parent_id: Some(customers.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::InvalidParent(_))));
    let err = levels.delete(customers.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::LevelInUse(_))));
    let err = levels.delete(parent.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::HasChildren(_))));

    // Moving the parent under its own child is a cycle.
    let err = levels
        .update(
            parent.id,
            DetailLevelInput {
                code: format!("P{tag}"),
                title: "People".into(),
                parent_id: Some(suppliers.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::InvalidParent(_))));

    details.unlink_level(detail.id, customers.id).await.unwrap();
    let err = details.unlink_level(detail.id, customers.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Taxonomy(TaxonomyError::NotFound { .. })));
    levels.delete(customers.id).await.unwrap();
}
