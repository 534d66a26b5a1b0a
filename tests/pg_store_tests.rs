// tests/pg_store_tests.rs
//
// Run with a scratch database:
//   DATABASE_URL=postgres://... cargo test --test pg_store_tests -- --ignored

use safelearn::{
    error::AppError,
    models::{
        resource::{NewCompletion, NewResource, ResourceKind},
        tenant::NewTenant,
        user::{NewUser, Role},
    },
    store::{PgStore, Store},
};
use sqlx::postgres::PgPoolOptions;

async fn store() -> PgStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    PgStore::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

fn new_user(role: Role, email: String) -> NewUser {
    NewUser {
        tenant_id: 0,
        first_name: "Pat".to_string(),
        last_name: "Tester".to_string(),
        email,
        password_hash: "hash".to_string(),
        role,
        grade: (role == Role::Student).then(|| "8".to_string()),
        phone: None,
        student_id: None,
    }
}

async fn school(store: &PgStore) -> (i64, i64) {
    let (tenant, director) = store
        .create_school(
            NewTenant {
                name: unique("school"),
                address: String::new(),
                contact_email: unique("contact") + "@school.test",
                contact_phone: String::new(),
            },
            new_user(Role::Director, unique("director") + "@school.test"),
        )
        .await
        .unwrap();
    (tenant.id, director.id)
}

#[tokio::test]
#[ignore]
async fn duplicate_director_email_rolls_back_the_school() {
    let store = store().await;
    let email = unique("dup") + "@school.test";
    let first_name = unique("first");
    let second_name = unique("second");

    store
        .create_school(
            NewTenant {
                name: first_name,
                address: String::new(),
                contact_email: email.clone(),
                contact_phone: String::new(),
            },
            new_user(Role::Director, email.clone()),
        )
        .await
        .unwrap();

    let err = store
        .create_school(
            NewTenant {
                name: second_name.clone(),
                address: String::new(),
                contact_email: email.clone(),
                contact_phone: String::new(),
            },
            new_user(Role::Director, email),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let tenants = store.list_active_tenants().await.unwrap();
    assert!(tenants.iter().all(|t| t.name != second_name));
}

#[tokio::test]
#[ignore]
async fn completion_is_unique_per_student() {
    let store = store().await;
    let (tenant_id, director_id) = school(&store).await;

    let mut student = new_user(Role::Student, unique("student") + "@school.test");
    student.tenant_id = tenant_id;
    let student = store.create_user(student).await.unwrap();

    let resource = store
        .create_resource(NewResource {
            tenant_id,
            created_by: director_id,
            title: "Flood plan".to_string(),
            description: None,
            kind: ResourceKind::Guideline,
            content: "Move to higher ground.".to_string(),
            tags: vec!["flood".to_string()],
            is_public: true,
            thumbnail: None,
            duration_seconds: None,
        })
        .await
        .unwrap();

    let completion = NewCompletion {
        resource_id: resource.id,
        student_id: student.id,
        time_spent: 10,
    };
    store.insert_completion(completion.clone()).await.unwrap();
    let err = store.insert_completion(completion).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(store.list_student_completions(student.id).await.unwrap().len(), 1);

    // Cascade
    assert!(store.delete_resource(tenant_id, resource.id).await.unwrap());
    assert!(store.list_student_completions(student.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn foreign_tenant_rows_are_invisible() {
    let store = store().await;
    let (tenant_a, director_a) = school(&store).await;
    let (tenant_b, _) = school(&store).await;

    let resource = store
        .create_resource(NewResource {
            tenant_id: tenant_a,
            created_by: director_a,
            title: "Fire exits".to_string(),
            description: None,
            kind: ResourceKind::Article,
            content: "Know your exits.".to_string(),
            tags: vec![],
            is_public: true,
            thumbnail: None,
            duration_seconds: None,
        })
        .await
        .unwrap();

    assert!(store.find_resource(tenant_b, resource.id).await.unwrap().is_none());
    assert!(!store.delete_resource(tenant_b, resource.id).await.unwrap());
    assert_eq!(store.count_public_resources(tenant_a).await.unwrap(), 1);
}
