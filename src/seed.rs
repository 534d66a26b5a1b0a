// src/seed.rs

use crate::{
    config::SeedSchool,
    error::AppError,
    models::{
        tenant::NewTenant,
        user::{NewUser, Role, normalize_email},
    },
    store::DynStore,
    utils::hash::hash_password,
};

/// Creates the bootstrap school and its director unless the director's
/// e-mail is already registered.
pub async fn seed_school(store: &DynStore, seed: &SeedSchool) -> Result<(), AppError> {
    let email = normalize_email(&seed.director_email);

    if store.find_user_by_email(&email).await?.is_some() {
        tracing::debug!("Seed director already present, skipping");
        return Ok(());
    }

    tracing::info!("Seeding school: {}", seed.school_name);
    let (tenant, director) = store
        .create_school(
            NewTenant {
                name: seed.school_name.clone(),
                address: String::new(),
                contact_email: email.clone(),
                contact_phone: String::new(),
            },
            NewUser {
                tenant_id: 0,
                first_name: "School".to_string(),
                last_name: "Director".to_string(),
                email,
                password_hash: hash_password(&seed.director_password)?,
                role: Role::Director,
                grade: None,
                phone: None,
                student_id: None,
            },
        )
        .await?;

    tracing::info!(tenant_id = tenant.id, director_id = director.id, "Seed school created");
    Ok(())
}
