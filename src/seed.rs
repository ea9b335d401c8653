//! Sample data for local setups: three accounts (one admin), five styles
//! with uploaded images and one review per style.
//!
//! ```text
//! hijab_catalog_backend seed -i           import
//! hijab_catalog_backend seed -i --force   clear everything, then import
//! hijab_catalog_backend seed -d           delete everything
//! ```

use clap::Args;

use crate::db::{ReviewExt, StyleExt, UserExt};
use crate::error::{ErrorMessage, HttpError, db_failure};
use crate::media::{ImageStore, StoredImage};
use crate::models::UserRole;
use crate::rating::recompute_aggregate;
use crate::utils::password;

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "Password123!";

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Import the sample users, styles and reviews
    #[arg(
        short = 'i',
        long,
        conflicts_with = "delete",
        required_unless_present = "delete"
    )]
    pub import: bool,

    /// Delete all users, styles and reviews
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Clear existing data before importing
    #[arg(long, requires = "import")]
    pub force: bool,
}

struct SeedUser {
    name: &'static str,
    email: &'static str,
    role: UserRole,
}

struct SeedStyle {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
}

/// Indices point into `STYLES` and `USERS`.
struct SeedReview {
    style: usize,
    user: usize,
    rating: i32,
    comment: &'static str,
}

const USERS: [SeedUser; 3] = [
    SeedUser {
        name: "Ayesha Khan",
        email: "ayesha@example.com",
        role: UserRole::User,
    },
    SeedUser {
        name: "Fatima Ahmed",
        email: "fatima@example.com",
        role: UserRole::User,
    },
    SeedUser {
        name: "Admin User",
        email: "admin@example.com",
        role: UserRole::Admin,
    },
];

const STYLES: [SeedStyle; 5] = [
    SeedStyle {
        name: "Turkish Hijab Style",
        description: "Elegant Turkish hijab style with a modern twist, perfect for formal occasions.",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcSGFNL3ytWBoEEJ0PIbutKdcQk-gbxgky06kA&s",
    },
    SeedStyle {
        name: "Casual Everyday Hijab",
        description: "Simple and comfortable hijab style for daily wear with easy wrapping technique.",
        image_url: "https://blackcamels.com.pk/cdn/shop/products/2-5_0e406f3d-a6c9-4575-b1f5-69bf92bedb50.jpg?v=1753963988",
    },
    SeedStyle {
        name: "Emirati Hijab Style",
        description: "Traditional Emirati hijab style with a luxurious feel and elegant draping.",
        image_url: "https://blackcamels.com.pk/cdn/shop/products/19-4.jpg?v=1753963985",
    },
    SeedStyle {
        name: "Modern Wrap Hijab",
        description: "Contemporary hijab style with a unique wrap that stays in place all day.",
        image_url: "https://blackcamels.com.pk/cdn/shop/products/16-4.jpg?v=1753963986",
    },
    SeedStyle {
        name: "Wedding Hijab Style",
        description: "Luxurious hijab style for weddings and special occasions with embellishments.",
        image_url: "https://blackcamels.com.pk/cdn/shop/products/7-5_5ab2a2c6-99a2-48c2-8eba-3e0def70324e.jpg?v=1753963987",
    },
];

const REVIEWS: [SeedReview; 5] = [
    SeedReview {
        style: 0,
        user: 0,
        rating: 5,
        comment: "Love this style! It's so elegant and comfortable at the same time.",
    },
    SeedReview {
        style: 1,
        user: 1,
        rating: 4,
        comment: "Great for everyday wear. Would recommend to anyone looking for comfort.",
    },
    SeedReview {
        style: 2,
        user: 2,
        rating: 5,
        comment: "Perfect for special occasions. Got so many compliments!",
    },
    SeedReview {
        style: 3,
        user: 0,
        rating: 3,
        comment: "Nice style but took some practice to get it right.",
    },
    SeedReview {
        style: 4,
        user: 1,
        rating: 5,
        comment: "Absolutely stunning! My new favorite way to wear hijab.",
    },
];

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_skipped: usize,
    pub styles: usize,
    pub reviews: usize,
}

pub async fn run<D, S>(db: &D, images: &S, args: &SeedArgs) -> Result<(), HttpError>
where
    D: UserExt + StyleExt + ReviewExt,
    S: ImageStore,
{
    if args.delete {
        let (styles, users) = delete_all(db).await?;
        tracing::info!(styles, users, "seed data destroyed");
        return Ok(());
    }

    let report = import(db, images, args.force).await?;
    tracing::info!(
        users_created = report.users_created,
        users_skipped = report.users_skipped,
        styles = report.styles,
        reviews = report.reviews,
        "seed data imported"
    );
    Ok(())
}

/// Insert the sample data. Accounts that already exist (by email) are
/// reused; styles are always added. A failed image upload keeps the
/// remote URL with no stored image.
pub async fn import<D, S>(db: &D, images: &S, force: bool) -> Result<SeedReport, HttpError>
where
    D: UserExt + StyleExt + ReviewExt,
    S: ImageStore,
{
    if force {
        delete_all(db).await?;
        tracing::info!("existing data cleared");
    }

    let mut report = SeedReport::default();

    let mut users = Vec::with_capacity(USERS.len());
    for seed in &USERS {
        let existing = db
            .get_user_by_email(seed.email)
            .await
            .map_err(db_failure("getting seed user"))?;
        if let Some(user) = existing {
            tracing::info!(email = seed.email, "user already exists, skipping");
            report.users_skipped += 1;
            users.push(user);
            continue;
        }

        let hash_password = password::hash(SEED_PASSWORD).map_err(|e| {
            tracing::error!("Password hashing error: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;
        let user = db
            .save_user(seed.name, seed.email, &hash_password, seed.role)
            .await
            .map_err(db_failure("saving seed user"))?;

        tracing::info!(email = seed.email, role = seed.role.to_str(), "user created");
        report.users_created += 1;
        users.push(user);
    }

    let mut style_ids = Vec::with_capacity(STYLES.len());
    for seed in &STYLES {
        let image = match images.upload(seed.image_url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(style = seed.name, "image upload failed, keeping remote URL: {}", e);
                StoredImage {
                    public_id: String::new(),
                    url: seed.image_url.to_string(),
                }
            }
        };

        let style = db
            .create_style(seed.name, seed.description, &image)
            .await
            .map_err(db_failure("creating seed style"))?;
        style_ids.push(style.id);
    }
    report.styles = style_ids.len();

    for seed in &REVIEWS {
        db.create_review(
            style_ids[seed.style],
            users[seed.user].id,
            seed.rating,
            seed.comment,
        )
        .await
        .map_err(db_failure("creating seed review"))?;
        report.reviews += 1;
    }

    for style_id in &style_ids {
        recompute_aggregate(db, *style_id).await;
    }

    Ok(report)
}

/// Remove every review, style and user. Returns (styles, users) removed.
pub async fn delete_all<D>(db: &D) -> Result<(u64, u64), HttpError>
where
    D: UserExt + StyleExt,
{
    let styles = db
        .delete_all_styles()
        .await
        .map_err(db_failure("deleting styles"))?;
    let users = db
        .delete_all_users()
        .await
        .map_err(db_failure("deleting users"))?;

    Ok((styles, users))
}
