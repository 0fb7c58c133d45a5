//! Catalog seeding from a directory of sneaker images.
//!
//! Each image becomes one item. The display name comes from the file stem
//! (`air-max-90.jpg` is listed as "Air Max 90"); price, stock and gender are
//! random, which is enough for a demo catalog.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::info;

use kicks_core::{Gender, Price};
use kicks_storefront::db::{self, ItemRepository};
use kicks_storefront::models::NewItem;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// Seed one item per image in `dir`.
///
/// # Arguments
///
/// * `dir` - Directory to scan (not recursive)
/// * `image_prefix` - Path stored on each item, joined with the file name
/// * `reset` - Delete never-ordered items first
///
/// # Errors
///
/// Returns an error if the directory cannot be read, the database URL is
/// missing, or an insert fails.
pub async fn items(
    dir: &Path,
    image_prefix: &str,
    reset: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let images = collect_images(dir)?;
    if images.is_empty() {
        return Err(format!("No images found in {}", dir.display()).into());
    }
    info!(count = images.len(), dir = %dir.display(), "Found images");

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    let repo = ItemRepository::new(&pool);

    if reset {
        let removed = repo.delete_all_unordered().await?;
        info!(removed, "Removed items without orders");
    }

    let mut rng = rand::rng();
    for path in &images {
        let item = listing_for(path, image_prefix, &mut rng)?;
        let created = repo.create(&item).await?;
        info!(
            id = %created.id,
            name = %created.name,
            price = %created.price,
            availability = created.availability,
            "Created item"
        );
    }

    info!(count = images.len(), "Seeding complete");
    Ok(())
}

/// Image files directly inside `dir`, sorted by file name.
fn collect_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    let known_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    !hidden && known_extension
}

/// Build a random listing for one image.
fn listing_for(
    path: &Path,
    image_prefix: &str,
    rng: &mut impl Rng,
) -> Result<NewItem, Box<dyn std::error::Error>> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Non UTF-8 file name: {}", path.display()))?;
    let stem = file_name.split('.').next().unwrap_or(file_name);

    let gender = if rng.random_bool(0.5) {
        Gender::Men
    } else {
        Gender::Women
    };

    Ok(NewItem {
        name: display_name(stem),
        image: image_path(image_prefix, file_name),
        price: Price::from_dollars(rng.random_range(50..=300)),
        availability: rng.random_range(3..30),
        gender,
    })
}

/// Title-case a dash separated file stem.
fn display_name(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn image_path(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name.to_owned()
    } else {
        format!("{prefix}/{file_name}")
    }
}
