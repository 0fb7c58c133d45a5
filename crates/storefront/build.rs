//! Build script for storefront crate.
//!
//! Migrations are embedded with `sqlx::migrate!`, which cannot see new files
//! on its own. Rebuild whenever the migrations directory changes.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
