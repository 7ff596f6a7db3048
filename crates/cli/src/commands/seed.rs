//! Seed the catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: Classic Tee
//!   description: Heavyweight cotton t-shirt
//!   price: "19.99"
//!   originalPrice: "24.99"
//!   category: Men
//!   brand: Basics
//!   images: [/img/tee-1.jpg]
//!   colors:
//!     - { name: Black, code: "#000000" }
//!   sizes: [S, M, L]
//!   stock: 40
//!   featured: true
//! ```
//!
//! The whole file is validated before any connection is opened.

use std::path::Path;

use tracing::{error, info};

use fashion_store_core::{Product, ProductDraft};
use fashion_store_storefront::db::{self, products::ProductRepository};

/// Every listing problem in the catalog, each prefixed with the entry's
/// position.
fn validate(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .enumerate()
        .flat_map(|(index, product)| {
            let at = format!("product #{} ({})", index + 1, product.name);
            product
                .listing_problems()
                .into_iter()
                .map(move |problem| format!("{at}: {problem}"))
        })
        .collect()
}

/// Seed products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete the current catalog first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be
/// read or fails validation, or a database operation fails.
pub async fn products(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path).await?;
    let drafts: Vec<ProductDraft> = serde_yaml::from_str(&content)?;
    let products: Vec<Product> = drafts.into_iter().map(ProductDraft::into_product).collect();

    info!(products = products.len(), "Parsed catalog");

    let errors = validate(&products);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    if clear_existing {
        let removed = repo.delete_all().await?;
        info!(removed, "Cleared existing catalog");
    }

    let mut inserted = 0_usize;
    for product in products {
        let id = repo.insert(&product).await?;
        info!(%id, name = %product.name, "Inserted product");
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use fashion_store_core::{Category, Size};
    use rust_decimal::Decimal;

    fn parse(yaml: &str) -> Vec<Product> {
        serde_yaml::from_str::<Vec<ProductDraft>>(yaml)
            .unwrap()
            .into_iter()
            .map(ProductDraft::into_product)
            .collect()
    }

    const CATALOG: &str = r##"
- name: Classic Tee
  price: "19.99"
  originalPrice: "24.99"
  category: Men
  brand: Basics
  images: [/img/tee.jpg]
  colors:
    - { name: Black, code: "#000000" }
  sizes: [S, M, "32"]
  stock: 40
  featured: true
- name: Rain Jacket
  price: "89.00"
  category: Women
  brand: Outerwear Co
  images: [/img/jacket.jpg]
"##;

    #[test]
    fn test_parses_catalog() {
        let products = parse(CATALOG);
        assert_eq!(products.len(), 2);
        assert!(validate(&products).is_empty());

        let tee = &products[0];
        assert_eq!(tee.category, Category::Men);
        assert_eq!(tee.original_price, Decimal::new(2499, 2));
        assert_eq!(tee.sizes, vec![Size::S, Size::M, Size::Custom("32".to_owned())]);
        assert!(tee.is_active);
    }

    #[test]
    fn test_original_price_defaults_to_price() {
        let products = parse(CATALOG);
        let jacket = &products[1];
        assert_eq!(jacket.original_price, jacket.price);
        assert_eq!(jacket.stock, 0);
        assert!(!jacket.featured);
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let yaml = r#"
- name: " "
  price: "-1"
  category: Kids
  brand: ""
  stock: -3
"#;
        let errors = validate(&parse(yaml));

        assert_eq!(errors.len(), 5);
        assert!(errors[0].starts_with("product #1"));
        assert!(errors.iter().any(|e| e.ends_with("at least one image is required")));
    }

    #[test]
    fn test_unknown_category_is_a_parse_error() {
        let yaml = "- { name: Bowl, price: \"5\", category: Pets, brand: Home, images: [a.jpg] }";
        assert!(serde_yaml::from_str::<Vec<ProductDraft>>(yaml).is_err());
    }
}
