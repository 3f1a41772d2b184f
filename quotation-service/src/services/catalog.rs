use crate::models::Product;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

/// Outcome of merging imported products into the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

/// Product list backed by a JSON file.
///
/// Every mutation rewrites the file before returning, so a successful call
/// means the change survives a restart.
#[derive(Debug)]
pub struct ProductCatalog {
    path: PathBuf,
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Hydrate from `path`. A missing file is an empty catalog; an unreadable
    /// one is logged and also treated as empty.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let products = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Product>>(&bytes) {
                Ok(products) => products,
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        "Catalog file is corrupted, starting with an empty catalog: {}",
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = products.len(), "Product catalog loaded");
        Ok(Self { path, products })
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.matches(query)).collect()
    }

    pub async fn add(&mut self, product: Product) -> Result<(), AppError> {
        if self.products.iter().any(|p| p.same_entry(&product)) {
            return Err(AppError::bad_request(format!(
                "A product with SKU '{}' already exists",
                product.sku
            )));
        }
        tracing::info!(sku = %product.sku, "Adding product to catalog");
        let mut next = self.products.clone();
        next.push(product);
        self.commit(next).await
    }

    pub async fn update(&mut self, product: Product) -> Result<(), AppError> {
        let mut next = self.products.clone();
        let existing = next
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| AppError::not_found(format!("Product '{}' not found", product.id)))?;
        *existing = product;
        self.commit(next).await
    }

    /// Merge `products`: entries sharing an id or SKU with an existing product
    /// replace it in place, the rest are appended in order.
    pub async fn import(&mut self, products: Vec<Product>) -> Result<MergeSummary, AppError> {
        let mut next = self.products.clone();
        let mut summary = MergeSummary::default();
        for product in products {
            match next.iter_mut().find(|p| p.same_entry(&product)) {
                Some(existing) => {
                    *existing = product;
                    summary.updated += 1;
                }
                None => {
                    next.push(product);
                    summary.added += 1;
                }
            }
        }
        self.commit(next).await?;
        tracing::info!(
            added = summary.added,
            updated = summary.updated,
            "Products imported into catalog"
        );
        Ok(summary)
    }

    /// Returns false when no product had this id.
    pub async fn remove(&mut self, id: &str) -> Result<bool, AppError> {
        if !self.products.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        let next = self.products.iter().filter(|p| p.id != id).cloned().collect();
        self.commit(next).await?;
        tracing::info!(product_id = %id, "Product removed from catalog");
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<(), AppError> {
        self.commit(Vec::new()).await?;
        tracing::info!("Product catalog cleared");
        Ok(())
    }

    /// Write `next` to disk, then make it the in-memory list. On error the
    /// catalog keeps its previous contents.
    async fn commit(&mut self, next: Vec<Product>) -> Result<(), AppError> {
        self.persist(&next).await?;
        self.products = next;
        Ok(())
    }

    async fn persist(&self, products: &[Product]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(products)?;

        // The file on disk is always a complete catalog.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), "Failed to persist catalog: {}", e);
            AppError::from(e)
        })
    }
}
